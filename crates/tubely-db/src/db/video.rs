use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgPool, Postgres};
use tubely_core::models::Video;
use tubely_core::AppError;
use uuid::Uuid;

/// Video record access used by the upload handlers.
///
/// Records are created outside this service; the handlers only read them and
/// write back the asset URLs.
#[async_trait::async_trait]
pub trait VideoRepository: Send + Sync {
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// Persist `thumbnail_url` and `updated_at` of an existing record,
    /// leaving `video_url` as stored. Fails with `NotFound` if the record no
    /// longer exists.
    async fn update_thumbnail_url(&self, video: &Video) -> Result<(), AppError>;

    /// Persist `video_url` and `updated_at`, leaving `thumbnail_url` as
    /// stored. Fails with `NotFound` if the record no longer exists.
    async fn update_video_url(&self, video: &Video) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct PostgresVideoRepository {
    pool: PgPool,
}

impl PostgresVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a record. Used by seeding tools and tests.
    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "insert", db.record_id = %video.id))]
    pub async fn create_video(&self, video: &Video) -> Result<Video, AppError> {
        let created = sqlx::query_as::<Postgres, Video>(
            r#"
            INSERT INTO videos (
                id, created_at, updated_at, thumbnail_url, video_url, title, description, user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, created_at, updated_at, thumbnail_url, video_url, title, description, user_id
            "#,
        )
        .bind(video.id)
        .bind(video.created_at)
        .bind(video.updated_at)
        .bind(&video.thumbnail_url)
        .bind(&video.video_url)
        .bind(&video.title)
        .bind(&video.description)
        .bind(video.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn execute_update(
        &self,
        query: Query<'_, Postgres, PgArguments>,
        video_id: Uuid,
    ) -> Result<(), AppError> {
        let result = query.execute(&self.pool).await.map_err(|e| {
            tracing::error!(error = ?e, video_id = %video_id, "Failed to update video");
            AppError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Couldn't find video".to_string()));
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl VideoRepository for PostgresVideoRepository {
    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let video = sqlx::query_as::<Postgres, Video>(
            r#"
            SELECT id, created_at, updated_at, thumbnail_url, video_url, title, description, user_id
            FROM videos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "update", db.record_id = %video.id))]
    async fn update_thumbnail_url(&self, video: &Video) -> Result<(), AppError> {
        let query = sqlx::query(
            r#"
            UPDATE videos
            SET thumbnail_url = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(video.id)
        .bind(&video.thumbnail_url)
        .bind(video.updated_at);

        self.execute_update(query, video.id).await
    }

    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "update", db.record_id = %video.id))]
    async fn update_video_url(&self, video: &Video) -> Result<(), AppError> {
        let query = sqlx::query(
            r#"
            UPDATE videos
            SET video_url = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(video.id)
        .bind(&video.video_url)
        .bind(video.updated_at);

        self.execute_update(query, video.id).await
    }
}
