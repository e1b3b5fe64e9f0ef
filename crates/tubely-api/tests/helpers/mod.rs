//! Shared setup for upload integration tests.
//!
//! The router is built exactly as in production, but the database, object
//! store and media tools are replaced with in-process fakes so the tests need
//! neither Postgres nor ffmpeg.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Utc;
use object_store::memory::InMemory;
use object_store::ObjectStoreExt;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tubely_api::auth::issue_access_token;
use tubely_api::setup::routes::setup_routes;
use tubely_api::AppState;
use tubely_core::{AppError, Config, StorageBackend, Video};
use tubely_db::VideoRepository;
use tubely_processing::{MediaInspector, MediaRepackager, StreamDimensions};
use tubely_storage::{LocalStorage, S3Storage, Storage, StorageError, StorageResult};
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-chars";
pub const BUCKET: &str = "tubely-videos";
pub const REGION: &str = "us-east-2";
pub const ASSETS_BASE_URL: &str = "http://localhost:8091/assets";

/// Videos kept in a map instead of Postgres.
#[derive(Default)]
pub struct InMemoryVideoRepository {
    videos: Mutex<HashMap<Uuid, Video>>,
}

impl InMemoryVideoRepository {
    pub fn insert(&self, video: Video) {
        self.videos.lock().unwrap().insert(video.id, video);
    }

    pub fn get(&self, id: Uuid) -> Option<Video> {
        self.videos.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.get(id))
    }

    async fn update_thumbnail_url(&self, video: &Video) -> Result<(), AppError> {
        let mut videos = self.videos.lock().unwrap();
        let existing = videos
            .get_mut(&video.id)
            .ok_or_else(|| AppError::NotFound("Couldn't find video".to_string()))?;
        existing.thumbnail_url = video.thumbnail_url.clone();
        existing.updated_at = video.updated_at;
        Ok(())
    }

    async fn update_video_url(&self, video: &Video) -> Result<(), AppError> {
        let mut videos = self.videos.lock().unwrap();
        let existing = videos
            .get_mut(&video.id)
            .ok_or_else(|| AppError::NotFound("Couldn't find video".to_string()))?;
        existing.video_url = video.video_url.clone();
        existing.updated_at = video.updated_at;
        Ok(())
    }
}

/// Reports fixed dimensions for every file.
pub struct FixedInspector(pub Option<StreamDimensions>);

#[async_trait]
impl MediaInspector for FixedInspector {
    async fn probe_dimensions(&self, _path: &Path) -> anyhow::Result<Option<StreamDimensions>> {
        Ok(self.0)
    }
}

pub struct FailingInspector;

#[async_trait]
impl MediaInspector for FailingInspector {
    async fn probe_dimensions(&self, _path: &Path) -> anyhow::Result<Option<StreamDimensions>> {
        anyhow::bail!("ffprobe exited with status 1")
    }
}

/// Copies the input next to itself, the way the ffmpeg repackager names its
/// output.
pub struct CopyRepackager;

#[async_trait]
impl MediaRepackager for CopyRepackager {
    async fn faststart(&self, input: &Path) -> anyhow::Result<PathBuf> {
        let output = tubely_processing::video::faststart::output_path(input);
        tokio::fs::copy(input, &output).await?;
        Ok(output)
    }
}

/// Like [`CopyRepackager`], but stores a thumbnail on every record while it
/// runs, as a concurrent thumbnail upload would.
pub struct ThumbnailRacingRepackager {
    pub repo: Arc<InMemoryVideoRepository>,
    pub thumbnail_url: String,
}

#[async_trait]
impl MediaRepackager for ThumbnailRacingRepackager {
    async fn faststart(&self, input: &Path) -> anyhow::Result<PathBuf> {
        let ids: Vec<Uuid> = self.repo.videos.lock().unwrap().keys().copied().collect();
        for id in ids {
            if let Some(mut video) = self.repo.get(id) {
                video.set_thumbnail_url(self.thumbnail_url.clone());
                self.repo.update_thumbnail_url(&video).await?;
            }
        }
        CopyRepackager.faststart(input).await
    }
}

pub struct FailingRepackager;

#[async_trait]
impl MediaRepackager for FailingRepackager {
    async fn faststart(&self, _input: &Path) -> anyhow::Result<PathBuf> {
        anyhow::bail!("moov atom not found")
    }
}

/// Wraps a storage backend and records every key written through it.
pub struct RecordingStorage {
    inner: Arc<dyn Storage>,
    keys: Mutex<Vec<String>>,
}

impl RecordingStorage {
    pub fn new(inner: Arc<dyn Storage>) -> Self {
        Self {
            inner,
            keys: Mutex::new(Vec::new()),
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        self.keys.lock().unwrap().push(storage_key.to_string());
        self.inner
            .upload_with_key(storage_key, data, content_type)
            .await
    }
}

pub struct FailingStorage;

#[async_trait]
impl Storage for FailingStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        _data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<String> {
        Err(StorageError::UploadFailed(format!(
            "connection reset while writing {}",
            storage_key
        )))
    }
}

/// Which fakes to wire in. Defaults describe a working 1920x1080 upload.
pub struct TestOptions {
    pub repo: Arc<InMemoryVideoRepository>,
    pub inspector: Arc<dyn MediaInspector>,
    pub repackager: Arc<dyn MediaRepackager>,
    pub failing_video_storage: bool,
    pub max_thumbnail_size_bytes: usize,
    pub max_video_size_bytes: usize,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            repo: Arc::new(InMemoryVideoRepository::default()),
            inspector: Arc::new(FixedInspector(Some(StreamDimensions {
                width: 1920,
                height: 1080,
            }))),
            repackager: Arc::new(CopyRepackager),
            failing_video_storage: false,
            max_thumbnail_size_bytes: 10 * 1024 * 1024,
            max_video_size_bytes: 50 * 1024 * 1024,
        }
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub repo: Arc<InMemoryVideoRepository>,
    pub videos: Arc<RecordingStorage>,
    /// Object store behind `videos`, for reading back uploaded bytes.
    pub video_store: Arc<InMemory>,
    pub thumbnails: Arc<RecordingStorage>,
    pub assets_dir: TempDir,
    pub staging_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Insert a fresh record owned by `owner`.
    pub fn seed_video(&self, owner: Uuid) -> Video {
        let now = Utc::now();
        let video = Video {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            thumbnail_url: None,
            video_url: None,
            title: "Boots".to_string(),
            description: "A review of hiking boots".to_string(),
            user_id: owner,
        };
        self.repo.insert(video.clone());
        video
    }

    /// Number of entries left in the staging directory.
    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.staging_dir.path())
            .expect("Failed to read staging dir")
            .count()
    }

    /// Bytes stored under `key` in the video bucket.
    pub async fn video_object(&self, key: &str) -> Vec<u8> {
        self.video_store
            .get(&object_store::path::Path::from(key))
            .await
            .expect("Object not found")
            .bytes()
            .await
            .expect("Failed to read object")
            .to_vec()
    }
}

pub fn bearer(user_id: Uuid) -> String {
    let token = issue_access_token(user_id, JWT_SECRET, chrono::Duration::hours(1))
        .expect("Failed to issue token");
    format!("Bearer {}", token)
}

fn test_config(options: &TestOptions, assets_dir: &Path, staging_dir: &Path) -> Config {
    Config {
        server_port: 0,
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        log_format: "pretty".to_string(),
        database_url: "postgres://localhost/tubely_test".to_string(),
        db_max_connections: 1,
        db_timeout_seconds: 1,
        jwt_secret: JWT_SECRET.to_string(),
        assets_root: assets_dir.to_path_buf(),
        assets_base_url: ASSETS_BASE_URL.to_string(),
        storage_backend: StorageBackend::S3,
        s3_bucket: Some(BUCKET.to_string()),
        s3_region: Some(REGION.to_string()),
        s3_endpoint: None,
        local_storage_path: None,
        local_storage_base_url: None,
        ffprobe_path: "ffprobe".to_string(),
        ffmpeg_path: "ffmpeg".to_string(),
        upload_staging_dir: Some(staging_dir.to_path_buf()),
        max_thumbnail_size_bytes: options.max_thumbnail_size_bytes,
        max_video_size_bytes: options.max_video_size_bytes,
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestOptions::default()).await
}

pub async fn setup_test_app_with(options: TestOptions) -> TestApp {
    let assets_dir = tempfile::tempdir().expect("Failed to create assets dir");
    let staging_dir = tempfile::tempdir().expect("Failed to create staging dir");
    let config = test_config(&options, assets_dir.path(), staging_dir.path());

    let local = LocalStorage::new(assets_dir.path(), ASSETS_BASE_URL.to_string())
        .await
        .expect("Failed to create asset storage");
    let thumbnails = Arc::new(RecordingStorage::new(Arc::new(local)));

    let video_store = Arc::new(InMemory::new());
    let video_backend: Arc<dyn Storage> = if options.failing_video_storage {
        Arc::new(FailingStorage)
    } else {
        Arc::new(S3Storage::with_store(
            video_store.clone(),
            BUCKET.to_string(),
            REGION.to_string(),
            None,
        ))
    };
    let videos = Arc::new(RecordingStorage::new(video_backend));

    let repo = options.repo;

    let state = Arc::new(AppState {
        config,
        videos: repo.clone(),
        assets: thumbnails.clone(),
        video_storage: videos.clone(),
        inspector: options.inspector,
        repackager: options.repackager,
    });

    let app = setup_routes(state).expect("Failed to build routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        repo,
        videos,
        video_store,
        thumbnails,
        assets_dir,
        staging_dir,
    }
}
