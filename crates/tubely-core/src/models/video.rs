use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A video record.
///
/// Records are created elsewhere; the upload handlers only attach the
/// thumbnail and video URLs. Only the owner (`user_id`) may change them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Video {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub title: String,
    pub description: String,
    pub user_id: Uuid,
}

impl Video {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Point the record at a new thumbnail. Last write wins.
    pub fn set_thumbnail_url(&mut self, url: String) {
        self.thumbnail_url = Some(url);
        self.updated_at = Utc::now();
    }

    /// Point the record at a new processed video. Last write wins.
    pub fn set_video_url(&mut self, url: String) {
        self.video_url = Some(url);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_video(owner: Uuid) -> Video {
        let now = Utc::now();
        Video {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            thumbnail_url: None,
            video_url: None,
            title: "Boots".to_string(),
            description: "A video about boots".to_string(),
            user_id: owner,
        }
    }

    #[test]
    fn test_ownership() {
        let owner = Uuid::new_v4();
        let video = sample_video(owner);
        assert!(video.is_owned_by(owner));
        assert!(!video.is_owned_by(Uuid::new_v4()));
    }

    #[test]
    fn test_set_urls_bumps_updated_at() {
        let mut video = sample_video(Uuid::new_v4());
        let before = video.updated_at;
        video.set_video_url("https://bucket.s3.us-east-1.amazonaws.com/other/abc.mp4".into());
        video.set_thumbnail_url("http://localhost:8091/assets/thumbnails/x.png".into());
        assert!(video.updated_at >= before);
        assert_eq!(
            video.video_url.as_deref(),
            Some("https://bucket.s3.us-east-1.amazonaws.com/other/abc.mp4")
        );
        assert!(video.thumbnail_url.is_some());
    }

    #[test]
    fn test_serializes_snake_case_fields() {
        let video = sample_video(Uuid::new_v4());
        let json = serde_json::to_value(&video).unwrap();
        assert!(json.get("thumbnail_url").is_some());
        assert!(json.get("video_url").is_some());
        assert_eq!(json["user_id"], serde_json::json!(video.user_id));
    }
}
