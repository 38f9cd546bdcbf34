use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A video record as kept by the metadata store.
///
/// `video_url` and `thumbnail_url` hold canonical, unsigned object locations. They are
/// only replaced with signed URLs on the way out of the API and never persisted that way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Video {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    /// Build a fresh draft record with no media attached.
    pub fn new(user_id: Uuid, title: String, description: String) -> Self {
        let now = Utc::now();
        Video {
            id: Uuid::new_v4(),
            user_id,
            title,
            description,
            thumbnail_url: None,
            video_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateVideoRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_video_is_a_draft() {
        let owner = Uuid::new_v4();
        let video = Video::new(owner, "Boots".to_string(), String::new());
        assert!(video.video_url.is_none());
        assert!(video.thumbnail_url.is_none());
        assert!(video.is_owned_by(owner));
        assert!(!video.is_owned_by(Uuid::new_v4()));
    }
}
