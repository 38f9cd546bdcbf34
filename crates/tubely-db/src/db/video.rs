use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use tubely_core::{AppError, Video};
use uuid::Uuid;

use super::db_error;

/// Metadata store for video records.
#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn create_video(&self, video: &Video) -> Result<Video, AppError>;

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// Videos owned by `user_id`, newest first.
    async fn list_videos_for_user(&self, user_id: Uuid) -> Result<Vec<Video>, AppError>;

    /// Set only the `video_url` column and return the stored row.
    ///
    /// Other columns keep whatever was last committed, so concurrent
    /// thumbnail and video uploads for one record do not overwrite each other.
    /// Fails with `NotFound` when no record has the id.
    async fn set_video_url(&self, id: Uuid, url: &str) -> Result<Video, AppError>;

    /// Set only the `thumbnail_url` column and return the stored row.
    async fn set_thumbnail_url(&self, id: Uuid, url: &str) -> Result<Video, AppError>;
}

#[derive(sqlx::FromRow)]
struct VideoRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: String,
    thumbnail_url: Option<String>,
    video_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VideoRow> for Video {
    fn from(row: VideoRow) -> Self {
        Video {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            thumbnail_url: row.thumbnail_url,
            video_url: row.video_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const VIDEO_COLUMNS: &str =
    "id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at";

/// PostgreSQL-backed [`VideoStore`]
#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `column` is always one of the fixed URL columns.
    async fn set_url_column(&self, id: Uuid, column: &'static str, url: &str) -> Result<Video, AppError> {
        let row = sqlx::query_as::<Postgres, VideoRow>(&format!(
            r#"
            UPDATE videos
            SET {} = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            column, VIDEO_COLUMNS
        ))
        .bind(id)
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(Video::from)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))
    }
}

#[async_trait]
impl VideoStore for VideoRepository {
    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "insert", db.record_id = %video.id))]
    async fn create_video(&self, video: &Video) -> Result<Video, AppError> {
        let row = sqlx::query_as::<Postgres, VideoRow>(&format!(
            r#"
            INSERT INTO videos (id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            VIDEO_COLUMNS
        ))
        .bind(video.id)
        .bind(video.user_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.thumbnail_url)
        .bind(&video.video_url)
        .bind(video.created_at)
        .bind(video.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let row = sqlx::query_as::<Postgres, VideoRow>(&format!(
            "SELECT {} FROM videos WHERE id = $1",
            VIDEO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Video::from))
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn list_videos_for_user(&self, user_id: Uuid) -> Result<Vec<Video>, AppError> {
        let rows = sqlx::query_as::<Postgres, VideoRow>(&format!(
            "SELECT {} FROM videos WHERE user_id = $1 ORDER BY created_at DESC",
            VIDEO_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(Video::from).collect())
    }

    #[tracing::instrument(skip(self, url), fields(db.table = "videos", db.operation = "update", db.record_id = %id))]
    async fn set_video_url(&self, id: Uuid, url: &str) -> Result<Video, AppError> {
        self.set_url_column(id, "video_url", url).await
    }

    #[tracing::instrument(skip(self, url), fields(db.table = "videos", db.operation = "update", db.record_id = %id))]
    async fn set_thumbnail_url(&self, id: Uuid, url: &str) -> Result<Video, AppError> {
        self.set_url_column(id, "thumbnail_url", url).await
    }
}
