use tubely_core::{AppError, Video};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::HttpAppError;
use crate::state::AppState;

/// Path ids arrive as strings so a malformed one is a 400 in our error format.
pub fn parse_video_id(raw: &str) -> Result<Uuid, HttpAppError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| HttpAppError(AppError::InvalidInput("Invalid ID".to_string())))
}

/// Fetch a video the caller owns: 404 when absent, 403 when it belongs to someone else.
pub async fn load_owned_video(
    state: &AppState,
    user: AuthUser,
    video_id: Uuid,
) -> Result<Video, HttpAppError> {
    let video = state
        .videos
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    if !video.is_owned_by(user.user_id) {
        tracing::warn!(
            video_id = %video_id,
            user_id = %user.user_id,
            "Access to another user's video denied"
        );
        return Err(AppError::Forbidden("Not authorized to access this video".to_string()).into());
    }

    Ok(video)
}
