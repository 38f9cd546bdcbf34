use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::ownership::{load_owned_video, parse_video_id};
use crate::services::signing::sign_video;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tubely_core::Video;

#[utoipa::path(
    get,
    path = "/api/videos/{video_id}",
    tag = "videos",
    params(
        ("video_id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video with signed media URLs", body = Video),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 403, description = "Video belongs to another user", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 500, description = "Stored location could not be signed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, operation = "get_video"))]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(video_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    let video = load_owned_video(&state, user, video_id).await?;

    let signed = sign_video(&state.access_urls, video).await?;
    Ok(Json(signed))
}

#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "videos",
    responses(
        (status = 200, description = "The caller's videos, newest first, with signed media URLs", body = Vec<Video>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, operation = "list_videos"))]
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let videos = state.videos.list_videos_for_user(user.user_id).await?;

    let mut signed = Vec::with_capacity(videos.len());
    for video in videos {
        signed.push(sign_video(&state.access_urls, video).await?);
    }

    Ok(Json(signed))
}
