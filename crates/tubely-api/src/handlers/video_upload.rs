use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::ownership::{load_owned_video, parse_video_id};
use crate::state::AppState;
use crate::utils::upload::{field_content_type, multipart_error};
use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tubely_core::{AppError, Video};

const VIDEO_FIELD: &str = "video";

#[utoipa::path(
    post,
    path = "/api/video_upload/{video_id}",
    tag = "videos",
    params(
        ("video_id" = Uuid, Path, description = "Video ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video stored; record carries the canonical URL", body = Video),
        (status = 400, description = "Invalid input or unprocessable media", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Video belongs to another user", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Stored but record not updated", body = ErrorResponse),
        (status = 502, description = "Object store failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(user_id = %user.user_id, operation = "upload_video"))]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(video_id): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    let video = load_owned_video(&state, user, video_id).await?;

    tracing::info!(video_id = %video_id, "Uploading video");

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        let content_type = field_content_type(&field)?;
        let updated = state
            .ingest
            .ingest(&video, &content_type, Box::pin(field))
            .await?;

        return Ok(Json(updated));
    }

    Err(AppError::InvalidInput(format!("Missing '{}' file field", VIDEO_FIELD)).into())
}
