use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::ownership::{load_owned_video, parse_video_id};
use crate::state::AppState;
use crate::utils::upload::{field_content_type, multipart_error, read_field_limited};
use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tubely_core::{AppError, Video};

const THUMBNAIL_FIELD: &str = "thumbnail";

#[utoipa::path(
    post,
    path = "/api/thumbnail_upload/{video_id}",
    tag = "videos",
    params(
        ("video_id" = Uuid, Path, description = "Video ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Thumbnail stored; record carries the canonical URL", body = Video),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Video belongs to another user", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(user_id = %user.user_id, operation = "upload_thumbnail"))]
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(video_id): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    let video = load_owned_video(&state, user, video_id).await?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(THUMBNAIL_FIELD) {
            continue;
        }

        let content_type = field_content_type(&field)?;
        let data = read_field_limited(field, state.thumbnails.max_bytes()).await?;
        let updated = state
            .thumbnails
            .publish(&video, &content_type, data)
            .await?;

        return Ok(Json(updated));
    }

    Err(AppError::InvalidInput(format!("Missing '{}' file field", THUMBNAIL_FIELD)).into())
}
