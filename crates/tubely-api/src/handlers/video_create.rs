use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tubely_core::models::CreateVideoRequest;
use tubely_core::{AppError, Video};

const MAX_TITLE_LEN: usize = 256;

#[utoipa::path(
    post,
    path = "/api/videos",
    tag = "videos",
    request_body = CreateVideoRequest,
    responses(
        (status = 201, description = "Draft video created", body = Video),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(user_id = %user.user_id, operation = "create_video"))]
pub async fn create_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateVideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("Title is required".to_string()).into());
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::InvalidInput(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LEN
        ))
        .into());
    }

    let video = Video::new(user.user_id, title.to_string(), request.description);
    let created = state.videos.create_video(&video).await?;

    tracing::info!(video_id = %created.id, "Draft video created");

    Ok((StatusCode::CREATED, Json(created)))
}
