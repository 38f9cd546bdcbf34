//! OpenAPI documentation, served at `/api-docs/openapi.json`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use tubely_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tubely API",
        version = "0.1.0",
        description = "Video upload and delivery. Uploaded videos are probed, remuxed for fast start, stored under an aspect-ratio prefix and served through short-lived signed URLs."
    ),
    paths(
        handlers::health::health_check,
        handlers::video_create::create_video,
        handlers::video_get::get_video,
        handlers::video_get::list_videos,
        handlers::video_upload::upload_video,
        handlers::thumbnail_upload::upload_thumbnail,
    ),
    components(
        schemas(
            models::Video,
            models::CreateVideoRequest,
            models::VideoCategory,
            error::ErrorResponse,
            handlers::health::HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "videos", description = "Video records, uploads and signed delivery URLs"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
