//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::constants::{API_PREFIX, MULTIPART_OVERHEAD_BYTES};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tubely_core::Config;
use utoipa::OpenApi;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    // Public routes (no authentication required)
    let public_routes = public_routes();

    // Protected routes (require authentication)
    let protected_routes = protected_routes(state.clone()).layer(
        axum::middleware::from_fn_with_state(
            state.jwt.clone(),
            crate::auth::middleware::auth_middleware,
        ),
    );

    let app = public_routes
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        );

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

/// Public routes (no authentication required)
fn public_routes() -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
}

/// Protected routes (require authentication).
fn protected_routes(state: Arc<AppState>) -> Router {
    let video_body_limit = state
        .config
        .max_video_size_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let thumbnail_body_limit = state
        .config
        .max_thumbnail_size_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route(
            &format!("{}/videos", API_PREFIX),
            post(handlers::video_create::create_video).get(handlers::video_get::list_videos),
        )
        .route(
            &format!("{}/videos/{{video_id}}", API_PREFIX),
            get(handlers::video_get::get_video),
        )
        .route(
            &format!("{}/video_upload/{{video_id}}", API_PREFIX),
            post(handlers::video_upload::upload_video)
                .layer(DefaultBodyLimit::max(video_body_limit)),
        )
        .route(
            &format!("{}/thumbnail_upload/{{video_id}}", API_PREFIX),
            post(handlers::thumbnail_upload::upload_thumbnail)
                .layer(DefaultBodyLimit::max(thumbnail_body_limit)),
        )
        .with_state(state)
}
