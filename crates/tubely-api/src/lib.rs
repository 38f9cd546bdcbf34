//! Tubely API Library
//!
//! HTTP handlers, authentication, error rendering and application setup around the
//! video ingestion pipeline.

// Module declarations
mod api_doc;
mod constants;
mod handlers;
mod services;
mod utils;

// Public modules
pub mod auth;
pub mod error;
pub mod setup;
pub mod state;
pub mod telemetry;

// Re-exports
pub use api_doc::ApiDoc;
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
