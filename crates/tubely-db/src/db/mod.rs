//! Database repositories for the data access layer

pub mod video;

pub use video::{VideoRepository, VideoStore};

use tubely_core::AppError;

/// Convert a driver error into the application's database error.
pub(crate) fn db_error(err: sqlx::Error) -> AppError {
    AppError::Database(err.to_string())
}
