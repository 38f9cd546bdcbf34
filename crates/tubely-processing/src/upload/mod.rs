//! Upload pipeline: validate → stage → probe → remux → classify → store → record.

pub mod error;
pub mod pipeline;
pub mod thumbnail;

pub use error::IngestError;
pub use pipeline::{IngestConfig, VideoIngestPipeline};
pub use thumbnail::ThumbnailPublisher;
