//! Tubely Processing Library
//!
//! The video ingestion pipeline and the pieces it is built from:
//!
//! - [`staging`]: spool an upload stream to a scratch file under a byte ceiling
//! - [`command`]: run external tools with a deadline
//! - [`video`]: ffprobe analysis, ffmpeg fast-start remux, aspect-ratio classification
//! - [`upload`]: the [`VideoIngestPipeline`] and thumbnail publishing
//!
//! Every scratch artifact is owned by a drop guard, so no exit path leaves files behind.

pub mod command;
pub mod staging;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
pub mod upload;
pub mod video;

// Re-export commonly used types
pub use command::{run_with_deadline, CommandError, CommandOutput};
pub use staging::{stage, StagedFile, StagingError};
pub use upload::{IngestConfig, IngestError, ThumbnailPublisher, VideoIngestPipeline};
pub use video::{classify_aspect_ratio, MediaAnalyzer, ProbeError, ProbeResult, RemuxError, RemuxedFile, Remuxer};
