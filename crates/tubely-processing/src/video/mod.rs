//! Video inspection and preparation.

pub mod classify;
pub mod probe;
pub mod remux;

pub use classify::classify_aspect_ratio;
pub use probe::{parse_probe_output, MediaAnalyzer, ProbeError, ProbeResult};
pub use remux::{RemuxError, RemuxedFile, Remuxer};
