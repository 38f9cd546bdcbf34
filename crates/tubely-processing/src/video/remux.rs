//! Fast-start remux with ffmpeg.
//!
//! Stream-copies the staged upload into an MP4 whose `moov` atom sits before the media
//! data, so players can start before the whole file has downloaded.

use crate::command::{run_with_deadline, CommandError};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const OUTPUT_SUFFIX: &str = ".processing";

#[derive(Debug, Error)]
pub enum RemuxError {
    #[error("ffmpeg remux failed: {0}")]
    RemuxFailed(#[from] CommandError),

    #[error("ffmpeg reported success but wrote no output at {0}")]
    MissingOutput(PathBuf),
}

/// Remux output on local disk. Dropping it deletes the file.
#[derive(Debug)]
pub struct RemuxedFile {
    path: PathBuf,
}

impl RemuxedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RemuxedFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                error = %e,
                path = %self.path.display(),
                "Failed to remove remux output"
            ),
        }
    }
}

/// `<input>.processing`, next to the input.
pub fn output_path_for(input: &Path) -> PathBuf {
    let mut path: OsString = input.as_os_str().to_owned();
    path.push(OUTPUT_SUFFIX);
    PathBuf::from(path)
}

pub struct Remuxer {
    ffmpeg_path: String,
    timeout: Duration,
}

impl Remuxer {
    pub fn new(ffmpeg_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            timeout,
        }
    }

    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "remux_faststart"
    ))]
    pub async fn remux_faststart(&self, input: &Path) -> Result<RemuxedFile, RemuxError> {
        let start = std::time::Instant::now();

        // Guard exists before ffmpeg starts so a partial output is removed on failure.
        let output = RemuxedFile {
            path: output_path_for(input),
        };

        let args: Vec<&OsStr> = vec![
            OsStr::new("-nostdin"),
            OsStr::new("-y"),
            OsStr::new("-v"),
            OsStr::new("error"),
            OsStr::new("-i"),
            input.as_os_str(),
            OsStr::new("-c"),
            OsStr::new("copy"),
            OsStr::new("-movflags"),
            OsStr::new("faststart"),
            OsStr::new("-f"),
            OsStr::new("mp4"),
            output.path().as_os_str(),
        ];

        run_with_deadline(&self.ffmpeg_path, args, self.timeout).await?;

        let size_bytes = match tokio::fs::metadata(output.path()).await {
            Ok(meta) => meta.len(),
            Err(_) => return Err(RemuxError::MissingOutput(output.path().to_path_buf())),
        };

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            size_bytes,
            "Remux completed"
        );

        Ok(output)
    }
}
