//! Temp staging of upload streams.
//!
//! ffprobe and ffmpeg need a seekable file path, so the request body is spooled to a
//! uniquely named scratch file first. The file lives exactly as long as its [`StagedFile`].

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::error::Error as StdError;
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

const STAGED_FILE_PREFIX: &str = "tubely-upload-";

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Upload exceeds the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error("Failed to read upload stream: {0}")]
    Read(#[source] Box<dyn StdError + Send + Sync>),

    #[error("Failed to write scratch file: {0}")]
    Io(#[from] std::io::Error),
}

/// A completely written upload on local disk. Dropping it deletes the file.
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
    size: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Spool `stream` into a new scratch file under `scratch_dir`.
///
/// Reading stops at the first chunk that would push the total past `max_bytes`; the
/// upload is rejected rather than truncated. The returned file is rewound to the start.
pub async fn stage<S, E>(
    scratch_dir: &Path,
    mut stream: S,
    max_bytes: usize,
) -> Result<StagedFile, StagingError>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    // Created first so every early return below drops (and deletes) it.
    let named = tempfile::Builder::new()
        .prefix(STAGED_FILE_PREFIX)
        .tempfile_in(scratch_dir)?;

    let mut file = tokio::fs::File::from_std(named.as_file().try_clone()?);
    let mut written: usize = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| StagingError::Read(e.into()))?;

        if written.saturating_add(chunk.len()) > max_bytes {
            tracing::debug!(
                limit = max_bytes,
                received = written + chunk.len(),
                "Upload rejected: size limit exceeded"
            );
            return Err(StagingError::TooLarge { limit: max_bytes });
        }

        file.write_all(&chunk).await?;
        written += chunk.len();
    }

    file.flush().await?;
    file.rewind().await?;

    tracing::debug!(
        path = %named.path().display(),
        size_bytes = written,
        "Upload staged"
    );

    Ok(StagedFile {
        file: named,
        size: written as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::io::Read;

    type ChunkResult = Result<Bytes, std::io::Error>;

    fn chunks(parts: &[&str]) -> impl Stream<Item = ChunkResult> + Unpin {
        stream::iter(
            parts
                .iter()
                .map(|p| Ok(Bytes::copy_from_slice(p.as_bytes())))
                .collect::<Vec<ChunkResult>>(),
        )
    }

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_stage_writes_all_bytes_and_rewinds() {
        let dir = tempfile::tempdir().unwrap();
        let staged = stage(dir.path(), chunks(&["abc", "def"]), 16)
            .await
            .unwrap();

        assert_eq!(staged.size(), 6);
        assert_eq!(std::fs::read(staged.path()).unwrap(), b"abcdef");

        // The shared handle is positioned at the start again.
        let mut contents = String::new();
        staged.file.as_file().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "abcdef");
    }

    #[tokio::test]
    async fn test_stage_accepts_exact_limit() {
        let dir = tempfile::tempdir().unwrap();
        let staged = stage(dir.path(), chunks(&["1234", "5678"]), 8)
            .await
            .unwrap();
        assert_eq!(staged.size(), 8);
    }

    #[tokio::test]
    async fn test_stage_rejects_oversized_upload_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let result = stage(dir.path(), chunks(&["1234", "56789"]), 8).await;

        assert!(matches!(result, Err(StagingError::TooLarge { limit: 8 })));
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_stream_error_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let failing = stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ]);
        let result = stage(dir.path(), failing, 1024).await;

        assert!(matches!(result, Err(StagingError::Read(_))));
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_drop_removes_staged_file() {
        let dir = tempfile::tempdir().unwrap();
        let staged = stage(dir.path(), chunks(&["video"]), 1024).await.unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());

        drop(staged);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_missing_scratch_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = stage(&dir.path().join("missing"), chunks(&["x"]), 1024).await;
        assert!(matches!(result, Err(StagingError::Io(_))));
    }
}
