//! Media analyzer - aspect ratio detection with ffprobe

use crate::command::{run_with_deadline, CommandError};
use serde::Deserialize;
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const PROBE_ARGS: [&str; 7] = [
    "-v",
    "error",
    "-print_format",
    "json",
    "-show_streams",
    "-select_streams",
    "v:0",
];

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("ffprobe failed: {0}")]
    ProbeFailed(#[from] CommandError),

    #[error("Failed to parse ffprobe output: {0}")]
    InvalidOutput(#[from] serde_json::Error),

    #[error("No streams found in media file")]
    NoStreamsFound,
}

/// What the pipeline needs to know about a staged video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// Display aspect ratio as reported, e.g. "16:9". Empty when the stream has none.
    pub aspect_ratio: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    display_aspect_ratio: Option<String>,
}

/// Parse ffprobe's `-print_format json -show_streams` output.
///
/// The first video stream wins, falling back to a stream that declares no codec type.
pub fn parse_probe_output(stdout: &[u8]) -> Result<ProbeResult, ProbeError> {
    let output: ProbeOutput = serde_json::from_slice(stdout)?;

    let stream = output
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .or_else(|| output.streams.iter().find(|s| s.codec_type.is_none()))
        .ok_or(ProbeError::NoStreamsFound)?;

    Ok(ProbeResult {
        aspect_ratio: stream.display_aspect_ratio.clone().unwrap_or_default(),
        width: stream.width,
        height: stream.height,
    })
}

pub struct MediaAnalyzer {
    ffprobe_path: String,
    timeout: Duration,
}

impl MediaAnalyzer {
    pub fn new(ffprobe_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            timeout,
        }
    }

    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    pub async fn probe(&self, video_path: &Path) -> Result<ProbeResult, ProbeError> {
        let start = std::time::Instant::now();

        let mut args: Vec<&OsStr> = PROBE_ARGS.into_iter().map(OsStr::new).collect();
        args.push(video_path.as_os_str());

        let output = run_with_deadline(&self.ffprobe_path, args, self.timeout).await?;

        let result = parse_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            aspect_ratio = %result.aspect_ratio,
            width = ?result.width,
            height = ?result.height,
            "Video probe completed"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_first_video_stream() {
        let json = br#"{
            "streams": [
                {"index": 0, "codec_type": "audio", "codec_name": "aac"},
                {"index": 1, "codec_type": "video", "width": 1080, "height": 1920, "display_aspect_ratio": "9:16"}
            ]
        }"#;
        let result = parse_probe_output(json).unwrap();
        assert_eq!(result.aspect_ratio, "9:16");
        assert_eq!(result.width, Some(1080));
        assert_eq!(result.height, Some(1920));
    }

    #[test]
    fn test_missing_aspect_ratio_is_empty() {
        let json = br#"{"streams": [{"codec_type": "video", "width": 640, "height": 480}]}"#;
        assert_eq!(parse_probe_output(json).unwrap().aspect_ratio, "");
    }

    #[test]
    fn test_no_streams() {
        assert!(matches!(
            parse_probe_output(br#"{"streams": []}"#),
            Err(ProbeError::NoStreamsFound)
        ));
        assert!(matches!(
            parse_probe_output(br#"{}"#),
            Err(ProbeError::NoStreamsFound)
        ));
        assert!(matches!(
            parse_probe_output(br#"{"streams": [{"codec_type": "audio"}]}"#),
            Err(ProbeError::NoStreamsFound)
        ));
    }

    #[test]
    fn test_garbage_output() {
        assert!(matches!(
            parse_probe_output(b"not json"),
            Err(ProbeError::InvalidOutput(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_runs_tool() {
        let tools = crate::test_helpers::FakeTools::new("16:9");
        let analyzer = MediaAnalyzer::new(tools.ffprobe_path(), Duration::from_secs(10));
        let input = tools.dir().join("input.mp4");
        std::fs::write(&input, b"fake").unwrap();

        let result = analyzer.probe(&input).await.unwrap();
        assert_eq!(result.aspect_ratio, "16:9");
        assert_eq!(tools.probe_invocations(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_failure() {
        let tools = crate::test_helpers::FakeTools::failing_probe();
        let analyzer = MediaAnalyzer::new(tools.ffprobe_path(), Duration::from_secs(10));
        let err = analyzer
            .probe(&tools.dir().join("input.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProbeError::ProbeFailed(CommandError::Failed { .. })
        ));
    }
}
