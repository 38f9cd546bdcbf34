//! Stand-ins for `ffprobe` and `ffmpeg`.
//!
//! Each fake is a small shell script in a private temp directory that appends its
//! arguments to a `<tool>.calls` file, so tests can assert whether a tool ran at all.

use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct FakeTools {
    dir: TempDir,
}

impl FakeTools {
    /// Probe reports a single video stream with `aspect_ratio`; remux copies input to output.
    pub fn new(aspect_ratio: &str) -> Self {
        let tools = Self::empty();
        tools.write_probe(&probe_body(&format!(
            r#"{{"streams":[{{"index":0,"codec_type":"video","width":1920,"height":1080,"display_aspect_ratio":"{}"}}]}}"#,
            aspect_ratio
        )));
        tools.write_remux(COPY_REMUX);
        tools
    }

    /// Probe exits non-zero as ffprobe does on unreadable input.
    pub fn failing_probe() -> Self {
        let tools = Self::empty();
        tools.write_probe("echo 'Invalid data found when processing input' >&2\nexit 1\n");
        tools.write_remux(COPY_REMUX);
        tools
    }

    /// Probe succeeds but reports no streams.
    pub fn streamless_probe() -> Self {
        let tools = Self::empty();
        tools.write_probe(&probe_body(r#"{"streams":[]}"#));
        tools.write_remux(COPY_REMUX);
        tools
    }

    /// Remux writes a partial output file and then exits non-zero.
    pub fn failing_remux() -> Self {
        let tools = Self::empty();
        tools.write_probe(&probe_body(
            r#"{"streams":[{"codec_type":"video","display_aspect_ratio":"16:9"}]}"#,
        ));
        tools.write_remux(
            "for out; do :; done\nprintf partial > \"$out\"\necho 'moov atom not found' >&2\nexit 1\n",
        );
        tools
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn ffprobe_path(&self) -> String {
        self.dir.path().join("ffprobe").to_string_lossy().into_owned()
    }

    pub fn ffmpeg_path(&self) -> String {
        self.dir.path().join("ffmpeg").to_string_lossy().into_owned()
    }

    pub fn probe_invocations(&self) -> usize {
        self.invocations("ffprobe")
    }

    pub fn remux_invocations(&self) -> usize {
        self.invocations("ffmpeg")
    }

    fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn calls_file(&self, tool: &str) -> PathBuf {
        self.dir.path().join(format!("{}.calls", tool))
    }

    fn invocations(&self, tool: &str) -> usize {
        fs::read_to_string(self.calls_file(tool))
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }

    fn write_probe(&self, body: &str) {
        self.write_script("ffprobe", body);
    }

    fn write_remux(&self, body: &str) {
        self.write_script("ffmpeg", body);
    }

    fn write_script(&self, tool: &str, body: &str) {
        let path = self.dir.path().join(tool);
        let script = format!(
            "#!/bin/sh\necho \"$@\" >> '{}'\n{}",
            self.calls_file(tool).display(),
            body
        );
        {
            let mut file = fs::File::create(&path).unwrap();
            file.write_all(script.as_bytes()).unwrap();
            file.sync_all().unwrap();
        }
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }
}

// Copies the `-i` argument to the last argument.
const COPY_REMUX: &str = r#"in=""
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-i" ]; then
    in="$2"
  fi
  out="$1"
  shift
done
cp "$in" "$out"
"#;

fn probe_body(json: &str) -> String {
    format!("cat <<'JSON'\n{}\nJSON\n", json)
}
