use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tokio::time::timeout;

use super::{processed_path, MediaTool, ProbeError, ProbeReport, RewriteError};

/// [`MediaTool`] backed by the ffprobe/ffmpeg binaries. Every invocation is
/// bounded by `timeout`; a hung process is killed when the future drops.
#[derive(Debug, Clone)]
pub struct FfmpegTool {
    ffprobe_path: String,
    ffmpeg_path: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

impl FfmpegTool {
    pub fn new(
        ffprobe_path: impl Into<String>,
        ffmpeg_path: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            ffmpeg_path: ffmpeg_path.into(),
            timeout,
        }
    }
}

#[async_trait]
impl MediaTool for FfmpegTool {
    #[tracing::instrument(skip(self), fields(media.tool = "ffprobe"))]
    async fn probe(&self, input: &Path) -> Result<ProbeReport, ProbeError> {
        let started = Instant::now();
        let run = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(input)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = timeout(self.timeout, run)
            .await
            .map_err(|_| ProbeError::TimedOut(self.timeout))?
            .map_err(ProbeError::Launch)?;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let report = extract_dimensions(&output.stdout)?;
        tracing::debug!(
            width = report.width,
            height = report.height,
            duration_ms = started.elapsed().as_millis() as u64,
            "probed video dimensions"
        );
        Ok(report)
    }

    #[tracing::instrument(skip(self), fields(media.tool = "ffmpeg"))]
    async fn rewrite_for_streaming(&self, input: &Path) -> Result<PathBuf, RewriteError> {
        let output_path = processed_path(input);
        let started = Instant::now();
        let run = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(input)
            .args(["-c", "copy", "-movflags", "faststart", "-f", "mp4"])
            .arg(&output_path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = timeout(self.timeout, run)
            .await
            .map_err(|_| RewriteError::TimedOut(self.timeout))?
            .map_err(RewriteError::Launch)?;

        if !output.status.success() {
            return Err(RewriteError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        tracing::info!(
            output = %output_path.display(),
            duration_ms = started.elapsed().as_millis() as u64,
            "rewrote container for streaming"
        );
        Ok(output_path)
    }
}

/// Reads the first stream's dimensions. A file whose first stream carries
/// no usable width/height is rejected rather than guessed at.
fn extract_dimensions(stdout: &[u8]) -> Result<ProbeReport, ProbeError> {
    let parsed: ProbeOutput = serde_json::from_slice(stdout).map_err(ProbeError::Parse)?;
    match parsed.streams.first() {
        Some(stream) => match (stream.width, stream.height) {
            (Some(width), Some(height)) if width > 0 && height > 0 => {
                Ok(ProbeReport { width, height })
            }
            _ => Err(ProbeError::NoDimensions),
        },
        None => Err(ProbeError::NoDimensions),
    }
}
