mod ffmpeg;
pub mod fake;

pub use fake::FakeTool;
pub use ffmpeg::FfmpegTool;

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use clipdock_core::AppError;

const PROCESSED_SUFFIX: &str = ".processed";

/// Dimensions reported for the primary video stream of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeReport {
    pub width: u32,
    pub height: u32,
}

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("failed to launch ffprobe: {0}")]
    Launch(#[source] io::Error),

    #[error("ffprobe exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("ffprobe output was not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("no video stream with usable dimensions")]
    NoDimensions,

    #[error("ffprobe timed out after {0:?}")]
    TimedOut(Duration),
}

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("failed to launch ffmpeg: {0}")]
    Launch(#[source] io::Error),

    #[error("ffmpeg exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("ffmpeg timed out after {0:?}")]
    TimedOut(Duration),
}

impl From<ProbeError> for AppError {
    fn from(err: ProbeError) -> Self {
        AppError::Probe(err.to_string())
    }
}

impl From<RewriteError> for AppError {
    fn from(err: RewriteError) -> Self {
        AppError::Rewrite(err.to_string())
    }
}

/// Capability seam over the external media tooling. The production
/// implementation shells out to ffprobe/ffmpeg; tests swap in [`FakeTool`].
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Reads the pixel dimensions of the file at `input`.
    async fn probe(&self, input: &Path) -> Result<ProbeReport, ProbeError>;

    /// Rewrites `input` into a streaming-friendly MP4 next to the source
    /// and returns the output path.
    async fn rewrite_for_streaming(&self, input: &Path) -> Result<PathBuf, RewriteError>;
}

/// Output path for a rewritten file: the input path with a fixed suffix,
/// keeping the output inside the same staging directory.
pub(crate) fn processed_path(input: &Path) -> PathBuf {
    let mut raw: OsString = input.as_os_str().to_os_string();
    raw.push(PROCESSED_SUFFIX);
    PathBuf::from(raw)
}
