pub mod aspect;
pub mod staging;
pub mod tool;

pub use aspect::AspectClass;
pub use staging::{StagedFile, StagingError};
pub use tool::{FakeTool, FfmpegTool, MediaTool, ProbeError, ProbeReport, RewriteError};
