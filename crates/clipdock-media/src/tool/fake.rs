use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{processed_path, MediaTool, ProbeError, ProbeReport, RewriteError};

/// In-memory [`MediaTool`] for tests: returns canned dimensions, records
/// every call, and can be told to fail from a given probe onward.
/// Rewrites copy the input so downstream code sees a real output file.
pub struct FakeTool {
    report: Mutex<ProbeReport>,
    fail_probes_from: Mutex<Option<usize>>,
    fail_rewrites: Mutex<bool>,
    probed: Mutex<Vec<PathBuf>>,
    rewritten: Mutex<Vec<PathBuf>>,
}

impl FakeTool {
    pub fn new() -> Self {
        Self {
            report: Mutex::new(ProbeReport {
                width: 1920,
                height: 1080,
            }),
            fail_probes_from: Mutex::new(None),
            fail_rewrites: Mutex::new(false),
            probed: Mutex::new(Vec::new()),
            rewritten: Mutex::new(Vec::new()),
        }
    }

    pub fn set_dimensions(&self, width: u32, height: u32) {
        *self.report.lock().unwrap() = ProbeReport { width, height };
    }

    /// Every probe from now on fails.
    pub fn fail_probes(&self) {
        *self.fail_probes_from.lock().unwrap() = Some(0);
    }

    /// The first `successes` probes succeed, later ones fail.
    pub fn fail_probes_after(&self, successes: usize) {
        *self.fail_probes_from.lock().unwrap() = Some(successes);
    }

    pub fn fail_rewrites(&self) {
        *self.fail_rewrites.lock().unwrap() = true;
    }

    pub fn probe_count(&self) -> usize {
        self.probed.lock().unwrap().len()
    }

    pub fn rewrite_count(&self) -> usize {
        self.rewritten.lock().unwrap().len()
    }

    pub fn probed_paths(&self) -> Vec<PathBuf> {
        self.probed.lock().unwrap().clone()
    }
}

impl Default for FakeTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaTool for FakeTool {
    async fn probe(&self, input: &Path) -> Result<ProbeReport, ProbeError> {
        let call_index = {
            let mut probed = self.probed.lock().unwrap();
            probed.push(input.to_path_buf());
            probed.len() - 1
        };
        if let Some(from) = *self.fail_probes_from.lock().unwrap() {
            if call_index >= from {
                return Err(ProbeError::Failed {
                    status: "exit status: 1".to_string(),
                    stderr: "forced probe failure".to_string(),
                });
            }
        }
        Ok(*self.report.lock().unwrap())
    }

    async fn rewrite_for_streaming(&self, input: &Path) -> Result<PathBuf, RewriteError> {
        self.rewritten.lock().unwrap().push(input.to_path_buf());
        if *self.fail_rewrites.lock().unwrap() {
            return Err(RewriteError::Failed {
                status: "exit status: 1".to_string(),
                stderr: "forced rewrite failure".to_string(),
            });
        }
        let output = processed_path(input);
        tokio::fs::copy(input, &output)
            .await
            .map_err(RewriteError::Launch)?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn records_calls_and_returns_canned_dimensions() {
        let tool = FakeTool::new();
        tool.set_dimensions(720, 1280);

        let report = tool.probe(Path::new("/tmp/clip")).await.unwrap();
        assert_eq!(
            report,
            ProbeReport {
                width: 720,
                height: 1280
            }
        );
        assert_eq!(tool.probe_count(), 1);
        assert_eq!(tool.probed_paths(), vec![PathBuf::from("/tmp/clip")]);
    }

    #[tokio::test]
    async fn rewrite_copies_input_to_processed_sibling() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("upload");
        std::fs::write(&input, b"mp4 bytes").unwrap();

        let tool = FakeTool::new();
        let output = tool.rewrite_for_streaming(&input).await.unwrap();

        assert_eq!(output, dir.path().join("upload.processed"));
        assert_eq!(std::fs::read(&output).unwrap(), b"mp4 bytes");
        assert_eq!(tool.rewrite_count(), 1);
    }

    #[tokio::test]
    async fn fail_probes_after_allows_early_successes() {
        let tool = FakeTool::new();
        tool.fail_probes_after(1);

        assert!(tool.probe(Path::new("/tmp/a")).await.is_ok());
        assert!(tool.probe(Path::new("/tmp/b")).await.is_err());
        assert!(tool.probe(Path::new("/tmp/c")).await.is_err());
    }
}
