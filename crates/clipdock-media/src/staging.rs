use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::Stream;
use tempfile::TempDir;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio_util::io::StreamReader;

use clipdock_core::AppError;

const COPY_BUFFER_SIZE: usize = 64 * 1024;
const STAGED_FILE_NAME: &str = "upload";

#[derive(Error, Debug)]
pub enum StagingError {
    #[error("failed to create staging area: {0}")]
    Acquire(#[source] io::Error),

    #[error("failed to write staged bytes: {0}")]
    Write(#[source] io::Error),

    #[error("staged payload of at least {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: u64, max: u64 },
}

impl From<StagingError> for AppError {
    fn from(err: StagingError) -> Self {
        match err {
            StagingError::TooLarge { size, max } => AppError::PayloadTooLarge { size, max },
            other => AppError::Staging(other.to_string()),
        }
    }
}

/// An upload staged to scratch disk inside its own temporary directory.
///
/// Dropping the handle removes the directory and everything in it, so any
/// sibling files written next to the staged upload (such as a rewritten
/// output) are released on every exit path without explicit cleanup.
pub struct StagedFile {
    dir: TempDir,
    file: File,
    path: PathBuf,
    bytes_written: u64,
}

impl StagedFile {
    pub async fn acquire(scratch_root: &Path) -> Result<Self, StagingError> {
        let dir = TempDir::new_in(scratch_root).map_err(StagingError::Acquire)?;
        let path = dir.path().join(STAGED_FILE_NAME);
        let file = File::create(&path).await.map_err(StagingError::Acquire)?;
        Ok(Self {
            dir,
            file,
            path,
            bytes_written: 0,
        })
    }

    /// Copies the stream to disk, failing as soon as the running total
    /// passes `max_bytes`.
    pub async fn write_stream<S>(&mut self, stream: S, max_bytes: u64) -> Result<u64, StagingError>
    where
        S: Stream<Item = Result<Bytes, io::Error>> + Send + Unpin,
    {
        let mut reader = StreamReader::new(stream);
        let mut buf = vec![0u8; COPY_BUFFER_SIZE];
        loop {
            let n = reader.read(&mut buf).await.map_err(StagingError::Write)?;
            if n == 0 {
                break;
            }
            self.bytes_written += n as u64;
            if self.bytes_written > max_bytes {
                return Err(StagingError::TooLarge {
                    size: self.bytes_written,
                    max: max_bytes,
                });
            }
            self.file
                .write_all(&buf[..n])
                .await
                .map_err(StagingError::Write)?;
        }
        self.file.flush().await.map_err(StagingError::Write)?;
        Ok(self.bytes_written)
    }

    pub async fn rewind(&mut self) -> Result<(), StagingError> {
        self.file
            .seek(io::SeekFrom::Start(0))
            .await
            .map_err(StagingError::Write)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn dir_path(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn chunks(parts: Vec<&'static [u8]>) -> impl Stream<Item = Result<Bytes, io::Error>> + Unpin {
        stream::iter(parts.into_iter().map(|part| Ok(Bytes::from_static(part))))
    }

    #[tokio::test]
    async fn stages_stream_to_disk() {
        let scratch = TempDir::new().unwrap();
        let mut staged = StagedFile::acquire(scratch.path()).await.unwrap();

        let written = staged
            .write_stream(chunks(vec![b"hello ", b"staged ", b"world"]), 1024)
            .await
            .unwrap();

        assert_eq!(written, 18);
        assert_eq!(staged.bytes_written(), 18);
        let on_disk = std::fs::read(staged.path()).unwrap();
        assert_eq!(on_disk, b"hello staged world");
    }

    #[tokio::test]
    async fn rejects_stream_past_cap() {
        let scratch = TempDir::new().unwrap();
        let mut staged = StagedFile::acquire(scratch.path()).await.unwrap();

        let err = staged
            .write_stream(chunks(vec![&[0u8; 40], &[0u8; 40]]), 64)
            .await
            .unwrap_err();

        match err {
            StagingError::TooLarge { size, max } => {
                assert!(size > max);
                assert_eq!(max, 64);
            }
            other => panic!("expected TooLarge, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn propagates_stream_errors() {
        let scratch = TempDir::new().unwrap();
        let mut staged = StagedFile::acquire(scratch.path()).await.unwrap();

        let failing = stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer gone")),
        ]);
        let err = staged.write_stream(failing, 1024).await.unwrap_err();

        assert!(matches!(err, StagingError::Write(_)));
    }

    #[tokio::test]
    async fn drop_removes_staging_directory() {
        let scratch = TempDir::new().unwrap();
        let staged_dir;
        {
            let mut staged = StagedFile::acquire(scratch.path()).await.unwrap();
            staged
                .write_stream(chunks(vec![b"bytes"]), 1024)
                .await
                .unwrap();
            staged_dir = staged.dir_path().to_path_buf();
            assert!(staged_dir.exists());
        }
        assert!(!staged_dir.exists());
    }

    #[tokio::test]
    async fn drop_removes_sibling_outputs() {
        let scratch = TempDir::new().unwrap();
        let sibling;
        {
            let mut staged = StagedFile::acquire(scratch.path()).await.unwrap();
            staged
                .write_stream(chunks(vec![b"bytes"]), 1024)
                .await
                .unwrap();
            sibling = PathBuf::from(format!("{}.processed", staged.path().display()));
            std::fs::write(&sibling, b"rewritten").unwrap();
            assert!(sibling.exists());
        }
        assert!(!sibling.exists());
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn rewind_returns_to_start() {
        let scratch = TempDir::new().unwrap();
        let mut staged = StagedFile::acquire(scratch.path()).await.unwrap();
        staged
            .write_stream(chunks(vec![b"content"]), 1024)
            .await
            .unwrap();
        staged.rewind().await.unwrap();

        let mut replayed = Vec::new();
        staged.file.read_to_end(&mut replayed).await.unwrap();
        assert_eq!(replayed, b"content");
    }
}
