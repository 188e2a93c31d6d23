use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tokio::{fs, io::AsyncReadExt};
use tracing::{trace, warn};

use super::{ChunkSource, ReadOutcome};
use crate::error::TailError;

/// Follows a named file across creation, truncation and rotation.
///
/// Rotation is detected by size only: the file is reopened when its current
/// length drops below the number of bytes already consumed from it. A
/// replacement that is at least as large as what was read is
/// indistinguishable from the original file growing, and is read from the old
/// offset. A path that disappears between polls drops the open handle, so a
/// file recreated under the same name is read from its start whatever its size.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    cursor: ReadCursor,
}

#[derive(Debug, Default)]
struct ReadCursor {
    handle: Option<fs::File>,
    bytes_read: u64,
}

impl ReadCursor {
    /// An unknown length counts as recycled so the reopen surfaces the error.
    fn recycled(&self, current_len: Option<u64>) -> bool {
        current_len.map_or(true, |len| len < self.bytes_read)
    }
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cursor: ReadCursor::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes consumed from the currently open file; resets on rotation.
    pub fn bytes_read(&self) -> u64 {
        self.cursor.bytes_read
    }

    async fn reopen(&mut self) -> Result<fs::File, TailError> {
        trace!(path = %self.path.display(), "file recycled, reopening");
        self.cursor.bytes_read = 0;
        fs::File::open(&self.path).await.map_err(|source| {
            warn!(path = %self.path.display(), error = %source, "failed to open followed file");
            TailError::Open {
                path: self.path.clone(),
                source,
            }
        })
    }
}

impl ChunkSource for FileSource {
    async fn read_chunk(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, TailError> {
        let current_len = match fs::metadata(&self.path).await {
            Ok(meta) => Some(meta.len()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                trace!(path = %self.path.display(), "followed file does not exist yet");
                self.cursor = ReadCursor::default();
                return Ok(ReadOutcome::NotYetAvailable);
            }
            Err(_) => None,
        };

        let mut file = match self.cursor.handle.take() {
            Some(file) if !self.cursor.recycled(current_len) => file,
            _ => self.reopen().await?,
        };
        let result = file.read(buf).await;
        self.cursor.handle = Some(file);

        match result {
            Ok(0) => Ok(ReadOutcome::EndOfData),
            Ok(n) => {
                self.cursor.bytes_read += n as u64;
                Ok(ReadOutcome::Data(n))
            }
            Err(source) => {
                warn!(path = %self.path.display(), error = %source, "failed to read followed file");
                Err(TailError::Read { source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn read_all_available(source: &mut FileSource) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = [0u8; 4];
        loop {
            match source.read_chunk(&mut buf).await.expect("read") {
                ReadOutcome::Data(n) => out.extend_from_slice(&buf[..n]),
                ReadOutcome::EndOfData | ReadOutcome::NotYetAvailable => return out,
            }
        }
    }

    #[tokio::test]
    async fn missing_file_is_not_yet_available() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut source = FileSource::new(dir.path().join("absent.log"));
        let mut buf = [0u8; 8];
        let outcome = source.read_chunk(&mut buf).await.expect("read");
        assert_eq!(outcome, ReadOutcome::NotYetAvailable);
        assert_eq!(source.bytes_read(), 0);
    }

    #[tokio::test]
    async fn reads_in_capacity_sized_chunks_and_tracks_offset() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("app.log");
        std::fs::write(&path, b"0123456789").expect("write");

        let mut source = FileSource::new(&path);
        assert_eq!(read_all_available(&mut source).await, b"0123456789");
        assert_eq!(source.bytes_read(), 10);
    }

    #[tokio::test]
    async fn truncation_below_offset_restarts_from_the_beginning() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("app.log");
        std::fs::write(&path, b"first generation\n").expect("write");

        let mut source = FileSource::new(&path);
        assert_eq!(read_all_available(&mut source).await, b"first generation\n");

        std::fs::write(&path, b"second\n").expect("truncate");
        assert_eq!(read_all_available(&mut source).await, b"second\n");
        assert_eq!(source.bytes_read(), 7);
    }

    #[tokio::test]
    async fn shrinking_to_exactly_the_offset_does_not_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("app.log");
        std::fs::write(&path, b"abcdef").expect("write");

        let mut source = FileSource::new(&path);
        assert_eq!(read_all_available(&mut source).await, b"abcdef");

        // Same length, different content: looks like "caught up", nothing re-read.
        std::fs::write(&path, b"uvwxyz").expect("rewrite");
        assert!(read_all_available(&mut source).await.is_empty());
        assert_eq!(source.bytes_read(), 6);
    }

    #[tokio::test]
    async fn deleted_file_goes_back_to_not_yet_available() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("app.log");
        std::fs::write(&path, b"x").expect("write");

        let mut source = FileSource::new(&path);
        assert_eq!(read_all_available(&mut source).await, b"x");

        std::fs::remove_file(&path).expect("remove");
        let mut buf = [0u8; 4];
        assert_eq!(
            source.read_chunk(&mut buf).await.expect("read"),
            ReadOutcome::NotYetAvailable
        );
        assert_eq!(source.bytes_read(), 0);
    }

    #[tokio::test]
    async fn recreated_file_is_read_from_its_start_even_when_larger() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("app.log");
        std::fs::write(&path, b"old\n").expect("write");

        let mut source = FileSource::new(&path);
        assert_eq!(read_all_available(&mut source).await, b"old\n");

        std::fs::remove_file(&path).expect("remove");
        assert!(read_all_available(&mut source).await.is_empty());

        std::fs::write(&path, b"brand new content\n").expect("recreate");
        assert_eq!(
            read_all_available(&mut source).await,
            b"brand new content\n"
        );
        assert_eq!(source.bytes_read(), 18);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn directory_path_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A directory stats fine but reading it fails, which is fatal.
        let path = dir.path().to_path_buf();
        let mut source = FileSource::new(&path);
        let mut buf = [0u8; 4];
        let err = source.read_chunk(&mut buf).await.expect_err("directory");
        assert!(matches!(err, TailError::Open { .. } | TailError::Read { .. }));
    }
}
