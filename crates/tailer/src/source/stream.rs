use tokio::io::{AsyncRead, AsyncReadExt};

use super::{ChunkSource, ReadOutcome};
use crate::error::TailError;

/// Follows an already-open byte stream. There is no file identity to track.
#[derive(Debug)]
pub struct StreamSource<R> {
    reader: R,
}

impl<R> StreamSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R> ChunkSource for StreamSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn read_chunk(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, TailError> {
        match self.reader.read(buf).await {
            Ok(0) => Ok(ReadOutcome::EndOfData),
            Ok(n) => Ok(ReadOutcome::Data(n)),
            Err(source) => Err(TailError::Read { source }),
        }
    }
}
