use std::future::Future;

use crate::error::TailError;

mod file;
mod stream;

pub use file::FileSource;
pub use stream::StreamSource;

/// Result of a single non-fatal read attempt.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ReadOutcome {
    /// `n` bytes were written to the front of the buffer; `n > 0`.
    Data(usize),
    /// Nothing new right now.
    EndOfData,
    /// The followed path does not exist (yet).
    NotYetAvailable,
}

/// The "read next chunk" seam of the follow loop.
///
/// Implementations own whatever cursor state they need. The loop awaits each
/// call to completion before it looks at cancellation again, so an
/// implementation that blocks holds up `stop()` until it returns.
pub trait ChunkSource: Send {
    fn read_chunk(
        &mut self,
        buf: &mut [u8],
    ) -> impl Future<Output = Result<ReadOutcome, TailError>> + Send;
}
