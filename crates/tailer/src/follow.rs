use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    time,
};
use tracing::{debug, trace, warn};

use crate::{
    error::{StopReason, TailError},
    scope::CancelScope,
    source::{ChunkSource, ReadOutcome},
};

/// State shared between a [`crate::Tailer`] and its loop task.
#[derive(Debug)]
pub(crate) struct FollowState {
    running: AtomicBool,
    poll_interval_nanos: AtomicU64,
    pub(crate) scope: CancelScope,
}

impl FollowState {
    pub(crate) fn new(scope: CancelScope, poll_interval: Duration) -> Self {
        Self {
            running: AtomicBool::new(false),
            poll_interval_nanos: AtomicU64::new(duration_nanos(poll_interval)),
            scope,
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        Duration::from_nanos(self.poll_interval_nanos.load(Ordering::Relaxed))
    }

    pub(crate) fn set_poll_interval(&self, poll_interval: Duration) {
        self.poll_interval_nanos
            .store(duration_nanos(poll_interval), Ordering::Relaxed);
    }
}

fn duration_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// Holds the running flag up for as long as it lives.
///
/// Moved into the loop task, so the flag drops back to false however the task
/// ends: normal return, panic, or the runtime discarding it before first poll.
pub(crate) struct RunningGuard(Arc<FollowState>);

impl RunningGuard {
    pub(crate) fn enter(state: Arc<FollowState>) -> Self {
        state.running.store(true, Ordering::Relaxed);
        Self(state)
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.running.store(false, Ordering::Relaxed);
    }
}

/// The read / forward / sleep cycle, generic over where bytes come from.
pub(crate) struct FollowLoop<S, W> {
    source: S,
    out: W,
    state: Arc<FollowState>,
    chunk_capacity: usize,
}

impl<S, W> FollowLoop<S, W>
where
    S: ChunkSource,
    W: AsyncWrite + Unpin + Send,
{
    pub(crate) fn new(source: S, out: W, state: Arc<FollowState>, chunk_capacity: usize) -> Self {
        Self {
            source,
            out,
            state,
            chunk_capacity: chunk_capacity.max(1),
        }
    }

    /// Runs until the scope ends (`Ok`) or the source or sink fails (`Err`).
    pub(crate) async fn run(mut self) -> Result<StopReason, TailError> {
        let state = Arc::clone(&self.state);
        let mut buf = vec![0u8; self.chunk_capacity];

        loop {
            match self.source.read_chunk(&mut buf).await {
                Ok(ReadOutcome::Data(n)) => {
                    trace!(bytes = n, "tailer: forwarding chunk");
                    self.forward(&buf[..n]).await?;
                    // More may be pending; only stop between chunks, never mid-read.
                    if let Some(reason) = state.scope.check() {
                        debug!(?reason, "tailer loop done");
                        return Ok(reason);
                    }
                    continue;
                }
                Ok(ReadOutcome::EndOfData) | Ok(ReadOutcome::NotYetAvailable) => {}
                Err(err) => {
                    warn!(error = %err, "tailer: error reading");
                    return Err(err);
                }
            }

            tokio::select! {
                _ = time::sleep(state.poll_interval()) => {}
                reason = state.scope.done() => {
                    debug!(?reason, "tailer loop done");
                    return Ok(reason);
                }
            }
        }
    }

    async fn forward(&mut self, chunk: &[u8]) -> Result<(), TailError> {
        let written = match self.out.write_all(chunk).await {
            Ok(()) => self.out.flush().await,
            Err(err) => Err(err),
        };
        written.map_err(|source| {
            warn!(error = %source, "tailer: error writing to output");
            TailError::Write { source }
        })
    }
}
