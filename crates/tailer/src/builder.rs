use std::{fmt, path::PathBuf, sync::Arc, time::Duration};

use tokio::io::{AsyncRead, AsyncWrite};

use crate::{
    config::TailerConfig,
    follow::{FollowLoop, FollowState},
    scope::CancelScope,
    source::{ChunkSource, FileSource, StreamSource},
    tailer::Tailer,
};

type BoxedSink = Box<dyn AsyncWrite + Send + Unpin>;

/// Construction inputs for a [`Tailer`].
///
/// Defaults: an unbounded [`CancelScope`], the process's stderr as output, and
/// [`TailerConfig::default`].
#[derive(Default)]
pub struct TailerBuilder {
    pub(crate) scope: Option<CancelScope>,
    pub(crate) output: Option<BoxedSink>,
    pub(crate) config: TailerConfig,
}

impl fmt::Debug for TailerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TailerBuilder")
            .field("scope", &self.scope)
            .field("output", &self.output.as_ref().map(|_| "<sink>"))
            .field("config", &self.config)
            .finish()
    }
}

impl TailerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parent scope; the tailer runs under a child of it, so `stop()` never
    /// cancels the caller's scope.
    pub fn scope(mut self, scope: CancelScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn output<W>(mut self, output: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        self.output = Some(Box::new(output));
        self
    }

    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.config.poll_interval = poll_interval;
        self
    }

    pub fn chunk_capacity(mut self, chunk_capacity: usize) -> Self {
        self.config.chunk_capacity = chunk_capacity;
        self
    }

    pub fn config(mut self, config: TailerConfig) -> Self {
        self.config = config;
        self
    }

    /// Follow the file at `path`, which need not exist yet.
    pub fn file(self, path: impl Into<PathBuf>) -> Tailer {
        self.source(FileSource::new(path))
    }

    /// Follow an already-open stream.
    pub fn reader<R>(self, reader: R) -> Tailer
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        self.source(StreamSource::new(reader))
    }

    pub fn source<S>(self, source: S) -> Tailer
    where
        S: ChunkSource + 'static,
    {
        let scope = self.scope.unwrap_or_default().child();
        let state = Arc::new(FollowState::new(scope, self.config.poll_interval));
        let output = self
            .output
            .unwrap_or_else(|| Box::new(tokio::io::stderr()));
        let follow = FollowLoop::new(
            source,
            output,
            Arc::clone(&state),
            self.config.chunk_capacity,
        );
        Tailer::new(state, Box::pin(follow.run()))
    }
}
