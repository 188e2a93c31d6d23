use std::{
    fmt,
    future::Future,
    path::PathBuf,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{io::AsyncRead, runtime::Handle, task::JoinHandle};
use tracing::debug;

use crate::{
    builder::TailerBuilder,
    error::{StopReason, TailError},
    follow::{FollowState, RunningGuard},
};

type LoopResult = Result<StopReason, TailError>;
type BoxedLoop = Pin<Box<dyn Future<Output = LoopResult> + Send>>;

/// Control handle for one follow loop.
///
/// The loop is built at construction and spawned by [`Tailer::start`] onto the
/// current tokio runtime. A tailer runs at most once: after its loop has ended
/// it cannot be restarted. Dropping the handle cancels the loop.
pub struct Tailer {
    state: Arc<FollowState>,
    pending: Mutex<Option<BoxedLoop>>,
    task: Mutex<Option<JoinHandle<LoopResult>>>,
}

impl fmt::Debug for Tailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tailer")
            .field("running", &self.is_running())
            .field("poll_interval", &self.poll_interval())
            .field("cancelled", &self.state.scope.is_cancelled())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Tailer {
    pub(crate) fn new(state: Arc<FollowState>, follow: BoxedLoop) -> Self {
        Self {
            state,
            pending: Mutex::new(Some(follow)),
            task: Mutex::new(None),
        }
    }

    pub fn builder() -> TailerBuilder {
        TailerBuilder::new()
    }

    /// Follows `path` with default scope, output (stderr) and config.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        TailerBuilder::new().file(path)
    }

    /// Follows `reader` with default scope, output (stderr) and config.
    pub fn reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        TailerBuilder::new().reader(reader)
    }

    /// Sets the wait between empty reads. Applies from the next sleep phase.
    pub fn with_poll(&self, poll_interval: Duration) -> &Self {
        self.state.set_poll_interval(poll_interval);
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.state.poll_interval()
    }

    /// Spawns the follow loop and returns immediately.
    ///
    /// Fails with [`TailError::AlreadyStarted`] on any call after the first and
    /// with [`TailError::NoRuntime`] outside a tokio runtime.
    pub fn start(&self) -> Result<&Self, TailError> {
        let runtime = Handle::try_current().map_err(|_| TailError::NoRuntime)?;
        let follow = lock(&self.pending)
            .take()
            .ok_or(TailError::AlreadyStarted)?;
        let running = RunningGuard::enter(Arc::clone(&self.state));
        let task = runtime.spawn(async move {
            let _running = running;
            follow.await
        });
        *lock(&self.task) = Some(task);
        debug!(poll_interval = ?self.poll_interval(), "tailer started");
        Ok(self)
    }

    /// Signals the loop to end at its next checkpoint. Does not wait.
    pub fn stop(&self) {
        self.state.scope.cancel();
    }

    /// Best-effort snapshot; the loop may change state right after this returns.
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Waits for the loop to end and returns how it ended.
    ///
    /// Returns [`TailError::NotStarted`] if the tailer was never started or
    /// the result was already taken by an earlier call.
    pub async fn wait(&self) -> Result<StopReason, TailError> {
        let task = lock(&self.task).take().ok_or(TailError::NotStarted)?;
        task.await.map_err(|err| TailError::Join(err.to_string()))?
    }
}

impl Drop for Tailer {
    fn drop(&mut self) {
        self.state.scope.cancel();
    }
}
