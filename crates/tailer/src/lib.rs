#![forbid(unsafe_code)]
//! Polling `tail -f` follower for growing files and already-open byte streams.
//!
//! A [`Tailer`] forwards newly appended bytes from its source to an output sink
//! until it is stopped, its [`CancelScope`] is cancelled, or the scope's
//! deadline passes. It polls on a fixed interval rather than using filesystem
//! notifications:
//! - [`FileSource`] follows a path that may not exist yet and reopens it when
//!   the file is truncated or rotated to something smaller than what was read.
//! - [`StreamSource`] forwards whatever an [`tokio::io::AsyncRead`] yields.
//!
//! ```no_run
//! use std::time::Duration;
//! use tailer::{CancelScope, Tailer};
//!
//! # async fn demo() -> Result<(), tailer::TailError> {
//! let tailer = Tailer::builder()
//!     .scope(CancelScope::new().with_timeout(Duration::from_secs(30)))
//!     .poll_interval(Duration::from_millis(250))
//!     .output(tokio::io::stdout())
//!     .file("/var/log/app.log");
//! tailer.start()?;
//! let reason = tailer.wait().await?;
//! println!("tailer ended: {reason:?}");
//! # Ok(())
//! # }
//! ```

mod builder;
mod config;
mod error;
mod follow;
mod scope;
mod source;
mod tailer;

pub use builder::TailerBuilder;
pub use config::{TailerConfig, DEFAULT_CHUNK_CAPACITY, DEFAULT_POLL_INTERVAL};
pub use error::{ConfigError, StopReason, TailError};
pub use scope::CancelScope;
pub use source::{ChunkSource, FileSource, ReadOutcome, StreamSource};
pub use tailer::Tailer;
