//! Task spawning and execution abstractions.
//!
//! - `spawn`: runs a future on the current runtime, returns an awaitable
//!   `JoinHandle`
//! - `spawn_on`: runs a future on an explicit runtime `Handle`, used by
//!   callers that may not be inside the runtime context (UI threads)
//! - `spawn_blocking`: for reads that block (file I/O, image decoding)
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//!
//! async fn example() {
//!     let handle = task::spawn(async { 42 });
//!     assert_eq!(handle.await.unwrap(), 42);
//!
//!     let decoded = task::spawn_blocking(|| vec![0u8; 16].len()).await.unwrap();
//!     assert_eq!(decoded, 16);
//! }
//! ```

use crate::runtime::Handle;

pub use tokio::task::{spawn_blocking, yield_now, AbortHandle, JoinError, JoinHandle};

/// Spawns a new asynchronous task on the current Tokio runtime.
///
/// The spawned task may run on a different thread.
///
/// # Panics
///
/// Panics when called outside of a runtime context. Use [`spawn_on`] when the
/// caller cannot guarantee that.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

/// Spawns a new asynchronous task on the runtime behind `handle`.
///
/// Safe to call from threads that are not owned by the runtime, such as a
/// host UI thread.
pub fn spawn_on<F>(handle: &Handle, future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    handle.spawn(future)
}

/// Result type for task operations.
pub type Result<T> = std::result::Result<T, JoinError>;
