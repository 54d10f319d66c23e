//! Runtime abstraction layer for the Mixtape binder core.
//!
//! Binders never talk to Tokio directly. Everything that schedules work
//! (fetch tasks, fade animations, precaching) goes through this crate so the
//! executor stays swappable and the spawn/cancel vocabulary is shared by every
//! crate in the workspace.
//!
//! # Modules
//!
//! - `task`: Task spawning and execution
//! - `time`: Time-related operations (sleep, interval, instant)
//! - `sync`: Synchronization primitives (Mutex, channels, cancellation tokens)
//! - `runtime`: Runtime handles and `block_on`
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::CancellationToken;
//! use core_async::task;
//! use core_async::time::{sleep, Duration};
//!
//! async fn example() {
//!     let token = CancellationToken::new();
//!     let child = token.clone();
//!
//!     let handle = task::spawn(async move {
//!         core_async::select! {
//!             _ = child.cancelled() => None,
//!             _ = sleep(Duration::from_secs(1)) => Some(42),
//!         }
//!     });
//!
//!     token.cancel();
//!     assert_eq!(handle.await.unwrap(), None);
//! }
//! ```

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

// Re-export commonly used types at crate root for convenience
pub use sync::CancellationToken;
pub use task::spawn;
pub use time::{sleep, Duration, Instant};

/// Race several futures, running the branch of the first to complete.
pub use tokio::select;
