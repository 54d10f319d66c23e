//! Time-related abstractions backed by `tokio::time`.
//!
//! `Instant` is monotonic and suitable for measuring elapsed time, which is
//! what fade transitions use to compute opacity.
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{sleep, Duration, Instant};
//!
//! async fn example() {
//!     let start = Instant::now();
//!     sleep(Duration::from_millis(10)).await;
//!     assert!(start.elapsed() >= Duration::from_millis(10));
//! }
//! ```

pub use tokio::time::{
    interval, sleep, sleep_until, timeout, Interval, MissedTickBehavior, Sleep, Timeout,
};

pub use std::time::{Duration, Instant};

/// Builds an interval that skips missed ticks instead of bursting.
///
/// Animation frames that fall behind should not be replayed back to back.
pub fn frame_interval(period: Duration) -> Interval {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}
