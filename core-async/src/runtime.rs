//! Runtime utilities that abstract over the underlying async executor.
//!
//! We wrap Tokio's runtime primitives so that downstream crates never need to
//! depend on Tokio directly.

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Returns a handle to the runtime driving the current thread, if any.
///
/// Binders capture this at construction so that later binds issued from a
/// host UI thread (which is not a runtime worker) can still schedule work.
pub fn current_handle() -> Option<Handle> {
    Handle::try_current().ok()
}

/// Runs the provided future to completion on a lightweight current-thread
/// runtime.
///
/// # Errors
///
/// Returns the I/O error raised while building the runtime.
pub fn block_on<F>(future: F) -> std::io::Result<F::Output>
where
    F: std::future::Future,
{
    let runtime = Builder::new_current_thread().enable_all().build()?;
    Ok(runtime.block_on(future))
}
