//! UI thread dispatch.
//!
//! Widget mutation is not thread-safe in any real toolkit. Every mutation the
//! binder core performs is wrapped in a [`UiJob`] and handed to the host's
//! [`UiDispatcher`], which runs it on the single UI thread in FIFO order.

use crate::error::Result;

/// A unit of work that must run on the UI thread.
pub type UiJob = Box<dyn FnOnce() + Send + 'static>;

/// Host capability to run closures on the UI thread.
///
/// # Ordering
///
/// Jobs dispatched from the same thread must run in the order they were
/// dispatched. Binders rely on this: a job that clears a widget is always
/// dispatched before the job that applies the new value.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::dispatch::UiDispatcher;
///
/// fn show(dispatcher: &dyn UiDispatcher, label: Arc<dyn TextWidget>) -> Result<()> {
///     dispatcher.run_on_ui(Box::new(move || label.set_text(Some("Hello"))))
/// }
/// ```
pub trait UiDispatcher: Send + Sync {
    /// Queue `job` to run on the UI thread.
    ///
    /// Returns [`BridgeError::NotAvailable`](crate::error::BridgeError::NotAvailable)
    /// once the UI loop has shut down.
    fn dispatch(&self, job: UiJob) -> Result<()>;

    /// Whether the calling thread is the UI thread.
    fn is_ui_thread(&self) -> bool;

    /// Run `job` inline when already on the UI thread, otherwise dispatch it.
    fn run_on_ui(&self, job: UiJob) -> Result<()> {
        if self.is_ui_thread() {
            job();
            Ok(())
        } else {
            self.dispatch(job)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct QueueDispatcher {
        on_ui: bool,
        queued: Mutex<Vec<UiJob>>,
    }

    impl UiDispatcher for QueueDispatcher {
        fn dispatch(&self, job: UiJob) -> Result<()> {
            self.queued.lock().unwrap().push(job);
            Ok(())
        }

        fn is_ui_thread(&self) -> bool {
            self.on_ui
        }
    }

    struct ClosedDispatcher;

    impl UiDispatcher for ClosedDispatcher {
        fn dispatch(&self, _job: UiJob) -> Result<()> {
            Err(BridgeError::NotAvailable("UI loop stopped".to_string()))
        }

        fn is_ui_thread(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_run_on_ui_inline_on_ui_thread() {
        let dispatcher = QueueDispatcher {
            on_ui: true,
            queued: Mutex::new(Vec::new()),
        };
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();

        dispatcher
            .run_on_ui(Box::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(dispatcher.queued.lock().unwrap().is_empty());
    }

    #[test]
    fn test_run_on_ui_queues_off_ui_thread() {
        let dispatcher = QueueDispatcher {
            on_ui: false,
            queued: Mutex::new(Vec::new()),
        };
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();

        dispatcher
            .run_on_ui(Box::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        let jobs: Vec<UiJob> = dispatcher.queued.lock().unwrap().drain(..).collect();
        for job in jobs {
            job();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_closed_dispatcher_reports_not_available() {
        let result = ClosedDispatcher.run_on_ui(Box::new(|| {}));
        assert!(matches!(result, Err(BridgeError::NotAvailable(_))));
    }
}
