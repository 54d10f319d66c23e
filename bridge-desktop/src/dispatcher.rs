//! UI Dispatcher Implementations
//!
//! Desktop hosts without a native toolkit loop (headless players, test
//! harnesses, terminal frontends) still need exactly one thread that owns
//! widget mutation. [`ThreadUiDispatcher`] provides that thread;
//! [`ManualUiDispatcher`] lets a test decide when queued jobs run.

use bridge_traits::{
    dispatch::{UiDispatcher, UiJob},
    error::{BridgeError, Result},
};
use core_async::sync::{mpsc, oneshot};
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard};
use std::thread::{self, JoinHandle, ThreadId};
use tracing::{debug, error};

const UI_THREAD_NAME: &str = "mixtape-ui";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Runs UI jobs on a dedicated, named OS thread in FIFO order.
///
/// The thread lives until [`shutdown`](Self::shutdown) is called or the
/// dispatcher is dropped. Jobs still queued at that point are run before the
/// thread exits; jobs dispatched afterwards are rejected with
/// [`BridgeError::NotAvailable`].
pub struct ThreadUiDispatcher {
    sender: Mutex<Option<mpsc::UnboundedSender<UiJob>>>,
    thread: Mutex<Option<JoinHandle<()>>>,
    thread_id: ThreadId,
}

impl ThreadUiDispatcher {
    /// Spawn the UI thread.
    pub fn spawn() -> Result<Self> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<UiJob>();

        let handle = thread::Builder::new()
            .name(UI_THREAD_NAME.to_string())
            .spawn(move || {
                debug!("UI thread started");
                while let Some(job) = receiver.blocking_recv() {
                    if catch_unwind(AssertUnwindSafe(job)).is_err() {
                        error!("UI job panicked; continuing with next job");
                    }
                }
                debug!("UI thread stopped");
            })?;

        let thread_id = handle.thread().id();

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            thread: Mutex::new(Some(handle)),
            thread_id,
        })
    }

    /// Wait until every job dispatched before this call has run.
    pub async fn flush(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.dispatch(Box::new(move || {
            let _ = tx.send(());
        }))?;
        rx.await
            .map_err(|_| BridgeError::NotAvailable("UI thread stopped".to_string()))
    }

    /// Stop accepting jobs, drain the queue and join the UI thread.
    ///
    /// Must not be called from the UI thread itself.
    pub fn shutdown(&self) -> Result<()> {
        if self.is_ui_thread() {
            return Err(BridgeError::OperationFailed(
                "Cannot shut down the UI thread from itself".to_string(),
            ));
        }

        lock(&self.sender).take();
        if let Some(handle) = lock(&self.thread).take() {
            handle
                .join()
                .map_err(|_| BridgeError::OperationFailed("UI thread panicked".to_string()))?;
        }
        Ok(())
    }
}

impl UiDispatcher for ThreadUiDispatcher {
    fn dispatch(&self, job: UiJob) -> Result<()> {
        let sender = lock(&self.sender);
        match sender.as_ref() {
            Some(sender) => sender
                .send(job)
                .map_err(|_| BridgeError::NotAvailable("UI thread stopped".to_string())),
            None => Err(BridgeError::NotAvailable(
                "UI dispatcher shut down".to_string(),
            )),
        }
    }

    fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.thread_id
    }
}

impl std::fmt::Debug for ThreadUiDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadUiDispatcher")
            .field("thread_id", &self.thread_id)
            .field("running", &lock(&self.sender).is_some())
            .finish()
    }
}

impl Drop for ThreadUiDispatcher {
    fn drop(&mut self) {
        lock(&self.sender).take();
        // Joining from the UI thread would deadlock; the thread exits on its own
        // once the channel is closed.
        if !self.is_ui_thread() {
            if let Some(handle) = lock(&self.thread).take() {
                let _ = handle.join();
            }
        }
    }
}

/// Queues UI jobs until the owner explicitly runs them.
///
/// No thread is the UI thread except the one currently inside
/// [`run_pending`](Self::run_pending), unless the dispatcher was created with
/// [`with_current_thread_as_ui`](Self::with_current_thread_as_ui).
pub struct ManualUiDispatcher {
    queue: Mutex<VecDeque<UiJob>>,
    ui_thread: Option<ThreadId>,
    draining: Mutex<Option<ThreadId>>,
    closed: Mutex<bool>,
}

impl ManualUiDispatcher {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            ui_thread: None,
            draining: Mutex::new(None),
            closed: Mutex::new(false),
        }
    }

    /// Treat the calling thread as the UI thread, so `run_on_ui` from it runs inline.
    pub fn with_current_thread_as_ui() -> Self {
        Self {
            ui_thread: Some(thread::current().id()),
            ..Self::new()
        }
    }

    /// Number of jobs waiting to run.
    pub fn pending(&self) -> usize {
        lock(&self.queue).len()
    }

    /// Run queued jobs in FIFO order, including jobs queued while draining.
    ///
    /// Returns the number of jobs run.
    pub fn run_pending(&self) -> usize {
        let previous = lock(&self.draining).replace(thread::current().id());
        let mut ran = 0;
        loop {
            let job = lock(&self.queue).pop_front();
            match job {
                Some(job) => {
                    job();
                    ran += 1;
                }
                None => break,
            }
        }
        *lock(&self.draining) = previous;
        ran
    }

    /// Reject all further dispatches and drop queued jobs.
    pub fn close(&self) {
        *lock(&self.closed) = true;
        lock(&self.queue).clear();
    }
}

impl Default for ManualUiDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl UiDispatcher for ManualUiDispatcher {
    fn dispatch(&self, job: UiJob) -> Result<()> {
        if *lock(&self.closed) {
            return Err(BridgeError::NotAvailable(
                "UI dispatcher closed".to_string(),
            ));
        }
        lock(&self.queue).push_back(job);
        Ok(())
    }

    fn is_ui_thread(&self) -> bool {
        let current = thread::current().id();
        self.ui_thread == Some(current) || *lock(&self.draining) == Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_thread_dispatcher_runs_jobs_in_order_on_ui_thread() {
        let dispatcher = Arc::new(ThreadUiDispatcher::spawn().unwrap());
        let seen = Arc::new(Mutex::new(Vec::new()));

        assert!(!dispatcher.is_ui_thread());

        for i in 0..10 {
            let seen = seen.clone();
            let d = dispatcher.clone();
            dispatcher
                .dispatch(Box::new(move || {
                    assert!(d.is_ui_thread());
                    assert_eq!(thread::current().name(), Some(UI_THREAD_NAME));
                    seen.lock().unwrap().push(i);
                }))
                .unwrap();
        }

        dispatcher.flush().await.unwrap();
        assert_eq!(*seen.lock().unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_thread_dispatcher_survives_panicking_job() {
        let dispatcher = ThreadUiDispatcher::spawn().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        dispatcher.dispatch(Box::new(|| panic!("boom"))).unwrap();
        let c = counter.clone();
        dispatcher
            .dispatch(Box::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();

        dispatcher.flush().await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_thread_dispatcher_rejects_after_shutdown() {
        let dispatcher = ThreadUiDispatcher::spawn().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        dispatcher
            .dispatch(Box::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();

        dispatcher.shutdown().unwrap();
        // Queued jobs are drained before the thread exits
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        let result = dispatcher.dispatch(Box::new(|| {}));
        assert!(matches!(result, Err(BridgeError::NotAvailable(_))));
    }

    #[test]
    fn test_manual_dispatcher_queues_until_run() {
        let dispatcher = Arc::new(ManualUiDispatcher::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let c = counter.clone();
        let d = dispatcher.clone();
        dispatcher
            .run_on_ui(Box::new(move || {
                assert!(d.is_ui_thread());
                c.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();

        assert_eq!(dispatcher.pending(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(!dispatcher.is_ui_thread());

        assert_eq!(dispatcher.run_pending(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!dispatcher.is_ui_thread());
    }

    #[test]
    fn test_manual_dispatcher_drains_nested_jobs() {
        let dispatcher = Arc::new(ManualUiDispatcher::new());
        let order = Arc::new(Mutex::new(Vec::new()));

        let d = dispatcher.clone();
        let o = order.clone();
        dispatcher
            .dispatch(Box::new(move || {
                o.lock().unwrap().push("outer");
                let o = o.clone();
                d.dispatch(Box::new(move || o.lock().unwrap().push("inner")))
                    .unwrap();
            }))
            .unwrap();

        assert_eq!(dispatcher.run_pending(), 2);
        assert_eq!(*order.lock().unwrap(), vec!["outer", "inner"]);
    }

    #[test]
    fn test_manual_dispatcher_current_thread_runs_inline() {
        let dispatcher = ManualUiDispatcher::with_current_thread_as_ui();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();

        dispatcher
            .run_on_ui(Box::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(dispatcher.pending(), 0);
    }

    #[test]
    fn test_manual_dispatcher_close() {
        let dispatcher = ManualUiDispatcher::new();
        dispatcher.dispatch(Box::new(|| {})).unwrap();
        dispatcher.close();

        assert_eq!(dispatcher.pending(), 0);
        assert!(dispatcher.dispatch(Box::new(|| {})).is_err());
    }
}
