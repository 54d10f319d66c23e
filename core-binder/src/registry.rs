//! Per-binder map from widget to its in-flight task.
//!
//! At most one task is tracked per widget. Registering a new task for a
//! widget cancels the previous one. Every registration gets a fresh
//! generation number, and a task removes its own entry on completion only if
//! the generation still matches, so a finishing stale task can never drop the
//! ticket of a newer bind.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use bridge_traits::widget::WidgetId;
use core_async::sync::CancellationToken;
use core_async::task::JoinHandle;

struct TaskTicket {
    token: CancellationToken,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

/// A task that was cancelled and removed from the registry.
#[derive(Debug)]
pub struct CancelledTask {
    pub widget: WidgetId,
    pub generation: u64,
    /// Join handle of the task, if it was attached before cancellation.
    pub handle: Option<JoinHandle<()>>,
}

#[derive(Default)]
pub struct TaskRegistry {
    tasks: Mutex<HashMap<WidgetId, TaskTicket>>,
    next_generation: AtomicU64,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<WidgetId, TaskTicket>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Track `token` as the task for `widget` and return its generation.
    ///
    /// Any task previously tracked for `widget` is cancelled and returned.
    pub fn register(
        &self,
        widget: WidgetId,
        token: CancellationToken,
    ) -> (u64, Option<CancelledTask>) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let previous = self.lock().insert(
            widget,
            TaskTicket {
                token,
                generation,
                handle: None,
            },
        );
        let previous = previous.map(|ticket| Self::cancel_ticket(widget, ticket));
        (generation, previous)
    }

    /// Attach the join handle of a spawned task.
    ///
    /// Ignored when the task already completed or was superseded.
    pub fn attach(&self, widget: WidgetId, generation: u64, handle: JoinHandle<()>) {
        if let Some(ticket) = self.lock().get_mut(&widget) {
            if ticket.generation == generation {
                ticket.handle = Some(handle);
            }
        }
    }

    /// Cancel and remove the task tracked for `widget`, if any.
    pub fn cancel(&self, widget: WidgetId) -> Option<CancelledTask> {
        let ticket = self.lock().remove(&widget)?;
        Some(Self::cancel_ticket(widget, ticket))
    }

    /// Cancel and remove every tracked task.
    pub fn cancel_all(&self) -> Vec<CancelledTask> {
        let drained: Vec<_> = self.lock().drain().collect();
        drained
            .into_iter()
            .map(|(widget, ticket)| Self::cancel_ticket(widget, ticket))
            .collect()
    }

    /// Remove the entry for `widget` if it still belongs to `generation`.
    ///
    /// Returns whether an entry was removed.
    pub fn complete(&self, widget: WidgetId, generation: u64) -> bool {
        let mut tasks = self.lock();
        match tasks.get(&widget) {
            Some(ticket) if ticket.generation == generation => {
                tasks.remove(&widget);
                true
            }
            _ => false,
        }
    }

    pub fn is_tracked(&self, widget: WidgetId) -> bool {
        self.lock().contains_key(&widget)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn cancel_ticket(widget: WidgetId, ticket: TaskTicket) -> CancelledTask {
        ticket.token.cancel();
        CancelledTask {
            widget,
            generation: ticket.generation,
            handle: ticket.handle,
        }
    }
}

impl std::fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRegistry")
            .field("tracked", &self.len())
            .finish()
    }
}
