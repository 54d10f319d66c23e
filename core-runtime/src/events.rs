//! # Event Bus System
//!
//! Broadcasts what binders do so that owners can react (log read failures,
//! collect statistics, drive tests) without binders knowing about them.
//!
//! ## Overview
//!
//! - **Event Types**: [`BinderEvent`] with its [`Attribute`] and [`ApplySource`]
//! - **EventBus**: cloneable handle around a `tokio::sync::broadcast` channel
//! - **EventStream**: receiver wrapper with optional filtering
//!
//! ```text
//! ┌──────────────┐    emit    ┌──────────┐   subscribe   ┌───────────────┐
//! │ TitleBinder  ├───────────>│          ├──────────────>│ MixtapeScreen │
//! ├──────────────┤            │ EventBus │               └───────────────┘
//! │ArtworkBinder ├───────────>│          ├──────────────> tests, hosts
//! └──────────────┘            └──────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{Attribute, BinderEvent, EventBus, EventStream};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(64);
//! let mut failures = EventStream::new(bus.subscribe())
//!     .filter(|event| matches!(event, BinderEvent::ReadFailed { .. }));
//!
//! bus.emit(BinderEvent::ReadFailed {
//!     item: "song-1".into(),
//!     attribute: Attribute::Artwork,
//!     message: "corrupt picture".to_string(),
//! })
//! .ok();
//!
//! let event = failures.recv().await.unwrap();
//! assert_eq!(event.attribute(), Attribute::Artwork);
//! # }
//! ```

use bridge_traits::library::ItemId;
use bridge_traits::widget::WidgetId;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, SendError},
};

pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that fall further behind receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 256;

/// Which attribute of an item a binder handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Title,
    Subtitle,
    Artwork,
}

impl Attribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Title => "title",
            Attribute::Subtitle => "subtitle",
            Attribute::Artwork => "artwork",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an applied value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplySource {
    /// Served from the cache during `bind`
    Cache,
    /// Read from the item by a background task
    Fetch,
    /// Substituted because the item was absent or its read failed
    Default,
}

/// Events published by binders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum BinderEvent {
    /// A value (or a default) reached a widget.
    Applied {
        widget: WidgetId,
        attribute: Attribute,
        source: ApplySource,
    },
    /// Reading an item failed; the default was shown instead.
    ReadFailed {
        item: ItemId,
        attribute: Attribute,
        message: String,
    },
    /// An in-flight task was cancelled before it touched its widget.
    Cancelled {
        widget: WidgetId,
        attribute: Attribute,
    },
}

impl BinderEvent {
    pub fn attribute(&self) -> Attribute {
        match self {
            BinderEvent::Applied { attribute, .. }
            | BinderEvent::ReadFailed { attribute, .. }
            | BinderEvent::Cancelled { attribute, .. } => *attribute,
        }
    }

    /// Returns a human-readable description of the event.
    pub fn description(&self) -> String {
        match self {
            BinderEvent::Applied {
                attribute, source, ..
            } => match source {
                ApplySource::Cache => format!("Applied cached {}", attribute),
                ApplySource::Fetch => format!("Applied fetched {}", attribute),
                ApplySource::Default => format!("Applied default {}", attribute),
            },
            BinderEvent::ReadFailed {
                item,
                attribute,
                message,
            } => format!("Failed to read {} of {}: {}", attribute, item, message),
            BinderEvent::Cancelled { attribute, .. } => {
                format!("Cancelled pending {} bind", attribute)
            }
        }
    }

    pub fn severity(&self) -> EventSeverity {
        match self {
            BinderEvent::ReadFailed { .. } => EventSeverity::Warning,
            BinderEvent::Applied { .. } | BinderEvent::Cancelled { .. } => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Central event bus.
///
/// Cloning yields another handle to the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BinderEvent>,
}

impl EventBus {
    /// Creates a new event bus buffering up to `capacity` events per subscriber.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0; validated configs never pass 0.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all current subscribers.
    ///
    /// Returns the number of subscribers reached, or an error when nobody is
    /// subscribed. Publishers usually ignore that error.
    pub fn emit(&self, event: BinderEvent) -> Result<usize, SendError<BinderEvent>> {
        self.sender.send(event)
    }

    /// Creates an independent receiver for all future events.
    pub fn subscribe(&self) -> Receiver<BinderEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

type EventFilter = Box<dyn Fn(&BinderEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with an optional filter.
pub struct EventStream {
    receiver: Receiver<BinderEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<BinderEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` will be returned.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&BinderEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &BinderEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next matching event.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` if this stream fell behind by `n` events,
    /// `RecvError::Closed` once every bus handle is dropped.
    pub async fn recv(&mut self) -> Result<BinderEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Returns the next matching event already queued, or `None`.
    pub fn try_recv(&mut self) -> Option<Result<BinderEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}
