//! Library items backed by fixed values.
//!
//! Useful for headless hosts (playlist headers whose values are known up
//! front) and for exercising binders against controlled latency and failure.

use async_trait::async_trait;
use bridge_traits::{
    artwork::Artwork,
    library::{ItemId, LibraryItem, LibraryReadError, ReadResult},
};
use core_async::sync::Notify;
use core_async::time::{sleep, Duration};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Slot<T> {
    Value(Option<T>),
    Fail(String),
}

impl<T: Clone> Slot<T> {
    fn read(&self) -> ReadResult<Option<T>> {
        match self {
            Slot::Value(value) => Ok(value.clone()),
            Slot::Fail(message) => Err(LibraryReadError::Unavailable(message.clone())),
        }
    }
}

/// A [`LibraryItem`] whose reads return configured values.
///
/// Reads can be delayed, gated on a [`Notify`] and made to fail per
/// attribute. Each read is counted.
///
/// ```ignore
/// let item = StaticLibraryItem::new("song-1")
///     .with_title("Blue in Green")
///     .with_subtitle("Miles Davis")
///     .with_delay(Duration::from_millis(50));
/// ```
#[derive(Debug)]
pub struct StaticLibraryItem {
    id: ItemId,
    title: Slot<String>,
    subtitle: Slot<String>,
    artwork: Slot<Artwork>,
    delay: Option<Duration>,
    gate: Option<Arc<Notify>>,
    title_reads: AtomicUsize,
    subtitle_reads: AtomicUsize,
    artwork_reads: AtomicUsize,
    last_artwork_request: std::sync::Mutex<Option<(u32, u32)>>,
}

impl StaticLibraryItem {
    /// An item with no values for any attribute.
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            title: Slot::Value(None),
            subtitle: Slot::Value(None),
            artwork: Slot::Value(None),
            delay: None,
            gate: None,
            title_reads: AtomicUsize::new(0),
            subtitle_reads: AtomicUsize::new(0),
            artwork_reads: AtomicUsize::new(0),
            last_artwork_request: std::sync::Mutex::new(None),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Slot::Value(Some(title.into()));
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Slot::Value(Some(subtitle.into()));
        self
    }

    pub fn with_artwork(mut self, artwork: Artwork) -> Self {
        self.artwork = Slot::Value(Some(artwork));
        self
    }

    pub fn failing_title(mut self, message: impl Into<String>) -> Self {
        self.title = Slot::Fail(message.into());
        self
    }

    pub fn failing_subtitle(mut self, message: impl Into<String>) -> Self {
        self.subtitle = Slot::Fail(message.into());
        self
    }

    pub fn failing_artwork(mut self, message: impl Into<String>) -> Self {
        self.artwork = Slot::Fail(message.into());
        self
    }

    /// Sleep for `delay` before every read.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Block every read until `gate` is notified once for it.
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn title_reads(&self) -> usize {
        self.title_reads.load(Ordering::SeqCst)
    }

    pub fn subtitle_reads(&self) -> usize {
        self.subtitle_reads.load(Ordering::SeqCst)
    }

    pub fn artwork_reads(&self) -> usize {
        self.artwork_reads.load(Ordering::SeqCst)
    }

    /// Size passed to the most recent artwork read.
    pub fn last_artwork_request(&self) -> Option<(u32, u32)> {
        *self
            .last_artwork_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn wait(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(delay) = self.delay {
            sleep(delay).await;
        }
    }
}

#[async_trait]
impl LibraryItem for StaticLibraryItem {
    fn item_id(&self) -> ItemId {
        self.id.clone()
    }

    async fn title(&self) -> ReadResult<Option<String>> {
        self.title_reads.fetch_add(1, Ordering::SeqCst);
        self.wait().await;
        self.title.read()
    }

    async fn subtitle(&self) -> ReadResult<Option<String>> {
        self.subtitle_reads.fetch_add(1, Ordering::SeqCst);
        self.wait().await;
        self.subtitle.read()
    }

    async fn artwork(&self, width: u32, height: u32) -> ReadResult<Option<Artwork>> {
        self.artwork_reads.fetch_add(1, Ordering::SeqCst);
        *self
            .last_artwork_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some((width, height));
        self.wait().await;
        self.artwork.read()
    }
}
