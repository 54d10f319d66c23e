//! Warm text caches ahead of binding.
//!
//! Reading titles and subtitles is cheap compared to artwork, so a screen can
//! read them for a whole list up front and let later binds hit the cache.

use std::sync::Arc;

use bridge_traits::library::LibraryItem;
use core_async::sync::CancellationToken;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::cache::TextCache;
use crate::error::{BinderError, Result};

/// Outcome of a [`Precacher::precache`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrecacheReport {
    /// Items whose title and subtitle were both read (or already cached)
    pub cached: usize,
    /// Items with at least one failed read
    pub failed: usize,
}

impl PrecacheReport {
    pub fn total(&self) -> usize {
        self.cached + self.failed
    }
}

/// Reads titles and subtitles into a pair of text caches with bounded
/// concurrency.
#[derive(Debug, Clone)]
pub struct Precacher {
    titles: Arc<TextCache>,
    subtitles: Arc<TextCache>,
    concurrency: usize,
}

impl Precacher {
    /// # Errors
    ///
    /// [`BinderError::InvalidArgument`] when `concurrency` is 0.
    pub fn new(
        titles: Arc<TextCache>,
        subtitles: Arc<TextCache>,
        concurrency: usize,
    ) -> Result<Self> {
        if concurrency == 0 {
            return Err(BinderError::invalid(
                "concurrency",
                "precache concurrency must be greater than 0",
            ));
        }
        Ok(Self {
            titles,
            subtitles,
            concurrency,
        })
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Read title and subtitle of every item into the caches.
    ///
    /// Keys already cached are not read again. Failed reads are logged and
    /// counted, never propagated. Stops early, returning what was done so
    /// far, once `token` is cancelled.
    pub async fn precache(
        &self,
        items: Vec<Arc<dyn LibraryItem>>,
        token: &CancellationToken,
    ) -> PrecacheReport {
        let requested = items.len();
        let outcomes: Vec<bool> = stream::iter(items)
            .map(|item| self.precache_item(item))
            .buffer_unordered(self.concurrency)
            .take_until(token.cancelled())
            .collect()
            .await;

        let cached = outcomes.iter().filter(|ok| **ok).count();
        let report = PrecacheReport {
            cached,
            failed: outcomes.len() - cached,
        };

        if report.total() < requested {
            debug!(
                done = report.total(),
                requested, "Precache cancelled before completion"
            );
        }
        info!(
            cached = report.cached,
            failed = report.failed,
            "Precached item text"
        );
        report
    }

    async fn precache_item(&self, item: Arc<dyn LibraryItem>) -> bool {
        let key = item.item_id();
        let mut ok = true;

        if !self.titles.contains(&key) {
            match item.title().await {
                Ok(Some(title)) => {
                    self.titles.put(key.clone(), title);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(item = %key, error = %e, "Failed to precache title");
                    ok = false;
                }
            }
        }

        if !self.subtitles.contains(&key) {
            match item.subtitle().await {
                Ok(Some(subtitle)) => {
                    self.subtitles.put(key.clone(), subtitle);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(item = %key, error = %e, "Failed to precache subtitle");
                    ok = false;
                }
            }
        }

        ok
    }
}
