//! # Configuration
//!
//! Cache capacities and binder behavior for one screen.
//!
//! ## Overview
//!
//! A screen has two regions, a small header (one playlist) and a large body
//! (its songs), each with its own set of caches. [`ScreenConfig`] groups:
//!
//! - [`CacheConfig`] for the header and for the body
//! - [`BinderConfig`] shared by every binder (fade, fallback decode size,
//!   animation frame interval)
//! - event buffer size and text precache concurrency
//!
//! All types deserialize with per-field defaults, so hosts can load partial
//! settings from their own storage.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CacheConfig, ScreenConfig};
//!
//! let config = ScreenConfig::builder()
//!     .body_cache(CacheConfig::body().with_artwork_bytes(8 * 1024 * 1024))
//!     .fade_in_ms(150)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use serde::{Deserialize, Serialize};

/// Default fade-in duration for newly bound values.
pub const DEFAULT_FADE_IN_MS: i64 = 300;

/// Decode size used for a widget dimension that has not been measured yet.
pub const DEFAULT_FALLBACK_DIMENSION: u32 = 300;

/// Animation frame period (about 60 fps).
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// Items read concurrently while precaching text.
pub const DEFAULT_PRECACHE_CONCURRENCY: usize = 4;

/// How an artwork cache is bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtworkCapacity {
    /// At most this many images, whatever their decoded size
    Entries(usize),
    /// At most this many decoded bytes in total
    Bytes(usize),
}

impl ArtworkCapacity {
    /// The bound itself, in entries or bytes.
    pub fn limit(&self) -> usize {
        match *self {
            ArtworkCapacity::Entries(entries) => entries,
            ArtworkCapacity::Bytes(bytes) => bytes,
        }
    }
}

/// Capacities of the three caches of one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached titles
    pub title_entries: usize,
    /// Maximum number of cached subtitles
    pub subtitle_entries: usize,
    /// Bound of the artwork cache
    pub artwork: ArtworkCapacity,
}

impl CacheConfig {
    /// Sizes for a scrolling list of songs.
    pub const fn body() -> Self {
        Self {
            title_entries: 10_000,
            subtitle_entries: 10_000,
            artwork: ArtworkCapacity::Bytes(1_000_000),
        }
    }

    /// Sizes for a header showing a single item.
    ///
    /// Two entries per cache, artwork included, so a large cover is still
    /// cached.
    pub const fn header() -> Self {
        Self {
            title_entries: 2,
            subtitle_entries: 2,
            artwork: ArtworkCapacity::Entries(2),
        }
    }

    pub fn with_title_entries(mut self, entries: usize) -> Self {
        self.title_entries = entries;
        self
    }

    pub fn with_subtitle_entries(mut self, entries: usize) -> Self {
        self.subtitle_entries = entries;
        self
    }

    pub fn with_artwork_bytes(mut self, bytes: usize) -> Self {
        self.artwork = ArtworkCapacity::Bytes(bytes);
        self
    }

    pub fn with_artwork_entries(mut self, entries: usize) -> Self {
        self.artwork = ArtworkCapacity::Entries(entries);
        self
    }

    /// Rejects zero capacities. `region` names the config in the message.
    pub fn validate(&self, region: &str) -> Result<()> {
        if self.title_entries == 0 {
            return Err(Error::Config(format!(
                "{} title cache capacity must be greater than 0",
                region
            )));
        }
        if self.subtitle_entries == 0 {
            return Err(Error::Config(format!(
                "{} subtitle cache capacity must be greater than 0",
                region
            )));
        }
        if self.artwork.limit() == 0 {
            return Err(Error::Config(format!(
                "{} artwork cache capacity must be greater than 0",
                region
            )));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::body()
    }
}

/// Behavior shared by all binders of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderConfig {
    /// Fade-in duration; 0 or negative disables the animation
    pub fade_in_ms: i64,
    /// Decode width used while a widget reports width 0
    pub fallback_width: u32,
    /// Decode height used while a widget reports height 0
    pub fallback_height: u32,
    /// Period between fade animation steps
    pub frame_interval_ms: u64,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            fade_in_ms: DEFAULT_FADE_IN_MS,
            fallback_width: DEFAULT_FALLBACK_DIMENSION,
            fallback_height: DEFAULT_FALLBACK_DIMENSION,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
        }
    }
}

impl BinderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.fallback_width == 0 || self.fallback_height == 0 {
            return Err(Error::Config(format!(
                "Fallback decode size must be non-zero, got {}x{}",
                self.fallback_width, self.fallback_height
            )));
        }
        if self.frame_interval_ms == 0 {
            return Err(Error::Config(
                "Frame interval must be at least 1 ms".to_string(),
            ));
        }
        Ok(())
    }
}

/// Complete configuration of one screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub header_cache: CacheConfig,
    pub body_cache: CacheConfig,
    pub binder: BinderConfig,
    /// Buffer size of the screen's event bus
    pub event_buffer: usize,
    /// Items read concurrently by the text precacher
    pub precache_concurrency: usize,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            header_cache: CacheConfig::header(),
            body_cache: CacheConfig::body(),
            binder: BinderConfig::default(),
            event_buffer: DEFAULT_EVENT_BUFFER_SIZE,
            precache_concurrency: DEFAULT_PRECACHE_CONCURRENCY,
        }
    }
}

impl ScreenConfig {
    pub fn builder() -> ScreenConfigBuilder {
        ScreenConfigBuilder::default()
    }

    /// Validates every section.
    ///
    /// Deserialized configs should be validated before use; the builder does
    /// it in [`ScreenConfigBuilder::build`].
    pub fn validate(&self) -> Result<()> {
        self.header_cache.validate("Header")?;
        self.body_cache.validate("Body")?;
        self.binder.validate()?;

        if self.event_buffer == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }
        if self.precache_concurrency == 0 {
            return Err(Error::Config(
                "Precache concurrency must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`ScreenConfig`].
#[derive(Debug, Default)]
pub struct ScreenConfigBuilder {
    header_cache: Option<CacheConfig>,
    body_cache: Option<CacheConfig>,
    binder: Option<BinderConfig>,
    fade_in_ms: Option<i64>,
    fallback_size: Option<(u32, u32)>,
    frame_interval_ms: Option<u64>,
    event_buffer: Option<usize>,
    precache_concurrency: Option<usize>,
}

impl ScreenConfigBuilder {
    pub fn header_cache(mut self, cache: CacheConfig) -> Self {
        self.header_cache = Some(cache);
        self
    }

    pub fn body_cache(mut self, cache: CacheConfig) -> Self {
        self.body_cache = Some(cache);
        self
    }

    /// Replace the whole binder section. Individual setters below win over it.
    pub fn binder(mut self, binder: BinderConfig) -> Self {
        self.binder = Some(binder);
        self
    }

    pub fn fade_in_ms(mut self, millis: i64) -> Self {
        self.fade_in_ms = Some(millis);
        self
    }

    pub fn fallback_size(mut self, width: u32, height: u32) -> Self {
        self.fallback_size = Some((width, height));
        self
    }

    pub fn frame_interval_ms(mut self, millis: u64) -> Self {
        self.frame_interval_ms = Some(millis);
        self
    }

    pub fn event_buffer(mut self, size: usize) -> Self {
        self.event_buffer = Some(size);
        self
    }

    pub fn precache_concurrency(mut self, limit: usize) -> Self {
        self.precache_concurrency = Some(limit);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] naming the offending value when any capacity,
    /// dimension, interval or limit is zero.
    pub fn build(self) -> Result<ScreenConfig> {
        let defaults = ScreenConfig::default();

        let mut binder = self.binder.unwrap_or(defaults.binder);
        if let Some(fade) = self.fade_in_ms {
            binder.fade_in_ms = fade;
        }
        if let Some((width, height)) = self.fallback_size {
            binder.fallback_width = width;
            binder.fallback_height = height;
        }
        if let Some(interval) = self.frame_interval_ms {
            binder.frame_interval_ms = interval;
        }

        let config = ScreenConfig {
            header_cache: self.header_cache.unwrap_or(defaults.header_cache),
            body_cache: self.body_cache.unwrap_or(defaults.body_cache),
            binder,
            event_buffer: self.event_buffer.unwrap_or(defaults.event_buffer),
            precache_concurrency: self
                .precache_concurrency
                .unwrap_or(defaults.precache_concurrency),
        };

        config.validate()?;
        Ok(config)
    }
}
