//! # Core Binder
//!
//! Binds attributes of library items (title, subtitle, artwork) to widgets.
//!
//! ## Overview
//!
//! A [`DataBinder`] serves values from a shared [`BoundedCache`] when it can
//! and reads them from the item on a runtime worker when it cannot. Each
//! widget has at most one in-flight task: binding it again cancels the
//! previous one before anything else happens, and every widget mutation runs
//! on the UI thread after a final cancellation check. Reads that fail fall
//! back to [`DisplayableDefaults`].
//!
//! ## Components
//!
//! - **Cache** ([`cache`]): mutex-guarded LRU with pluggable weights
//! - **Binder** ([`binder`]): the bind/cancel protocol, generic over [`BindKind`]
//! - **Registry** ([`registry`]): widget to in-flight task, generation-checked
//! - **Fade** ([`fade`]): opacity animation for newly applied values
//! - **Precache** ([`precache`]): bulk text reads ahead of binding
//!
//! ## Usage
//!
//! ```ignore
//! use core_binder::{ArtworkBinder, ArtworkCache, DisplayableDefaults};
//!
//! let cache = Arc::new(ArtworkCache::with_byte_capacity(1_000_000)?);
//! let binder = ArtworkBinder::new(cache, Arc::new(DisplayableDefaults::empty()), dispatcher);
//!
//! binder.bind(cover_view.clone(), Some(song.clone()));
//! // ... on teardown
//! binder.cancel_all();
//! ```

pub mod binder;
pub mod cache;
pub mod defaults;
pub mod error;
pub mod fade;
pub mod kind;
pub mod precache;
pub mod registry;

pub use binder::{ArtworkBinder, BinderSettings, DataBinder, SubtitleBinder, TitleBinder};
pub use cache::{
    ArtworkCache, ArtworkWeigher, BoundedCache, CacheStats, TextCache, UnitWeigher, Weigher,
};
pub use defaults::DisplayableDefaults;
pub use error::{BinderError, Result};
pub use fade::FadeTransition;
pub use kind::{ArtworkKind, BindKind, SubtitleKind, TitleKind};
pub use precache::{PrecacheReport, Precacher};
pub use registry::TaskRegistry;
