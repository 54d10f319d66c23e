//! Mixtape umbrella crate.
//!
//! Hosts depend on `mixtape-workspace` and pick a feature instead of wiring
//! the member crates one by one:
//!
//! - `desktop-shims` (default): the screen façade plus the headless desktop
//!   host (UI thread dispatcher, in-memory views, static items)
//! - `binder-only`: just the binders and caches, for hosts that bring their
//!   own dispatcher and widgets
//! - `audio-tags`: `AudioFileItem`, reading titles, artists and covers from
//!   tagged audio files

#[cfg(feature = "desktop-shims")]
pub use core_service as service;

#[cfg(feature = "binder-only")]
pub use core_binder as binder;

#[cfg(any(feature = "desktop-shims", feature = "audio-tags"))]
pub use bridge_desktop as desktop;
