//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop and headless hosts.
//!
//! ## Overview
//!
//! - `ThreadUiDispatcher` runs UI jobs on a dedicated named thread
//! - `ManualUiDispatcher` queues UI jobs until the owner drains them
//! - `TextView` / `ImageView` are in-memory widgets that record every mutation
//! - `StaticLibraryItem` serves fixed values with optional latency and failures
//! - `AudioFileItem` reads title, artist and cover art from audio file tags
//!
//! ## Feature Flags
//!
//! - `audio-tags`: Enable `AudioFileItem` (pulls in `lofty`)
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{StaticLibraryItem, TextView, ThreadUiDispatcher};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let dispatcher = Arc::new(ThreadUiDispatcher::spawn().unwrap());
//!     let label = Arc::new(TextView::with_size(200, 24));
//!     let item = Arc::new(StaticLibraryItem::new("song-1").with_title("So What"));
//!
//!     // Hand these to a binder
//! }
//! ```

mod dispatcher;
mod items;
mod views;

#[cfg(feature = "audio-tags")]
mod audio_file;

pub use dispatcher::{ManualUiDispatcher, ThreadUiDispatcher};
pub use items::StaticLibraryItem;
pub use views::{ImageView, TextView, ViewChange};

#[cfg(feature = "audio-tags")]
pub use audio_file::AudioFileItem;
