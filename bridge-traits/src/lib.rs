//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host UI.
//!
//! ## Overview
//!
//! This crate defines the contract between the binder core and the host
//! toolkit. The core needs very little from the host: something that can be
//! read (a [`LibraryItem`]), somewhere to show the result (a [`TextWidget`] or
//! [`ImageWidget`]) and a way to get back onto the UI thread
//! ([`UiDispatcher`]).
//!
//! ## Traits
//!
//! ### Data
//! - [`LibraryItem`](library::LibraryItem) - One media entity with fallible
//!   title, subtitle and artwork reads
//!
//! ### Presentation
//! - [`Widget`](widget::Widget) - Identity, opacity and current size of a slot
//! - [`TextWidget`](widget::TextWidget) - A slot that displays text
//! - [`ImageWidget`](widget::ImageWidget) - A slot that displays artwork
//! - [`UiDispatcher`](dispatch::UiDispatcher) - Runs closures on the single UI thread
//!
//! ### Utilities
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync`. Widgets use interior mutability
//! and are only ever mutated from closures handed to the dispatcher, so an
//! implementation may assume that mutation happens on the UI thread.
//!
//! ## Examples
//!
//! ### Implementing LibraryItem
//!
//! ```ignore
//! use bridge_traits::library::{ItemId, LibraryItem, ReadResult};
//! use bridge_traits::artwork::Artwork;
//! use async_trait::async_trait;
//!
//! pub struct Song {
//!     id: ItemId,
//!     title: String,
//! }
//!
//! #[async_trait]
//! impl LibraryItem for Song {
//!     fn item_id(&self) -> ItemId {
//!         self.id.clone()
//!     }
//!
//!     async fn title(&self) -> ReadResult<Option<String>> {
//!         Ok(Some(self.title.clone()))
//!     }
//!
//!     async fn subtitle(&self) -> ReadResult<Option<String>> {
//!         Ok(None)
//!     }
//!
//!     async fn artwork(&self, width: u32, height: u32) -> ReadResult<Option<Artwork>> {
//!         Ok(None)
//!     }
//! }
//! ```

pub mod artwork;
pub mod dispatch;
pub mod error;
pub mod library;
pub mod logging;
pub mod widget;

pub use error::BridgeError;

// Re-export commonly used types
pub use artwork::Artwork;
pub use dispatch::{UiDispatcher, UiJob};
pub use library::{ItemId, LibraryItem, LibraryReadError, ReadResult};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use widget::{ImageWidget, TextWidget, Widget, WidgetId, WidgetSize};
