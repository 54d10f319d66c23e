//! # Core Runtime Module
//!
//! Foundational runtime infrastructure shared by the binder crates:
//! - Logging and tracing setup
//! - Screen configuration with validation
//! - Event bus for binder events
//!
//! ## Overview
//!
//! Nothing here knows how values are fetched or displayed. Binders publish
//! to the [`events::EventBus`], owners read [`config::ScreenConfig`], and
//! hosts install logging once at startup with [`logging::init_logging`].

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
