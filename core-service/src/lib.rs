//! Screen façade and bootstrap helpers.
//!
//! This crate wires host-provided bridges (UI dispatcher, widgets, library
//! items) into the binder core. A [`MixtapeScreen`] owns the header and body
//! [`BinderSet`]s of a playlist screen together with their caches, logs read
//! failures reported by the binders and cancels all outstanding work on
//! teardown. Desktop apps typically enable the `desktop-shims` feature (which
//! depends on `bridge-desktop`) and start from [`bootstrap_desktop`].

pub mod error;
pub mod presets;
pub mod screen;

pub use error::{CoreError, Result};
pub use screen::{BinderSet, MixtapeScreen};

#[cfg(feature = "desktop-shims")]
use std::sync::Arc;

#[cfg(feature = "desktop-shims")]
use bridge_desktop::ThreadUiDispatcher;
#[cfg(feature = "desktop-shims")]
use core_runtime::config::ScreenConfig;

/// A screen driven by a dedicated desktop UI thread.
#[cfg(feature = "desktop-shims")]
#[derive(Debug)]
pub struct DesktopScreen {
    pub screen: MixtapeScreen,
    pub dispatcher: Arc<ThreadUiDispatcher>,
}

/// Convenience bootstrapper for desktop hosts.
///
/// Spawns the UI thread and builds a screen with the stock header and body
/// defaults. Call inside a Tokio runtime.
///
/// ```
/// # #[cfg(feature = "desktop-shims")]
/// # async fn example() -> core_service::Result<()> {
/// use core_runtime::config::ScreenConfig;
/// use core_service::bootstrap_desktop;
///
/// let desktop = bootstrap_desktop(&ScreenConfig::default())?;
/// let in_flight = desktop.screen.body().in_flight();
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop(config: &ScreenConfig) -> Result<DesktopScreen> {
    let dispatcher = ThreadUiDispatcher::spawn()
        .map(Arc::new)
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;

    let screen = MixtapeScreen::new(
        config,
        presets::header_defaults(),
        presets::body_defaults(),
        dispatcher.clone(),
    )?;

    Ok(DesktopScreen { screen, dispatcher })
}
