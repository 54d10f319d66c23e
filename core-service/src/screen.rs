//! The screen owner: binders, caches, event logging and teardown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bridge_traits::{
    dispatch::UiDispatcher,
    library::LibraryItem,
    widget::{ImageWidget, TextWidget},
};
use core_async::runtime;
use core_async::sync::broadcast::{error::RecvError, Receiver};
use core_async::sync::CancellationToken;
use core_async::task::{self, JoinHandle};
use core_binder::{
    ArtworkBinder, ArtworkCache, BinderSettings, DisplayableDefaults, PrecacheReport, Precacher,
    SubtitleBinder, TextCache, TitleBinder,
};
use core_runtime::config::{CacheConfig, ScreenConfig};
use core_runtime::events::{BinderEvent, EventBus, EventStream};
use tracing::{debug, info, warn};

use crate::error::Result;

/// Title, subtitle and artwork binders of one screen region.
///
/// The three binders share the region's defaults and each owns one of the
/// region's caches.
#[derive(Debug)]
pub struct BinderSet {
    title: TitleBinder,
    subtitle: SubtitleBinder,
    artwork: ArtworkBinder,
}

impl BinderSet {
    /// Build a region's caches from `caches` and one binder per attribute.
    pub fn new(
        caches: &CacheConfig,
        defaults: DisplayableDefaults,
        settings: BinderSettings,
        dispatcher: Arc<dyn UiDispatcher>,
        events: &EventBus,
    ) -> Result<Self> {
        let defaults = Arc::new(defaults);

        let title = TitleBinder::new(
            Arc::new(TextCache::new(caches.title_entries)?),
            Arc::clone(&defaults),
            Arc::clone(&dispatcher),
        )
        .with_settings(settings)
        .with_events(events.clone());

        let subtitle = SubtitleBinder::new(
            Arc::new(TextCache::new(caches.subtitle_entries)?),
            Arc::clone(&defaults),
            Arc::clone(&dispatcher),
        )
        .with_settings(settings)
        .with_events(events.clone());

        let artwork = ArtworkBinder::new(
            Arc::new(ArtworkCache::from_capacity(caches.artwork)?),
            defaults,
            dispatcher,
        )
        .with_settings(settings)
        .with_events(events.clone());

        Ok(Self {
            title,
            subtitle,
            artwork,
        })
    }

    pub fn title(&self) -> &TitleBinder {
        &self.title
    }

    pub fn subtitle(&self) -> &SubtitleBinder {
        &self.subtitle
    }

    pub fn artwork(&self) -> &ArtworkBinder {
        &self.artwork
    }

    /// Bind all three attributes of `item` to one row of widgets.
    pub fn bind_row(
        &self,
        title: Arc<dyn TextWidget>,
        subtitle: Arc<dyn TextWidget>,
        artwork: Arc<dyn ImageWidget>,
        item: Option<Arc<dyn LibraryItem>>,
    ) {
        self.title.bind(title, item.clone());
        self.subtitle.bind(subtitle, item.clone());
        self.artwork.bind(artwork, item);
    }

    /// Cancel every in-flight task of the region. Returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        self.title.cancel_all() + self.subtitle.cancel_all() + self.artwork.cancel_all()
    }

    pub fn in_flight(&self) -> usize {
        self.title.in_flight() + self.subtitle.in_flight() + self.artwork.in_flight()
    }
}

/// Owner of everything a playlist screen binds.
///
/// Holds a header region (playlist name, artists, cover; tiny caches) and a
/// body region (one row per song; large caches), an event bus shared by all
/// six binders and a listener that logs read failures. Call
/// [`teardown`](Self::teardown) when the screen goes away; dropping the
/// screen does it too.
///
/// # Example
///
/// ```ignore
/// let screen = MixtapeScreen::new(
///     &ScreenConfig::default(),
///     presets::header_defaults(),
///     presets::body_defaults(),
///     dispatcher,
/// )?;
///
/// screen.header().bind_row(name_label, artists_label, cover_view, Some(playlist));
/// screen.precache_body_text(songs.clone()).await;
/// ```
pub struct MixtapeScreen {
    header: BinderSet,
    body: BinderSet,
    events: EventBus,
    precacher: Precacher,
    shutdown: CancellationToken,
    listener: Option<JoinHandle<()>>,
    torn_down: AtomicBool,
}

impl MixtapeScreen {
    /// Build both regions from `config`.
    ///
    /// Must be called inside a Tokio runtime for fetches to run off the UI
    /// thread and for read failures to be logged.
    ///
    /// # Errors
    ///
    /// [`CoreError::Runtime`](crate::CoreError::Runtime) for an invalid
    /// config, [`CoreError::Binder`](crate::CoreError::Binder) if a binder
    /// rejects a setting.
    pub fn new(
        config: &ScreenConfig,
        header_defaults: DisplayableDefaults,
        body_defaults: DisplayableDefaults,
        dispatcher: Arc<dyn UiDispatcher>,
    ) -> Result<Self> {
        config.validate()?;
        let settings = BinderSettings::from_config(&config.binder)?;
        let events = EventBus::new(config.event_buffer);

        let header = BinderSet::new(
            &config.header_cache,
            header_defaults,
            settings,
            Arc::clone(&dispatcher),
            &events,
        )?;
        let body = BinderSet::new(
            &config.body_cache,
            body_defaults,
            settings,
            dispatcher,
            &events,
        )?;

        let precacher = Precacher::new(
            Arc::clone(body.title().cache()),
            Arc::clone(body.subtitle().cache()),
            config.precache_concurrency,
        )?;

        let shutdown = CancellationToken::new();
        let listener = match runtime::current_handle() {
            Some(handle) => Some(task::spawn_on(
                &handle,
                log_read_failures(events.subscribe(), shutdown.clone()),
            )),
            None => {
                warn!("No async runtime available; read failures will not be logged");
                None
            }
        };

        info!(
            header_titles = config.header_cache.title_entries,
            body_titles = config.body_cache.title_entries,
            body_artwork = ?config.body_cache.artwork,
            fade_in_ms = config.binder.fade_in_ms,
            "Screen initialized"
        );

        Ok(Self {
            header,
            body,
            events,
            precacher,
            shutdown,
            listener,
            torn_down: AtomicBool::new(false),
        })
    }

    pub fn header(&self) -> &BinderSet {
        &self.header
    }

    pub fn body(&self) -> &BinderSet {
        &self.body
    }

    /// Handle to the bus every binder of this screen publishes on.
    pub fn events(&self) -> EventBus {
        self.events.clone()
    }

    pub fn subscribe(&self) -> EventStream {
        EventStream::new(self.events.subscribe())
    }

    /// Warm the body title and subtitle caches with `items`.
    ///
    /// Returns early, with partial counts, once the screen is torn down.
    pub async fn precache_body_text(&self, items: Vec<Arc<dyn LibraryItem>>) -> PrecacheReport {
        let token = self.shutdown.child_token();
        self.precacher.precache(items, &token).await
    }

    /// Whether the read-failure listener is still running.
    pub fn is_listening(&self) -> bool {
        self.listener
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::Acquire)
    }

    /// Cancel all binder work and stop the failure listener.
    ///
    /// Returns the number of tasks cancelled. Calling it again is a no-op
    /// returning 0.
    pub fn teardown(&self) -> usize {
        if self.torn_down.swap(true, Ordering::AcqRel) {
            return 0;
        }

        let cancelled = self.header.cancel_all() + self.body.cancel_all();
        self.shutdown.cancel();

        info!(cancelled, "Screen torn down");
        cancelled
    }
}

impl Drop for MixtapeScreen {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for MixtapeScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MixtapeScreen")
            .field("header", &self.header)
            .field("body", &self.body)
            .field("torn_down", &self.is_torn_down())
            .finish()
    }
}

async fn log_read_failures(
    mut events: Receiver<BinderEvent>,
    shutdown: CancellationToken,
) {
    loop {
        let next = core_async::select! {
            biased;
            _ = shutdown.cancelled() => break,
            next = events.recv() => next,
        };

        match next {
            Ok(BinderEvent::ReadFailed {
                item,
                attribute,
                message,
            }) => {
                warn!(%item, %attribute, error = %message, "Failed to read item; showing default");
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Read-failure listener lagged behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
    debug!("Read-failure listener stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;
    use bridge_desktop::ManualUiDispatcher;

    fn screen(config: &ScreenConfig) -> Result<MixtapeScreen> {
        MixtapeScreen::new(
            config,
            presets::header_defaults(),
            presets::body_defaults(),
            Arc::new(ManualUiDispatcher::new()),
        )
    }

    #[test]
    fn test_caches_follow_config() {
        let screen = screen(&ScreenConfig::default()).unwrap();

        assert_eq!(screen.header().title().cache().capacity(), 2);
        assert_eq!(screen.header().subtitle().cache().capacity(), 2);
        assert_eq!(screen.header().artwork().cache().capacity(), 2);
        assert_eq!(screen.body().title().cache().capacity(), 10_000);
        assert_eq!(screen.body().artwork().cache().capacity(), 1_000_000);
        assert_eq!(screen.header().title().defaults().title(), Some("Playlist"));
        assert_eq!(
            screen.body().subtitle().defaults().subtitle(),
            Some("Unknown artist")
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ScreenConfig::default();
        config.body_cache.title_entries = 0;

        let err = screen(&config).unwrap_err();
        assert!(matches!(err, crate::CoreError::Runtime(_)));
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let screen = screen(&ScreenConfig::default()).unwrap();
        assert!(!screen.is_torn_down());
        assert_eq!(screen.teardown(), 0);
        assert!(screen.is_torn_down());
        assert_eq!(screen.teardown(), 0);
    }
}
