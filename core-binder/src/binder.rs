//! The generic binder.
//!
//! [`DataBinder`] owns the protocol for one attribute kind: for each widget,
//! keep at most one in-flight task, serve cache hits synchronously, read
//! misses on a runtime worker, fall back to defaults on failure and never let
//! superseded work touch the widget.
//!
//! ```text
//! bind(w, item)
//!   ├─ cancel task tracked for w
//!   ├─ clear w                                  (UI thread)
//!   ├─ no item      → apply default             (UI thread)
//!   ├─ cache hit    → apply cached value        (UI thread)
//!   └─ cache miss   → spawn fetch ──┬─ Ok(Some) → cache, apply     (UI thread, token checked)
//!                                   ├─ Ok(None) → leave w cleared
//!                                   ├─ Err      → apply default, publish ReadFailed
//!                                   └─ cancelled → drop result
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use bridge_traits::{
    dispatch::UiDispatcher,
    library::{ItemId, LibraryItem},
    widget::{Widget, WidgetId, WidgetSize},
};
use core_async::runtime::{self, Handle};
use core_async::sync::CancellationToken;
use core_async::task;
use core_async::time::Duration;
use core_runtime::config::{BinderConfig, DEFAULT_FADE_IN_MS, DEFAULT_FALLBACK_DIMENSION};
use core_runtime::events::{ApplySource, BinderEvent, EventBus};
use tracing::{debug, error, trace, Instrument};

use crate::cache::BoundedCache;
use crate::defaults::DisplayableDefaults;
use crate::error::{BinderError, Result};
use crate::fade::{FadeTransition, DEFAULT_FRAME_INTERVAL};
use crate::kind::{ArtworkKind, BindKind, SubtitleKind, TitleKind};
use crate::registry::{CancelledTask, TaskRegistry};

pub type TitleBinder = DataBinder<TitleKind>;
pub type SubtitleBinder = DataBinder<SubtitleKind>;
pub type ArtworkBinder = DataBinder<ArtworkKind>;

/// Tunable binder behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinderSettings {
    fade_in_ms: i64,
    fallback: WidgetSize,
    frame_interval: Duration,
}

impl Default for BinderSettings {
    fn default() -> Self {
        Self {
            fade_in_ms: DEFAULT_FADE_IN_MS,
            fallback: WidgetSize::new(DEFAULT_FALLBACK_DIMENSION, DEFAULT_FALLBACK_DIMENSION),
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }
}

impl BinderSettings {
    /// Settings from a validated [`BinderConfig`].
    pub fn from_config(config: &BinderConfig) -> Result<Self> {
        let mut settings = Self::default();
        settings.set_fade_in_ms(config.fade_in_ms);
        settings.set_fallback_size(config.fallback_width, config.fallback_height)?;
        settings.set_frame_interval(Duration::from_millis(config.frame_interval_ms))?;
        Ok(settings)
    }

    pub fn fade_in_ms(&self) -> i64 {
        self.fade_in_ms
    }

    /// 0 or negative disables the fade.
    pub fn set_fade_in_ms(&mut self, millis: i64) {
        self.fade_in_ms = millis;
    }

    pub fn with_fade_in_ms(mut self, millis: i64) -> Self {
        self.set_fade_in_ms(millis);
        self
    }

    pub fn fallback_size(&self) -> WidgetSize {
        self.fallback
    }

    pub fn set_fallback_size(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 {
            return Err(BinderError::invalid(
                "fallback_width",
                "fallback decode width must be greater than 0",
            ));
        }
        if height == 0 {
            return Err(BinderError::invalid(
                "fallback_height",
                "fallback decode height must be greater than 0",
            ));
        }
        self.fallback = WidgetSize::new(width, height);
        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    pub fn set_frame_interval(&mut self, interval: Duration) -> Result<()> {
        if interval.is_zero() {
            return Err(BinderError::invalid(
                "frame_interval",
                "frame interval must be greater than 0",
            ));
        }
        self.frame_interval = interval;
        Ok(())
    }

    fn fade(&self) -> FadeTransition {
        FadeTransition::from_millis(self.fade_in_ms).with_frame_interval(self.frame_interval)
    }
}

/// State shared between a binder and the tasks it spawns.
struct Shared<K: BindKind> {
    cache: Arc<BoundedCache<K::Value>>,
    defaults: Arc<DisplayableDefaults>,
    dispatcher: Arc<dyn UiDispatcher>,
    registry: Arc<TaskRegistry>,
    events: Option<EventBus>,
}

impl<K: BindKind> Clone for Shared<K> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            defaults: Arc::clone(&self.defaults),
            dispatcher: Arc::clone(&self.dispatcher),
            registry: Arc::clone(&self.registry),
            events: self.events.clone(),
        }
    }
}

impl<K: BindKind> Shared<K> {
    fn emit(&self, event: BinderEvent) {
        if let Some(events) = &self.events {
            // No subscribers is fine
            let _ = events.emit(event);
        }
    }

    fn emit_applied(&self, widget: WidgetId, source: ApplySource) {
        self.emit(BinderEvent::Applied {
            widget,
            attribute: K::ATTRIBUTE,
            source,
        });
    }

    fn emit_cancelled(&self, cancelled: &CancelledTask) {
        trace!(
            widget = %cancelled.widget,
            generation = cancelled.generation,
            attribute = %K::ATTRIBUTE,
            "Cancelled in-flight task"
        );
        self.emit(BinderEvent::Cancelled {
            widget: cancelled.widget,
            attribute: K::ATTRIBUTE,
        });
    }

    /// Run `job` inline on the UI thread, otherwise dispatch it.
    fn on_ui(&self, job: impl FnOnce() + Send + 'static) -> bool {
        match self.dispatcher.run_on_ui(Box::new(job)) {
            Ok(()) => true,
            Err(e) => {
                debug!(attribute = %K::ATTRIBUTE, error = %e, "UI dispatch rejected");
                false
            }
        }
    }

    /// Assign `value` without animation and without a task.
    fn apply_untracked(
        &self,
        widget: Arc<K::Widget>,
        value: Option<K::Value>,
        source: ApplySource,
    ) {
        let shared = self.clone();
        self.on_ui(move || {
            K::apply(&widget, value.as_ref());
            shared.emit_applied(widget.widget_id(), source);
        });
    }

    /// Assign `value` on behalf of the task `generation`.
    ///
    /// When `animate` is set the widget is cleared and made transparent in
    /// the same UI job, ready for [`Shared::finish_fade`]. Otherwise the
    /// registry entry is released from that job, so a cancel issued before it
    /// runs still suppresses the mutation. Returns whether the job was
    /// accepted by the dispatcher.
    fn apply_tracked(
        &self,
        widget: Arc<K::Widget>,
        value: Option<K::Value>,
        source: ApplySource,
        token: CancellationToken,
        generation: u64,
        animate: bool,
    ) -> bool {
        let widget_id = widget.widget_id();
        let shared = self.clone();
        let accepted = self.on_ui(move || {
            if token.is_cancelled() {
                return;
            }
            if animate {
                K::apply(&widget, None);
                widget.set_opacity(0.0);
            }
            K::apply(&widget, value.as_ref());
            shared.emit_applied(widget_id, source);
            if !animate {
                shared.registry.complete(widget_id, generation);
            }
        });
        if !accepted {
            self.registry.complete(widget_id, generation);
        }
        accepted
    }

    /// Raise opacity to 1, then release the registry entry of `generation`.
    async fn finish_fade(
        self,
        widget: Arc<K::Widget>,
        token: CancellationToken,
        generation: u64,
        fade: FadeTransition,
    ) {
        let widget_id = widget.widget_id();
        fade.run(widget, token, Arc::clone(&self.dispatcher)).await;

        let registry = Arc::clone(&self.registry);
        if !self.on_ui(move || {
            registry.complete(widget_id, generation);
        }) {
            self.registry.complete(widget_id, generation);
        }
    }

    /// Apply a fetched value (or the default after a failed read) from a
    /// worker task.
    async fn deliver(
        self,
        widget: Arc<K::Widget>,
        value: Option<K::Value>,
        source: ApplySource,
        token: CancellationToken,
        generation: u64,
        fade: FadeTransition,
    ) {
        let animate = fade.is_enabled() && value.is_some();
        let applied = self.apply_tracked(
            Arc::clone(&widget),
            value,
            source,
            token.clone(),
            generation,
            animate,
        );
        if applied && animate {
            self.finish_fade(widget, token, generation, fade).await;
        }
    }

    /// Body of the task spawned on a cache miss.
    async fn fetch_and_apply(
        self,
        widget: Arc<K::Widget>,
        item: Arc<dyn LibraryItem>,
        key: ItemId,
        size: WidgetSize,
        token: CancellationToken,
        generation: u64,
        fade: FadeTransition,
    ) {
        let widget_id = widget.widget_id();

        let outcome = core_async::select! {
            biased;
            _ = token.cancelled() => None,
            result = K::fetch(item.as_ref(), size) => Some(result),
        };

        match outcome {
            None => {
                trace!("Fetch abandoned after cancellation");
            }
            Some(Ok(Some(value))) => {
                self.cache.put(key, value.clone());
                trace!("Fetched value cached");
                self.deliver(widget, Some(value), ApplySource::Fetch, token, generation, fade)
                    .await;
            }
            Some(Ok(None)) => {
                debug!("Item has no value; leaving widget cleared");
                self.registry.complete(widget_id, generation);
            }
            Some(Err(e)) => {
                debug!(error = %e, "Read failed; applying default");
                self.emit(BinderEvent::ReadFailed {
                    item: key,
                    attribute: K::ATTRIBUTE,
                    message: e.to_string(),
                });
                let fallback = K::default_value(&self.defaults);
                self.deliver(widget, fallback, ApplySource::Default, token, generation, fade)
                    .await;
            }
        }
    }
}

/// Binds one attribute of library items to widgets.
///
/// See the module docs for the protocol. Use the [`TitleBinder`],
/// [`SubtitleBinder`] and [`ArtworkBinder`] aliases.
///
/// # Example
///
/// ```ignore
/// let cache = Arc::new(TextCache::new(10_000)?);
/// let binder = TitleBinder::new(cache, defaults.clone(), dispatcher.clone())
///     .with_events(bus.clone());
///
/// binder.bind(label.clone(), Some(song));
/// ```
pub struct DataBinder<K: BindKind> {
    shared: Shared<K>,
    settings: BinderSettings,
    runtime: Option<Handle>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: BindKind> DataBinder<K> {
    /// Create a binder.
    ///
    /// Captures the current Tokio runtime handle, if any, so binds issued
    /// later from a non-runtime UI thread can still spawn work.
    pub fn new(
        cache: Arc<BoundedCache<K::Value>>,
        defaults: Arc<DisplayableDefaults>,
        dispatcher: Arc<dyn UiDispatcher>,
    ) -> Self {
        Self {
            shared: Shared {
                cache,
                defaults,
                dispatcher,
                registry: Arc::new(TaskRegistry::new()),
                events: None,
            },
            settings: BinderSettings::default(),
            runtime: runtime::current_handle(),
            _kind: PhantomData,
        }
    }

    /// Publish binder events on `events`.
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.shared.events = Some(events);
        self
    }

    pub fn with_settings(mut self, settings: BinderSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Spawn work on `handle` instead of the runtime captured at construction.
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Bind `item` to `widget`, replacing whatever the widget showed.
    ///
    /// `None` shows the default without reading anything. Never fails: read
    /// errors are replaced by the default.
    pub fn bind(&self, widget: Arc<K::Widget>, item: Option<Arc<dyn LibraryItem>>) {
        let widget_id = widget.widget_id();
        let span = tracing::debug_span!(
            "bind",
            attribute = %K::ATTRIBUTE,
            widget = %widget_id,
            item = tracing::field::Empty,
        );
        let _entered = span.enter();

        if let Some(previous) = self.shared.registry.cancel(widget_id) {
            self.shared.emit_cancelled(&previous);
        }

        {
            let widget = Arc::clone(&widget);
            self.shared.on_ui(move || {
                K::apply(&widget, None);
                widget.set_opacity(1.0);
            });
        }

        let Some(item) = item else {
            debug!("No item; applying default");
            let fallback = K::default_value(&self.shared.defaults);
            self.apply_immediate(widget, fallback, ApplySource::Default);
            return;
        };

        let key = item.item_id();
        span.record("item", tracing::field::display(&key));

        if let Some(value) = self.shared.cache.get(&key) {
            debug!("Cache hit");
            self.apply_immediate(widget, Some(value), ApplySource::Cache);
            return;
        }

        let Some(handle) = self.runtime_handle() else {
            error!("No async runtime available; applying default instead of fetching");
            let fallback = K::default_value(&self.shared.defaults);
            self.shared
                .apply_untracked(widget, fallback, ApplySource::Default);
            return;
        };

        debug!("Cache miss; fetching");
        let size = widget.size().or_fallback(self.settings.fallback);
        let token = CancellationToken::new();
        let (generation, superseded) = self.shared.registry.register(widget_id, token.clone());
        if let Some(superseded) = superseded {
            self.shared.emit_cancelled(&superseded);
        }

        let fetch = self.shared.clone().fetch_and_apply(
            widget,
            item,
            key,
            size,
            token,
            generation,
            self.settings.fade(),
        );
        let join = task::spawn_on(&handle, fetch.instrument(span.clone()));
        self.shared.registry.attach(widget_id, generation, join);
    }

    /// Apply a value known during `bind` (cache hit or default).
    ///
    /// The value is assigned right away; only the opacity animation, if any,
    /// runs as a tracked task so a rebind can stop it.
    fn apply_immediate(
        &self,
        widget: Arc<K::Widget>,
        value: Option<K::Value>,
        source: ApplySource,
    ) {
        let fade = self.settings.fade();
        let handle = match self.runtime_handle() {
            Some(handle) if fade.is_enabled() && value.is_some() => handle,
            _ => {
                self.shared.apply_untracked(widget, value, source);
                return;
            }
        };

        let widget_id = widget.widget_id();
        let token = CancellationToken::new();
        let (generation, superseded) = self.shared.registry.register(widget_id, token.clone());
        if let Some(superseded) = superseded {
            self.shared.emit_cancelled(&superseded);
        }

        let applied = self.shared.apply_tracked(
            Arc::clone(&widget),
            value,
            source,
            token.clone(),
            generation,
            true,
        );
        if !applied {
            return;
        }

        let animation = self
            .shared
            .clone()
            .finish_fade(widget, token, generation, fade);
        let join = task::spawn_on(&handle, animation);
        self.shared.registry.attach(widget_id, generation, join);
    }

    fn runtime_handle(&self) -> Option<Handle> {
        self.runtime.clone().or_else(runtime::current_handle)
    }

    /// Cancel the in-flight task for `widget`, if any.
    ///
    /// Returns whether a task was cancelled. The widget keeps whatever it
    /// currently shows.
    pub fn cancel(&self, widget: &K::Widget) -> bool {
        match self.shared.registry.cancel(widget.widget_id()) {
            Some(cancelled) => {
                self.shared.emit_cancelled(&cancelled);
                true
            }
            None => false,
        }
    }

    /// Cancel every in-flight task. Returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let cancelled = self.shared.registry.cancel_all();
        for task in &cancelled {
            self.shared.emit_cancelled(task);
        }
        if !cancelled.is_empty() {
            debug!(
                attribute = %K::ATTRIBUTE,
                count = cancelled.len(),
                "Cancelled all in-flight tasks"
            );
        }
        cancelled.len()
    }

    pub fn cache(&self) -> &Arc<BoundedCache<K::Value>> {
        &self.shared.cache
    }

    pub fn defaults(&self) -> &Arc<DisplayableDefaults> {
        &self.shared.defaults
    }

    pub fn settings(&self) -> &BinderSettings {
        &self.settings
    }

    /// Number of widgets with an in-flight task.
    pub fn in_flight(&self) -> usize {
        self.shared.registry.len()
    }

    /// Whether `widget` has an in-flight task.
    pub fn is_bound(&self, widget: &K::Widget) -> bool {
        self.shared.registry.is_tracked(widget.widget_id())
    }

    pub fn fade_in_ms(&self) -> i64 {
        self.settings.fade_in_ms()
    }

    /// 0 or negative disables the fade for subsequent binds.
    pub fn set_fade_in_ms(&mut self, millis: i64) {
        self.settings.set_fade_in_ms(millis);
    }

    pub fn fallback_size(&self) -> WidgetSize {
        self.settings.fallback_size()
    }

    /// # Errors
    ///
    /// [`BinderError::InvalidArgument`] when either dimension is 0.
    pub fn set_fallback_size(&mut self, width: u32, height: u32) -> Result<()> {
        self.settings.set_fallback_size(width, height)
    }
}

impl<K: BindKind> std::fmt::Debug for DataBinder<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataBinder")
            .field("attribute", &K::ATTRIBUTE)
            .field("in_flight", &self.in_flight())
            .field("settings", &self.settings)
            .field("has_runtime", &self.runtime.is_some())
            .finish()
    }
}
