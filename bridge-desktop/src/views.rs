//! In-memory widgets.
//!
//! Headless hosts and tests bind into these instead of real toolkit widgets.
//! Every mutation is recorded so the sequence of states a widget went through
//! can be inspected afterwards.

use bridge_traits::{
    artwork::Artwork,
    widget::{ImageWidget, TextWidget, Widget, WidgetId, WidgetSize},
};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use std::thread::{self, ThreadId};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One recorded mutation of a view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewChange {
    Text(Option<String>),
    Artwork(Option<Artwork>),
    Opacity(f32),
}

#[derive(Debug)]
struct ViewState<V> {
    value: Option<V>,
    opacity: f32,
    size: WidgetSize,
    history: Vec<ViewChange>,
    threads: HashSet<ThreadId>,
}

impl<V> ViewState<V> {
    fn new(size: WidgetSize) -> Self {
        Self {
            value: None,
            opacity: 1.0,
            size,
            history: Vec::new(),
            threads: HashSet::new(),
        }
    }

    fn record(&mut self, change: ViewChange) {
        self.history.push(change);
        self.threads.insert(thread::current().id());
    }
}

macro_rules! impl_view_common {
    ($view:ty) => {
        impl $view {
            /// Create an unmeasured view (size 0 x 0).
            pub fn new() -> Self {
                Self::with_size(0, 0)
            }

            pub fn with_size(width: u32, height: u32) -> Self {
                Self {
                    id: WidgetId::new(),
                    state: Mutex::new(ViewState::new(WidgetSize::new(width, height))),
                }
            }

            /// Simulate a layout pass.
            pub fn resize(&self, width: u32, height: u32) {
                lock(&self.state).size = WidgetSize::new(width, height);
            }

            pub fn opacity(&self) -> f32 {
                lock(&self.state).opacity
            }

            /// Every mutation since creation, oldest first.
            pub fn history(&self) -> Vec<ViewChange> {
                lock(&self.state).history.clone()
            }

            /// Forget recorded mutations, keeping the current state.
            pub fn clear_history(&self) {
                let mut state = lock(&self.state);
                state.history.clear();
                state.threads.clear();
            }

            /// Threads that mutated this view.
            pub fn mutation_threads(&self) -> HashSet<ThreadId> {
                lock(&self.state).threads.clone()
            }
        }

        impl Default for $view {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Widget for $view {
            fn widget_id(&self) -> WidgetId {
                self.id
            }

            fn set_opacity(&self, opacity: f32) {
                let mut state = lock(&self.state);
                state.opacity = opacity.clamp(0.0, 1.0);
                let recorded = state.opacity;
                state.record(ViewChange::Opacity(recorded));
            }

            fn size(&self) -> WidgetSize {
                lock(&self.state).size
            }
        }
    };
}

/// A text slot held in memory.
#[derive(Debug)]
pub struct TextView {
    id: WidgetId,
    state: Mutex<ViewState<String>>,
}

impl_view_common!(TextView);

impl TextView {
    pub fn text(&self) -> Option<String> {
        lock(&self.state).value.clone()
    }

    /// Text values set so far, ignoring opacity changes.
    pub fn text_history(&self) -> Vec<Option<String>> {
        lock(&self.state)
            .history
            .iter()
            .filter_map(|change| match change {
                ViewChange::Text(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl TextWidget for TextView {
    fn set_text(&self, text: Option<&str>) {
        let mut state = lock(&self.state);
        state.value = text.map(str::to_string);
        state.record(ViewChange::Text(text.map(str::to_string)));
    }
}

/// An image slot held in memory.
#[derive(Debug)]
pub struct ImageView {
    id: WidgetId,
    state: Mutex<ViewState<Artwork>>,
}

impl_view_common!(ImageView);

impl ImageView {
    pub fn artwork(&self) -> Option<Artwork> {
        lock(&self.state).value.clone()
    }

    /// Artwork values set so far, ignoring opacity changes.
    pub fn artwork_history(&self) -> Vec<Option<Artwork>> {
        lock(&self.state)
            .history
            .iter()
            .filter_map(|change| match change {
                ViewChange::Artwork(artwork) => Some(artwork.clone()),
                _ => None,
            })
            .collect()
    }
}

impl ImageWidget for ImageView {
    fn set_artwork(&self, artwork: Option<&Artwork>) {
        let mut state = lock(&self.state);
        state.value = artwork.cloned();
        state.record(ViewChange::Artwork(artwork.cloned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_view_records_changes() {
        let view = TextView::with_size(100, 20);
        view.set_text(None);
        view.set_opacity(0.0);
        view.set_text(Some("Song"));
        view.set_opacity(1.0);

        assert_eq!(view.text(), Some("Song".to_string()));
        assert_eq!(view.opacity(), 1.0);
        assert_eq!(
            view.history(),
            vec![
                ViewChange::Text(None),
                ViewChange::Opacity(0.0),
                ViewChange::Text(Some("Song".to_string())),
                ViewChange::Opacity(1.0),
            ]
        );
        assert_eq!(view.text_history(), vec![None, Some("Song".to_string())]);
        assert_eq!(view.mutation_threads().len(), 1);
    }

    #[test]
    fn test_image_view_records_artwork() {
        let view = ImageView::new();
        assert_eq!(view.size(), WidgetSize::new(0, 0));

        let art = Artwork::solid(4, 4, [1, 2, 3, 255]);
        view.set_artwork(Some(&art));
        view.set_artwork(None);

        assert!(view.artwork().is_none());
        assert_eq!(view.artwork_history(), vec![Some(art), None]);
    }

    #[test]
    fn test_opacity_is_clamped() {
        let view = TextView::new();
        view.set_opacity(1.5);
        assert_eq!(view.opacity(), 1.0);
        view.set_opacity(-0.2);
        assert_eq!(view.opacity(), 0.0);
    }

    #[test]
    fn test_resize_and_clear_history() {
        let view = ImageView::new();
        view.resize(640, 480);
        view.set_opacity(0.5);
        view.clear_history();

        assert_eq!(view.size(), WidgetSize::new(640, 480));
        assert!(view.history().is_empty());
        assert_eq!(view.opacity(), 0.5);
    }

    #[test]
    fn test_views_have_distinct_ids() {
        assert_ne!(TextView::new().widget_id(), TextView::new().widget_id());
    }
}
