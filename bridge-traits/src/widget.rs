//! Widget abstractions: the presentation side of a bind.
//!
//! The core only needs four capabilities from a host widget: a stable
//! identity, "set value", "set opacity" and "get current size". Everything
//! else (layout, drawing, animation APIs) stays in the host.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::artwork::Artwork;

/// Stable identity of one widget instance.
///
/// Task registries are keyed by this id. A host generates one id when the
/// widget is created and keeps it for the widget's whole life, including
/// when a list recycles the widget for a different row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WidgetId(pub Uuid);

impl WidgetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WidgetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Current laid-out size of a widget in pixels.
///
/// A dimension is zero while the widget has not been measured yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WidgetSize {
    pub width: u32,
    pub height: u32,
}

impl WidgetSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Replace each zero dimension with the matching fallback.
    pub fn or_fallback(self, fallback: WidgetSize) -> WidgetSize {
        WidgetSize {
            width: if self.width == 0 {
                fallback.width
            } else {
                self.width
            },
            height: if self.height == 0 {
                fallback.height
            } else {
                self.height
            },
        }
    }
}

/// Common capabilities of every bindable widget.
///
/// Mutating methods take `&self`; implementations use interior mutability.
/// The binder core only calls them from jobs running on the UI thread.
pub trait Widget: Send + Sync {
    fn widget_id(&self) -> WidgetId;

    /// Set opacity in `[0.0, 1.0]`.
    fn set_opacity(&self, opacity: f32);

    fn size(&self) -> WidgetSize;
}

/// A widget that displays a line of text.
pub trait TextWidget: Widget {
    /// Display `text`, or nothing when `None`.
    fn set_text(&self, text: Option<&str>);
}

/// A widget that displays artwork.
pub trait ImageWidget: Widget {
    /// Display `artwork`, or nothing when `None`.
    fn set_artwork(&self, artwork: Option<&Artwork>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widget_ids_are_unique() {
        let a = WidgetId::new();
        let b = WidgetId::new();
        assert_ne!(a, b);
        assert_eq!(a, a);
    }

    #[test]
    fn test_size_fallback_per_dimension() {
        let fallback = WidgetSize::new(300, 300);

        assert_eq!(
            WidgetSize::new(0, 0).or_fallback(fallback),
            WidgetSize::new(300, 300)
        );
        assert_eq!(
            WidgetSize::new(120, 0).or_fallback(fallback),
            WidgetSize::new(120, 300)
        );
        assert_eq!(
            WidgetSize::new(64, 48).or_fallback(fallback),
            WidgetSize::new(64, 48)
        );
    }
}
