//! What a binder binds: the per-attribute capability set.
//!
//! A [`BindKind`] tells the generic binder how to read one attribute from an
//! item, what its default is and how to show it on a widget. The three kinds
//! shipped here cover titles, subtitles and artwork.

use bridge_traits::{
    artwork::Artwork,
    library::{LibraryItem, ReadResult},
    widget::{ImageWidget, TextWidget, Widget, WidgetSize},
};
use core_runtime::events::Attribute;
use futures::future::BoxFuture;

use crate::defaults::DisplayableDefaults;

/// Capabilities a binder needs for one attribute.
///
/// Kinds are zero-sized markers; all functions are associated functions.
pub trait BindKind: Send + Sync + 'static {
    /// Value produced by a read and stored in the cache.
    type Value: Clone + Send + Sync + 'static;

    /// Widget type the value is shown on.
    type Widget: Widget + ?Sized + 'static;

    const ATTRIBUTE: Attribute;

    /// Read the value from `item`. `size` is the decode size for kinds that
    /// care about it.
    fn fetch<'a>(
        item: &'a dyn LibraryItem,
        size: WidgetSize,
    ) -> BoxFuture<'a, ReadResult<Option<Self::Value>>>;

    fn default_value(defaults: &DisplayableDefaults) -> Option<Self::Value>;

    /// Show `value` on `widget`, or show nothing when `None`.
    fn apply(widget: &Self::Widget, value: Option<&Self::Value>);
}

/// Primary text of an item.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleKind;

impl BindKind for TitleKind {
    type Value = String;
    type Widget = dyn TextWidget;

    const ATTRIBUTE: Attribute = Attribute::Title;

    fn fetch<'a>(
        item: &'a dyn LibraryItem,
        _size: WidgetSize,
    ) -> BoxFuture<'a, ReadResult<Option<String>>> {
        item.title()
    }

    fn default_value(defaults: &DisplayableDefaults) -> Option<String> {
        defaults.title().map(str::to_string)
    }

    fn apply(widget: &dyn TextWidget, value: Option<&String>) {
        widget.set_text(value.map(String::as_str));
    }
}

/// Secondary text of an item.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubtitleKind;

impl BindKind for SubtitleKind {
    type Value = String;
    type Widget = dyn TextWidget;

    const ATTRIBUTE: Attribute = Attribute::Subtitle;

    fn fetch<'a>(
        item: &'a dyn LibraryItem,
        _size: WidgetSize,
    ) -> BoxFuture<'a, ReadResult<Option<String>>> {
        item.subtitle()
    }

    fn default_value(defaults: &DisplayableDefaults) -> Option<String> {
        defaults.subtitle().map(str::to_string)
    }

    fn apply(widget: &dyn TextWidget, value: Option<&String>) {
        widget.set_text(value.map(String::as_str));
    }
}

/// Artwork of an item, decoded for the widget's size.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtworkKind;

impl BindKind for ArtworkKind {
    type Value = Artwork;
    type Widget = dyn ImageWidget;

    const ATTRIBUTE: Attribute = Attribute::Artwork;

    fn fetch<'a>(
        item: &'a dyn LibraryItem,
        size: WidgetSize,
    ) -> BoxFuture<'a, ReadResult<Option<Artwork>>> {
        item.artwork(size.width, size.height)
    }

    fn default_value(defaults: &DisplayableDefaults) -> Option<Artwork> {
        defaults.artwork().cloned()
    }

    fn apply(widget: &dyn ImageWidget, value: Option<&Artwork>) {
        widget.set_artwork(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_desktop::{ImageView, StaticLibraryItem, TextView};

    #[tokio::test]
    async fn test_kinds_read_their_attribute() {
        let art = Artwork::solid(3, 3, [9, 9, 9, 255]);
        let item = StaticLibraryItem::new("song")
            .with_title("Title")
            .with_subtitle("Artist")
            .with_artwork(art.clone());
        let size = WidgetSize::new(64, 32);

        assert_eq!(
            TitleKind::fetch(&item, size).await.unwrap(),
            Some("Title".to_string())
        );
        assert_eq!(
            SubtitleKind::fetch(&item, size).await.unwrap(),
            Some("Artist".to_string())
        );
        assert_eq!(ArtworkKind::fetch(&item, size).await.unwrap(), Some(art));
        assert_eq!(item.last_artwork_request(), Some((64, 32)));
    }

    #[test]
    fn test_defaults_per_kind() {
        let defaults = DisplayableDefaults::empty()
            .with_title("Unknown title")
            .with_subtitle("Unknown artist");

        assert_eq!(
            TitleKind::default_value(&defaults),
            Some("Unknown title".to_string())
        );
        assert_eq!(
            SubtitleKind::default_value(&defaults),
            Some("Unknown artist".to_string())
        );
        assert!(ArtworkKind::default_value(&defaults).is_none());
    }

    #[test]
    fn test_apply() {
        let label = TextView::new();
        TitleKind::apply(&label, Some(&"Hello".to_string()));
        assert_eq!(label.text(), Some("Hello".to_string()));
        SubtitleKind::apply(&label, None);
        assert_eq!(label.text(), None);

        let image = ImageView::new();
        let art = Artwork::solid(2, 2, [0, 0, 0, 255]);
        ArtworkKind::apply(&image, Some(&art));
        assert_eq!(image.artwork(), Some(art));

        assert_eq!(TitleKind::ATTRIBUTE, Attribute::Title);
        assert_eq!(ArtworkKind::ATTRIBUTE, Attribute::Artwork);
    }
}
