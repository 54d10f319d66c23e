//! Fallback values shown when an item cannot provide its own.

use bridge_traits::artwork::Artwork;

/// Default title, subtitle and artwork, each optional.
///
/// Applied when a bind has no item or when reading the item fails. Defaults
/// are immutable once built and shared between binders through an `Arc`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayableDefaults {
    title: Option<String>,
    subtitle: Option<String>,
    artwork: Option<Artwork>,
}

impl DisplayableDefaults {
    pub fn new(
        title: Option<String>,
        subtitle: Option<String>,
        artwork: Option<Artwork>,
    ) -> Self {
        Self {
            title,
            subtitle,
            artwork,
        }
    }

    /// Defaults with no values: failed reads leave the widget empty.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_artwork(mut self, artwork: Artwork) -> Self {
        self.artwork = Some(artwork);
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    pub fn artwork(&self) -> Option<&Artwork> {
        self.artwork.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let art = Artwork::solid(1, 1, [0, 0, 0, 255]);
        let defaults = DisplayableDefaults::empty()
            .with_title("Unknown title")
            .with_subtitle("Unknown artist")
            .with_artwork(art.clone());

        assert_eq!(defaults.title(), Some("Unknown title"));
        assert_eq!(defaults.subtitle(), Some("Unknown artist"));
        assert_eq!(defaults.artwork(), Some(&art));
    }

    #[test]
    fn test_empty() {
        let defaults = DisplayableDefaults::empty();
        assert!(defaults.title().is_none());
        assert!(defaults.subtitle().is_none());
        assert!(defaults.artwork().is_none());
        assert_eq!(defaults, DisplayableDefaults::new(None, None, None));
    }
}
