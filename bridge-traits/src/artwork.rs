//! Decoded artwork shared between caches and widgets.

use std::fmt;
use std::sync::Arc;

use image::{imageops::FilterType, DynamicImage, Rgba, RgbaImage};

use crate::library::{LibraryReadError, ReadResult};

/// A decoded image ready for display.
///
/// Cloning is cheap: the pixel buffer is shared behind an `Arc`, so the same
/// artwork can sit in a cache and on several widgets at once.
#[derive(Clone)]
pub struct Artwork {
    image: Arc<DynamicImage>,
}

impl Artwork {
    /// Wrap an already decoded image.
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    /// Decode artwork from encoded bytes (JPEG, PNG, ...).
    pub fn from_encoded(data: &[u8]) -> ReadResult<Self> {
        image::load_from_memory(data)
            .map(Self::new)
            .map_err(|e| LibraryReadError::Decode(format!("Failed to decode artwork: {}", e)))
    }

    /// Single-color artwork, typically used for defaults and placeholders.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::new(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba(rgba),
        )))
    }

    /// Scale to fit within `width` x `height`, keeping the aspect ratio.
    ///
    /// Returns a clone of `self` when the artwork already fits.
    pub fn fit_within(&self, width: u32, height: u32) -> Self {
        if self.width() <= width && self.height() <= height {
            return self.clone();
        }
        Self::new(self.image.resize(width, height, FilterType::Triangle))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Size of the decoded pixel buffer in bytes.
    ///
    /// This is what artwork caches are weighted by.
    pub fn byte_count(&self) -> usize {
        self.image.as_bytes().len()
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Whether both handles share the same pixel buffer.
    pub fn ptr_eq(&self, other: &Artwork) -> bool {
        Arc::ptr_eq(&self.image, &other.image)
    }
}

impl PartialEq for Artwork {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.image.color() == other.image.color()
                && self.width() == other.width()
                && self.height() == other.height()
                && self.image.as_bytes() == other.image.as_bytes())
    }
}

impl fmt::Debug for Artwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artwork")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("bytes", &self.byte_count())
            .finish()
    }
}
