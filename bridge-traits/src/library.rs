//! Library items: the data side of a bind.
//!
//! A [`LibraryItem`] is an opaque handle to one media entity (a song, an
//! album, a playlist header). Each of its three reads may fail for reasons
//! outside the caller's control, and each may legitimately have no value.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::artwork::Artwork;

/// Stable identity of a library item.
///
/// Caches are keyed by this value, so two handles with the same id are the
/// same item as far as the binders are concerned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Failure to read an attribute from a library item.
#[derive(Error, Debug)]
pub enum LibraryReadError {
    #[error("Item data unavailable: {0}")]
    Unavailable(String),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Failed to decode item data: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ReadResult<T> = std::result::Result<T, LibraryReadError>;

/// One media entity exposing fallible title, subtitle and artwork reads.
///
/// Reads may take arbitrary time (network, disk, decoding). Binders always
/// call them from a worker task, never from the UI thread. Implementations
/// that block should hop onto a blocking worker themselves.
///
/// `Ok(None)` means the item has no value for that attribute; `Err` means
/// the value could not be read and the caller should fall back to a default.
#[async_trait]
pub trait LibraryItem: Send + Sync {
    /// Identity used as the cache key.
    fn item_id(&self) -> ItemId;

    /// Primary text, e.g. the song title.
    async fn title(&self) -> ReadResult<Option<String>>;

    /// Secondary text, e.g. the artist.
    async fn subtitle(&self) -> ReadResult<Option<String>>;

    /// Artwork decoded for display at roughly `width` x `height` pixels.
    async fn artwork(&self, width: u32, height: u32) -> ReadResult<Option<Artwork>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;

    mock! {
        Item {}

        #[async_trait]
        impl LibraryItem for Item {
            fn item_id(&self) -> ItemId;
            async fn title(&self) -> ReadResult<Option<String>>;
            async fn subtitle(&self) -> ReadResult<Option<String>>;
            async fn artwork(&self, width: u32, height: u32) -> ReadResult<Option<Artwork>>;
        }
    }

    #[test]
    fn test_item_id_conversions() {
        let from_str = ItemId::from("song-1");
        let from_string = ItemId::from("song-1".to_string());

        assert_eq!(from_str, from_string);
        assert_eq!(from_str.as_str(), "song-1");
        assert_eq!(from_str.to_string(), "song-1");
    }

    #[test]
    fn test_read_error_display() {
        let err = LibraryReadError::Unavailable("offline".to_string());
        assert_eq!(err.to_string(), "Item data unavailable: offline");

        let io: LibraryReadError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(io, LibraryReadError::Io(_)));
    }

    #[tokio::test]
    async fn test_item_as_trait_object() {
        let mut item = MockItem::new();
        item.expect_item_id().return_const(ItemId::new("a"));
        item.expect_title()
            .returning(|| Ok(Some("Title".to_string())));
        item.expect_subtitle()
            .returning(|| Err(LibraryReadError::Unavailable("no auth".to_string())));

        let item: Box<dyn LibraryItem> = Box::new(item);
        assert_eq!(item.item_id(), ItemId::new("a"));
        assert_eq!(item.title().await.unwrap(), Some("Title".to_string()));
        assert!(item.subtitle().await.is_err());
    }
}
