//! Library items backed by tagged audio files on disk.

use async_trait::async_trait;
use bridge_traits::{
    artwork::Artwork,
    library::{ItemId, LibraryItem, LibraryReadError, ReadResult},
};
use core_async::task::spawn_blocking;
use lofty::config::ParseOptions;
use lofty::file::TaggedFileExt;
use lofty::picture::PictureType;
use lofty::probe::Probe;
use lofty::tag::{Accessor, Tag};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A [`LibraryItem`] that reads title, artist and cover art from an audio
/// file's tags.
///
/// The item id is the file path. Every read re-parses the file on a blocking
/// worker; binders cache the results.
#[derive(Debug, Clone)]
pub struct AudioFileItem {
    path: PathBuf,
}

impl AudioFileItem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn with_tag<T, F>(&self, read: F) -> ReadResult<Option<T>>
    where
        T: Send + 'static,
        F: FnOnce(&Tag) -> ReadResult<Option<T>> + Send + 'static,
    {
        let path = self.path.clone();
        spawn_blocking(move || {
            let tagged_file = Probe::open(&path)
                .map_err(|e| {
                    LibraryReadError::NotFound(format!("{}: {}", path.display(), e))
                })?
                .options(ParseOptions::new())
                .guess_file_type()?
                .read()
                .map_err(|e| {
                    LibraryReadError::Decode(format!(
                        "Failed to parse {}: {}",
                        path.display(),
                        e
                    ))
                })?;

            let tag = tagged_file
                .primary_tag()
                .or_else(|| tagged_file.first_tag());

            match tag {
                Some(tag) => read(tag),
                None => {
                    debug!("No tags in {}", path.display());
                    Ok(None)
                }
            }
        })
        .await
        .map_err(|e| LibraryReadError::Unavailable(format!("Tag reader task failed: {}", e)))?
    }

    fn normalize(text: &str) -> Option<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

#[async_trait]
impl LibraryItem for AudioFileItem {
    fn item_id(&self) -> ItemId {
        ItemId::new(self.path.to_string_lossy().into_owned())
    }

    async fn title(&self) -> ReadResult<Option<String>> {
        self.with_tag(|tag| Ok(tag.title().and_then(|t| Self::normalize(&t))))
            .await
    }

    async fn subtitle(&self) -> ReadResult<Option<String>> {
        self.with_tag(|tag| Ok(tag.artist().and_then(|a| Self::normalize(&a))))
            .await
    }

    async fn artwork(&self, width: u32, height: u32) -> ReadResult<Option<Artwork>> {
        self.with_tag(move |tag| {
            let pictures = tag.pictures();
            let picture = pictures
                .iter()
                .find(|pic| pic.pic_type() == PictureType::CoverFront)
                .or_else(|| pictures.first());

            match picture {
                Some(picture) if !picture.data().is_empty() => {
                    let artwork = Artwork::from_encoded(picture.data())?;
                    Ok(Some(artwork.fit_within(width, height)))
                }
                _ => Ok(None),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_is_path() {
        let item = AudioFileItem::new("/music/album/01.flac");
        assert_eq!(item.item_id(), ItemId::new("/music/album/01.flac"));
        assert_eq!(item.path(), Path::new("/music/album/01.flac"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            AudioFileItem::normalize("  So What "),
            Some("So What".to_string())
        );
        assert_eq!(AudioFileItem::normalize("   "), None);
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let item = AudioFileItem::new(std::env::temp_dir().join("mixtape-no-such-file.mp3"));
        assert!(item.title().await.is_err());
        assert!(item.artwork(300, 300).await.is_err());
    }

    #[tokio::test]
    async fn test_non_audio_file_is_error() {
        let path = std::env::temp_dir().join("mixtape-not-audio.txt");
        tokio::fs::write(&path, b"plain text, no tags here")
            .await
            .unwrap();

        let item = AudioFileItem::new(&path);
        assert!(item.subtitle().await.is_err());

        let _ = tokio::fs::remove_file(&path).await;
    }
}
