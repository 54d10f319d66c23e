//! Stock defaults for the two regions of a playlist screen.

use bridge_traits::artwork::Artwork;
use core_binder::DisplayableDefaults;

/// Edge length of the placeholder covers.
const PLACEHOLDER_SIZE: u32 = 64;

/// Playlist header: shown until the playlist's own name, artists and cover load.
pub fn header_defaults() -> DisplayableDefaults {
    DisplayableDefaults::empty()
        .with_title("Playlist")
        .with_subtitle("Unknown artists")
        .with_artwork(Artwork::solid(
            PLACEHOLDER_SIZE,
            PLACEHOLDER_SIZE,
            [0x42, 0x42, 0x42, 0xff],
        ))
}

/// Song rows: shown when a song has no readable tags or cover.
pub fn body_defaults() -> DisplayableDefaults {
    DisplayableDefaults::empty()
        .with_title("Unknown title")
        .with_subtitle("Unknown artist")
        .with_artwork(Artwork::solid(
            PLACEHOLDER_SIZE,
            PLACEHOLDER_SIZE,
            [0x61, 0x61, 0x61, 0xff],
        ))
}
