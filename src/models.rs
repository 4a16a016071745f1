use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A media file known to the catalog.
///
/// Identity is the absolute filesystem path and nothing else: two records
/// with the same path are the same media even if their tags differ. Tags on
/// an already-cataloged path are never refreshed by a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    pub path: String,
    pub title: String,
    pub artist: String,
    /// Length in whole seconds. 0 means unknown — video durations start out
    /// provisional and are corrected once the playback engine reports in.
    pub length: u32,
}

impl Media {
    pub fn new(
        path: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        length: u32,
    ) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            artist: artist.into(),
            length,
        }
    }

    /// Human-readable `hh:mm:ss` form of [`Media::length`].
    pub fn duration(&self) -> String {
        format_seconds(self.length)
    }
}

impl PartialEq for Media {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Media {}

impl Hash for Media {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

/// A named, ordered collection of catalog entries.
///
/// Identity is the (globally unique) name. Order is insertion order while the
/// playlist lives in memory; reload order is whatever the store returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    pub media: Vec<Media>,
}

impl Playlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            media: Vec::new(),
        }
    }
}

/// Converts seconds to `hh:mm:ss`.
pub fn format_seconds(total_seconds: u32) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
