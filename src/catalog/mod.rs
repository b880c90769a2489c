//! The immutable track list, loaded once at startup.

use std::{collections::HashSet, path::Path};

use serde::{Deserialize, Serialize};

use crate::common::types::TrackId;

pub mod category;

pub use category::Category;

/// A playable track. Durations are in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub track_id: TrackId,
    pub title: String,
    pub artist: String,
    pub duration: u64,
}

impl Track {
    pub fn category(&self) -> Category {
        Category::from_track_id(self.track_id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("catalog contains no tracks")]
    Empty,
    #[error("duplicate track id {0} in catalog")]
    DuplicateId(TrackId),
    #[error("track {0} has zero duration")]
    ZeroDuration(TrackId),
}

/// Non-empty list of tracks with unique ids and non-zero durations, in file order.
#[derive(Debug, Clone)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    pub fn new(tracks: Vec<Track>) -> Result<Self, CatalogError> {
        if tracks.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::with_capacity(tracks.len());
        for track in &tracks {
            if !seen.insert(track.track_id) {
                return Err(CatalogError::DuplicateId(track.track_id));
            }
            if track.duration == 0 {
                return Err(CatalogError::ZeroDuration(track.track_id));
            }
        }
        Ok(Self { tracks })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: display.clone(),
            source,
        })?;
        let tracks: Vec<Track> = serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
            path: display,
            source,
        })?;
        Self::new(tracks)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, track_id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.track_id == track_id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
