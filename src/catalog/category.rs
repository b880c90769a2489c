use crate::common::types::TrackId;

/// Coarse genre label derived from a track id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Pop,
    Chill,
    Energy,
    Party,
    Running,
    Relaxing,
    Other,
}

/// Id ranges (inclusive start, exclusive end) and the category they map to.
const RANGES: &[(TrackId, TrackId, Category)] = &[
    (1000, 2000, Category::Pop),
    (2000, 3000, Category::Chill),
    (3000, 4000, Category::Energy),
    (4000, 5000, Category::Party),
    (5000, 6000, Category::Running),
    (6000, 7000, Category::Relaxing),
];

impl Category {
    pub fn from_track_id(track_id: TrackId) -> Self {
        RANGES
            .iter()
            .find(|(start, end, _)| (*start..*end).contains(&track_id))
            .map(|(_, _, category)| *category)
            .unwrap_or(Category::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pop => "pop",
            Self::Chill => "chill",
            Self::Energy => "energy",
            Self::Party => "party",
            Self::Running => "running",
            Self::Relaxing => "relaxing",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
