//! Next-track scoring.
//!
//! Every catalog track outside the recent history scores its net vote count
//! plus a similarity bonus against the party's liked tracks: +2 for a shared
//! category and +3 for a shared artist, per liked track. The best score wins.
//! A best score of exactly zero carries no signal, so the pick is uniform over
//! the non-recent tracks instead.

use std::collections::{HashMap, VecDeque};

use rand::{Rng, seq::SliceRandom};

use crate::{
    catalog::{Catalog, Track},
    common::types::TrackId,
    configs::{PartyConfig, TieBreak},
};

const CATEGORY_BONUS: i64 = 2;
const ARTIST_BONUS: i64 = 3;

#[derive(Debug, Clone, Copy)]
pub struct SelectionParams {
    pub tie_break: TieBreak,
    pub tie_break_probability: f64,
}

impl From<&PartyConfig> for SelectionParams {
    fn from(config: &PartyConfig) -> Self {
        Self {
            tie_break: config.tie_break,
            tie_break_probability: config.tie_break_probability,
        }
    }
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self::from(&PartyConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    /// Highest total score.
    Weighted,
    /// No signal; uniform among non-recent tracks.
    Random,
    /// Every track was recent; uniform over the whole catalog.
    Relaxed,
}

#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub track: &'a Track,
    pub score: i64,
    pub kind: SelectionKind,
}

/// Bonus a candidate earns from its resemblance to the liked tracks.
pub fn similarity_bonus(candidate: &Track, liked: &[&Track]) -> i64 {
    let category = candidate.category();
    liked
        .iter()
        .map(|l| {
            let mut bonus = 0;
            if l.category() == category {
                bonus += CATEGORY_BONUS;
            }
            if l.artist == candidate.artist {
                bonus += ARTIST_BONUS;
            }
            bonus
        })
        .sum()
}

/// Catalog tracks with a positive net score.
pub fn liked_tracks<'a>(catalog: &'a Catalog, scores: &HashMap<TrackId, i64>) -> Vec<&'a Track> {
    catalog
        .tracks()
        .iter()
        .filter(|t| scores.get(&t.track_id).is_some_and(|s| *s > 0))
        .collect()
}

/// Total score of one candidate.
pub fn score_track(track: &Track, scores: &HashMap<TrackId, i64>, liked: &[&Track]) -> i64 {
    scores.get(&track.track_id).copied().unwrap_or(0) + similarity_bonus(track, liked)
}

/// Picks the next track. Returns `None` only for an empty catalog.
pub fn choose<'a, R: Rng + ?Sized>(
    catalog: &'a Catalog,
    scores: &HashMap<TrackId, i64>,
    recent: &VecDeque<TrackId>,
    params: SelectionParams,
    rng: &mut R,
) -> Option<Selection<'a>> {
    let liked = liked_tracks(catalog, scores);
    let candidates: Vec<&Track> = catalog
        .tracks()
        .iter()
        .filter(|t| !recent.contains(&t.track_id))
        .collect();

    let mut best: Option<(&Track, i64)> = None;
    let mut ties: u32 = 0;
    for &track in &candidates {
        let score = score_track(track, scores, &liked);
        match best {
            Some((_, best_score)) if score < best_score => {}
            Some((_, best_score)) if score == best_score => {
                ties += 1;
                let replace = match params.tie_break {
                    TieBreak::Uniform => rng.gen_ratio(1, ties),
                    TieBreak::Legacy => rng.gen_bool(params.tie_break_probability),
                };
                if replace {
                    best = Some((track, score));
                }
            }
            _ => {
                best = Some((track, score));
                ties = 1;
            }
        }
    }

    if let Some((track, score)) = best {
        if score != 0 {
            return Some(Selection {
                track,
                score,
                kind: SelectionKind::Weighted,
            });
        }
    }

    if let Some(&track) = candidates.choose(rng) {
        return Some(Selection {
            track,
            score: 0,
            kind: SelectionKind::Random,
        });
    }

    catalog.tracks().choose(rng).map(|track| Selection {
        track,
        score: 0,
        kind: SelectionKind::Relaxed,
    })
}
