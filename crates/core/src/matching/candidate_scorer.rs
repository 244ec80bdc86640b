//! Ranking of found-item candidates against a lost-item query.
//!
//! Every rule is additive and independent; a candidate that earns nothing is
//! not a match.

use crate::shared::constants::{
    CATEGORY_MATCH_SCORE, PROXIMITY_SCORE, PROXIMITY_THRESHOLD_DEGREES,
};

use super::item::{FoundCandidate, LostItemQuery, MatchResult};

/// Scores every candidate, drops the zero scores and sorts the rest by
/// descending score. Ties keep their input order.
pub fn score_candidates(lost: &LostItemQuery, candidates: &[FoundCandidate]) -> Vec<MatchResult> {
    let mut matches: Vec<MatchResult> = candidates
        .iter()
        .map(|candidate| MatchResult {
            found_item_id: candidate.id,
            score: score_candidate(lost, candidate),
        })
        .filter(|m| m.score > 0)
        .collect();
    // Vec::sort_by is stable.
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    log::debug!(
        "{} of {} candidates matched lost {:?}",
        matches.len(),
        candidates.len(),
        lost.category
    );
    matches
}

pub fn score_candidate(lost: &LostItemQuery, candidate: &FoundCandidate) -> u32 {
    let category = if same_category(&lost.category, &candidate.category) {
        CATEGORY_MATCH_SCORE
    } else {
        0
    };
    let near = lost.location().is_some_and(|origin| {
        degree_distance(origin, (candidate.lat, candidate.lng)) < PROXIMITY_THRESHOLD_DEGREES
    });
    let proximity = if near { PROXIMITY_SCORE } else { 0 };
    log::debug!(
        "candidate {}: category +{category}, proximity +{proximity}",
        candidate.id
    );
    category + proximity
}

fn same_category(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Straight-line distance in raw degrees. Not geodesic: it overstates
/// east-west distances away from the equator and ignores the antimeridian.
fn degree_distance((lat1, lng1): (f64, f64), (lat2, lng2): (f64, f64)) -> f64 {
    (lat1 - lat2).hypot(lng1 - lng2)
}
