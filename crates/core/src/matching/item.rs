use serde::{Deserialize, Serialize};

/// Description of an item someone has lost.
///
/// Colour and description are carried for future signals; scoring ignores
/// them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LostItemQuery {
    pub category: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl LostItemQuery {
    /// `(lat, lng)` when both halves are present.
    pub fn location(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lng)
    }
}

/// A reported found item being ranked against a [`LostItemQuery`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoundCandidate {
    pub id: i64,
    pub category: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub found_item_id: i64,
    pub score: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchRequest {
    pub lost_item: LostItemQuery,
    pub candidates: Vec<FoundCandidate>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResponse {
    pub matches: Vec<MatchResult>,
}
