pub mod candidate_scorer;
pub mod item;
