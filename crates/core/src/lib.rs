//! Redaction of faces and identity-document text in lost-and-found photos,
//! plus ranking of found-item candidates against a lost-item query.

pub mod blurring;
pub mod detection;
pub mod imaging;
pub mod matching;
pub mod pipeline;
pub mod shared;
