//! Transit-subsystem error type.

use thiserror::Error;

/// Errors produced by `evac-transit`.
///
/// These only appear at the fetch / parse boundary;
/// [`FeedData::load`](crate::FeedData::load) absorbs all of them.
#[derive(Debug, Error)]
pub enum TransitError {
    #[error("feed fetch failed: {0}")]
    Fetch(String),

    #[error("feed payload contains no JSON object")]
    NoJson,

    #[error("feed JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("polyline truncated at byte {0}")]
    TruncatedPolyline(usize),

    #[error("invalid polyline character {ch:?} at byte {offset}")]
    InvalidPolyline { ch: char, offset: usize },

    #[error("polyline coordinate out of range at byte {0}")]
    PolylineOutOfRange(usize),
}

pub type TransitResult<T> = Result<T, TransitError>;
