use crate::model::photo::Photo;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A named collection of photos owned by a user.
///
/// `created_at` is the backend's string-encoded millisecond timestamp and is used
/// only for ordering album lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    pub owner: String,
    #[serde(default)]
    pub photos: PhotoPage,
}

/// One lazily loaded page of an album's photo collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoPage {
    #[serde(default)]
    pub items: Vec<Photo>,
    /// Opaque continuation token; `None` once the collection is exhausted.
    #[serde(rename = "nextToken", skip_serializing_if = "Option::is_none", default)]
    pub next_token: Option<String>,
}

/// Order two string-encoded creation timestamps.
///
/// Compares numerically when both sides are plain integers (the millisecond
/// encoding the backend emits), falling back to lexicographic comparison so
/// foreign encodings still sort deterministically.
pub fn created_at_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}
