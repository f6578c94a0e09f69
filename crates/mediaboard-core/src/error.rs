//! Error types for scene operations.

use thiserror::Error;

/// Errors raised by scene operations.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Malformed media link: {0:?}")]
    MalformedLink(String),
    #[error("Malformed scene document: {0}")]
    MalformedDocument(#[source] serde_json::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// A single item's media failed to fetch or decode.
///
/// This is local to one item and never aborts the scene.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to load {link}: {reason}")]
pub struct MediaLoadError {
    pub link: String,
    pub reason: String,
}

impl MediaLoadError {
    pub fn new(link: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            reason: reason.into(),
        }
    }
}
