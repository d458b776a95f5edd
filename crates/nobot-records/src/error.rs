//! Error types for record persistence.

use thiserror::Error;

/// Errors raised while loading or persisting the record snapshot.
///
/// Store operations themselves never fail; these surface only from the
/// [`Persistence`](crate::Persistence) collaborator and the schema loader.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("persistence i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot could not be encoded or was not valid JSON.
    #[error("persistence encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The persisted document had an unexpected top-level shape.
    #[error("unrecognized record schema: {0}")]
    Schema(String),
}

impl StoreError {
    /// Static error code for log and metric labels.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::Schema(_) => "schema",
        }
    }
}
