use thiserror::Error;

use crate::metrics::MetricsError;
use crate::store::StoreError;

/// Every variant maps to the same opaque 500; the detail only reaches the log.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("request body is not valid JSON: {0}")]
    InvalidBody(#[from] serde_json::Error),
    #[error("fileContent is missing")]
    MissingContent,
    #[error("storage write failed: {0}")]
    Store(#[from] StoreError),
    #[error("metric emission failed: {0}")]
    Metrics(#[from] MetricsError),
}

impl IngestError {
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::InvalidBody(_) | IngestError::MissingContent => "input",
            IngestError::Store(_) | IngestError::Metrics(_) => "dependency",
        }
    }
}
