use crate::services::store::StoreError;
use thiserror::Error;

/// Every way a single upload can fail.
///
/// Callers see one failure status; the variants exist so logs and tests can
/// tell a bad request apart from a storage outage.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("malformed event: {0}")]
    MalformedEvent(#[from] serde_json::Error),
    #[error("event is missing required field `body`")]
    MissingBody,
    #[error("event is missing required field `headers`")]
    MissingHeaders,
    #[error("invalid base64 body: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("invalid filename `{filename}`: {reason}")]
    InvalidFilename {
        filename: String,
        reason: &'static str,
    },
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl UploadError {
    /// Short, stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            UploadError::MalformedEvent(_) => "malformed_event",
            UploadError::MissingBody => "missing_body",
            UploadError::MissingHeaders => "missing_headers",
            UploadError::InvalidBase64(_) => "invalid_base64",
            UploadError::InvalidFilename { .. } => "invalid_filename",
            UploadError::Storage(_) => "storage",
        }
    }

    /// Status reported to the trigger. All failures share one code.
    pub fn status_code(&self) -> u16 {
        500
    }
}
