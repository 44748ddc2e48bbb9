//! The result mapping returned to the trigger.

use crate::errors::UploadError;
use serde::{Deserialize, Serialize};

pub const SUCCESS_MESSAGE: &str = "Upload successful";
pub const FAILURE_MESSAGE: &str = "Error uploading file";

/// `{statusCode, body}` as understood by HTTP-triggered function platforms.
/// `body` is itself a JSON document, serialized to a string.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub status_code: u16,
    pub body: String,
}

/// JSON carried inside [`UploadResponse::body`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ResponseBody {
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResponse {
    pub fn success(filename: &str) -> Self {
        Self::with_body(
            200,
            ResponseBody {
                message: SUCCESS_MESSAGE.into(),
                filename: Some(filename.to_string()),
                error: None,
            },
        )
    }

    pub fn failure(err: &UploadError) -> Self {
        Self::with_body(
            err.status_code(),
            ResponseBody {
                message: FAILURE_MESSAGE.into(),
                filename: None,
                error: Some(err.to_string()),
            },
        )
    }

    fn with_body(status_code: u16, body: ResponseBody) -> Self {
        // A struct of plain strings always serializes.
        let body = serde_json::to_string(&body).unwrap_or_default();
        Self { status_code, body }
    }
}

#[cfg(test)]
impl UploadResponse {
    /// Parse the inner JSON body back out.
    pub fn parsed_body(&self) -> serde_json::Result<ResponseBody> {
        serde_json::from_str(&self.body)
    }
}
