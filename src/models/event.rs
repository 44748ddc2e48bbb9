//! The trigger event delivered per invocation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Header that names the stored object.
pub const FILENAME_HEADER: &str = "X-Filename";

/// An HTTP-triggered invocation as delivered by the function platform.
///
/// Only the fields the upload path reads are modeled; anything else in the
/// payload (request context, path parameters, ...) is ignored.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadEvent {
    /// Request body, raw text or base64 depending on `is_base64_encoded`.
    pub body: Option<String>,

    /// Set by the trigger when `body` carries base64 of a binary payload.
    /// Absent and `null` both mean plain text.
    pub is_base64_encoded: Option<bool>,

    /// Request headers as sent by the client.
    pub headers: Option<HashMap<String, String>>,
}

impl UploadEvent {
    /// Look up a header by its exact name. Header keys in trigger events are
    /// case-sensitive; a differently-cased variant is logged and ignored.
    pub fn header(&self, name: &str) -> Option<&str> {
        let headers = self.headers.as_ref()?;
        if let Some(value) = headers.get(name) {
            return Some(value);
        }
        if let Some(variant) = headers
            .keys()
            .find(|key| key.eq_ignore_ascii_case(name))
        {
            tracing::warn!("ignoring header `{}`; only `{}` is read", variant, name);
        }
        None
    }
}
