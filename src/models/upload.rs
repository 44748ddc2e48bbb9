//! A decoded upload, ready to be written.

use crate::{
    errors::UploadError,
    models::event::{FILENAME_HEADER, UploadEvent},
};
use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;

/// Key used when the client does not name the file.
pub const DEFAULT_FILENAME: &str = "uploaded_file";

/// Decoded payload plus the key it will be stored under.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadRequest {
    /// Storage key, taken from `X-Filename` or [`DEFAULT_FILENAME`].
    pub filename: String,

    /// Bytes to store.
    pub payload: Bytes,
}

impl UploadRequest {
    pub fn new(filename: Option<&str>, payload: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.unwrap_or(DEFAULT_FILENAME).to_string(),
            payload: payload.into(),
        }
    }
}

impl TryFrom<UploadEvent> for UploadRequest {
    type Error = UploadError;

    /// Body first, then decoding, then headers: a malformed body is
    /// reported even when headers are also missing.
    fn try_from(event: UploadEvent) -> Result<Self, Self::Error> {
        let body = event.body.as_deref().ok_or(UploadError::MissingBody)?;
        let payload = if event.is_base64_encoded.unwrap_or(false) {
            Bytes::from(decode_base64(body)?)
        } else {
            Bytes::copy_from_slice(body.as_bytes())
        };

        if event.headers.is_none() {
            return Err(UploadError::MissingHeaders);
        }
        Ok(Self::new(event.header(FILENAME_HEADER), payload))
    }
}

/// Standard-alphabet base64 with padding. ASCII whitespace (line breaks
/// from MIME-style wrapping) is skipped.
fn decode_base64(body: &str) -> Result<Vec<u8>, base64::DecodeError> {
    if body.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        general_purpose::STANDARD.decode(compact)
    } else {
        general_purpose::STANDARD.decode(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn event(body: Option<&str>, base64: Option<bool>, filename: Option<&str>) -> UploadEvent {
        let mut headers = HashMap::new();
        if let Some(name) = filename {
            headers.insert(FILENAME_HEADER.to_string(), name.to_string());
        }
        UploadEvent {
            body: body.map(str::to_string),
            is_base64_encoded: base64,
            headers: Some(headers),
        }
    }

    #[test]
    fn plain_body_is_taken_as_utf8() {
        let req = UploadRequest::try_from(event(Some("héllo"), None, Some("a.txt"))).unwrap();
        assert_eq!(req.filename, "a.txt");
        assert_eq!(&req.payload[..], "héllo".as_bytes());
    }

    #[test]
    fn base64_body_is_decoded_and_filename_defaults() {
        let req = UploadRequest::try_from(event(Some("aGVsbG8="), Some(true), None)).unwrap();
        assert_eq!(req.filename, DEFAULT_FILENAME);
        assert_eq!(&req.payload[..], b"hello");
    }

    #[test]
    fn base64_flag_false_keeps_text_verbatim() {
        let req = UploadRequest::try_from(event(Some("aGVsbG8="), Some(false), None)).unwrap();
        assert_eq!(&req.payload[..], b"aGVsbG8=");
    }

    #[test]
    fn wrapped_base64_is_accepted() {
        let req =
            UploadRequest::try_from(event(Some("aGVs\r\nbG8=\n"), Some(true), None)).unwrap();
        assert_eq!(&req.payload[..], b"hello");
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let err = UploadRequest::try_from(event(Some("not base64!"), Some(true), None)).unwrap_err();
        assert!(matches!(err, UploadError::InvalidBase64(_)));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn missing_body_is_rejected() {
        let err = UploadRequest::try_from(event(None, None, Some("a.txt"))).unwrap_err();
        assert!(matches!(err, UploadError::MissingBody));
    }

    #[test]
    fn missing_headers_is_rejected_after_decoding() {
        let mut evt = event(Some("%%%"), Some(true), None);
        evt.headers = None;
        let err = UploadRequest::try_from(evt.clone()).unwrap_err();
        assert!(matches!(err, UploadError::InvalidBase64(_)));

        evt.body = Some("hello".into());
        evt.is_base64_encoded = None;
        let err = UploadRequest::try_from(evt).unwrap_err();
        assert!(matches!(err, UploadError::MissingHeaders));
    }
}
