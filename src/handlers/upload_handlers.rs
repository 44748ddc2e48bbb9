//! HTTP front doors onto [`UploadService`].
//!
//! - `POST /invoke` takes a trigger event and answers with the function's
//!   `{statusCode, body}` mapping, like a function platform's invoke API.
//! - `POST|PUT /upload` takes the file as the raw request body and answers
//!   with the function's status and JSON body directly.

use crate::{
    models::{event::FILENAME_HEADER, response::UploadResponse, upload::UploadRequest},
    services::upload_service::UploadService,
};
use axum::{
    Json,
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

/// `POST /invoke` — always 200; the function's own status is inside.
pub async fn invoke(State(service): State<UploadService>, body: Bytes) -> Json<UploadResponse> {
    Json(service.handle_json(&body).await)
}

/// `POST|PUT /upload` — store the raw body under `X-Filename`.
pub async fn upload(
    State(service): State<UploadService>,
    headers: HeaderMap,
    body: Bytes,
) -> UploadResponse {
    let filename = headers
        .get(FILENAME_HEADER)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());
    service
        .handle_request(UploadRequest::new(filename.as_deref(), body))
        .await
}

impl IntoResponse for UploadResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response
    }
}
