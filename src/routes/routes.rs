//! Routes for the HTTP server mode.
//!
//! - `GET  /healthz` — liveness
//! - `GET  /readyz`  — readiness (probes the object store)
//! - `POST /invoke`  — run the function on a trigger event (JSON)
//! - `POST /upload`, `PUT /upload` — run the function on a raw body

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        upload_handlers::{invoke, upload},
    },
    services::upload_service::UploadService,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build the router. Handlers share the `UploadService` state.
pub fn routes() -> Router<UploadService> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/invoke", post(invoke))
        .route("/upload", post(upload).put(upload))
}
