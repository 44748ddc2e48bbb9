//! Function-runtime mode: receive trigger events from the Lambda runtime API.

use crate::{models::response::UploadResponse, services::upload_service::UploadService};
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use serde_json::Value;

/// Poll the runtime API until the platform shuts the process down.
pub async fn serve(service: UploadService) -> Result<(), Error> {
    run(service_fn(|event: LambdaEvent<Value>| {
        function_handler(event, &service)
    }))
    .await
}

/// Shape problems in the payload become a failure response rather than a
/// runtime error, so the trigger always receives `{statusCode, body}`.
async fn function_handler(
    event: LambdaEvent<Value>,
    service: &UploadService,
) -> Result<UploadResponse, Error> {
    tracing::debug!(request_id = %event.context.request_id, "invocation received");
    Ok(service.handle_value(event.payload).await)
}
