//! Response builders shared by the HTTP layer and the worker.

use serde_json::{Value, json};

use crate::core::models::{DeferredAck, RequestId, RpcResponse, RpcResult, TaskResult};
use crate::errors::{ProcessingError, RequestError};

/// Wraps a completed task.
#[must_use]
pub fn task_response(id: RequestId, task: TaskResult) -> RpcResponse {
    RpcResponse::success(id, RpcResult::Task(Box::new(task)))
}

/// Immediate reply for a deferred request.
#[must_use]
pub fn accepted_response(id: RequestId, task_id: &str) -> RpcResponse {
    RpcResponse::success(id, RpcResult::Accepted(DeferredAck::processing(task_id)))
}

#[must_use]
pub fn request_failure(id: RequestId, error: &RequestError) -> RpcResponse {
    RpcResponse::failure(id, error.code(), error.to_string())
}

#[must_use]
pub fn processing_failure(id: RequestId, error: &ProcessingError) -> RpcResponse {
    RpcResponse::failure(id, error.code(), error.to_string())
}

/// Body for `GET /`.
#[must_use]
pub fn greeting() -> Value {
    json!({
        "message": "welcome to the pdf summarizer agent",
        "version": env!("CARGO_PKG_VERSION"),
    })
}
