use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::{Instrument, error, field, info, info_span, warn};

use crate::api::helpers::{accepted_response, processing_failure, request_failure, task_response};
use crate::api::parsing::{Rejection, decode_request, parse_request};
use crate::core::models::{DeliveryMode, ParsedRequest, RpcRequest, RpcResponse};
use crate::errors::ProcessingError;

use super::deliver::WebhookDispatcher;
use super::spawner::{BackgroundTasks, panic_message};
use super::summarize::Pipeline;

/// Where a request is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Parsing,
    LocatorResolved,
    Extracting,
    Summarizing,
    Completed,
    Dispatched,
}

/// Drives one request from envelope to response, inline or via webhook.
#[derive(Clone)]
pub struct Orchestrator {
    pipeline: Pipeline,
    dispatcher: WebhookDispatcher,
    tasks: BackgroundTasks,
}

impl Orchestrator {
    #[must_use]
    pub fn new(pipeline: Pipeline, dispatcher: WebhookDispatcher, tasks: BackgroundTasks) -> Self {
        Self {
            pipeline,
            dispatcher,
            tasks,
        }
    }

    #[must_use]
    pub fn tasks(&self) -> &BackgroundTasks {
        &self.tasks
    }

    /// Entry point for a raw HTTP body.
    pub async fn handle_body(&self, body: &[u8]) -> RpcResponse {
        match decode_request(body) {
            Ok(request) => self.handle(request).await,
            Err(Rejection { id, error }) => {
                warn!("Rejected request id={}: {}", id, error);
                request_failure(id, &error)
            }
        }
    }

    /// Handle a decoded request. Always returns a response carrying the
    /// request's id; a panic anywhere below is reported as an internal error.
    pub async fn handle(&self, request: RpcRequest) -> RpcResponse {
        let id = request.id.clone();
        let span = info_span!(
            "a2a_request",
            request_id = %id,
            task_id = field::Empty
        );

        let outcome = AssertUnwindSafe(self.process(request).instrument(span.clone()))
            .catch_unwind()
            .await;

        match outcome {
            Ok(response) => response,
            Err(panic) => {
                let err = ProcessingError::Internal(panic_message(panic.as_ref()));
                span.in_scope(|| error!("Request handler panicked: {}", err));
                processing_failure(id, &err)
            }
        }
    }

    async fn process(&self, mut request: RpcRequest) -> RpcResponse {
        info!(state = ?LifecycleState::Parsing, method = %request.method, "Received request");

        let parsed = match parse_request(&mut request) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Invalid request: {}", e);
                return request_failure(request.id, &e);
            }
        };
        tracing::Span::current().record("task_id", parsed.task_id.as_str());
        info!(state = ?LifecycleState::LocatorResolved, "Document locator resolved");

        match parsed.delivery.clone() {
            DeliveryMode::Blocking => self.complete(&parsed).await,
            DeliveryMode::Deferred(target) => {
                let ack = accepted_response(parsed.request_id.clone(), &parsed.task_id);
                let this = self.clone();
                self.tasks.spawn(format!("summarize:{}", parsed.task_id), async move {
                    let payload = this.complete(&parsed).await;
                    let outcome = this.dispatcher.deliver(&target, &payload).await;
                    info!(state = ?LifecycleState::Dispatched, ?outcome, "Webhook dispatch finished");
                });
                info!(state = ?LifecycleState::Dispatched, "Accepted for deferred delivery");
                ack
            }
        }
    }

    /// Run the pipeline and render the outcome as a response. Panics inside
    /// a collaborator become internal errors so the deferred path still
    /// reports back to its webhook.
    async fn complete(&self, parsed: &ParsedRequest) -> RpcResponse {
        let result = match AssertUnwindSafe(self.pipeline.run(parsed)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(ProcessingError::Internal(panic_message(panic.as_ref()))),
        };

        match result {
            Ok(task) => task_response(parsed.request_id.clone(), task),
            Err(e) => {
                error!("Processing failed for taskId={}: {}", parsed.task_id, e);
                processing_failure(parsed.request_id.clone(), &e)
            }
        }
    }
}
