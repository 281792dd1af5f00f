//! Request lifecycle: pipeline, background spawning and webhook delivery

use std::sync::Arc;

pub mod deliver;
pub mod orchestrator;
pub mod spawner;
pub mod summarize;

pub use deliver::{DeliveryOutcome, WebhookDispatcher};
pub use orchestrator::{LifecycleState, Orchestrator};
pub use spawner::BackgroundTasks;
pub use summarize::Pipeline;

use crate::ai::LlmClient;
use crate::core::config::AppConfig;
use crate::errors::ConfigError;
use crate::extract::PdfExtractor;

/// Wire the production collaborators from configuration.
///
/// # Errors
///
/// Returns an error if any HTTP client cannot be built.
pub fn build_orchestrator(config: &AppConfig) -> Result<Orchestrator, ConfigError> {
    let extractor = PdfExtractor::new(config.fetch_timeout, config.max_document_bytes)?;
    let summarizer = LlmClient::from_config(config)
        .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
    let dispatcher = WebhookDispatcher::new(config.webhook_timeout)?;

    Ok(Orchestrator::new(
        Pipeline::new(Arc::new(extractor), Arc::new(summarizer)),
        dispatcher,
        BackgroundTasks::new(config.max_concurrent_tasks),
    ))
}
