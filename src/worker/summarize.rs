use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tracing::info;

use crate::ai::Summarizer;
use crate::core::models::{
    AgentMessage, Artifact, OutputPart, ParsedRequest, SUMMARY_ARTIFACT_NAME, TaskResult,
    TaskState, TaskStatus,
};
use crate::errors::ProcessingError;
use crate::extract::Extractor;

use super::orchestrator::LifecycleState;

/// Extraction followed by summarization. The summarizer only runs after the
/// extractor has returned text.
#[derive(Clone)]
pub struct Pipeline {
    extractor: Arc<dyn Extractor>,
    summarizer: Arc<dyn Summarizer>,
}

impl Pipeline {
    #[must_use]
    pub fn new(extractor: Arc<dyn Extractor>, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            extractor,
            summarizer,
        }
    }

    /// # Errors
    ///
    /// Returns the stage-tagged failure of whichever collaborator failed first.
    pub async fn run(&self, request: &ParsedRequest) -> Result<TaskResult, ProcessingError> {
        info!(state = ?LifecycleState::Extracting, locator = ?request.locator, "Extracting text");
        let text = self.extractor.extract(&request.locator).await?;

        info!(
            state = ?LifecycleState::Summarizing,
            "Summarizing text (length={})",
            text.len()
        );
        let summary = self.summarizer.summarize(&text).await?;

        info!(state = ?LifecycleState::Completed, "Summary ready for taskId={}", request.task_id);
        Ok(build_task_result(request, summary))
    }
}

/// Assemble the completed task for `summary`, reusing the request's identifiers.
#[must_use]
pub fn build_task_result(request: &ParsedRequest, summary: String) -> TaskResult {
    let parts = vec![OutputPart::Text { text: summary }];

    TaskResult {
        id: request.task_id.clone(),
        context_id: request.context_id.clone(),
        status: TaskStatus {
            state: TaskState::Completed,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            message: AgentMessage {
                message_id: request.message_id.clone(),
                role: "agent".to_string(),
                parts: parts.clone(),
                kind: "message".to_string(),
                task_id: request.task_id.clone(),
            },
        },
        artifacts: vec![Artifact {
            artifact_id: request.artifact_id.clone(),
            name: SUMMARY_ARTIFACT_NAME.to_string(),
            parts,
        }],
        kind: "task".to_string(),
    }
}
