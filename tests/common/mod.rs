#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pdf_summarizer::ai::Summarizer;
use pdf_summarizer::core::models::DocumentLocator;
use pdf_summarizer::errors::{ExtractionError, SummarizationError};
use pdf_summarizer::extract::Extractor;
use pdf_summarizer::worker::{BackgroundTasks, Orchestrator, Pipeline, WebhookDispatcher};
use serde_json::{Value, json};

pub enum ExtractBehavior {
    Text(String),
    Fail,
    Panic,
}

pub struct StubExtractor {
    pub calls: AtomicUsize,
    pub delay: Duration,
    pub behavior: ExtractBehavior,
}

impl StubExtractor {
    pub fn returning(text: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            behavior: ExtractBehavior::Text(text.to_string()),
        })
    }

    pub fn delayed(text: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay,
            behavior: ExtractBehavior::Text(text.to_string()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            behavior: ExtractBehavior::Fail,
        })
    }

    pub fn panicking() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            behavior: ExtractBehavior::Panic,
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Extractor for StubExtractor {
    async fn extract(&self, _locator: &DocumentLocator) -> Result<String, ExtractionError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            ExtractBehavior::Text(text) => Ok(text.clone()),
            ExtractBehavior::Fail => Err(ExtractionError::Status(404)),
            ExtractBehavior::Panic => panic!("extractor blew up"),
        }
    }
}

/// Echoes its input, or fails when built with [`StubSummarizer::failing`].
pub struct StubSummarizer {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl StubSummarizer {
    pub fn echo() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: true,
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Summarizer for StubSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, SummarizationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SummarizationError::Upstream {
                status: 400,
                body: "bad request".to_string(),
            });
        }
        Ok(text.to_string())
    }
}

pub fn orchestrator(extractor: Arc<StubExtractor>, summarizer: Arc<StubSummarizer>) -> Orchestrator {
    Orchestrator::new(
        Pipeline::new(extractor, summarizer),
        WebhookDispatcher::new(Duration::from_secs(5)).unwrap(),
        BackgroundTasks::new(4),
    )
}

pub fn blocking_request(id: Value, parts: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "message/send",
        "params": {
            "message": {"kind": "message", "role": "user", "parts": parts}
        }
    })
}

pub fn url_parts() -> Value {
    json!([{"kind": "text", "text": "Please summarize https://example.com/paper.pdf."}])
}

pub fn deferred_request(id: Value, webhook_url: &str, token: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "message/send",
        "params": {
            "message": {"kind": "message", "role": "user", "parts": url_parts()},
            "configuration": {
                "blocking": false,
                "pushNotificationConfig": {"url": webhook_url, "token": token}
            }
        }
    })
}

/// Poll until `done` holds or the deadline passes.
pub async fn wait_until(mut done: impl FnMut() -> bool, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if done() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    done()
}
