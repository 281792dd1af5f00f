//! PDF text extraction from raw bytes or remote URLs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{info, warn};

use crate::core::models::DocumentLocator;
use crate::errors::ExtractionError;
use crate::utils::links::is_http_url;
use crate::utils::mime::looks_like_pdf;

/// Resolves a document locator to plain text.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, locator: &DocumentLocator) -> Result<String, ExtractionError>;
}

pub struct PdfExtractor {
    http: Client,
    max_document_bytes: usize,
}

impl PdfExtractor {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(fetch_timeout: Duration, max_document_bytes: usize) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(fetch_timeout).build()?;
        Ok(Self {
            http,
            max_document_bytes,
        })
    }

    /// # Errors
    ///
    /// Fails on network errors, non-200 responses, non-PDF content, oversized
    /// bodies, and PDFs without readable text.
    pub async fn extract_from_url(&self, url: &str) -> Result<String, ExtractionError> {
        if !is_http_url(url) {
            return Err(ExtractionError::InvalidSource(url.to_string()));
        }

        info!("Downloading PDF from {}", url);
        let mut response = self.http.get(url).send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            warn!("PDF download failed: status={} url={}", status, url);
            return Err(ExtractionError::Status(status.as_u16()));
        }

        if let Some(len) = response.content_length() {
            self.check_size(usize::try_from(len).unwrap_or(usize::MAX))?;
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // Chunked responses carry no length, so the cap is enforced while reading.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            self.check_size(body.len() + chunk.len())?;
            body.extend_from_slice(&chunk);
        }

        if !looks_like_pdf(content_type.as_deref(), url, &body) {
            return Err(ExtractionError::NotPdf(
                content_type.unwrap_or_else(|| "<none>".to_string()),
            ));
        }

        self.extract_from_bytes(body).await
    }

    /// # Errors
    ///
    /// Fails when the bytes are not a parseable PDF or contain no text.
    pub async fn extract_from_bytes(&self, bytes: Vec<u8>) -> Result<String, ExtractionError> {
        self.check_size(bytes.len())?;
        tokio::task::spawn_blocking(move || extract_text_from_pdf_bytes(&bytes))
            .await
            .map_err(|e| ExtractionError::Unreadable(format!("extraction task failed: {e}")))?
    }

    fn check_size(&self, size: usize) -> Result<(), ExtractionError> {
        if size > self.max_document_bytes {
            return Err(ExtractionError::TooLarge {
                size,
                limit: self.max_document_bytes,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Extractor for PdfExtractor {
    async fn extract(&self, locator: &DocumentLocator) -> Result<String, ExtractionError> {
        match locator {
            DocumentLocator::Url(url) => self.extract_from_url(url).await,
            DocumentLocator::Bytes(bytes) => {
                info!("Extracting text from uploaded bytes ({} bytes)", bytes.len());
                self.extract_from_bytes(bytes.clone()).await
            }
        }
    }
}

/// Synchronous extraction; run it off the async worker threads.
///
/// # Errors
///
/// Returns [`ExtractionError::Unreadable`] for malformed PDFs and
/// [`ExtractionError::Empty`] when no text survives trimming.
pub fn extract_text_from_pdf_bytes(bytes: &[u8]) -> Result<String, ExtractionError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractionError::Unreadable(e.to_string()))?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ExtractionError::Empty);
    }
    Ok(trimmed.to_string())
}
