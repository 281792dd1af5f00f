/// PDF summarizer agent: an A2A-style JSON-RPC service that turns a PDF into
/// an LLM-written summary.
///
/// A request names a document by URL or inline base64 bytes. The agent
/// extracts the text, asks the configured LLM for a summary and returns it as
/// a completed task, either inline or later via a caller-supplied webhook.
///
/// # Architecture
///
/// - `api`: axum routes, envelope decoding and response builders
/// - `worker`: the lifecycle orchestrator, background spawner and webhook dispatcher
/// - `extract`: PDF download and text extraction
/// - `ai`: prompt construction and the Gemini/OpenAI client
///
/// # Example
///
/// ```no_run
/// use pdf_summarizer::core::config::AppConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     pdf_summarizer::setup_logging();
///
///     let config = AppConfig::from_env()?;
///     let app = pdf_summarizer::api::build_app(&config)?;
///
///     let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
///     axum::serve(listener, app).await?;
///     Ok(())
/// }
/// ```
pub mod ai;
pub mod api;
pub mod core;
pub mod errors;
pub mod extract;
pub mod utils;
pub mod worker;

/// Configure structured JSON logging.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`. Calling this more
/// than once is harmless; later calls leave the first subscriber in place.
///
/// # Example
///
/// ```
/// pdf_summarizer::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
