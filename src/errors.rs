use thiserror::Error;

/// JSON-RPC error codes used in error responses.
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Validation failures raised while turning a raw envelope into a request.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Unknown method {0}")]
    UnknownMethod(String),

    #[error("No message parts provided")]
    NoMessageParts,

    #[error("No file URL or bytes provided")]
    NoDocumentLocator,

    #[error("Invalid base64 file bytes: {0}")]
    InvalidFileBytes(String),
}

impl RequestError {
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::ParseError(_) => codes::PARSE_ERROR,
            Self::InvalidRequest(_) => codes::INVALID_REQUEST,
            Self::UnknownMethod(_) => codes::METHOD_NOT_FOUND,
            Self::InvalidParams(_)
            | Self::NoMessageParts
            | Self::NoDocumentLocator
            | Self::InvalidFileBytes(_) => codes::INVALID_PARAMS,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Invalid source {0}: must be bytes or an http(s) URL")]
    InvalidSource(String),

    #[error("Network error while downloading PDF: {0}")]
    Network(String),

    #[error("Failed to fetch PDF (status {0})")]
    Status(u16),

    #[error("URL is not a PDF (Content-Type: {0})")]
    NotPdf(String),

    #[error("PDF is {size} bytes, exceeding the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("Failed to extract text from PDF: {0}")]
    Unreadable(String),

    #[error("No readable text found in PDF.")]
    Empty,
}

impl From<reqwest::Error> for ExtractionError {
    fn from(error: reqwest::Error) -> Self {
        ExtractionError::Network(error.to_string())
    }
}

#[derive(Debug, Error)]
pub enum SummarizationError {
    #[error("Failed to reach LLM API: {0}")]
    Http(String),

    #[error("LLM API error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("No text in LLM response")]
    EmptyResponse,

    #[error("Invalid request header: {0}")]
    InvalidHeader(String),
}

impl SummarizationError {
    /// Rate limits, server-side failures and network errors are worth another attempt.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Upstream { status, .. } => *status == 429 || *status >= 500,
            Self::EmptyResponse | Self::InvalidHeader(_) => false,
        }
    }
}

impl From<reqwest::Error> for SummarizationError {
    fn from(error: reqwest::Error) -> Self {
        SummarizationError::Http(error.to_string())
    }
}

/// Failures after a request was accepted. The display prefix names the stage.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Failed to extract text: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Failed to summarize text: {0}")]
    Summarization(#[from] SummarizationError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ProcessingError {
    #[must_use]
    pub const fn code(&self) -> i32 {
        codes::INTERNAL_ERROR
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}: environment variable not set")]
    Missing(&'static str),

    #[error("{name}: invalid value {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

impl From<reqwest::Error> for ConfigError {
    fn from(error: reqwest::Error) -> Self {
        ConfigError::HttpClient(error.to_string())
    }
}
