use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Methods accepted by the summarize endpoint.
pub const ALLOWED_METHODS: [&str; 2] = ["summarize/pdf", "message/send"];

pub const PROCESSING_STATUS: &str = "processing";
pub const PROCESSING_MESSAGE: &str = "PDF summarization in progress";
pub const SUMMARY_ARTIFACT_NAME: &str = "summary";

fn default_jsonrpc() -> String {
    JSONRPC_VERSION.to_string()
}

fn default_message_kind() -> String {
    "message".to_string()
}

fn default_user_role() -> String {
    "user".to_string()
}

const fn default_blocking() -> bool {
    true
}

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn message_kind_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_message_kind))
}

fn user_role_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_user_role))
}

fn blocking_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_else(default_blocking))
}

/// JSON-RPC id: echoed back verbatim on every response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
    #[default]
    Null,
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{n}"),
            RequestId::String(s) => f.write_str(s),
            RequestId::Null => f.write_str("null"),
        }
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        RequestId::String(value.to_string())
    }
}

// ============================================================================
// Inbound envelope
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: RequestId,
    pub method: String,
    pub params: RpcParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcParams {
    pub message: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<DeliveryConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default = "default_message_kind", deserialize_with = "message_kind_or_default")]
    pub kind: String,
    #[serde(default = "default_user_role", deserialize_with = "user_role_or_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parts: Vec<MessagePart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
}

/// A message part, discriminated by its `kind` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MessagePart {
    Text(TextPart),
    File(FilePart),
    Data(DataPart),
    /// Any other kind; never yields a document locator.
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextPart {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePart {
    #[serde(default, alias = "file_url", skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    /// Base64-encoded document content.
    #[serde(default, alias = "file_bytes", skip_serializing_if = "Option::is_none")]
    pub file_bytes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileContent>,
}

/// The nested A2A `file` object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPart {
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryConfig {
    #[serde(default = "default_blocking", deserialize_with = "blocking_or_default")]
    pub blocking: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_notification_config: Option<PushNotificationConfig>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            blocking: true,
            push_notification_config: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushNotificationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl PushNotificationConfig {
    /// Returns the webhook target only when both `url` and `token` are non-empty.
    #[must_use]
    pub fn target(&self) -> Option<WebhookTarget> {
        let url = self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        let token = self.token.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
        Some(WebhookTarget {
            url: url.to_string(),
            token: token.to_string(),
        })
    }
}

// ============================================================================
// Canonical internal request
// ============================================================================

#[derive(Clone, PartialEq, Eq)]
pub enum DocumentLocator {
    Url(String),
    Bytes(Vec<u8>),
}

impl fmt::Debug for DocumentLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentLocator::Url(url) => f.debug_tuple("Url").field(url).finish(),
            DocumentLocator::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct WebhookTarget {
    pub url: String,
    pub token: String,
}

impl fmt::Debug for WebhookTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookTarget")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryMode {
    Blocking,
    Deferred(WebhookTarget),
}

/// A validated request with every identifier resolved.
#[derive(Debug, Clone)]
pub struct ParsedRequest {
    pub request_id: RequestId,
    pub method: String,
    pub task_id: String,
    pub message_id: String,
    pub artifact_id: String,
    pub context_id: String,
    pub locator: DocumentLocator,
    pub delivery: DeliveryMode,
}

// ============================================================================
// Results
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OutputPart {
    Text { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMessage {
    pub message_id: String,
    pub role: String,
    pub parts: Vec<OutputPart>,
    pub kind: String,
    pub task_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub state: TaskState,
    pub timestamp: String,
    pub message: AgentMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub artifact_id: String,
    pub name: String,
    pub parts: Vec<OutputPart>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    pub id: String,
    pub context_id: String,
    pub status: TaskStatus,
    pub artifacts: Vec<Artifact>,
    pub kind: String,
}

/// Immediate reply for deferred requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeferredAck {
    pub task_id: String,
    pub status: String,
    pub message: String,
}

impl DeferredAck {
    #[must_use]
    pub fn processing(task_id: &str) -> Self {
        Self {
            task_id: task_id.to_string(),
            status: PROCESSING_STATUS.to_string(),
            message: PROCESSING_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcResult {
    Task(Box<TaskResult>),
    Accepted(DeferredAck),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

/// Outbound envelope. Construct it with [`RpcResponse::success`] or
/// [`RpcResponse::failure`] so exactly one of `result` and `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcResponse {
    jsonrpc: String,
    id: RequestId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<RpcResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

impl RpcResponse {
    #[must_use]
    pub fn success(id: RequestId, result: RpcResult) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    #[must_use]
    pub fn failure(id: RequestId, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> &RequestId {
        &self.id
    }

    #[must_use]
    pub fn result(&self) -> Option<&RpcResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&RpcError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn task(&self) -> Option<&TaskResult> {
        match self.result.as_ref()? {
            RpcResult::Task(task) => Some(task),
            RpcResult::Accepted(_) => None,
        }
    }
}
