//! Turns a raw RPC envelope into a [`ParsedRequest`].

use base64::{Engine as _, engine::general_purpose};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::core::models::{
    ALLOWED_METHODS, DeliveryConfig, DeliveryMode, DocumentLocator, FilePart, MessagePart,
    ParsedRequest, PushNotificationConfig, RequestId, RpcRequest,
};
use crate::errors::RequestError;
use crate::utils::links::{find_document_url, find_document_url_in_value};

/// A request that failed before it could be parsed, with the id to answer under.
#[derive(Debug)]
pub struct Rejection {
    pub id: RequestId,
    pub error: RequestError,
}

/// Decode a request body. The method is checked before `params` is
/// deserialized, so an unknown method is reported as such even when its params
/// have a different shape.
///
/// # Errors
///
/// Returns a [`Rejection`] carrying whatever id could be recovered.
pub fn decode_request(body: &[u8]) -> Result<RpcRequest, Rejection> {
    let raw: Value = serde_json::from_slice(body).map_err(|e| Rejection {
        id: RequestId::Null,
        error: RequestError::ParseError(e.to_string()),
    })?;

    let id = raw
        .get("id")
        .cloned()
        .and_then(|v| serde_json::from_value::<RequestId>(v).ok())
        .unwrap_or_default();
    let reject = |error: RequestError| Rejection {
        id: id.clone(),
        error,
    };

    if !raw.is_object() {
        return Err(reject(RequestError::InvalidRequest(
            "expected a JSON object".to_string(),
        )));
    }

    let method = raw
        .get("method")
        .and_then(Value::as_str)
        .ok_or_else(|| reject(RequestError::InvalidRequest("missing method".to_string())))?;
    check_method(method).map_err(reject)?;

    serde_json::from_value(raw).map_err(|e| reject(RequestError::InvalidParams(e.to_string())))
}

/// Validate and normalize a decoded request.
///
/// A missing `taskId` is generated and written back to the message, so
/// parsing the same request again yields the same task id.
///
/// # Errors
///
/// Returns the first validation failure; nothing downstream runs on error.
pub fn parse_request(request: &mut RpcRequest) -> Result<ParsedRequest, RequestError> {
    check_method(&request.method)?;

    let message = &mut request.params.message;
    if message
        .task_id
        .as_deref()
        .is_none_or(|t| t.trim().is_empty())
    {
        message.task_id = Some(format!("task-{}", Uuid::new_v4()));
    }
    let task_id = message.task_id.clone().unwrap_or_default();

    if message.parts.is_empty() {
        return Err(RequestError::NoMessageParts);
    }
    let locator = resolve_locator(&message.parts)?;
    let delivery = delivery_mode(request.params.configuration.as_ref());

    Ok(ParsedRequest {
        request_id: request.id.clone(),
        method: request.method.clone(),
        task_id,
        message_id: format!("msg-{}", Uuid::new_v4()),
        artifact_id: format!("artifact-summary-{}", Uuid::new_v4()),
        context_id: Uuid::new_v4().to_string(),
        locator,
        delivery,
    })
}

/// # Errors
///
/// Returns [`RequestError::UnknownMethod`] for methods outside the allow-list.
pub fn check_method(method: &str) -> Result<(), RequestError> {
    if ALLOWED_METHODS.contains(&method) {
        Ok(())
    } else {
        Err(RequestError::UnknownMethod(method.to_string()))
    }
}

/// Scan parts in order; the first part yielding a locator wins.
///
/// # Errors
///
/// Returns [`RequestError::NoDocumentLocator`] when no part yields one, or
/// [`RequestError::InvalidFileBytes`] when a file part carries bad base64.
pub fn resolve_locator(parts: &[MessagePart]) -> Result<DocumentLocator, RequestError> {
    for part in parts {
        let found = match part {
            MessagePart::Text(text) => find_document_url(&text.text).map(DocumentLocator::Url),
            MessagePart::Data(data) => {
                find_document_url_in_value(&data.data).map(DocumentLocator::Url)
            }
            MessagePart::File(file) => file_locator(file)?,
            MessagePart::Unsupported => None,
        };
        if let Some(locator) = found {
            return Ok(locator);
        }
    }
    Err(RequestError::NoDocumentLocator)
}

fn file_locator(file: &FilePart) -> Result<Option<DocumentLocator>, RequestError> {
    let nested = file.file.as_ref();
    let non_empty = |s: Option<&String>| {
        s.map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    if let Some(url) = non_empty(file.file_url.as_ref())
        .or_else(|| non_empty(nested.and_then(|f| f.uri.as_ref())))
    {
        return Ok(Some(DocumentLocator::Url(url)));
    }

    match non_empty(file.file_bytes.as_ref())
        .or_else(|| non_empty(nested.and_then(|f| f.bytes.as_ref())))
    {
        Some(encoded) => decode_file_bytes(&encoded).map(|b| Some(DocumentLocator::Bytes(b))),
        None => Ok(None),
    }
}

fn decode_file_bytes(encoded: &str) -> Result<Vec<u8>, RequestError> {
    // Accept `data:application/pdf;base64,...` as well as bare base64.
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => encoded,
    };
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| RequestError::InvalidFileBytes(e.to_string()))?;
    if bytes.is_empty() {
        return Err(RequestError::InvalidFileBytes("decoded to zero bytes".to_string()));
    }
    Ok(bytes)
}

/// Deferred delivery needs `blocking: false` and a complete push config;
/// anything else is served synchronously.
#[must_use]
pub fn delivery_mode(config: Option<&DeliveryConfig>) -> DeliveryMode {
    let Some(config) = config else {
        return DeliveryMode::Blocking;
    };
    if config.blocking {
        return DeliveryMode::Blocking;
    }
    match config
        .push_notification_config
        .as_ref()
        .and_then(PushNotificationConfig::target)
    {
        Some(target) => DeliveryMode::Deferred(target),
        None => {
            warn!(
                "Non-blocking delivery requested without a usable pushNotificationConfig; \
                 falling back to blocking"
            );
            DeliveryMode::Blocking
        }
    }
}
