use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::ai::LlmProvider;
use crate::errors::ConfigError;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_MAX_INPUT_TOKENS: usize = 900_000;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 20 * 1024 * 1024;
pub const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_CONCURRENT_TASKS: usize = 16;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub llm_provider: LlmProvider,
    pub llm_api_key: String,
    pub llm_org_id: Option<String>,
    pub llm_model: String,
    pub llm_base_url: String,
    pub llm_timeout: Duration,
    pub max_input_tokens: usize,
    pub fetch_timeout: Duration,
    pub max_document_bytes: usize,
    pub webhook_timeout: Duration,
    pub max_concurrent_tasks: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let llm_provider = match get("LLM_PROVIDER") {
            Some(raw) => raw.parse::<LlmProvider>().map_err(|reason| ConfigError::Invalid {
                name: "LLM_PROVIDER",
                value: raw.clone(),
                reason,
            })?,
            None => LlmProvider::Gemini,
        };

        let key_var = llm_provider.api_key_var();
        let llm_api_key = get(key_var).ok_or(ConfigError::Missing(key_var))?;

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            llm_provider,
            llm_api_key,
            llm_org_id: get("OPENAI_ORG_ID"),
            llm_model: get("LLM_MODEL")
                .unwrap_or_else(|| llm_provider.default_model().to_string()),
            llm_base_url: get("LLM_BASE_URL")
                .unwrap_or_else(|| llm_provider.default_base_url().to_string()),
            llm_timeout: Duration::from_secs(parse_or(
                get("LLM_TIMEOUT_SECS"),
                "LLM_TIMEOUT_SECS",
                DEFAULT_LLM_TIMEOUT_SECS,
            )?),
            max_input_tokens: parse_or(
                get("MAX_INPUT_TOKENS"),
                "MAX_INPUT_TOKENS",
                DEFAULT_MAX_INPUT_TOKENS,
            )?,
            fetch_timeout: Duration::from_secs(parse_or(
                get("FETCH_TIMEOUT_SECS"),
                "FETCH_TIMEOUT_SECS",
                DEFAULT_FETCH_TIMEOUT_SECS,
            )?),
            max_document_bytes: parse_or(
                get("MAX_DOCUMENT_BYTES"),
                "MAX_DOCUMENT_BYTES",
                DEFAULT_MAX_DOCUMENT_BYTES,
            )?,
            webhook_timeout: Duration::from_secs(parse_or(
                get("WEBHOOK_TIMEOUT_SECS"),
                "WEBHOOK_TIMEOUT_SECS",
                DEFAULT_WEBHOOK_TIMEOUT_SECS,
            )?),
            max_concurrent_tasks: parse_or(
                get("MAX_CONCURRENT_TASKS"),
                "MAX_CONCURRENT_TASKS",
                DEFAULT_MAX_CONCURRENT_TASKS,
            )?,
        })
    }
}

fn parse_or<T>(raw: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::Invalid {
                name,
                value,
                reason: e.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_to_gemini() {
        let config = AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "g-key")])).unwrap();
        assert_eq!(config.llm_provider, LlmProvider::Gemini);
        assert_eq!(config.llm_model, "gemini-2.5-pro");
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
        assert_eq!(config.max_concurrent_tasks, DEFAULT_MAX_CONCURRENT_TASKS);
    }

    #[test]
    fn missing_api_key_names_the_variable() {
        let err = AppConfig::from_lookup(lookup(&[("LLM_PROVIDER", "openai")])).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn rejects_unparseable_numbers() {
        let err = AppConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g-key"),
            ("WEBHOOK_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                name: "WEBHOOK_TIMEOUT_SECS",
                ..
            }
        ));
    }

    #[test]
    fn rejects_unknown_provider() {
        let err = AppConfig::from_lookup(lookup(&[("LLM_PROVIDER", "llama")])).unwrap_err();
        assert!(err.to_string().contains("LLM_PROVIDER"));
    }
}
