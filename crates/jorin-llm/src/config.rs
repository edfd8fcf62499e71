use std::time::Duration;

use crate::LlmError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-5-mini";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Which wire protocol the backend speaks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Protocol {
    /// Full transcript on every call (`/v1/chat/completions`).
    #[default]
    Completions,
    /// Server-side continuation via `previous_response_id` (`/v1/responses`).
    Responses,
}

impl Protocol {
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            Self::Completions => "/v1/chat/completions",
            Self::Responses => "/v1/responses",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "completions" | "chat" | "chat_completions" => Some(Self::Completions),
            "responses" => Some(Self::Responses),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BackendConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub protocol: Protocol,
    pub timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            protocol: Protocol::default(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl BackendConfig {
    /// Reads `OPENAI_BASE_URL`, `OPENAI_API_KEY`, `JORIN_MODEL` and `JORIN_PROTOCOL`.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LlmError> {
        let mut config = Self::default();
        if let Some(base_url) = lookup("OPENAI_BASE_URL").filter(|value| !value.trim().is_empty())
        {
            config.base_url = base_url;
        }
        config.base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if let Some(api_key) = lookup("OPENAI_API_KEY") {
            config.api_key = api_key;
        }
        if let Some(model) = lookup("JORIN_MODEL").filter(|value| !value.trim().is_empty()) {
            config.model = model;
        }
        if let Some(protocol) = lookup("JORIN_PROTOCOL").filter(|value| !value.trim().is_empty())
        {
            config.protocol = Protocol::parse(&protocol).ok_or_else(|| {
                LlmError::Configuration(format!("unknown protocol '{protocol}'"))
            })?;
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.protocol.endpoint_path()
        )
    }
}
