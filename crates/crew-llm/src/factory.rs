//! Service Factory
//!
//! Builds a capability from a `(provider, type)` pair.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cortex::CortexError;
use crate::generator::TextGenerator;
use crate::service::SharedService;

/// Provider names accepted for the `TextGeneration` type
pub const AVAILABLE_PROVIDERS: &[&str] =
    &["OpenAI", "Mistral", "Groq", "Infodev", "Aterinieto", "Ollama"];

/// Registration settings for one named service
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    pub provider: String,
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ServiceConfig {
    pub fn new(provider: impl Into<String>, service_type: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            service_type: service_type.into(),
            ..Default::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    TextGeneration,
}

impl ServiceType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "TextGeneration" => Some(ServiceType::TextGeneration),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Mistral,
    Groq,
    Infodev,
    Aterinieto,
    Ollama,
}

impl Provider {
    /// Case-insensitive lookup by provider name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "openai" => Some(Provider::OpenAI),
            "mistral" => Some(Provider::Mistral),
            "groq" => Some(Provider::Groq),
            "infodev" => Some(Provider::Infodev),
            "aterinieto" => Some(Provider::Aterinieto),
            "ollama" => Some(Provider::Ollama),
            _ => None,
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Provider::OpenAI => "https://api.openai.com/v1/chat/completions",
            Provider::Mistral => "https://api.mistral.ai/v1/chat/completions",
            Provider::Groq => "https://api.groq.com/openai/v1/chat/completions",
            Provider::Infodev => "https://zara.infodev.ovh/completions",
            Provider::Aterinieto => "https://api.aterinieto.com/v1/chat/completions",
            Provider::Ollama => "http://localhost:11434/api/chat",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAI => "gpt-4o-mini-2024-07-18",
            Provider::Mistral => "mistral-large-latest",
            Provider::Groq => "llama3-70b-8192",
            Provider::Infodev => "infodev-ai-2024-07-18",
            Provider::Aterinieto | Provider::Ollama => "llama3.1:latest",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::OpenAI => "OpenAI",
            Provider::Mistral => "Mistral",
            Provider::Groq => "Groq",
            Provider::Infodev => "Infodev",
            Provider::Aterinieto => "Aterinieto",
            Provider::Ollama => "Ollama",
        };
        f.write_str(name)
    }
}

/// Create a capability for the configured provider and type
pub fn create_service(config: &ServiceConfig) -> Result<SharedService, CortexError> {
    let unsupported = || CortexError::UnsupportedService {
        provider: config.provider.clone(),
        service_type: config.service_type.clone(),
    };

    let service_type = ServiceType::parse(&config.service_type).ok_or_else(unsupported)?;
    let provider = Provider::parse(&config.provider).ok_or_else(unsupported)?;

    match service_type {
        ServiceType::TextGeneration => {
            let endpoint = config
                .endpoint
                .as_deref()
                .filter(|e| !e.is_empty())
                .unwrap_or(provider.default_endpoint());
            let model = config
                .model
                .as_deref()
                .filter(|m| !m.is_empty())
                .unwrap_or(provider.default_model());
            let token = config.api_key.clone().unwrap_or_default();

            log::debug!("Creating {} text generator at {} ({})", provider, endpoint, model);
            Ok(Arc::new(TextGenerator::new(endpoint, token, model)))
        }
    }
}
