//! Chat-completion text generator.
//!
//! One implementation serves every supported provider; providers differ only
//! by endpoint and default model.

use async_trait::async_trait;
use crew_core::TaskOptions;
use reqwest::Client;
use serde_json::{json, Value};

use crate::service::{Result, Service, ServiceError};

/// Option keys consumed while building the message list.
const RESERVED_OPTIONS: &[&str] = &["prompt", "model", "category", "context"];

pub struct TextGenerator {
    client: Client,
    endpoint: String,
    token: String,
    model: String,
}

impl TextGenerator {
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            token: token.into(),
            model: model.into(),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn build_request_body(&self, options: &TaskOptions) -> Value {
        let model = options
            .get("model")
            .and_then(Value::as_str)
            .unwrap_or(self.model.as_str());
        let category = options
            .get("category")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let prompt = options
            .get("prompt")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let mut messages = vec![json!({
            "role": "system",
            "content": format!("You are a helpful assistant about {}", category),
        })];

        if let Some(context) = options.get("context").and_then(Value::as_array) {
            for item in context {
                let earlier_prompt = item.get("prompt").and_then(Value::as_str);
                let earlier_answer = item
                    .pointer("/response/choices/0/text")
                    .and_then(Value::as_str);

                match (earlier_prompt, earlier_answer) {
                    (Some(p), Some(a)) => messages.push(json!({
                        "role": "user",
                        "content": format!("{}\n{}", p, a),
                    })),
                    _ => log::debug!("Skipping malformed context item: {}", item),
                }
            }
        }

        messages.push(json!({ "role": "user", "content": prompt }));

        let mut body = json!({
            "model": model,
            "stream": false,
            "messages": messages,
        });

        for (key, value) in options {
            if !RESERVED_OPTIONS.contains(&key.as_str()) {
                body[key.as_str()] = value.clone();
            }
        }

        body
    }
}

#[async_trait]
impl Service for TextGenerator {
    async fn run(&self, options: &TaskOptions) -> Result<Value> {
        let body = self.build_request_body(options);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                log::error!("Error during fetch operation: {}", e);
                ServiceError::Http(e)
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            log::error!("Error during fetch operation: HTTP {}", status);
            return Err(ServiceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let data = response.json::<Value>().await?;
        Ok(data)
    }
}
