use std::sync::Arc;

use async_trait::async_trait;
use crew_core::TaskOptions;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error! status: {status}")]
    Api { status: u16, body: String },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

/// An external capability invoked by name through the gateway.
#[async_trait]
pub trait Service: Send + Sync {
    /// Run the capability.
    ///
    /// `options` carries at least `prompt`. Failures must be returned as
    /// errors, never folded into a successful response.
    async fn run(&self, options: &TaskOptions) -> Result<Value>;
}

pub type SharedService = Arc<dyn Service>;
