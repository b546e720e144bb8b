//! Service gateway: logical service names mapped to capabilities.

use std::sync::Arc;

use crew_core::TaskOptions;
use dashmap::DashMap;
use serde_json::Value;
use thiserror::Error;

use crate::factory::{create_service, ServiceConfig};
use crate::service::{ServiceError, SharedService};

#[derive(Debug, Error)]
pub enum CortexError {
    #[error("Service {0} not registered")]
    NotRegistered(String),

    #[error("Unsupported service: provider '{provider}' with type '{service_type}'")]
    UnsupportedService {
        provider: String,
        service_type: String,
    },

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Registry of named capabilities.
///
/// Registration is expected during setup; lookups afterwards are read-only.
#[derive(Default)]
pub struct Cortex {
    services: DashMap<String, SharedService>,
}

impl Cortex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a capability from `config` and bind it to `name`.
    ///
    /// Re-registering a name replaces the previous capability.
    pub fn register_service(&self, name: &str, config: &ServiceConfig) -> Result<(), CortexError> {
        let service = create_service(config)?;
        self.register_shared(name, service);
        log::info!(
            "Registered service {} ({} / {})",
            name,
            config.provider,
            config.service_type
        );
        Ok(())
    }

    pub fn register_shared(&self, name: &str, service: SharedService) {
        self.services.insert(name.to_string(), service);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    pub fn service_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Dispatch a request to the named capability.
    pub async fn think(&self, name: &str, options: &TaskOptions) -> Result<Value, CortexError> {
        // Clone the handle so no map guard is held across the await.
        let service = self
            .services
            .get(name)
            .map(|entry| Arc::clone(entry.value()));

        let Some(service) = service else {
            let error = CortexError::NotRegistered(name.to_string());
            log::error!("{}", error);
            return Err(error);
        };

        service.run(options).await.map_err(|error| {
            log::error!("Error occurred while running service {}: {}", name, error);
            CortexError::Service(error)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{Result as ServiceResult, Service};
    use async_trait::async_trait;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl Service for Echo {
        async fn run(&self, options: &TaskOptions) -> ServiceResult<Value> {
            Ok(json!({ "message": { "content": options.get("prompt").cloned() } }))
        }
    }

    struct Broken;

    #[async_trait]
    impl Service for Broken {
        async fn run(&self, _options: &TaskOptions) -> ServiceResult<Value> {
            Err(ServiceError::Other("provider unavailable".to_string()))
        }
    }

    fn prompt(text: &str) -> TaskOptions {
        let mut options = TaskOptions::new();
        options.insert("prompt".to_string(), json!(text));
        options
    }

    #[tokio::test]
    async fn think_dispatches_to_registered_service() {
        let cortex = Cortex::new();
        cortex.register_shared("echo", Arc::new(Echo));

        let result = cortex.think("echo", &prompt("hi")).await.unwrap();
        assert_eq!(result["message"]["content"], "hi");
    }

    #[tokio::test]
    async fn think_fails_for_unknown_service() {
        let cortex = Cortex::new();
        let error = cortex.think("missing", &prompt("hi")).await.unwrap_err();

        assert!(matches!(error, CortexError::NotRegistered(ref name) if name == "missing"));
        assert_eq!(error.to_string(), "Service missing not registered");
    }

    #[tokio::test]
    async fn think_propagates_capability_failure_unchanged() {
        let cortex = Cortex::new();
        cortex.register_shared("broken", Arc::new(Broken));

        let error = cortex.think("broken", &prompt("hi")).await.unwrap_err();
        assert!(matches!(error, CortexError::Service(ServiceError::Other(_))));
        assert_eq!(error.to_string(), "provider unavailable");
    }

    #[test]
    fn register_service_rejects_unsupported_pairs() {
        let cortex = Cortex::new();
        let result = cortex.register_service("gen", &ServiceConfig::new("Nope", "TextGeneration"));

        assert!(matches!(result, Err(CortexError::UnsupportedService { .. })));
        assert!(!cortex.contains("gen"));
    }

    #[test]
    fn register_service_binds_name() {
        let cortex = Cortex::new();
        cortex
            .register_service("TextGeneration", &ServiceConfig::new("Ollama", "TextGeneration"))
            .unwrap();
        cortex.register_shared("echo", Arc::new(Echo));

        assert!(cortex.contains("TextGeneration"));
        assert_eq!(cortex.service_names(), vec!["TextGeneration", "echo"]);
    }
}
