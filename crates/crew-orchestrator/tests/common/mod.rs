//! Shared fixtures: an in-process capability that records how it was called.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use crew_core::{TaskOptions, TaskStore};
use crew_llm::{Cortex, Service, ServiceError};
use serde_json::{json, Value};

pub const SERVICE: &str = "gen";

/// Answers `done: <prompt>`, fails prompts containing "fail", and answers
/// planning prompts with the configured plan.
#[derive(Default)]
pub struct ScriptedService {
    delay: Duration,
    planning: Option<Result<String, String>>,
    started: Mutex<Vec<String>>,
    finished: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, millis: u64) -> Self {
        self.delay = Duration::from_millis(millis);
        self
    }

    pub fn with_plan(mut self, plan: impl Into<String>) -> Self {
        self.planning = Some(Ok(plan.into()));
        self
    }

    pub fn with_failing_plan(mut self, message: impl Into<String>) -> Self {
        self.planning = Some(Err(message.into()));
        self
    }

    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    pub fn finished(&self) -> Vec<String> {
        self.finished.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.started.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Service for ScriptedService {
    async fn run(&self, options: &TaskOptions) -> Result<Value, ServiceError> {
        let prompt = options
            .get("prompt")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        self.started.lock().unwrap().push(prompt.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.finished.lock().unwrap().push(prompt.clone());

        if prompt.contains("[BEG_PLANNING]") {
            return match &self.planning {
                Some(Ok(plan)) => Ok(json!({ "message": { "role": "assistant", "content": plan } })),
                Some(Err(message)) => Err(ServiceError::Other(message.clone())),
                None => Ok(json!({ "message": { "content": "" } })),
            };
        }

        if prompt.contains("fail") {
            return Err(ServiceError::Other(format!("could not complete: {}", prompt)));
        }

        Ok(json!({ "message": { "role": "assistant", "content": format!("done: {}", prompt) } }))
    }
}

pub fn setup(service: ScriptedService) -> (Arc<Cortex>, Arc<TaskStore>, Arc<ScriptedService>) {
    let service = Arc::new(service);
    let cortex = Arc::new(Cortex::new());
    cortex.register_shared(SERVICE, service.clone());
    (cortex, Arc::new(TaskStore::new()), service)
}
