use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use crew_core::{StartOutcome, Task, TaskResult, TaskSpec, TaskState, TaskStore, TaskUpdate};
use crew_llm::Cortex;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// How an agent drains its pending tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactMode {
    /// One task at a time, in list order.
    #[default]
    Sequence,
    /// Every pending task at once; returns when all are terminal.
    Parallel,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown react mode '{0}', expected 'sequence' or 'parallel'")]
pub struct ParseReactModeError(String);

impl FromStr for ReactMode {
    type Err = ParseReactModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequence" | "sequential" => Ok(ReactMode::Sequence),
            "parallel" => Ok(ReactMode::Parallel),
            other => Err(ParseReactModeError(other.to_string())),
        }
    }
}

impl fmt::Display for ReactMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReactMode::Sequence => f.write_str("sequence"),
            ReactMode::Parallel => f.write_str("parallel"),
        }
    }
}

/// Anything that owns a task queue and can drain it.
#[async_trait]
pub trait Reactive: Send + Sync {
    fn agent(&self) -> &Agent;

    fn name(&self) -> &str {
        self.agent().name()
    }

    async fn react(&self, mode: ReactMode);
}

/// Executes its own tasks against the service gateway.
///
/// Task state lives in the shared [`TaskStore`], under this agent's name.
pub struct Agent {
    name: String,
    cortex: Arc<Cortex>,
    recall: Arc<TaskStore>,
    tools: Vec<String>,
}

impl Agent {
    pub fn new(name: impl Into<String>, cortex: Arc<Cortex>, recall: Arc<TaskStore>) -> Self {
        Self {
            name: name.into(),
            cortex,
            recall,
            tools: Vec::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<String>) -> Self {
        self.tools = tools;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tools(&self) -> &[String] {
        &self.tools
    }

    pub fn cortex(&self) -> &Arc<Cortex> {
        &self.cortex
    }

    pub fn recall(&self) -> &Arc<TaskStore> {
        &self.recall
    }

    /// Enqueue tasks, folding each spec's prompt into its options.
    ///
    /// The `prompt` key is always written (JSON null when absent).
    pub fn add_task(&self, specs: impl IntoIterator<Item = TaskSpec>) -> Vec<String> {
        specs
            .into_iter()
            .map(|mut spec| {
                let prompt = spec.prompt.take().map(Value::String).unwrap_or(Value::Null);
                spec.options.insert("prompt".to_string(), prompt);

                let goal = spec.goal.clone();
                let task_id = self.recall.add_task(&self.name, spec);
                log::info!("{} added task: {} (ID: {})", self.name, goal, task_id);
                task_id
            })
            .collect()
    }

    /// Run one of this agent's pending tasks to a terminal state.
    ///
    /// Unknown or already-started tasks are reported and left untouched.
    /// Capability failures end the task as failed and are not returned.
    pub async fn execute_task(&self, task_id: &str) {
        self.execute_owned_by(&self.name, task_id).await;
    }

    async fn execute_owned_by(&self, owner: &str, task_id: &str) {
        let task = match self.recall.try_start(owner, task_id) {
            StartOutcome::Started(task) => task,
            StartOutcome::NotFound => {
                log::warn!("Task with ID {} not found for {}.", task_id, owner);
                return;
            }
            StartOutcome::NotPending(task) => {
                log::warn!(
                    "Task \"{}\" (ID: {}) is already in progress or completed.",
                    task.goal,
                    task_id
                );
                return;
            }
        };

        log::info!(
            "{} is executing task: {} (state: in_progress, ID: {})",
            self.name,
            task.goal,
            task_id
        );

        match task.dispatch_target() {
            Some((service, options)) => match self.cortex.think(service, options).await {
                Ok(response) => {
                    log::info!("{} completed task: {} (ID: {})", self.name, task.goal, task_id);
                    self.recall.update_task(
                        owner,
                        task_id,
                        TaskUpdate::state(TaskState::Completed)
                            .with_result(TaskResult::Response(response.clone())),
                    );
                    if let Some(on_success) = &task.on_success {
                        on_success(&response);
                    }
                }
                Err(error) => {
                    log::error!(
                        "{} encountered an error with task: {} (ID: {}): {}",
                        self.name,
                        task.goal,
                        task_id,
                        error
                    );
                    let mut description = error.to_string();
                    if description.is_empty() {
                        description = format!("{:?}", error);
                    }
                    self.recall.update_task(
                        owner,
                        task_id,
                        TaskUpdate::state(TaskState::Failed)
                            .with_result(TaskResult::Failure(description.clone())),
                    );
                    if let Some(on_error) = &task.on_error {
                        on_error(&description);
                    }
                }
            },
            None => {
                log::warn!(
                    "{} is processing a non-dispatchable task: {} (ID: {})",
                    self.name,
                    task.goal,
                    task_id
                );
                self.recall.update_task(
                    owner,
                    task_id,
                    TaskUpdate::state(TaskState::Completed).with_result(TaskResult::Placeholder),
                );
            }
        }

        log::info!("{} finished task: {} (ID: {})", self.name, task.goal, task_id);
    }

    /// Execute every task pending at call time.
    pub async fn react(&self, mode: ReactMode) {
        let tasks = self.recall.get_pending_tasks(&self.name);
        log::debug!("{} reacting to {} pending task(s) in {} mode", self.name, tasks.len(), mode);

        match mode {
            ReactMode::Sequence => {
                for (index, task) in tasks.iter().enumerate() {
                    log::debug!("{} executing tasks: {}/{}", self.name, index + 1, tasks.len());
                    self.execute_task(&task.id).await;
                }
            }
            ReactMode::Parallel => {
                join_all(tasks.iter().map(|task| self.execute_task(&task.id))).await;
            }
        }
    }

    pub fn recall_tasks(&self) -> Vec<Task> {
        let tasks = self.recall.get_tasks(&self.name);
        log::info!("Recall for {}:", self.name);
        for task in &tasks {
            log::info!("  {} | {} | {}", task.id, task.goal, task.state);
        }
        tasks
    }

    pub fn recall_task_by_id(&self, task_id: &str) -> Option<Task> {
        let task = self.recall.get_task_by_id(&self.name, task_id);
        log::info!("Recall for {} with task ID '{}': {:?}", self.name, task_id, task);
        task
    }

    pub fn interact_with(&self, other: &Agent, message: &str) {
        log::info!("{} to {}: {}", self.name, other.name, message);
    }

    /// Enqueue `spec` on `other`'s list.
    pub fn request_help(&self, other: &Agent, spec: TaskSpec) -> Option<String> {
        let goal = spec.goal.clone();
        let task_id = other.add_task([spec]).pop();
        log::info!(
            "{} requested help from {} for task: {}",
            self.name,
            other.name,
            goal
        );
        task_id
    }

    /// Execute `other`'s task `task_id` through this agent's gateway.
    pub async fn give_help(&self, other: &Agent, task_id: &str) {
        self.execute_owned_by(&other.name, task_id).await;
        log::info!("{} helped {} with task ID: {}", self.name, other.name, task_id);
    }
}

#[async_trait]
impl Reactive for Agent {
    fn agent(&self) -> &Agent {
        self
    }

    async fn react(&self, mode: ReactMode) {
        Agent::react(self, mode).await;
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("tools", &self.tools)
            .finish()
    }
}
