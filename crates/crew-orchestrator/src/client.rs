use std::sync::Arc;

use async_trait::async_trait;
use crew_core::{Task, TaskSpec, TaskStore};
use crew_llm::Cortex;

use crate::agent::{Agent, ReactMode, Reactive};
use crate::boss::Boss;

/// An agent that asks a boss for work and watches other agents' progress.
pub struct Client {
    agent: Agent,
}

impl Client {
    pub fn new(name: impl Into<String>, cortex: Arc<Cortex>, recall: Arc<TaskStore>) -> Self {
        Self {
            agent: Agent::new(name, cortex, recall),
        }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Ask `boss` to enqueue `spec` on this client's own list.
    pub fn request_task(&self, boss: &Boss, spec: TaskSpec) -> Option<String> {
        log::info!("Client {} requested task: {}", self.agent.name(), spec.goal);
        boss.assign_task(&self.agent, spec)
    }

    pub fn check_task_progress(&self, other: &Agent) -> Vec<Task> {
        log::info!(
            "Client {} checking progress of agent: {}",
            self.agent.name(),
            other.name()
        );
        other.recall_tasks()
    }
}

#[async_trait]
impl Reactive for Client {
    fn agent(&self) -> &Agent {
        &self.agent
    }

    async fn react(&self, mode: ReactMode) {
        self.agent.react(mode).await;
    }
}
