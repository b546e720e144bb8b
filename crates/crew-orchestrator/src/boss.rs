use std::sync::Arc;

use async_trait::async_trait;
use crew_core::{TaskResult, TaskSpec, TaskStore, TaskUpdate};
use crew_llm::Cortex;
use serde_json::Value;

use crate::agent::{Agent, ReactMode, Reactive};
use crate::coordinator::Coordinator;
use crate::planning::Plan;

/// An agent that turns each of its tasks into a plan for its crew.
pub struct Boss {
    agent: Agent,
    coordinator: Coordinator,
}

impl Boss {
    pub fn new(name: impl Into<String>, cortex: Arc<Cortex>, recall: Arc<TaskStore>) -> Self {
        Self::from_agent(Agent::new(name, cortex, recall))
    }

    pub fn from_agent(agent: Agent) -> Self {
        Self {
            agent,
            coordinator: Coordinator::new(),
        }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn name(&self) -> &str {
        self.agent.name()
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn add_agent_to_crew<R: Reactive + 'static>(&mut self, member: Arc<R>) {
        log::info!("{} added {} to the crew.", self.agent.name(), member.name());
        self.coordinator.add_member(member);
    }

    pub fn add_task(&self, specs: impl IntoIterator<Item = TaskSpec>) -> Vec<String> {
        self.agent.add_task(specs)
    }

    /// Enqueue `spec` on `target`.
    pub fn assign_task(&self, target: &Agent, spec: TaskSpec) -> Option<String> {
        self.coordinator.assign(self.agent.name(), target, spec)
    }

    /// Plan, delegate, and drive the crew for each pending task.
    ///
    /// Planning tasks run one at a time in list order and crew members are
    /// always driven in sequence mode; `mode` does not change either.
    pub async fn react(&self, mode: ReactMode) {
        let name = self.agent.name();
        let recall = self.agent.recall();

        let tasks = recall.get_pending_tasks(name);
        if tasks.is_empty() {
            log::warn!("No pending tasks found for {}.", name);
            return;
        }
        log::debug!("{} planning {} task(s); requested mode {}", name, tasks.len(), mode);

        for task in tasks {
            let mut options = task.options.clone();
            options.insert(
                "prompt".to_string(),
                Value::String(self.coordinator.planning_prompt()),
            );
            recall.update_task(name, &task.id, TaskUpdate::options(options));

            self.agent.execute_task(&task.id).await;

            let result = recall
                .get_task_by_id(name, &task.id)
                .and_then(|t| t.result);
            log::info!(
                "Results for task '{}' (ID: {}): {:?}",
                task.goal,
                task.id,
                result
            );

            let content = result
                .as_ref()
                .and_then(TaskResult::message_content)
                .unwrap_or_default();
            let plan = Plan::parse(content);

            let assigned = self
                .coordinator
                .delegate(name, &plan, task.service.as_deref());
            log::debug!("{} delegated {} sub-task(s) for '{}'", name, assigned, task.goal);

            self.coordinator.drive_crew().await;
        }
    }
}

#[async_trait]
impl Reactive for Boss {
    fn agent(&self) -> &Agent {
        &self.agent
    }

    async fn react(&self, mode: ReactMode) {
        Boss::react(self, mode).await;
    }
}
