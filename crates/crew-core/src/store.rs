//! TaskStore implementation
//!
//! Owns every task record, partitioned by the owning agent's name. Lists keep
//! insertion order.

use std::collections::HashMap;

use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::task::{Task, TaskOptions, TaskResult, TaskSpec, TaskState};

/// Field updates merged into an existing task.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub state: Option<TaskState>,
    pub result: Option<TaskResult>,
    pub options: Option<TaskOptions>,
}

impl TaskUpdate {
    pub fn state(state: TaskState) -> Self {
        Self {
            state: Some(state),
            ..Default::default()
        }
    }

    pub fn options(options: TaskOptions) -> Self {
        Self {
            options: Some(options),
            ..Default::default()
        }
    }

    pub fn with_result(mut self, result: TaskResult) -> Self {
        self.result = Some(result);
        self
    }

    fn apply(self, task: &mut Task) {
        if let Some(state) = self.state {
            task.state = state;
        }
        if let Some(result) = self.result {
            task.result = Some(result);
        }
        if let Some(options) = self.options {
            task.options = options;
        }
        task.updated_at = Utc::now();
    }
}

/// Outcome of [`TaskStore::try_start`].
#[derive(Debug, Clone)]
pub enum StartOutcome {
    /// The task moved from pending to in progress; holds the updated record.
    Started(Task),
    /// No task with that id exists for the agent.
    NotFound,
    /// The task was already in progress or terminal; holds it unchanged.
    NotPending(Task),
}

/// In-memory task lists keyed by agent name
#[derive(Debug, Default)]
pub struct TaskStore {
    memory: DashMap<String, Vec<Task>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new pending task to the agent's list and return its id.
    ///
    /// `spec.options` is stored as given; merging `prompt` into the options
    /// is up to the caller.
    pub fn add_task(&self, agent_name: &str, spec: TaskSpec) -> String {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            goal: spec.goal,
            service: spec.service,
            options: spec.options,
            state: TaskState::Pending,
            result: None,
            created_at: now,
            updated_at: now,
            on_success: spec.on_success,
            on_error: spec.on_error,
        };
        let id = task.id.clone();

        self.memory
            .entry(agent_name.to_string())
            .or_default()
            .push(task);

        id
    }

    /// Merge `updates` into the matching task. Unknown ids are ignored.
    pub fn update_task(&self, agent_name: &str, task_id: &str, updates: TaskUpdate) {
        let Some(mut tasks) = self.memory.get_mut(agent_name) else {
            log::debug!("update_task: no tasks recorded for {}", agent_name);
            return;
        };

        match tasks.iter_mut().find(|t| t.id == task_id) {
            Some(task) => updates.apply(task),
            None => log::debug!("update_task: task {} not found for {}", task_id, agent_name),
        }
    }

    /// Atomically move a pending task to in progress.
    ///
    /// The state check and the transition happen under the agent's entry
    /// lock, so concurrent callers cannot both start the same task.
    pub fn try_start(&self, agent_name: &str, task_id: &str) -> StartOutcome {
        let Some(mut tasks) = self.memory.get_mut(agent_name) else {
            return StartOutcome::NotFound;
        };
        let Some(task) = tasks.iter_mut().find(|t| t.id == task_id) else {
            return StartOutcome::NotFound;
        };

        if task.state != TaskState::Pending {
            return StartOutcome::NotPending(task.clone());
        }

        task.state = TaskState::InProgress;
        task.updated_at = Utc::now();
        StartOutcome::Started(task.clone())
    }

    pub fn get_tasks(&self, agent_name: &str) -> Vec<Task> {
        self.memory
            .get(agent_name)
            .map(|tasks| tasks.clone())
            .unwrap_or_default()
    }

    pub fn get_pending_tasks(&self, agent_name: &str) -> Vec<Task> {
        self.memory
            .get(agent_name)
            .map(|tasks| {
                tasks
                    .iter()
                    .filter(|t| t.state == TaskState::Pending)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_task_by_id(&self, agent_name: &str, task_id: &str) -> Option<Task> {
        self.memory
            .get(agent_name)
            .and_then(|tasks| tasks.iter().find(|t| t.id == task_id).cloned())
    }

    /// Log a one-line view of each task and return task id -> goal.
    pub fn summarize_tasks(&self, agent_name: &str) -> HashMap<String, String> {
        let tasks = self.get_tasks(agent_name);
        if tasks.is_empty() {
            log::warn!("No tasks found for {}.", agent_name);
            return HashMap::new();
        }

        log::info!("Tasks summary for {}:", agent_name);
        for task in &tasks {
            log::info!(
                "  {} | {} | {} | {}",
                task.id,
                task.goal,
                task.state,
                task.result_preview().unwrap_or_else(|| "None".to_string())
            );
        }

        tasks.into_iter().map(|t| (t.id, t.goal)).collect()
    }
}
