//! Task types for agent work queues

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameters handed to a service capability, including `prompt`.
pub type TaskOptions = Map<String, Value>;

/// Invoked with the capability response after a task completes.
pub type SuccessCallback = Arc<dyn Fn(&Value) + Send + Sync>;

/// Invoked with the failure description after a task fails.
pub type ErrorCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Result stored on tasks that had nothing to dispatch.
pub const PLACEHOLDER_RESULT: &str = "Non-dispatchable task completed";

/// Number of characters kept by [`Task::result_preview`].
pub const PREVIEW_LEN: usize = 50;

/// Task lifecycle state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TaskState {
    #[default]
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "in_progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "failed")]
    Failed,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::InProgress => "in_progress",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome recorded on a task once it reaches a terminal state.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TaskResult {
    /// Response returned by the service capability.
    Response(Value),
    /// Description of the capability failure.
    Failure(String),
    /// The task had no service to dispatch to.
    Placeholder,
}

impl TaskResult {
    /// Text of the generated message, if the response carries one.
    ///
    /// Reads `message.content` first and falls back to the
    /// OpenAI-compatible `choices[0].message.content`.
    pub fn message_content(&self) -> Option<&str> {
        let TaskResult::Response(value) = self else {
            return None;
        };

        value
            .pointer("/message/content")
            .or_else(|| value.pointer("/choices/0/message/content"))
            .and_then(Value::as_str)
    }

    /// Full display text, before truncation.
    pub fn display_text(&self) -> String {
        match self {
            TaskResult::Response(value) => self
                .message_content()
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string()),
            TaskResult::Failure(description) => description.clone(),
            TaskResult::Placeholder => PLACEHOLDER_RESULT.to_string(),
        }
    }
}

/// Caller-supplied description of a task to enqueue.
#[derive(Clone, Default)]
pub struct TaskSpec {
    pub goal: String,
    pub service: Option<String>,
    pub options: TaskOptions,
    pub prompt: Option<String>,
    pub on_success: Option<SuccessCallback>,
    pub on_error: Option<ErrorCallback>,
}

impl TaskSpec {
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            ..Default::default()
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_options(mut self, options: TaskOptions) -> Self {
        self.options = options;
        self
    }

    pub fn on_success(mut self, callback: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for TaskSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSpec")
            .field("goal", &self.goal)
            .field("service", &self.service)
            .field("options", &self.options)
            .field("prompt", &self.prompt)
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// A task record as held by the store
#[derive(Clone, Serialize)]
pub struct Task {
    pub id: String,
    pub goal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    pub options: TaskOptions,
    pub state: TaskState,
    pub result: Option<TaskResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub on_success: Option<SuccessCallback>,
    #[serde(skip)]
    pub on_error: Option<ErrorCallback>,
}

impl Task {
    /// Service name to dispatch to, when the task is dispatchable.
    ///
    /// Both a non-empty service name and non-empty options are required.
    pub fn dispatch_target(&self) -> Option<(&str, &TaskOptions)> {
        let service = self.service.as_deref().filter(|s| !s.is_empty())?;
        if self.options.is_empty() {
            return None;
        }
        Some((service, &self.options))
    }

    pub fn prompt(&self) -> Option<&str> {
        self.options.get("prompt").and_then(Value::as_str)
    }

    /// Result text cut to [`PREVIEW_LEN`] characters for display.
    pub fn result_preview(&self) -> Option<String> {
        let text = self.result.as_ref()?.display_text();
        if text.chars().count() > PREVIEW_LEN {
            let head: String = text.chars().take(PREVIEW_LEN).collect();
            Some(format!("{}...", head))
        } else {
            Some(text)
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("goal", &self.goal)
            .field("service", &self.service)
            .field("options", &self.options)
            .field("state", &self.state)
            .field("result", &self.result)
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task_with(service: Option<&str>, options: TaskOptions) -> Task {
        let now = Utc::now();
        Task {
            id: "t1".to_string(),
            goal: "goal".to_string(),
            service: service.map(str::to_string),
            options,
            state: TaskState::Pending,
            result: None,
            created_at: now,
            updated_at: now,
            on_success: None,
            on_error: None,
        }
    }

    #[test]
    fn state_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TaskState::InProgress).unwrap(),
            "\"in_progress\""
        );
        let state: TaskState = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(state, TaskState::Failed);
        assert!(!TaskState::Pending.is_terminal());
        assert!(TaskState::Completed.is_terminal());
    }

    #[test]
    fn message_content_reads_both_shapes() {
        let ollama = TaskResult::Response(json!({"message": {"content": "hi"}}));
        assert_eq!(ollama.message_content(), Some("hi"));

        let openai = TaskResult::Response(json!({
            "choices": [{"message": {"role": "assistant", "content": "hello"}}]
        }));
        assert_eq!(openai.message_content(), Some("hello"));

        assert_eq!(TaskResult::Failure("boom".into()).message_content(), None);
        assert_eq!(TaskResult::Placeholder.message_content(), None);
    }

    #[test]
    fn dispatch_target_requires_service_and_options() {
        let mut options = TaskOptions::new();
        options.insert("prompt".into(), json!("p"));

        assert!(task_with(Some("gen"), options.clone()).dispatch_target().is_some());
        assert!(task_with(None, options.clone()).dispatch_target().is_none());
        assert!(task_with(Some(""), options).dispatch_target().is_none());
        assert!(task_with(Some("gen"), TaskOptions::new()).dispatch_target().is_none());
    }

    #[test]
    fn preview_truncates_long_results() {
        let mut task = task_with(None, TaskOptions::new());
        assert_eq!(task.result_preview(), None);

        task.result = Some(TaskResult::Response(json!({
            "message": {"content": "x".repeat(60)}
        })));
        let preview = task.result_preview().unwrap();
        assert_eq!(preview, format!("{}...", "x".repeat(50)));

        task.result = Some(TaskResult::Placeholder);
        assert_eq!(task.result_preview().as_deref(), Some(PLACEHOLDER_RESULT));
    }
}
