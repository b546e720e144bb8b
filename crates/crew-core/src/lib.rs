//! crew-core - task records and the in-memory task store
//!
//! Tasks are owned by the [`TaskStore`], partitioned by the name of the agent
//! that owns them. Agents never hold task state themselves; they read and
//! write through the store by `(agent name, task id)`.

pub mod store;
pub mod task;

pub use store::{StartOutcome, TaskStore, TaskUpdate};
pub use task::{
    ErrorCallback, SuccessCallback, Task, TaskOptions, TaskResult, TaskSpec, TaskState,
    PLACEHOLDER_RESULT, PREVIEW_LEN,
};
