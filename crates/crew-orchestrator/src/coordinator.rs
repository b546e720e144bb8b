//! Crew management and plan delegation

use std::sync::Arc;

use crew_core::TaskSpec;

use crate::agent::{Agent, ReactMode, Reactive};
use crate::planning::{planning_prompt, Plan};

/// Ordered, append-only crew plus the delegation steps a boss runs after
/// each planning task.
#[derive(Default)]
pub struct Coordinator {
    crew: Vec<Arc<dyn Reactive>>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_member(&mut self, member: Arc<dyn Reactive>) {
        self.crew.push(member);
    }

    pub fn crew(&self) -> &[Arc<dyn Reactive>] {
        &self.crew
    }

    pub fn crew_names(&self) -> Vec<&str> {
        self.crew.iter().map(|m| m.name()).collect()
    }

    pub fn find_member(&self, name: &str) -> Option<&Arc<dyn Reactive>> {
        self.crew.iter().find(|m| m.name() == name)
    }

    pub fn planning_prompt(&self) -> String {
        planning_prompt(&self.crew_names())
    }

    /// Enqueue `spec` on `target`, logged as coming from `assigner`.
    pub fn assign(&self, assigner: &str, target: &Agent, spec: TaskSpec) -> Option<String> {
        let goal = spec.goal.clone();
        let task_id = target.add_task([spec]).pop();
        log::info!(
            "Boss {} assigned task '{}' to {}",
            assigner,
            goal,
            target.name()
        );
        task_id
    }

    /// Turn every plan line into a task on the matching crew member.
    ///
    /// Sub-tasks reuse `service`; unknown agent names are skipped. Returns
    /// the number of tasks enqueued.
    pub fn delegate(&self, assigner: &str, plan: &Plan, service: Option<&str>) -> usize {
        let mut assigned = 0;

        for assignment in plan.assignments() {
            let Some(member) = self.find_member(&assignment.agent) else {
                log::warn!("Warning: Agent '{}' not found in crew.", assignment.agent);
                continue;
            };

            for line in &assignment.tasks {
                let mut spec = TaskSpec::new(line.as_str()).with_prompt(line.as_str());
                spec.service = service.map(str::to_string);
                if self.assign(assigner, member.agent(), spec).is_some() {
                    assigned += 1;
                }
            }
        }

        assigned
    }

    /// React every crew member in sequence mode, in crew order, and log a
    /// summary of each member's tasks.
    pub async fn drive_crew(&self) {
        for member in &self.crew {
            member.react(ReactMode::Sequence).await;
            member.agent().recall().summarize_tasks(member.name());
        }
    }
}
