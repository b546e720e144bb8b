use colored::Colorize;
use crew_core::{Task, TaskState};
use serde::Serialize;

const ID_WIDTH: usize = 8;
const GOAL_WIDTH: usize = 32;
const STATE_WIDTH: usize = 12;

#[derive(Serialize)]
struct AgentReport<'a> {
    agent: &'a str,
    tasks: &'a [Task],
}

fn paint(state: TaskState, cell: String) -> String {
    match state {
        TaskState::Pending => cell.normal().to_string(),
        TaskState::InProgress => cell.yellow().to_string(),
        TaskState::Completed => cell.green().to_string(),
        TaskState::Failed => cell.red().to_string(),
    }
}

fn fit(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let head: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", head)
    } else {
        text.to_string()
    }
}

/// One plain-text row per task; the state cell is padded before coloring so
/// escape codes do not break alignment.
pub fn render_row(task: &Task) -> (String, String, String) {
    let id: String = task.id.chars().take(ID_WIDTH).collect();
    let goal = format!("{:<width$}", fit(&task.goal, GOAL_WIDTH), width = GOAL_WIDTH);
    let state = format!("{:<width$}", task.state.as_str(), width = STATE_WIDTH);
    let result = task.result_preview().unwrap_or_default();
    (format!("{} {} ", id, goal), state, result)
}

pub fn print_table(lists: &[(String, Vec<Task>)]) {
    for (agent, tasks) in lists {
        println!("{}", format!("== {} ({} task(s))", agent, tasks.len()).cyan().bold());
        if tasks.is_empty() {
            println!("{}", "   no tasks".dimmed());
            continue;
        }
        for task in tasks {
            let (head, state, result) = render_row(task);
            println!("   {}{} {}", head, paint(task.state, state), result);
        }
    }
}

pub fn to_json(lists: &[(String, Vec<Task>)]) -> serde_json::Result<String> {
    let reports: Vec<AgentReport<'_>> = lists
        .iter()
        .map(|(agent, tasks)| AgentReport {
            agent: agent.as_str(),
            tasks: tasks.as_slice(),
        })
        .collect();
    serde_json::to_string_pretty(&reports)
}
