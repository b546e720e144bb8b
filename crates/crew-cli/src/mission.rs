//! Wires a mission config into a gateway, a task store, and agents.

use std::sync::Arc;

use anyhow::{Context, Result};
use crew_core::{Task, TaskStore};
use crew_llm::Cortex;
use crew_orchestrator::{Agent, Boss, Client, ReactMode};

use crate::config::MissionConfig;

pub struct Mission {
    agents: Vec<Arc<Agent>>,
    boss: Boss,
    client: Option<Client>,
}

impl Mission {
    pub fn build(config: &MissionConfig) -> Result<Self> {
        let cortex = Arc::new(Cortex::new());
        let recall = Arc::new(TaskStore::new());

        for (name, service) in &config.services {
            cortex
                .register_service(name, service)
                .with_context(|| format!("registering service '{}'", name))?;
        }

        let agents: Vec<Arc<Agent>> = config
            .agents
            .iter()
            .map(|a| {
                Arc::new(
                    Agent::new(a.name.as_str(), Arc::clone(&cortex), Arc::clone(&recall))
                        .with_tools(a.tools.clone()),
                )
            })
            .collect();

        let mut boss = Boss::new(config.boss.name.as_str(), Arc::clone(&cortex), Arc::clone(&recall));
        for member in &config.boss.crew {
            let agent = agents
                .iter()
                .find(|a| a.name() == member)
                .with_context(|| format!("crew member '{}' is not a declared agent", member))?;
            boss.add_agent_to_crew(Arc::clone(agent));
        }
        boss.add_task(config.boss.tasks.iter().cloned().map(Into::into));

        let client = config.client.as_ref().map(|c| {
            let client = Client::new(c.name.as_str(), Arc::clone(&cortex), Arc::clone(&recall));
            client.request_task(&boss, c.task.clone().into());
            client
        });

        Ok(Self {
            agents,
            boss,
            client,
        })
    }

    pub async fn run(&self, mode: ReactMode) {
        log::info!("Running mission for {} in {} mode", self.boss.name(), mode);
        self.boss.react(mode).await;

        if let Some(client) = &self.client {
            client.agent().react(mode).await;
        }
    }

    /// Every agent's task list: boss first, then agents, then the client.
    pub fn task_lists(&self) -> Vec<(String, Vec<Task>)> {
        let mut lists = vec![(self.boss.name().to_string(), self.boss.agent().recall_tasks())];
        for agent in &self.agents {
            lists.push((agent.name().to_string(), agent.recall_tasks()));
        }
        if let Some(client) = &self.client {
            let agent = client.agent();
            lists.push((agent.name().to_string(), client.check_task_progress(agent)));
        }
        lists
    }
}
