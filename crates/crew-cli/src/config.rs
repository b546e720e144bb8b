use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{bail, Context, Result};
use crew_core::{TaskOptions, TaskSpec};
use crew_llm::ServiceConfig;
use crew_orchestrator::ReactMode;
use serde::{Deserialize, Serialize};

const API_KEY_ENV: &str = "CREW_API_KEY";

fn default_boss_name() -> String {
    "Boss".to_string()
}

/// A mission file: services, agents, the boss and its work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionConfig {
    #[serde(default)]
    pub mode: Option<ReactMode>,
    #[serde(default)]
    pub services: BTreeMap<String, ServiceConfig>,
    #[serde(default)]
    pub agents: Vec<AgentConfig>,
    #[serde(default)]
    pub boss: BossConfig,
    #[serde(default)]
    pub client: Option<ClientConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,
    #[serde(default)]
    pub tools: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossConfig {
    #[serde(default = "default_boss_name")]
    pub name: String,
    #[serde(default)]
    pub crew: Vec<String>,
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            name: default_boss_name(),
            crew: Vec::new(),
            tasks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub name: String,
    pub task: TaskConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    pub goal: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub options: TaskOptions,
}

impl From<TaskConfig> for TaskSpec {
    fn from(config: TaskConfig) -> Self {
        let mut spec = TaskSpec::new(config.goal).with_options(config.options);
        spec.service = config.service;
        spec.prompt = config.prompt;
        spec
    }
}

impl MissionConfig {
    /// Load from TOML, or JSON when the file ends in `.json`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading mission file {}", path.display()))?;

        let config: MissionConfig = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("parsing JSON mission file {}", path.display()))?,
            _ => toml::from_str(&content)
                .with_context(|| format!("parsing TOML mission file {}", path.display()))?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Agent names partition the task store, so they must be unique, and the
    /// crew may only name declared agents.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        names.insert(self.boss.name.as_str());

        for agent in &self.agents {
            if !names.insert(agent.name.as_str()) {
                bail!("duplicate agent name '{}'", agent.name);
            }
        }
        if let Some(client) = &self.client {
            if !names.insert(client.name.as_str()) {
                bail!("duplicate agent name '{}'", client.name);
            }
        }

        for member in &self.boss.crew {
            if !self.agents.iter().any(|a| &a.name == member) {
                bail!("crew member '{}' is not a declared agent", member);
            }
        }

        Ok(())
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_api_key(std::env::var(API_KEY_ENV).ok());
    }

    /// Fill in `api_key` for services that do not set one.
    pub fn apply_api_key(&mut self, api_key: Option<String>) {
        let Some(api_key) = api_key else {
            return;
        };
        for service in self.services.values_mut() {
            if service.api_key.as_deref().map_or(true, str::is_empty) {
                service.api_key = Some(api_key.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("temp file");
        file.write_all(content.as_bytes()).expect("write");
        file
    }

    const TOML_MISSION: &str = r#"
mode = "parallel"

[services.TextGeneration]
provider = "Ollama"
type = "TextGeneration"
api_key = ""

[[agents]]
name = "Writer"
tools = ["search"]

[boss]
crew = ["Writer"]

[[boss.tasks]]
goal = "Generate a story"
service = "TextGeneration"
prompt = "Once upon a time..."
options = { max_tokens = 100 }
"#;

    #[test]
    fn loads_toml_mission() {
        let file = write_temp(".toml", TOML_MISSION);
        let config = MissionConfig::load(file.path()).unwrap();

        assert_eq!(config.mode, Some(ReactMode::Parallel));
        assert_eq!(config.boss.name, "Boss");
        assert_eq!(config.boss.crew, vec!["Writer"]);
        assert_eq!(config.agents[0].tools, vec!["search"]);
        assert_eq!(config.services["TextGeneration"].provider, "Ollama");

        let spec: TaskSpec = config.boss.tasks[0].clone().into();
        assert_eq!(spec.goal, "Generate a story");
        assert_eq!(spec.service.as_deref(), Some("TextGeneration"));
        assert_eq!(spec.prompt.as_deref(), Some("Once upon a time..."));
        assert_eq!(spec.options["max_tokens"], 100);
    }

    #[test]
    fn loads_json_mission() {
        let file = write_temp(
            ".json",
            r#"{
                "services": {"gen": {"provider": "OpenAI", "type": "TextGeneration"}},
                "agents": [{"name": "Writer"}],
                "boss": {"name": "Chief", "crew": ["Writer"], "tasks": [{"goal": "Plan"}]},
                "client": {"name": "Reader", "task": {"goal": "Ask", "service": "gen"}}
            }"#,
        );
        let config = MissionConfig::load(file.path()).unwrap();

        assert_eq!(config.mode, None);
        assert_eq!(config.boss.name, "Chief");
        assert_eq!(config.client.unwrap().task.service.as_deref(), Some("gen"));
    }

    #[test]
    fn rejects_unknown_crew_member() {
        let file = write_temp(".toml", "[boss]\ncrew = [\"Ghost\"]\n");
        let error = MissionConfig::load(file.path()).unwrap_err();
        assert!(error.to_string().contains("Ghost"));
    }

    #[test]
    fn rejects_duplicate_agent_names() {
        let file = write_temp(
            ".toml",
            "[[agents]]\nname = \"Boss\"\n\n[boss]\nname = \"Boss\"\n",
        );
        assert!(MissionConfig::load(file.path()).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let error = MissionConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(error.to_string().contains("reading mission file"));
    }

    #[test]
    fn api_key_fills_only_blank_keys() {
        let file = write_temp(
            ".toml",
            r#"
[services.a]
provider = "Groq"
type = "TextGeneration"
api_key = ""

[services.b]
provider = "Groq"
type = "TextGeneration"
api_key = "kept"

[services.c]
provider = "Groq"
type = "TextGeneration"
"#,
        );
        let mut config = MissionConfig::load(file.path()).unwrap();
        config.apply_api_key(Some("env-key".to_string()));

        assert_eq!(config.services["a"].api_key.as_deref(), Some("env-key"));
        assert_eq!(config.services["b"].api_key.as_deref(), Some("kept"));
        assert_eq!(config.services["c"].api_key.as_deref(), Some("env-key"));

        config.apply_api_key(None);
        assert_eq!(config.services["b"].api_key.as_deref(), Some("kept"));
    }
}
