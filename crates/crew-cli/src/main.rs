mod config;
mod logging;
mod mission;
mod output;

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use crew_orchestrator::ReactMode;

use crate::config::MissionConfig;
use crate::mission::Mission;

#[derive(Parser)]
#[command(name = "crew")]
#[command(about = "Run a boss-led crew of agents from a mission file")]
#[command(version)]
struct Cli {
    /// Mission file (TOML, or JSON with a .json extension)
    #[arg(long, short, env = "CREW_CONFIG", default_value = "mission.toml")]
    config: PathBuf,

    /// Overrides the mission's react mode: sequence or parallel
    #[arg(long, short, env = "CREW_MODE")]
    mode: Option<ReactMode>,

    /// Enable debug mode
    #[arg(long, short, default_value = "false")]
    debug: bool,

    /// Print task lists as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.debug);

    let mut config = MissionConfig::load(&cli.config)?;
    config.apply_env_overrides();

    let mode = cli.mode.or(config.mode).unwrap_or_default();
    if cli.debug {
        eprintln!(
            "{}",
            format!("[DEBUG] Mission {} in {} mode", cli.config.display(), mode).dimmed()
        );
    }

    let mission = Mission::build(&config)?;
    mission.run(mode).await;

    let lists = mission.task_lists();
    if cli.json {
        println!("{}", output::to_json(&lists)?);
    } else {
        output::print_table(&lists);
    }

    Ok(())
}
