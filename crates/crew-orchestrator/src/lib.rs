//! crew-orchestrator - agents that drain task queues through the service gateway
//!
//! - `agent`: task execution and the sequence/parallel react cycle
//! - `planning`: the planning prompt and the plan grammar parser
//! - `coordinator`: crew membership, delegation of parsed plans, crew reaction
//! - `boss`: an agent composed with a coordinator
//! - `client`: an agent that requests work from a boss

pub mod agent;
pub mod boss;
pub mod client;
pub mod coordinator;
pub mod planning;

pub use agent::{Agent, ParseReactModeError, ReactMode, Reactive};
pub use boss::Boss;
pub use client::Client;
pub use coordinator::Coordinator;
pub use planning::{planning_prompt, Assignment, Plan};
