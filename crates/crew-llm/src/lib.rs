pub mod cortex;
pub mod factory;
pub mod generator;
pub mod service;

pub use cortex::{Cortex, CortexError};
pub use factory::{create_service, Provider, ServiceConfig, ServiceType, AVAILABLE_PROVIDERS};
pub use generator::TextGenerator;
pub use service::{Service, ServiceError, SharedService};
