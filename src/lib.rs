pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{HttpRegistrationClient, HttpSubmissionClient, JsonlSolutionStore, MemorySolutionStore};
pub use config::SolverConfig;
pub use self::core::{Orchestrator, RunReport, RunSettings};
pub use domain::parity::{resolve_parity, Parity};
pub use domain::query::select_query;
pub use utils::error::{ConfigError, NetworkError, Result, SolverError, StorageError};
