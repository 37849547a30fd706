pub mod orchestrator;

pub use crate::domain::model::{RegistrationRequest, RegistrationResponse, Solution, SubmissionResult};
pub use crate::domain::ports::{RegistrationClient, SolutionStore, SubmissionClient};
pub use orchestrator::{Orchestrator, RunPlan, RunReport, RunSettings};
