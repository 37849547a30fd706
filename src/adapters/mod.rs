// Adapters layer: concrete implementations of the domain ports (http, storage).

pub mod http;
pub mod storage;

pub use http::{build_client, HttpRegistrationClient, HttpSubmissionClient};
pub use storage::{JsonlSolutionStore, MemorySolutionStore};
