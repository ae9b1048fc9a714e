pub mod config;
pub mod data;
pub mod error;
pub mod services;

pub use config::TriageConfig;
pub use data::{CardOutcome, FetchResponse, TriageSummary};
pub use error::TriageError;
pub use services::github::GitHubClient;
pub use services::triage::{run, select_matches};
