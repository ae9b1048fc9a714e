pub mod github;
pub mod triage;

pub use github::GitHubClient;
pub use triage::{run, select_matches};
