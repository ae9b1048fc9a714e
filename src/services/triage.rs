use log::info;

use crate::config::TriageConfig;
use crate::data::{FetchResponse, TriageSummary};
use crate::error::TriageError;
use crate::services::github::GitHubClient;

/// Select the pull requests that belong on the board: draft, with a
/// pending review request for the given team, and not already carded on
/// the given project.
///
/// Pure and order-preserving: ids come back in the order the fetch
/// returned them, and the response is only read.
pub fn select_matches(response: &FetchResponse, team_id: &str, project_id: &str) -> Vec<String> {
    response
        .pull_requests()
        .iter()
        .filter(|pr| {
            pr.is_draft
                && pr.requested_team_ids().any(|id| id == team_id)
                && !pr.project_ids().any(|id| id == project_id)
        })
        .map(|pr| pr.id.clone())
        .collect()
}

/// Run the whole pipeline once: fetch, filter, add cards.
///
/// A fetch-stage failure aborts the run before any mutation. Individual
/// card failures are recorded in the summary and do not fail the run.
pub async fn run(
    client: &GitHubClient,
    config: &TriageConfig,
) -> Result<TriageSummary, TriageError> {
    let response = client
        .fetch_open_pull_requests(&config.repository_id, config.fetch_limit)
        .await?;

    let matches = select_matches(&response, &config.team_id, &config.project_id);
    if matches.is_empty() {
        info!("no pull requests to triage");
        return Ok(TriageSummary::default());
    }

    info!("adding {} pull requests to the board", matches.len());
    let outcomes = client.add_to_column(&matches, &config.column_id).await?;
    Ok(TriageSummary { outcomes })
}
