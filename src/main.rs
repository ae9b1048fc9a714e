use anyhow::Result;
use clap::Parser;

use ghtriage::config::DEFAULT_FETCH_LIMIT;
use ghtriage::{GitHubClient, TriageConfig};

/// Files draft pull requests awaiting a team review onto a project board column.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Node id of the repository to scan
    #[arg(long)]
    repository_id: String,

    /// Node id of the review team whose requests select a pull request
    #[arg(long)]
    team_id: String,

    /// Node id of the project board used to detect already-triaged pull requests
    #[arg(long)]
    project_id: String,

    /// Node id of the column new cards are added to
    #[arg(long)]
    column_id: String,

    /// How many of the most recently updated open pull requests to scan
    #[arg(long, default_value_t = DEFAULT_FETCH_LIMIT)]
    limit: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = TriageConfig {
        repository_id: cli.repository_id,
        team_id: cli.team_id,
        project_id: cli.project_id,
        column_id: cli.column_id,
        fetch_limit: cli.limit,
    };

    let client = GitHubClient::new();
    // A fetch-stage failure propagates here and exits non-zero. Card
    // failures were already logged per item and only affect the counts.
    let summary = ghtriage::run(&client, &config).await?;

    println!(
        "{} matched, {} added, {} failed",
        summary.matched(),
        summary.added(),
        summary.failed()
    );
    Ok(())
}
