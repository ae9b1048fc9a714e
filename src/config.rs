/// Default number of open pull requests fetched per run.
pub const DEFAULT_FETCH_LIMIT: u32 = 10;

/// Identifiers the triage pipeline operates on.
///
/// These are GraphQL node ids, passed in explicitly (rather than read from
/// globals) so the pipeline can be pointed at arbitrary fixtures in tests.
#[derive(Debug, Clone)]
pub struct TriageConfig {
    /// Repository whose open pull requests are scanned.
    pub repository_id: String,
    /// Review team whose requested reviews select a pull request.
    pub team_id: String,
    /// Project board used to detect already-triaged pull requests.
    pub project_id: String,
    /// Column that matching pull requests are filed under.
    pub column_id: String,
    /// How many of the most recently updated open pull requests to scan.
    pub fetch_limit: u32,
}
