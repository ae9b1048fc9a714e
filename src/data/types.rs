use serde::Deserialize;

use crate::error::TriageError;

// GraphQL response types for the open-pull-requests query. Field names are
// renamed explicitly because the API speaks camelCase.

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FetchResponse {
    pub data: FetchData,
}

impl FetchResponse {
    /// The fetched pull requests, in API order. Empty when the repository
    /// node did not resolve.
    pub fn pull_requests(&self) -> &[PullRequestNode] {
        self.data
            .node
            .as_ref()
            .and_then(|node| node.pull_requests.as_ref())
            .map(|connection| connection.nodes.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FetchData {
    pub node: Option<RepositoryNode>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RepositoryNode {
    #[serde(rename = "pullRequests")]
    pub pull_requests: Option<PullRequestConnection>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PullRequestConnection {
    pub nodes: Vec<PullRequestNode>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PullRequestNode {
    pub number: u64,
    pub id: String,
    pub title: String,
    #[serde(rename = "isDraft")]
    pub is_draft: bool,
    #[serde(rename = "reviewRequests")]
    pub review_requests: ReviewRequestConnection,
    #[serde(rename = "projectCards")]
    pub project_cards: ProjectCardConnection,
}

impl PullRequestNode {
    /// Node ids of the teams this pull request has a pending review
    /// request for. Review requests whose reviewer no longer resolves, and
    /// reviewers that are not teams, contribute nothing.
    pub fn requested_team_ids(&self) -> impl Iterator<Item = &str> {
        self.review_requests
            .nodes
            .iter()
            .filter_map(|request| request.requested_reviewer.as_ref())
            .filter_map(RequestedReviewer::team_id)
    }

    /// Node ids of the projects this pull request already has a card on.
    pub fn project_ids(&self) -> impl Iterator<Item = &str> {
        self.project_cards
            .nodes
            .iter()
            .map(|card| card.project.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReviewRequestConnection {
    pub nodes: Vec<ReviewRequestNode>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReviewRequestNode {
    // Null when the requested reviewer was removed after the request.
    #[serde(rename = "requestedReviewer")]
    pub requested_reviewer: Option<RequestedReviewer>,
}

/// The reviewer a review request points at. Only teams carry an id we act
/// on; every other reviewer kind collapses to `Other`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "__typename")]
pub enum RequestedReviewer {
    Team { id: String, name: String },
    #[serde(other)]
    Other,
}

impl RequestedReviewer {
    pub fn team_id(&self) -> Option<&str> {
        match self {
            RequestedReviewer::Team { id, .. } => Some(id),
            RequestedReviewer::Other => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectCardConnection {
    pub nodes: Vec<ProjectCardNode>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectCardNode {
    pub project: ProjectRef,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectRef {
    pub name: String,
    pub id: String,
}

// Response types for the add-card mutation.

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddCardResponse {
    pub data: Option<AddCardData>,
}

impl AddCardResponse {
    /// Name of the column the card landed in, echoed by the API.
    pub fn column_name(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|data| data.add_project_card.as_ref())
            .and_then(|add| add.project_column.as_ref())
            .map(|column| column.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddCardData {
    #[serde(rename = "addProjectCard")]
    pub add_project_card: Option<AddProjectCard>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddProjectCard {
    #[serde(rename = "projectColumn")]
    pub project_column: Option<ProjectColumn>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectColumn {
    pub name: String,
}

// Board-update outcomes.

/// Result of one add-card mutation: the column name on success, the error
/// that was logged on failure.
#[derive(Debug)]
pub struct CardOutcome {
    pub pull_request_id: String,
    pub outcome: Result<String, TriageError>,
}

impl CardOutcome {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// What one run did, returned by the pipeline for observability.
#[derive(Debug, Default)]
pub struct TriageSummary {
    pub outcomes: Vec<CardOutcome>,
}

impl TriageSummary {
    pub fn matched(&self) -> usize {
        self.outcomes.len()
    }

    pub fn added(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_success()).count()
    }
}
