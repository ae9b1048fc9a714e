pub mod types;

pub use types::{
    AddCardResponse, CardOutcome, FetchResponse, ProjectCardConnection, ProjectCardNode,
    ProjectRef, PullRequestConnection, PullRequestNode, RepositoryNode, RequestedReviewer,
    ReviewRequestConnection, ReviewRequestNode, TriageSummary,
};
