use log::{debug, error};
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::env;

use crate::data::{AddCardResponse, CardOutcome, FetchResponse};
use crate::error::TriageError;

const GITHUB_GRAPHQL_ENDPOINT: &str = "https://api.github.com/graphql";
const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

const OPEN_PRS_QUERY: &str = r#"
    query ($repo_id: ID!, $num_prs: Int!) {
        node(id: $repo_id) {
            ... on Repository {
                pullRequests(last: $num_prs, states: OPEN) {
                    nodes {
                        number
                        id
                        title
                        isDraft
                        reviewRequests(first: 10) {
                            nodes {
                                requestedReviewer {
                                    __typename
                                    ... on Team {
                                        name
                                        id
                                    }
                                }
                            }
                        }
                        projectCards(first: 10) {
                            nodes {
                                project {
                                    name
                                    id
                                }
                            }
                        }
                    }
                }
            }
        }
    }
"#;

const ADD_CARD_MUTATION: &str = r#"
    mutation ($pr_id: ID!, $column_id: ID!) {
        addProjectCard(input: {contentId: $pr_id, projectColumnId: $column_id}) {
            projectColumn {
                name
            }
        }
    }
"#;

/// Thin client for the GitHub GraphQL API.
///
/// The bearer token is read from the environment at call time, not stored,
/// so a long-lived client picks up a rotated token on the next call.
pub struct GitHubClient {
    http: reqwest::Client,
    endpoint: String,
    token_var: String,
}

impl GitHubClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: GITHUB_GRAPHQL_ENDPOINT.to_string(),
            token_var: TOKEN_ENV_VAR.to_string(),
        }
    }

    /// Point the client at a different GraphQL endpoint (used by tests).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Read the token from a different environment variable (used by tests).
    #[must_use]
    pub fn with_token_var(mut self, token_var: String) -> Self {
        self.token_var = token_var;
        self
    }

    fn bearer_token(&self) -> Result<String, TriageError> {
        env::var(&self.token_var).map_err(|_| {
            TriageError::Configuration(format!("{} environment variable not set", self.token_var))
        })
    }

    /// Fetch up to `limit` of the most recently updated open pull requests
    /// for the repository, with their review requests and project cards.
    ///
    /// Only the first 10 review requests and 10 project cards per pull
    /// request are visible; that is a fixed page size, not pagination.
    pub async fn fetch_open_pull_requests(
        &self,
        repository_id: &str,
        limit: u32,
    ) -> Result<FetchResponse, TriageError> {
        let token = self.bearer_token()?;
        let variables = json!({ "repo_id": repository_id, "num_prs": limit });
        let response: FetchResponse = self.graphql(&token, OPEN_PRS_QUERY, variables).await?;
        debug!(
            "fetched {} open pull requests",
            response.pull_requests().len()
        );
        Ok(response)
    }

    /// Add each pull request as a card in the given column, one mutation
    /// per id, in order. A failed mutation is logged and recorded in its
    /// outcome; the remaining ids are still attempted. Duplicate ids issue
    /// duplicate mutations; the API treats re-adding a card as idempotent.
    ///
    /// Only a missing token aborts the batch, and it does so before any
    /// mutation is issued.
    pub async fn add_to_column(
        &self,
        pull_request_ids: &[String],
        column_id: &str,
    ) -> Result<Vec<CardOutcome>, TriageError> {
        let token = self.bearer_token()?;

        let mut outcomes = Vec::with_capacity(pull_request_ids.len());
        for pr_id in pull_request_ids {
            debug!("adding {pr_id} to column {column_id}");
            let variables = json!({ "pr_id": pr_id, "column_id": column_id });
            let outcome = match self
                .graphql::<AddCardResponse>(&token, ADD_CARD_MUTATION, variables)
                .await
            {
                Ok(response) => Ok(response.column_name().unwrap_or_default().to_string()),
                Err(err) => {
                    error!("failed to add {pr_id} to board: {err}");
                    Err(err)
                }
            };
            outcomes.push(CardOutcome {
                pull_request_id: pr_id.clone(),
                outcome,
            });
        }
        Ok(outcomes)
    }

    async fn graphql<T: DeserializeOwned>(
        &self,
        token: &str,
        document: &str,
        variables: Value,
    ) -> Result<T, TriageError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("bearer {token}"))
            .json(&json!({ "query": document, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TriageError::Http { status, body });
        }

        // GraphQL errors ride in on HTTP 200, so the body is inspected
        // before it is decoded into the expected shape.
        let payload: Value = serde_json::from_str(&body)?;
        if let Some(errors) = payload.get("errors") {
            return Err(TriageError::GraphQl(errors.clone()));
        }
        Ok(serde_json::from_value(payload)?)
    }
}

impl Default for GitHubClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, token_var: &str, token: &str) -> GitHubClient {
        env::set_var(token_var, token);
        GitHubClient::new()
            .with_endpoint(server.uri())
            .with_token_var(token_var.to_string())
    }

    fn fetch_body(nodes: Value) -> Value {
        json!({ "data": { "node": { "pullRequests": { "nodes": nodes } } } })
    }

    #[tokio::test]
    async fn fetch_parses_pull_requests() {
        let server = MockServer::start().await;
        let body = fetch_body(json!([{
            "number": 7,
            "id": "PR_7",
            "title": "Add docs for the new API",
            "isDraft": true,
            "reviewRequests": { "nodes": [{
                "requestedReviewer": { "__typename": "Team", "name": "docs", "id": "T_1" }
            }] },
            "projectCards": { "nodes": [] }
        }]));

        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("authorization", "bearer fetch-ok-token"))
            .and(body_string_contains("pullRequests"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let client = client_for(&server, "GHTRIAGE_TEST_TOKEN_FETCH_OK", "fetch-ok-token");
        let response = client.fetch_open_pull_requests("R_1", 10).await.unwrap();

        let prs = response.pull_requests();
        assert_eq!(prs.len(), 1);
        assert_eq!(prs[0].id, "PR_7");
        assert!(prs[0].is_draft);
        assert_eq!(prs[0].requested_team_ids().collect::<Vec<_>>(), ["T_1"]);
    }

    #[tokio::test]
    async fn fetch_raises_http_error_on_non_2xx() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = client_for(&server, "GHTRIAGE_TEST_TOKEN_FETCH_502", "t");
        let err = client.fetch_open_pull_requests("R_1", 10).await.unwrap_err();

        match err {
            TriageError::Http { status, body } => {
                assert_eq!(status, reqwest::StatusCode::BAD_GATEWAY);
                assert_eq!(body, "bad gateway");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_raises_graphql_error_on_errors_body() {
        let server = MockServer::start().await;
        // HTTP 200 with an `errors` array, the co-occurrence case.
        let body = json!({
            "data": null,
            "errors": [{ "message": "Could not resolve to a node with the global id" }]
        });
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let client = client_for(&server, "GHTRIAGE_TEST_TOKEN_FETCH_GQL", "t");
        let err = client.fetch_open_pull_requests("R_1", 10).await.unwrap_err();

        match err {
            TriageError::GraphQl(errors) => {
                assert!(errors.to_string().contains("Could not resolve"));
            }
            other => panic!("expected GraphQl error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_without_token_makes_no_request() {
        let server = MockServer::start().await;
        let client = GitHubClient::new()
            .with_endpoint(server.uri())
            .with_token_var("GHTRIAGE_TEST_TOKEN_UNSET".to_string());

        let err = client.fetch_open_pull_requests("R_1", 10).await.unwrap_err();

        assert!(matches!(err, TriageError::Configuration(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_to_column_continues_past_failed_item() {
        let server = MockServer::start().await;

        // The mutation for PR_2 fails at the GraphQL level; the others
        // succeed. Matched on the id embedded in the variables.
        Mock::given(method("POST"))
            .and(body_string_contains("PR_2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{ "message": "Project card already archived" }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "addProjectCard": { "projectColumn": { "name": "Triage" } } }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, "GHTRIAGE_TEST_TOKEN_BATCH", "t");
        let ids = vec!["PR_1".to_string(), "PR_2".to_string(), "PR_3".to_string()];
        let outcomes = client.add_to_column(&ids, "COL_1").await.unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_success());
        assert!(!outcomes[1].is_success());
        assert!(outcomes[2].is_success());
        assert_eq!(outcomes[2].outcome.as_deref().ok(), Some("Triage"));
        // All three mutations were issued despite the middle failure.
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn add_to_column_records_http_failures_per_item() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("PR_1"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "addProjectCard": { "projectColumn": { "name": "Triage" } } }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, "GHTRIAGE_TEST_TOKEN_BATCH_HTTP", "t");
        let ids = vec!["PR_1".to_string(), "PR_2".to_string()];
        let outcomes = client.add_to_column(&ids, "COL_1").await.unwrap();

        assert!(matches!(
            outcomes[0].outcome,
            Err(TriageError::Http { .. })
        ));
        assert!(outcomes[1].is_success());
    }

    #[tokio::test]
    async fn add_to_column_without_token_aborts_before_any_mutation() {
        let server = MockServer::start().await;
        let client = GitHubClient::new()
            .with_endpoint(server.uri())
            .with_token_var("GHTRIAGE_TEST_TOKEN_UNSET_BATCH".to_string());

        let ids = vec!["PR_1".to_string()];
        let err = client.add_to_column(&ids, "COL_1").await.unwrap_err();

        assert!(matches!(err, TriageError::Configuration(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
