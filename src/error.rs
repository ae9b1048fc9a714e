use serde_json::Value;

/// Errors produced while talking to the GraphQL API.
///
/// Library code returns this type directly; the binary converts to
/// `anyhow::Error` at the boundary. Fetch-stage errors abort the run,
/// board-update errors are recorded per item and logged.
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    /// The credential environment variable is not set. Raised before any
    /// network call is attempted.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Non-success HTTP status from the GraphQL endpoint.
    #[error("HTTP {status} from GraphQL endpoint: {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body carried a GraphQL `errors` array. Can co-occur
    /// with HTTP 200, so it is checked separately from the status line.
    #[error("GraphQL errors in response: {0}")]
    GraphQl(Value),

    /// Transport-level failure (connection refused, body read error).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The response body was not the JSON shape the query asked for.
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_displays_message() {
        let err = TriageError::Configuration("GITHUB_TOKEN environment variable not set".into());
        assert_eq!(
            err.to_string(),
            "configuration error: GITHUB_TOKEN environment variable not set"
        );
    }

    #[test]
    fn http_error_shows_status_and_body() {
        let err = TriageError::Http {
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: "upstream unhappy".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("502"));
        assert!(msg.contains("upstream unhappy"));
    }

    #[test]
    fn graphql_error_preserves_payload() {
        let payload = serde_json::json!([{ "message": "Could not resolve to a node" }]);
        let err = TriageError::GraphQl(payload);
        assert!(err.to_string().contains("Could not resolve to a node"));
    }
}
