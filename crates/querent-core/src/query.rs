use crate::error::QuerentError;
use serde::{Deserialize, Serialize};

/// One rendered entry in a stream-mode trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Step label; `"Token"` for token chunks, the node name for step updates,
    /// empty for custom notices.
    pub step: String,
    /// Rendered display string.
    pub message: String,
}

impl StepInfo {
    /// A step named `step`.
    pub fn new(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            message: message.into(),
        }
    }
}

/// The ordered steps collected for one stream mode.
///
/// Only built by the stream aggregator, which never emits a mode without steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamModeInfo {
    /// `token`, `step-update` or `custom`.
    pub mode: String,
    /// Steps in arrival order.
    pub steps: Vec<StepInfo>,
}

/// Normalized answer for a single query.
///
/// When `error` is set, `response` is empty and `stream_modes` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Final answer, empty on failure.
    pub response: String,
    /// Per-mode trace; empty on failure and for invoke.
    #[serde(default)]
    pub stream_modes: Vec<StreamModeInfo>,
    /// Failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResult {
    /// A successful result.
    pub fn success(response: impl Into<String>, stream_modes: Vec<StreamModeInfo>) -> Self {
        Self {
            response: response.into(),
            stream_modes,
            error: None,
        }
    }

    /// A failed query: no answer and no partial trace.
    pub fn failure(error: &QuerentError) -> Self {
        Self {
            response: String::new(),
            stream_modes: Vec::new(),
            error: Some(error.to_string()),
        }
    }

    /// Whether the query failed.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_success_serializes_camel_case_without_error() {
        let result = QueryResult::success(
            "Hello!",
            vec![StreamModeInfo {
                mode: "token".into(),
                steps: vec![StepInfo::new("Token", "Hel")],
            }],
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["response"], "Hello!");
        assert_eq!(json["streamModes"][0]["mode"], "token");
        assert_eq!(json["streamModes"][0]["steps"][0]["step"], "Token");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_failure_discards_response_and_trace() {
        let result = QueryResult::failure(&QuerentError::Config("missing credential".into()));
        assert!(result.is_error());
        assert_eq!(result.response, "");
        assert!(result.stream_modes.is_empty());
        assert_eq!(result.error.as_deref(), Some("missing credential"));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["error"], "missing credential");
        assert_eq!(json["streamModes"], serde_json::json!([]));
    }
}
