use thiserror::Error;

/// A convenience `Result` alias using [`QuerentError`].
pub type QuerentResult<T> = Result<T, QuerentError>;

/// Top-level error type for Querent.
///
/// `Config` and `Upstream` display their message verbatim: that text is what
/// callers see in `QueryResult::error`.
#[derive(Error, Debug)]
pub enum QuerentError {
    /// A required setting (usually the model credential) is missing or invalid.
    #[error("{0}")]
    Config(String),

    /// The assistant failed while invoking or streaming.
    #[error("{0}")]
    Upstream(String),

    /// An outbound HTTP request to the model provider failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A skill could not be found or failed to execute.
    #[error("Skill error: {0}")]
    Skill(String),

    /// An error from the HTTP gateway layer.
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
