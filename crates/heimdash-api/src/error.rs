use thiserror::Error;

/// Top-level error type for the `heimdash-api` crate.
///
/// Covers every failure mode across all upstream clients: transport,
/// non-success status codes, and malformed payloads. `heimdash-core`
/// decides per call site whether a failure is surfaced (light writes)
/// or logged and swallowed (refresh cycles).
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream answered with a non-success status code.
    #[error("Upstream rejected request (HTTP {status}): {body}")]
    Status {
        status: u16,
        /// Response body, truncated for logging.
        body: String,
    },

    /// URL construction failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Response parsed but did not carry the expected structure.
    #[error("Unexpected payload: {0}")]
    UnexpectedPayload(&'static str),

    /// A provider date string could not be converted.
    #[error("Invalid date from provider: {0}")]
    InvalidDate(String),
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying on the
    /// next scheduled tick.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Check the response status, draining the body into [`Error::Status`]
/// on failure.
pub(crate) async fn ensure_success(
    resp: reqwest::Response,
) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::Status {
        status: status.as_u16(),
        body: truncate(&body),
    })
}

/// Cap a body excerpt at 200 characters for error messages.
fn truncate(body: &str) -> String {
    body.chars().take(200).collect()
}

/// Deserialize a response body, keeping the raw text around for the
/// error path.
pub(crate) async fn parse_json<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, Error> {
    let body = resp.text().await.map_err(Error::Transport)?;
    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: truncate(&body),
    })
}
