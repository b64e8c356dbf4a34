use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("{service} request to {url} failed: {source}")]
    Request {
        service: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned HTTP {status} for {url}: {body}")]
    Status {
        service: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("{service} returned an unexpected payload from {url}: {source}")]
    Decode {
        service: String,
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{service} request failed after {attempts} attempts: {last}")]
    Exhausted {
        service: String,
        attempts: u32,
        #[source]
        last: Box<SourceError>,
    },
}

impl SourceError {
    /// HTTP status of the failure, looking through retry exhaustion
    pub fn status(&self) -> Option<u16> {
        match self {
            SourceError::Status { status, .. } => Some(*status),
            SourceError::Exhausted { last, .. } => last.status(),
            _ => None,
        }
    }

    /// Decoding failures will not go away on a second attempt
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SourceError::Decode { .. } | SourceError::Client(_))
    }
}
