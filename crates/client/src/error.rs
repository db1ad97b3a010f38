use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The API answered with a non-success status.
    #[error("Opine API error: {status} {reason}")]
    RemoteApi { status: u16, reason: String },
    #[error("request to `{path}` failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("could not decode response from `{path}`: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid Opine base url `{0}`")]
    InvalidBaseUrl(String),
    #[error("could not build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl ClientError {
    /// Upstream HTTP status, when the API produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteApi { status, .. } => Some(*status),
            _ => None,
        }
    }
}
