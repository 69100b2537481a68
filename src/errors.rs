use reqwest::StatusCode;
use thiserror::Error;

use crate::models::ResourceId;

#[derive(Error, Debug)]
pub enum ToggleError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("endpoint answered {0}")]
    Status(StatusCode),

    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid {name} header value: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("endpoint {endpoint} is not on page origin {origin}")]
    CrossOrigin { endpoint: String, origin: String },

    #[error("no endpoint configured and the first likeable element has no url")]
    MissingEndpoint,

    #[error("no likeable element with id {0}")]
    UnknownElement(ResourceId),

    #[error("failed to read page snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed page snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl ToggleError {
    pub fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
