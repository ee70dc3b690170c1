use thiserror::Error;

/// Failures talking to the PHP API.
///
/// Everything except `Rejected` is transport class: the request may or may not
/// have reached the server.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("malformed response from {endpoint}: {source}")]
    MalformedResponse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{endpoint} rejected the request: {message}")]
    Rejected { endpoint: String, message: String },
}

impl ApiError {
    pub fn rejected(endpoint: &str, message: Option<String>) -> Self {
        ApiError::Rejected {
            endpoint: endpoint.to_string(),
            message: message.unwrap_or_else(|| "request rejected".to_string()),
        }
    }

    pub fn is_transport(&self) -> bool {
        !matches!(self, ApiError::Rejected { .. })
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected { message, .. } => message.clone(),
            ApiError::Request(e) if e.is_connect() => "cannot reach the attendance server".to_string(),
            ApiError::Request(e) if e.is_timeout() => "the attendance server timed out".to_string(),
            // Error pages are often whole HTML documents
            ApiError::Status { endpoint, status, .. } => {
                format!("{endpoint} failed with HTTP {status}")
            }
            ApiError::MalformedResponse { endpoint, .. } => {
                format!("unexpected response from {endpoint}")
            }
            other => other.to_string(),
        }
    }
}
