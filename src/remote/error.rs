// Failure taxonomy for calls to the anomaly-detection service

/// Every remote call resolves to `Ok` or one of these; nothing else escapes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// No response obtained (connection refused, timeout, body read aborted).
    #[error("network error: {0}")]
    Network(String),
    /// Response envelope reported a status other than "success".
    #[error("{}", message.as_deref().unwrap_or("service reported failure"))]
    Service { message: Option<String> },
    /// Body was not JSON or lacked the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Service-provided message, if any.
    pub fn service_message(&self) -> Option<&str> {
        match self {
            ClientError::Service { message } => message.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Network(e.to_string())
    }
}
