use std::error::Error;

/// Error types specific to the audio primitive.
#[derive(Debug)]
pub enum AudioError {
    /// The backend could not create a resource for the given URI
    /// (network error, unsupported source, etc.).
    CreateFailed(String),
    InvalidUri(String),
    InvalidState(String),
    /// A play/pause command could not be delivered to the resource.
    TransportError(String),
    TaskJoinError(String),
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioError::CreateFailed(s) => write!(f, "Resource creation failed: {}", s),
            AudioError::InvalidUri(s) => write!(f, "Invalid source URI: {}", s),
            AudioError::InvalidState(s) => write!(f, "Invalid state: {}", s),
            AudioError::TransportError(s) => write!(f, "Transport error: {}", s),
            AudioError::TaskJoinError(s) => write!(f, "Async task join error: {}", s),
        }
    }
}

impl Error for AudioError {}

// --- From Implementations for AudioError ---

impl From<url::ParseError> for AudioError {
    fn from(e: url::ParseError) -> Self {
        AudioError::InvalidUri(e.to_string())
    }
}

impl From<tokio::task::JoinError> for AudioError {
    fn from(e: tokio::task::JoinError) -> Self {
        AudioError::TaskJoinError(e.to_string())
    }
}
