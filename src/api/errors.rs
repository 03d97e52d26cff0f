use thiserror::Error;

/// Failures crossing the collaborator seams. All of them are recoverable
/// inside the engine: lookups degrade, submissions preserve the draft for
/// retry.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No active session token is available")]
    Unauthorized,
    #[error("Transport failure calling [{endpoint}]: {message}")]
    Transport {
        endpoint: &'static str,
        message: String
    }
}

impl ApiError {
    pub fn transport(endpoint: &'static str, message: impl Into<String>) -> Self {
        Self::Transport { endpoint, message: message.into() }
    }
}
