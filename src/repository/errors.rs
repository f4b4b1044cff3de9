use thiserror::Error;

/// Failures of the remote list-fetch collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Remote error {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl FetchError {
    /// Message suitable for a toast or an inline banner.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Network(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            FetchError::Remote { status, message } if *status < 500 => {
                format!("The request was rejected: {message}")
            }
            FetchError::Remote { .. } => {
                "The server failed to load the list. Please try again later.".to_string()
            }
            FetchError::InvalidResponse(_) | FetchError::Unexpected(_) => {
                "Something went wrong while loading the list.".to_string()
            }
        }
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
