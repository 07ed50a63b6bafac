use thiserror::Error;

/// Failures of a deck session operation. The controller recovers from
/// every kind the same way; the kind only shapes the message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeckError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("deck {0} is expired")]
    DeckExpired(String),
    #[error("deck not found: {0}")]
    DeckNotFound(String),
    #[error("deck service unavailable: {0}")]
    RemoteUnavailable(String),
}

impl DeckError {
    pub fn kind(&self) -> &'static str {
        match self {
            DeckError::InvalidArgument(_) => "invalid_argument",
            DeckError::DeckExpired(_) => "deck_expired",
            DeckError::DeckNotFound(_) => "deck_not_found",
            DeckError::RemoteUnavailable(_) => "remote_unavailable",
        }
    }

    /// Whether a full reset with a fresh deck is the right response.
    pub fn recoverable_by_reset(&self) -> bool {
        match self {
            DeckError::InvalidArgument(_)
            | DeckError::DeckExpired(_)
            | DeckError::DeckNotFound(_)
            | DeckError::RemoteUnavailable(_) => true,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialize error: {0}")]
    Serialize(String),
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value.to_string())
    }
}
