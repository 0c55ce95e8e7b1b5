use thiserror::Error;

/// Errors that can occur in governance operations.
///
/// Every failing operation commits nothing; the error is the only effect.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GovernanceError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Balance oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

/// Coarse classification of a [`GovernanceError`], for transports that map
/// failures onto their own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unauthorized,
    NotFound,
    InvalidArgument,
    InvalidState,
    InvalidOperation,
    Unavailable,
    Corrupted,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::InvalidOperation => "invalid_operation",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Corrupted => "corrupted",
        }
    }
}

impl GovernanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GovernanceError::Unauthorized(_) => ErrorKind::Unauthorized,
            GovernanceError::NotFound(_) => ErrorKind::NotFound,
            GovernanceError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            GovernanceError::InvalidState(_) => ErrorKind::InvalidState,
            GovernanceError::InvalidOperation(_) => ErrorKind::InvalidOperation,
            GovernanceError::OracleUnavailable(_) => ErrorKind::Unavailable,
            GovernanceError::Snapshot(_) => ErrorKind::Corrupted,
        }
    }

    pub(crate) fn vote_not_found(vote_id: u64) -> Self {
        GovernanceError::NotFound(format!("vote {} does not exist", vote_id))
    }
}
