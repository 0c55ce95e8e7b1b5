//! RPC error types.

use jsonrpsee::types::error::ErrorObjectOwned;
use thiserror::Error;
use votedao_governance::GovernanceError;

/// JSON-RPC error codes used by the `dao_` methods.
pub mod error_codes {
    /// Invalid params
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error
    pub const INTERNAL_ERROR: i32 = -32603;
    /// Operation not allowed in the current state of the engine
    pub const INVALID_OPERATION: i32 = -32000;
    /// Vote or ballot not found
    pub const RESOURCE_NOT_FOUND: i32 = -32001;
    /// Vote not open
    pub const INVALID_STATE: i32 = -32002;
    /// Caller is not an admin
    pub const UNAUTHORIZED: i32 = -32003;
}

/// RPC errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RpcError {
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl RpcError {
    /// Get the error code.
    pub fn code(&self) -> i32 {
        match self {
            RpcError::InvalidParams(_) => error_codes::INVALID_PARAMS,
            RpcError::ResourceNotFound(_) => error_codes::RESOURCE_NOT_FOUND,
            RpcError::Unauthorized(_) => error_codes::UNAUTHORIZED,
            RpcError::InvalidState(_) => error_codes::INVALID_STATE,
            RpcError::InvalidOperation(_) => error_codes::INVALID_OPERATION,
            RpcError::Unavailable(_) => error_codes::INTERNAL_ERROR,
            RpcError::InternalError(_) => error_codes::INTERNAL_ERROR,
        }
    }

    /// Convert to JSON-RPC error object.
    pub fn to_error_object(&self) -> ErrorObjectOwned {
        ErrorObjectOwned::owned(self.code(), self.to_string(), None::<()>)
    }
}

impl From<RpcError> for ErrorObjectOwned {
    fn from(err: RpcError) -> Self {
        err.to_error_object()
    }
}

impl From<GovernanceError> for RpcError {
    fn from(err: GovernanceError) -> Self {
        match err {
            GovernanceError::Unauthorized(msg) => RpcError::Unauthorized(msg),
            GovernanceError::NotFound(msg) => RpcError::ResourceNotFound(msg),
            GovernanceError::InvalidArgument(msg) => RpcError::InvalidParams(msg),
            GovernanceError::InvalidState(msg) => RpcError::InvalidState(msg),
            GovernanceError::InvalidOperation(msg) => RpcError::InvalidOperation(msg),
            GovernanceError::OracleUnavailable(msg) => RpcError::Unavailable(msg),
            GovernanceError::Snapshot(msg) => RpcError::InternalError(msg),
        }
    }
}
