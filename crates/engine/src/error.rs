//! The module contains the errors the engine can return.
//!
//! Every failure reaching a caller falls in one of these buckets:
//!
//! - [`Validation`] local input problem, fixed by correcting the input.
//! - [`Indeterminate`] a read needed to decide could not be completed. The
//!   action is blocked; it is never treated as "no" or "zero".
//! - [`Remote`] a mutating procedure failed. Nothing was committed, retrying is
//!   safe.
//! - [`StalePrecondition`] the remote state moved under us (shift already
//!   open, closing already present, backend misconfigured).
//!
//!  [`Validation`]: EngineError::Validation
//!  [`Indeterminate`]: EngineError::Indeterminate
//!  [`Remote`]: EngineError::Remote
//!  [`StalePrecondition`]: EngineError::StalePrecondition
use api_types::rpc::RpcErrorCode;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Could not verify {0}, check your connection and retry")]
    Indeterminate(String),
    #[error("Operation failed: {0}")]
    Remote(String),
    #[error("{0}")]
    StalePrecondition(String),
    #[error("No employee is associated with the current session")]
    MissingIdentity,
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl EngineError {
    /// Returns `true` when the same action can simply be attempted again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Indeterminate(_) | Self::Remote(_))
    }
}

/// Errors a [`Backend`](crate::Backend) reports.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("{status}: {message}")]
    Server { status: u16, message: String },
    #[error("unexpected payload: {0}")]
    Decode(String),
}

pub(crate) const GENERIC_FAILURE: &str = "the server rejected the request";

/// Maps a failed passive read into the taxonomy.
pub(crate) fn read_failed(what: &str, err: BackendError) -> EngineError {
    tracing::warn!("read of {what} failed: {err}");
    EngineError::Indeterminate(what.to_string())
}

/// Maps a failed mutating call into the taxonomy.
pub(crate) fn call_failed(what: &str, err: BackendError) -> EngineError {
    tracing::warn!("{what} failed: {err}");
    match err {
        BackendError::Server { message, .. } if !message.trim().is_empty() => {
            EngineError::Remote(message)
        }
        BackendError::Unavailable(_) => {
            EngineError::Remote(format!("{what}: the server could not be reached"))
        }
        _ => EngineError::Remote(GENERIC_FAILURE.to_string()),
    }
}

/// Maps an explicit `success: false` procedure answer into the taxonomy.
pub(crate) fn rejected(what: &str, code: Option<RpcErrorCode>, message: Option<String>) -> EngineError {
    let message = message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());
    tracing::warn!(code = ?code, "{what} rejected: {}", message.as_deref().unwrap_or("-"));
    match code {
        Some(RpcErrorCode::ShiftAlreadyOpen) => EngineError::StalePrecondition(
            "A shift is already open for today (opened from another session)".to_string(),
        ),
        Some(RpcErrorCode::ShiftNotOpen) => EngineError::StalePrecondition(
            "The shift is no longer open (closed from another session)".to_string(),
        ),
        Some(RpcErrorCode::ClosingExists) => EngineError::StalePrecondition(
            "A daily closing already exists for this shift".to_string(),
        ),
        Some(RpcErrorCode::CategoriesMissing) => EngineError::StalePrecondition(
            "The deficit repair categories are missing in the backend configuration".to_string(),
        ),
        Some(RpcErrorCode::InsufficientBalance) | None => {
            EngineError::Remote(message.unwrap_or_else(|| GENERIC_FAILURE.to_string()))
        }
    }
}
