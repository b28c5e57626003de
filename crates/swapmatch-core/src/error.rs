use crate::types::{ParticipantId, RequestId, RequestKind};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SwapError>;

#[derive(Debug, Error)]
pub enum SwapError {
    #[error("Storage error: {0}")]
    Storage(#[from] redb::Error),

    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Storage operation error: {0}")]
    StorageOperation(#[from] redb::StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Participant {owner} already has an active {kind} request")]
    DuplicateRequest {
        owner: ParticipantId,
        kind: RequestKind,
    },

    #[error("Interest already expressed: from={from}, to={to}")]
    DuplicateInterest {
        from: ParticipantId,
        to: ParticipantId,
    },

    #[error("Request not found or not authorized: {0}")]
    RequestNotFound(RequestId),

    #[error("No interest found: from={from}, to={to}")]
    InterestNotFound {
        from: ParticipantId,
        to: ParticipantId,
    },

    #[error("No incoming interest: from={from}, to={to}")]
    NoIncomingInterest {
        from: ParticipantId,
        to: ParticipantId,
    },

    #[error("No match found between {a} and {b}")]
    MatchNotFound { a: ParticipantId, b: ParticipantId },
}

/// Coarse classification of a [`SwapError`], for callers that translate
/// failures into an external status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required field was absent or malformed. Nothing was applied.
    Validation,
    /// The call would violate an invariant (duplicate request or interest).
    Conflict,
    /// The referenced record does not exist or does not belong to the caller.
    NotFound,
    /// The backing store failed.
    Store,
    /// A view could not be encoded for delivery.
    Internal,
}

impl SwapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SwapError::MissingFields(_) | SwapError::Validation(_) => ErrorKind::Validation,
            SwapError::DuplicateRequest { .. } | SwapError::DuplicateInterest { .. } => {
                ErrorKind::Conflict
            }
            SwapError::RequestNotFound(_)
            | SwapError::InterestNotFound { .. }
            | SwapError::NoIncomingInterest { .. }
            | SwapError::MatchNotFound { .. } => ErrorKind::NotFound,
            SwapError::Storage(_)
            | SwapError::Database(_)
            | SwapError::Table(_)
            | SwapError::Transaction(_)
            | SwapError::Commit(_)
            | SwapError::StorageOperation(_)
            | SwapError::Serialization(_)
            | SwapError::StoreUnavailable(_) => ErrorKind::Store,
            SwapError::Json(_) => ErrorKind::Internal,
        }
    }
}
