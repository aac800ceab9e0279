//! Typed errors returned by the adapters.
//!
//! Every expected failure has its own variant so callers can match on it directly; the HTTP
//! layer (outside this crate) maps [`Error::kind`] to a status code and [`Error::body`] to the
//! response payload.

use crate::db::errors::DbError;
use crate::types::Entity;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Error categories, one per class of caller-facing response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    Conflict,
    UnprocessableEntity,
    Internal,
}

#[derive(ThisError, Debug)]
pub enum Error {
    /// The actor recorded on a mutation was empty
    #[error("Invalid updated by value")]
    InvalidUpdatedByValue,

    #[error("{entity} name cannot be empty")]
    InvalidName { entity: Entity },

    #[error("{entity} name already exists")]
    DuplicateName { entity: Entity },

    #[error("User email already exists")]
    DuplicateEmail,

    /// No live (non soft-deleted) record matched
    #[error("{entity} not found")]
    NotFound { entity: Entity },

    #[error("{entity} not created")]
    NotCreated { entity: Entity },

    #[error("{entity} not updated")]
    NotUpdated { entity: Entity },

    #[error("{entity} not deleted")]
    NotDeleted { entity: Entity },

    /// An identifier could not be parsed, or a composite key had a nil component
    #[error("Invalid {} id", .entity.to_string().to_lowercase())]
    InvalidId { entity: Entity },

    #[error("{entity} already exists")]
    AlreadyExists { entity: Entity },

    #[error("Session time conflict detected")]
    SessionTimeConflict,

    #[error("User already has an onboarding record")]
    AlreadyOnboarded,

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),
}

/// Serializable error payload: a stable code plus a user-safe message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidUpdatedByValue
            | Error::InvalidName { .. }
            | Error::DuplicateName { .. }
            | Error::DuplicateEmail
            | Error::NotCreated { .. }
            | Error::NotUpdated { .. }
            | Error::NotDeleted { .. } => ErrorKind::BadRequest,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::AlreadyExists { .. } | Error::SessionTimeConflict | Error::AlreadyOnboarded => ErrorKind::Conflict,
            Error::InvalidId { .. } => ErrorKind::UnprocessableEntity,
            Error::Database(_) => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code, e.g. `PLAN_ERROR_001`
    pub fn code(&self) -> String {
        match self {
            Error::InvalidUpdatedByValue => "BAD_REQUEST_ERROR_001".to_string(),
            Error::DuplicateName { .. } => "BAD_REQUEST_ERROR_002".to_string(),
            Error::DuplicateEmail => "BAD_REQUEST_ERROR_003".to_string(),
            Error::InvalidName { entity: Entity::Service } => "BAD_REQUEST_ERROR_005".to_string(),
            Error::InvalidName { .. } => "BAD_REQUEST_ERROR_004".to_string(),
            Error::NotFound { entity } => format!("{}_ERROR_001", entity.code_prefix()),
            Error::NotCreated { entity } => format!("{}_ERROR_002", entity.code_prefix()),
            Error::NotUpdated { entity } => format!("{}_ERROR_003", entity.code_prefix()),
            Error::InvalidId { entity } => format!("{}_ERROR_004", entity.code_prefix()),
            Error::NotDeleted { entity } => format!("{}_ERROR_005", entity.code_prefix()),
            Error::AlreadyExists { entity } => format!("{}_ERROR_006", entity.code_prefix()),
            Error::SessionTimeConflict => "CONFLICT_ERROR_001".to_string(),
            Error::AlreadyOnboarded => "ONBOARDING_ERROR_006".to_string(),
            Error::Database(_) => "INTERNAL_SERVER_ERROR_004".to_string(),
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Database(_) => "An unexpected error occurred.".to_string(),
            other => other.to_string(),
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code(),
            message: self.user_message(),
        }
    }

    /// Log the error at a level matching its severity
    pub fn log(&self) {
        match self.kind() {
            ErrorKind::Internal => tracing::error!("Internal database error: {:#}", self),
            ErrorKind::Conflict => tracing::warn!("Conflict error: {}", self),
            _ => tracing::debug!("Client error: {}", self),
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Database(DbError::from(err))
    }
}

/// Type alias for adapter operation results
pub type Result<T> = std::result::Result<T, Error>;
