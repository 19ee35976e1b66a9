//! Record services: validation and orchestration over the record store.
//!
//! # Responsibility
//! - Validate drafts and merged patches before any store mutation.
//! - Enforce name uniqueness with a pre-insert lookup backed by the store's
//!   UNIQUE constraint.
//! - Translate repository failures into the catalog error taxonomy.
//!
//! # Invariants
//! - Services are stateless; all state lives in the store.
//! - A rejected create or update performs no write.

pub mod house_service;
pub mod spell_service;

use crate::model::{RecordKind, ValidationError};
use crate::query::AppliedFilters;
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure taxonomy surfaced to HTTP and other callers.
#[derive(Debug)]
pub enum ServiceError {
    /// Missing or blank required field.
    Validation(ValidationError),
    /// Another record of the same kind already uses this name.
    DuplicateName { kind: RecordKind, name: String },
    /// No record resolves from the identifier, including malformed ones.
    NotFound { kind: RecordKind, id: String },
    /// Any other store failure.
    Store(RepoError),
}

impl ServiceError {
    pub(crate) fn not_found(kind: RecordKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub(crate) fn from_repo(kind: RecordKind, err: RepoError) -> Self {
        match err {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound(id) => Self::not_found(kind, id.to_string()),
            RepoError::DuplicateName(name) => Self::DuplicateName { kind, name },
            other => Self::Store(other),
        }
    }

    /// Stable machine-readable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::DuplicateName { .. } => "duplicate_name",
            Self::NotFound { .. } => "not_found",
            Self::Store(_) => "store",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateName { kind, .. } => write!(f, "{} already exists", kind.label()),
            Self::NotFound { kind, .. } => write!(f, "{} not found", kind.label()),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// List result: ordered records, their count and the applied filter echo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListResult<R> {
    pub items: Vec<R>,
    pub count: usize,
    pub filters: AppliedFilters,
}

pub(crate) fn log_outcome<T>(
    kind: RecordKind,
    operation: &str,
    started_at: Instant,
    result: &ServiceResult<T>,
) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(_) => info!(
            "event={kind}_{operation} module=service status=ok duration_ms={duration_ms}"
        ),
        Err(err) => warn!(
            "event={kind}_{operation} module=service status=error duration_ms={duration_ms} error_code={}",
            err.code()
        ),
    }
}
