//! Record store: repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Provide insert/get/find/update/delete per record kind.
//! - Translate query-engine filters into SQL, keeping SQL inside this layer.
//!
//! # Invariants
//! - Write paths validate records before any SQL mutation.
//! - A `name` uniqueness violation surfaces as `RepoError::DuplicateName`,
//!   whether caught by a pre-check or by the table's UNIQUE constraint.
//! - Read paths reject undecodable rows instead of masking them.

pub mod house_repo;
pub mod spell_repo;
mod sql;

use crate::db::DbError;
use crate::model::{RecordId, ValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound(RecordId),
    DuplicateName(String),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::DuplicateName(name) => write!(f, "record named `{name}` already exists"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
