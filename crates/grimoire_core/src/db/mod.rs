//! Catalog store bootstrap.
//!
//! Opening a store yields a connection with the `contains_ci` helper
//! registered and the catalog schema at the version this binary ships.
//! Schema versions live in `PRAGMA user_version`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failures while opening, preparing or querying the catalog store.
#[derive(Debug)]
pub enum DbError {
    /// The database at `location` could not be opened or created.
    Open {
        location: String,
        source: rusqlite::Error,
    },
    /// A scalar SQL function could not be registered.
    Function {
        name: &'static str,
        source: rusqlite::Error,
    },
    /// A schema migration script failed; nothing from the batch was kept.
    Migration {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
    /// The store was written by a newer release.
    UnsupportedSchemaVersion { found: u32, supported: u32 },
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { location, source } => {
                write!(f, "cannot open catalog store at {location}: {source}")
            }
            Self::Function { name, source } => {
                write!(f, "cannot register SQL function {name}: {source}")
            }
            Self::Migration {
                version,
                name,
                source,
            } => write!(f, "migration {version:04}_{name} failed: {source}"),
            Self::UnsupportedSchemaVersion { found, supported } => write!(
                f,
                "catalog schema version {found} is newer than supported version {supported}"
            ),
            Self::Sqlite(source) => write!(f, "catalog store error: {source}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. }
            | Self::Function { source, .. }
            | Self::Migration { source, .. }
            | Self::Sqlite(source) => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;
    use std::error::Error;

    #[test]
    fn migration_failure_names_the_script() {
        let err = DbError::Migration {
            version: 1,
            name: "init_catalog",
            source: rusqlite::Error::InvalidQuery,
        };
        assert!(err.to_string().starts_with("migration 0001_init_catalog failed"));
        assert!(err.source().is_some());
    }

    #[test]
    fn newer_schema_has_no_underlying_source() {
        let err = DbError::UnsupportedSchemaVersion {
            found: 7,
            supported: 1,
        };
        assert!(err.source().is_none());
        assert!(err.to_string().contains("version 7"));
    }
}
