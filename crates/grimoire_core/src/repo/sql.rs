//! SQL fragments shared by the record repositories.

use super::{RepoError, RepoResult};
use crate::model::RecordId;
use crate::query::{Filter, FilterTerm};
use rusqlite::types::Value;
use rusqlite::{Connection, ErrorCode};
use uuid::Uuid;

/// Current time in Unix epoch milliseconds, evaluated by SQLite.
pub(crate) const NOW_MS_SQL: &str = "CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)";

/// Builds a `WHERE` clause (empty for match-all) and its bind values.
pub(crate) fn where_clause(table: &str, filter: &Filter) -> (String, Vec<Value>) {
    if filter.is_match_all() {
        return (String::new(), Vec::new());
    }

    let mut clauses = Vec::with_capacity(filter.terms.len());
    let mut binds = Vec::new();

    for term in &filter.terms {
        match term {
            FilterTerm::AnyContains(fields, text) => {
                let alternatives = fields
                    .iter()
                    .map(|field| {
                        binds.push(Value::Text(text.clone()));
                        format!("contains_ci({}, ?)", field.column())
                    })
                    .collect::<Vec<_>>();
                clauses.push(format!("({})", alternatives.join(" OR ")));
            }
            FilterTerm::Contains(field, text) => {
                binds.push(Value::Text(text.clone()));
                clauses.push(format!("contains_ci({}, ?)", field.column()));
            }
            FilterTerm::ElementContains(field, text) => {
                binds.push(Value::Text(text.clone()));
                clauses.push(format!(
                    "EXISTS (
                        SELECT 1
                        FROM json_each({table}.{column}) AS element
                        WHERE contains_ci(element.value, ?)
                    )",
                    column = field.column()
                ));
            }
        }
    }

    (format!(" WHERE {}", clauses.join(" AND ")), binds)
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        }
        _ => false,
    }
}

pub(crate) fn parse_id(value: &str, table: &str) -> RepoResult<RecordId> {
    Uuid::parse_str(value).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{value}` in {table}.id"))
    })
}

pub(crate) fn ensure_table_ready(conn: &Connection, table: &'static str) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::MissingRequiredTable(table));
    }
    Ok(())
}
