//! Catalog domain model for spells and houses.
//!
//! # Responsibility
//! - Define canonical record shapes shared by store, service and clients.
//! - Define create drafts and update patches with their validation rules.
//!
//! # Invariants
//! - Every record is identified by a stable, store-assigned `RecordId`.
//! - `name` is required and unique within one record kind.
//! - Spell and house records never reference each other.

pub mod house;
pub mod spell;

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a spell or house record.
pub type RecordId = Uuid;

/// Parses a caller-supplied identifier.
///
/// Returns `None` for malformed input so callers can treat it as not found.
pub fn parse_record_id(raw: &str) -> Option<RecordId> {
    Uuid::parse_str(raw.trim()).ok()
}

/// The two independent record types of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Spell,
    House,
}

impl RecordKind {
    /// Capitalized label used in user-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Spell => "Spell",
            Self::House => "House",
        }
    }

    /// Lowercase name used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spell => "spell",
            Self::House => "house",
        }
    }

    /// Collection name, shared by the SQL table and the REST resource path.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Spell => "spells",
            Self::House => "houses",
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation error for create/update payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub kind: RecordKind,
    /// First required field found missing or blank.
    pub field: &'static str,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            RecordKind::Spell => f.write_str("All fields (name, type, description) are required"),
            RecordKind::House => f.write_str("House name is required"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Maps blank optional text to `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !is_blank(text))
}
