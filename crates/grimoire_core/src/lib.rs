//! Core domain logic for the grimoire catalog.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod envelope;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use envelope::Envelope;
pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogDestination,
    LoggingError, LoggingStatus,
};
pub use model::house::{House, HouseDraft, HousePatch};
pub use model::spell::{Spell, SpellDraft, SpellPatch};
pub use model::{parse_record_id, RecordId, RecordKind, ValidationError};
pub use query::{AppliedFilters, ListOptions, QueryPlan};
pub use repo::house_repo::{HouseRepository, SqliteHouseRepository};
pub use repo::spell_repo::{SpellRepository, SqliteSpellRepository};
pub use repo::{RepoError, RepoResult};
pub use service::house_service::HouseService;
pub use service::spell_service::SpellService;
pub use service::{ListResult, ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
