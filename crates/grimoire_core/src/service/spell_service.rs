//! Spell use-case service.
//!
//! # Invariants
//! - Create requires name, type and description, all non-blank.
//! - Update merges a partial patch and re-validates the merged record.

use super::{log_outcome, ListResult, ServiceError, ServiceResult};
use crate::model::spell::{Spell, SpellDraft, SpellPatch};
use crate::model::{parse_record_id, RecordId, RecordKind};
use crate::query::{ListOptions, QueryPlan};
use crate::repo::spell_repo::SpellRepository;
use std::time::Instant;

const KIND: RecordKind = RecordKind::Spell;

/// Spell service facade over a repository implementation.
pub struct SpellService<R: SpellRepository> {
    repo: R,
}

impl<R: SpellRepository> SpellService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a spell after validation and a name uniqueness check.
    pub fn create(&self, draft: SpellDraft) -> ServiceResult<Spell> {
        let started_at = Instant::now();
        let result = self.create_inner(draft);
        log_outcome(KIND, "create", started_at, &result);
        result
    }

    fn create_inner(&self, draft: SpellDraft) -> ServiceResult<Spell> {
        let spell = draft.into_spell()?;
        self.ensure_name_free(&spell.name, None)?;
        self.repo
            .insert_spell(&spell)
            .map_err(|err| ServiceError::from_repo(KIND, err))
    }

    /// Gets one spell by its identifier string.
    pub fn get(&self, raw_id: &str) -> ServiceResult<Spell> {
        let id = resolve_id(raw_id)?;
        self.repo
            .get_spell(id)
            .map_err(|err| ServiceError::from_repo(KIND, err))?
            .ok_or_else(|| ServiceError::not_found(KIND, raw_id))
    }

    /// Lists spells matching `options`, ordered per the requested sort.
    pub fn list(&self, options: &ListOptions) -> ServiceResult<ListResult<Spell>> {
        let started_at = Instant::now();
        let plan = QueryPlan::for_kind(KIND, options);
        let result = self
            .repo
            .find_spells(&plan.filter)
            .map_err(|err| ServiceError::from_repo(KIND, err))
            .map(|mut items| {
                plan.order(&mut items);
                ListResult {
                    count: items.len(),
                    items,
                    filters: options.applied(KIND),
                }
            });
        log_outcome(KIND, "list", started_at, &result);
        result
    }

    /// Applies a partial update and returns the stored result.
    pub fn update(&self, raw_id: &str, patch: SpellPatch) -> ServiceResult<Spell> {
        let started_at = Instant::now();
        let result = self.update_inner(raw_id, patch);
        log_outcome(KIND, "update", started_at, &result);
        result
    }

    fn update_inner(&self, raw_id: &str, patch: SpellPatch) -> ServiceResult<Spell> {
        let mut spell = self.get(raw_id)?;
        spell.apply(patch);
        spell.validate()?;
        self.ensure_name_free(&spell.name, Some(spell.id))?;
        self.repo
            .update_spell(&spell)
            .map_err(|err| ServiceError::from_repo(KIND, err))
    }

    /// Deletes a spell and returns its last known state.
    pub fn delete(&self, raw_id: &str) -> ServiceResult<Spell> {
        let started_at = Instant::now();
        let result = resolve_id(raw_id).and_then(|id| {
            self.repo
                .delete_spell(id)
                .map_err(|err| ServiceError::from_repo(KIND, err))
        });
        log_outcome(KIND, "delete", started_at, &result);
        result
    }

    fn ensure_name_free(&self, name: &str, owner: Option<RecordId>) -> ServiceResult<()> {
        let existing = self
            .repo
            .find_spell_by_name(name)
            .map_err(|err| ServiceError::from_repo(KIND, err))?;
        match existing {
            Some(found) if Some(found.id) != owner => Err(ServiceError::DuplicateName {
                kind: KIND,
                name: name.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

fn resolve_id(raw_id: &str) -> ServiceResult<RecordId> {
    parse_record_id(raw_id).ok_or_else(|| ServiceError::not_found(KIND, raw_id))
}
