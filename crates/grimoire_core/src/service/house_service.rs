//! House use-case service.
//!
//! # Invariants
//! - Create requires a non-blank name; all other fields are optional.
//! - Update merges a partial patch and re-validates the merged record.
//! - Renaming onto another house's name is a duplicate, not an overwrite.

use super::{log_outcome, ListResult, ServiceError, ServiceResult};
use crate::model::house::{House, HouseDraft, HousePatch};
use crate::model::{parse_record_id, RecordId, RecordKind};
use crate::query::{ListOptions, QueryPlan};
use crate::repo::house_repo::HouseRepository;
use std::time::Instant;

const KIND: RecordKind = RecordKind::House;

/// House service facade over a repository implementation.
pub struct HouseService<R: HouseRepository> {
    repo: R,
}

impl<R: HouseRepository> HouseService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a house after validation and a name uniqueness check.
    pub fn create(&self, draft: HouseDraft) -> ServiceResult<House> {
        let started_at = Instant::now();
        let result = self.create_inner(draft);
        log_outcome(KIND, "create", started_at, &result);
        result
    }

    fn create_inner(&self, draft: HouseDraft) -> ServiceResult<House> {
        let house = draft.into_house()?;
        self.ensure_name_free(&house.name, None)?;
        self.repo
            .insert_house(&house)
            .map_err(|err| ServiceError::from_repo(KIND, err))
    }

    /// Gets one house by its identifier string.
    pub fn get(&self, raw_id: &str) -> ServiceResult<House> {
        let id = resolve_id(raw_id)?;
        self.repo
            .get_house(id)
            .map_err(|err| ServiceError::from_repo(KIND, err))?
            .ok_or_else(|| ServiceError::not_found(KIND, raw_id))
    }

    /// Lists houses matching `options`, ordered per the requested sort.
    pub fn list(&self, options: &ListOptions) -> ServiceResult<ListResult<House>> {
        let started_at = Instant::now();
        let plan = QueryPlan::for_kind(KIND, options);
        let result = self
            .repo
            .find_houses(&plan.filter)
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
    pub fn update(&self, raw_id: &str, patch: HousePatch) -> ServiceResult<House> {
        let started_at = Instant::now();
        let result = self.update_inner(raw_id, patch);
        log_outcome(KIND, "update", started_at, &result);
        result
    }

    fn update_inner(&self, raw_id: &str, patch: HousePatch) -> ServiceResult<House> {
        let mut house = self.get(raw_id)?;
        house.apply(patch);
        house.validate()?;
        self.ensure_name_free(&house.name, Some(house.id))?;
        self.repo
            .update_house(&house)
            .map_err(|err| ServiceError::from_repo(KIND, err))
    }

    /// Deletes a house and returns its last known state.
    pub fn delete(&self, raw_id: &str) -> ServiceResult<House> {
        let started_at = Instant::now();
        let result = resolve_id(raw_id).and_then(|id| {
            self.repo
                .delete_house(id)
                .map_err(|err| ServiceError::from_repo(KIND, err))
        });
        log_outcome(KIND, "delete", started_at, &result);
        result
    }

    fn ensure_name_free(&self, name: &str, owner: Option<RecordId>) -> ServiceResult<()> {
        let existing = self
            .repo
            .find_house_by_name(name)
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
