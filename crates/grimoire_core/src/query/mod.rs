//! Query engine shared by the spell and house list endpoints.
//!
//! # Responsibility
//! - Turn raw list options into a store filter plus an in-memory ordering.
//! - Keep predicate semantics identical whether evaluated by SQLite or in
//!   memory.
//!
//! # Invariants
//! - Absent or empty options impose no constraint.
//! - All present filter terms combine with logical AND.
//! - Unknown sort keys are ignored, never an error.
//! - Sorting is stable: equal keys keep store order.

mod filter;
mod sort;

pub use filter::{Filter, FilterTerm};
pub use sort::{locale_cmp, SortKey, SortOrder, SortSpec};

use crate::model::RecordKind;
use serde::{Deserialize, Serialize};

/// Record fields the query engine can match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Name,
    Description,
    /// Spell category.
    Type,
    /// House head.
    Head,
    /// House trait sequence.
    Traits,
}

impl RecordField {
    /// Column holding this field in the record's table.
    pub fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Type => "type",
            Self::Head => "head",
            Self::Traits => "traits",
        }
    }
}

/// Read access the engine needs from a record.
pub trait Queryable {
    /// Scalar text field value, `None` when absent or not applicable.
    fn text(&self, field: RecordField) -> Option<&str>;
    /// Sequence field value, empty when absent or not applicable.
    fn elements(&self, field: RecordField) -> &[String];
    /// Creation time in epoch milliseconds.
    fn created_at(&self) -> i64;
}

/// Case-insensitive, unanchored substring match.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Raw list options as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOptions {
    pub search: Option<String>,
    /// `type` for spells, `head` for houses.
    pub field_filter: Option<String>,
    /// Houses only; ignored for spells.
    pub trait_filter: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

impl ListOptions {
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn field_filter(mut self, text: impl Into<String>) -> Self {
        self.field_filter = Some(text.into());
        self
    }

    pub fn trait_filter(mut self, text: impl Into<String>) -> Self {
        self.trait_filter = Some(text.into());
        self
    }

    pub fn sort_by(mut self, key: impl Into<String>, order: impl Into<String>) -> Self {
        self.sort_by = Some(key.into());
        self.order = Some(order.into());
        self
    }

    /// Echo of the options as the list endpoint reports them back.
    pub fn applied(&self, kind: RecordKind) -> AppliedFilters {
        let search = present(&self.search).map(str::to_string);
        let sort_by = present(&self.sort_by).map(str::to_string);
        let order = present(&self.order).unwrap_or("asc").to_string();
        match kind {
            RecordKind::Spell => AppliedFilters::Spells(SpellFilters {
                search,
                kind: present(&self.field_filter).map(str::to_string),
                sort_by,
                order,
            }),
            RecordKind::House => AppliedFilters::Houses(HouseFilters {
                search,
                head: present(&self.field_filter).map(str::to_string),
                trait_filter: present(&self.trait_filter).map(str::to_string),
                sort_by,
                order,
            }),
        }
    }
}

/// Filter and ordering derived from [`ListOptions`] for one record kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub filter: Filter,
    pub sort: Option<SortSpec>,
}

impl QueryPlan {
    pub fn for_kind(kind: RecordKind, options: &ListOptions) -> Self {
        let mut terms = Vec::new();

        if let Some(text) = present(&options.search) {
            terms.push(FilterTerm::AnyContains(
                vec![RecordField::Name, RecordField::Description],
                text.to_string(),
            ));
        }

        if let Some(text) = present(&options.field_filter) {
            let field = match kind {
                RecordKind::Spell => RecordField::Type,
                RecordKind::House => RecordField::Head,
            };
            terms.push(FilterTerm::Contains(field, text.to_string()));
        }

        if kind == RecordKind::House {
            if let Some(text) = present(&options.trait_filter) {
                terms.push(FilterTerm::ElementContains(
                    RecordField::Traits,
                    text.to_string(),
                ));
            }
        }

        let sort = present(&options.sort_by)
            .and_then(|raw| SortKey::parse(kind, raw))
            .map(|key| SortSpec {
                key,
                order: SortOrder::parse(options.order.as_deref()),
            });

        Self {
            filter: Filter { terms },
            sort,
        }
    }

    /// Applies the ordering pass to records already retrieved by the store.
    pub fn order<R: Queryable>(&self, records: &mut [R]) {
        if let Some(sort) = &self.sort {
            sort.sort(records);
        }
    }
}

/// Echo of the filters applied to a list request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AppliedFilters {
    Spells(SpellFilters),
    Houses(HouseFilters),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpellFilters {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub sort_by: Option<String>,
    pub order: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HouseFilters {
    pub search: Option<String>,
    pub head: Option<String>,
    #[serde(rename = "trait")]
    pub trait_filter: Option<String>,
    pub sort_by: Option<String>,
    pub order: String,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}
