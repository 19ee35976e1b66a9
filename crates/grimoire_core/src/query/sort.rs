use super::Queryable;
use super::RecordField;
use crate::model::RecordKind;
use icu_collator::options::CollatorOptions;
use icu_collator::CollatorBorrowed;
use std::cmp::Ordering;

thread_local! {
    static ROOT_COLLATOR: Option<CollatorBorrowed<'static>> =
        CollatorBorrowed::try_new(Default::default(), CollatorOptions::default())
            .map_err(|err| log::warn!("event=collator_init module=query status=error error={err}"))
            .ok();
}

/// Sort keys accepted by the list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    /// Spells only.
    Type,
    /// Houses only.
    Head,
    CreatedAt,
}

impl SortKey {
    /// Parses a `sortBy` value. Keys foreign to `kind` are rejected.
    pub fn parse(kind: RecordKind, raw: &str) -> Option<Self> {
        match (kind, raw) {
            (_, "name") => Some(Self::Name),
            (_, "createdAt") => Some(Self::CreatedAt),
            (RecordKind::Spell, "type") => Some(Self::Type),
            (RecordKind::House, "head") => Some(Self::Head),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Only `desc` selects descending order.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn compare<R: Queryable>(&self, a: &R, b: &R) -> Ordering {
        let ordering = match self.key {
            SortKey::Name => compare_text(a, b, RecordField::Name),
            SortKey::Type => compare_text(a, b, RecordField::Type),
            SortKey::Head => compare_text(a, b, RecordField::Head),
            SortKey::CreatedAt => a.created_at().cmp(&b.created_at()),
        };
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    /// Stable in-place sort.
    pub fn sort<R: Queryable>(&self, records: &mut [R]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}

// Absent values order before present ones.
fn compare_text<R: Queryable>(a: &R, b: &R, field: RecordField) -> Ordering {
    match (a.text(field), b.text(field)) {
        (Some(left), Some(right)) => locale_cmp(left, right),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Root-locale collation order, raw text as tiebreak.
///
/// Falls back to case-folded comparison when collation data is unavailable.
pub fn locale_cmp(left: &str, right: &str) -> Ordering {
    ROOT_COLLATOR
        .with(|collator| match collator {
            Some(collator) => collator.compare(left, right),
            None => left.to_lowercase().cmp(&right.to_lowercase()),
        })
        .then_with(|| left.cmp(right))
}
