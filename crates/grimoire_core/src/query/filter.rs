use super::{contains_ignore_case, Queryable, RecordField};

/// One AND-term of a store filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterTerm {
    /// At least one of the fields contains the text.
    AnyContains(Vec<RecordField>, String),
    /// The field contains the text.
    Contains(RecordField, String),
    /// At least one element of the sequence field contains the text.
    ElementContains(RecordField, String),
}

impl FilterTerm {
    pub fn matches<R: Queryable>(&self, record: &R) -> bool {
        match self {
            Self::AnyContains(fields, text) => fields
                .iter()
                .any(|field| field_contains(record, *field, text)),
            Self::Contains(field, text) => field_contains(record, *field, text),
            Self::ElementContains(field, text) => record
                .elements(*field)
                .iter()
                .any(|element| contains_ignore_case(element, text)),
        }
    }
}

fn field_contains<R: Queryable>(record: &R, field: RecordField, text: &str) -> bool {
    record
        .text(field)
        .is_some_and(|value| contains_ignore_case(value, text))
}

/// Conjunction of filter terms. An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub terms: Vec<FilterTerm>,
}

impl Filter {
    pub fn is_match_all(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn matches<R: Queryable>(&self, record: &R) -> bool {
        self.terms.iter().all(|term| term.matches(record))
    }
}
