//! House record model.
//!
//! # Invariants
//! - Only `name` is required; every other text field is optional.
//! - Blank optional text is stored as absent.
//! - `traits` keeps insertion order, which is also display order.

use super::{is_blank, non_blank, RecordId, RecordKind, ValidationError};
use crate::query::{Queryable, RecordField};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted house record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct House {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub colors: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    /// Name of the head of house.
    #[serde(default)]
    pub head: Option<String>,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl House {
    /// Creates an unsaved house with only its name set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            colors: None,
            symbol: None,
            head: None,
            traits: Vec::new(),
            description: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.name) {
            return Err(ValidationError {
                kind: RecordKind::House,
                field: "name",
            });
        }
        Ok(())
    }

    /// Applies a partial update in place.
    ///
    /// Present optional fields that are blank clear the stored value.
    pub fn apply(&mut self, patch: HousePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if patch.colors.is_some() {
            self.colors = non_blank(patch.colors);
        }
        if patch.symbol.is_some() {
            self.symbol = non_blank(patch.symbol);
        }
        if patch.head.is_some() {
            self.head = non_blank(patch.head);
        }
        if let Some(traits) = patch.traits {
            self.traits = normalize_traits(traits);
        }
        if patch.description.is_some() {
            self.description = non_blank(patch.description);
        }
    }

    /// Traits joined for display, or `N/A` when there are none.
    pub fn traits_display(&self) -> String {
        if self.traits.is_empty() {
            "N/A".to_string()
        } else {
            self.traits.join(", ")
        }
    }
}

impl Queryable for House {
    fn text(&self, field: RecordField) -> Option<&str> {
        match field {
            RecordField::Name => Some(&self.name),
            RecordField::Head => self.head.as_deref(),
            RecordField::Description => self.description.as_deref(),
            RecordField::Type | RecordField::Traits => None,
        }
    }

    fn elements(&self, field: RecordField) -> &[String] {
        match field {
            RecordField::Traits => &self.traits,
            _ => &[],
        }
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }
}

/// Create payload for a house.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traits: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl HouseDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Builds an unsaved house, validating the required name.
    pub fn into_house(self) -> Result<House, ValidationError> {
        let mut house = House::new(self.name.unwrap_or_default());
        house.colors = non_blank(self.colors);
        house.symbol = non_blank(self.symbol);
        house.head = non_blank(self.head);
        house.traits = normalize_traits(self.traits.unwrap_or_default());
        house.description = non_blank(self.description);
        house.validate()?;
        Ok(house)
    }
}

/// Partial update payload for a house.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HousePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traits: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Trims trait entries and drops blank ones, keeping order.
pub fn normalize_traits(traits: Vec<String>) -> Vec<String> {
    traits
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

/// Splits comma-separated form input into traits.
pub fn parse_traits(input: &str) -> Vec<String> {
    normalize_traits(input.split(',').map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::{parse_traits, HouseDraft, HousePatch};

    #[test]
    fn draft_normalizes_optional_fields() {
        let draft = HouseDraft {
            name: Some("Gryffindor".to_string()),
            colors: Some("  ".to_string()),
            traits: Some(vec![" brave ".to_string(), String::new(), "bold".to_string()]),
            ..HouseDraft::default()
        };
        let house = draft.into_house().unwrap();
        assert_eq!(house.colors, None);
        assert_eq!(house.traits, vec!["brave", "bold"]);
    }

    #[test]
    fn draft_without_name_is_rejected() {
        let err = HouseDraft::default().into_house().unwrap_err();
        assert_eq!(err.field, "name");
        assert_eq!(err.to_string(), "House name is required");
    }

    #[test]
    fn blank_patch_value_clears_optional_field() {
        let mut house = HouseDraft {
            head: Some("Minerva McGonagall".to_string()),
            symbol: Some("Lion".to_string()),
            ..HouseDraft::named("Gryffindor")
        }
        .into_house()
        .unwrap();

        house.apply(HousePatch {
            head: Some(String::new()),
            ..HousePatch::default()
        });

        assert_eq!(house.head, None);
        assert_eq!(house.symbol.as_deref(), Some("Lion"));
    }

    #[test]
    fn parse_traits_splits_on_commas() {
        assert_eq!(parse_traits("brave, daring,,chivalry "), vec!["brave", "daring", "chivalry"]);
    }
}
