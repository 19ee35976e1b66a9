//! Spell record model.
//!
//! # Invariants
//! - `name`, `kind` and `description` are all required and non-blank.
//! - `kind` is a free-form category serialized as `type`.

use super::{is_blank, RecordId, RecordKind, ValidationError};
use crate::query::{Queryable, RecordField};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted spell record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spell {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    /// Unix epoch milliseconds, assigned by the store.
    #[serde(default)]
    pub created_at: i64,
    /// Unix epoch milliseconds, refreshed by the store on every update.
    #[serde(default)]
    pub updated_at: i64,
}

impl Spell {
    /// Creates an unsaved spell with a freshly generated id.
    ///
    /// Timestamps stay at zero until the store assigns them.
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind: kind.into(),
            description: description.into(),
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing = [
            ("name", &self.name),
            ("type", &self.kind),
            ("description", &self.description),
        ]
        .into_iter()
        .find(|(_, value)| is_blank(value));

        match missing {
            Some((field, _)) => Err(ValidationError {
                kind: RecordKind::Spell,
                field,
            }),
            None => Ok(()),
        }
    }

    /// Applies a partial update in place. Absent fields are left untouched.
    pub fn apply(&mut self, patch: SpellPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
    }
}

impl Queryable for Spell {
    fn text(&self, field: RecordField) -> Option<&str> {
        match field {
            RecordField::Name => Some(&self.name),
            RecordField::Type => Some(&self.kind),
            RecordField::Description => Some(&self.description),
            RecordField::Head | RecordField::Traits => None,
        }
    }

    fn elements(&self, _field: RecordField) -> &[String] {
        &[]
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }
}

/// Create payload for a spell. Missing fields fail validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SpellDraft {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            kind: Some(kind.into()),
            description: Some(description.into()),
        }
    }

    /// Builds an unsaved spell, validating required fields.
    pub fn into_spell(self) -> Result<Spell, ValidationError> {
        let spell = Spell::new(
            self.name.unwrap_or_default(),
            self.kind.unwrap_or_default(),
            self.description.unwrap_or_default(),
        );
        spell.validate()?;
        Ok(spell)
    }
}

/// Partial update payload for a spell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{Spell, SpellDraft, SpellPatch};

    #[test]
    fn draft_with_blank_field_is_rejected() {
        let draft = SpellDraft {
            name: Some("Lumos".to_string()),
            kind: Some("   ".to_string()),
            description: Some("Creates light".to_string()),
        };
        let err = draft.into_spell().unwrap_err();
        assert_eq!(err.field, "type");
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut spell = Spell::new("Lumos", "Charm", "Creates light");
        spell.apply(SpellPatch {
            description: Some("Emits a beam of light".to_string()),
            ..SpellPatch::default()
        });
        assert_eq!(spell.name, "Lumos");
        assert_eq!(spell.kind, "Charm");
        assert_eq!(spell.description, "Emits a beam of light");
    }

    #[test]
    fn serializes_kind_as_type() {
        let spell = Spell::new("Lumos", "Charm", "Creates light");
        let value = serde_json::to_value(&spell).unwrap();
        assert_eq!(value["type"], "Charm");
        assert!(value.get("createdAt").is_some());
    }
}
