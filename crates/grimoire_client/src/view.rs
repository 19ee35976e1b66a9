//! Per-record-type view behavior.

use crate::form::{EditForm, FormField};
use crate::render;
use grimoire_core::model::house::parse_traits;
use grimoire_core::{House, HouseDraft, RecordId, RecordKind, Spell, SpellDraft};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

/// What a view needs to know about the records it displays.
pub trait ViewEntity: Clone + DeserializeOwned {
    const KIND: RecordKind;
    /// List query parameter carrying the field filter control.
    const FILTER_PARAM: &'static str;
    const SUPPORTS_TRAIT_FILTER: bool = false;

    type Draft: Serialize;

    fn id(&self) -> RecordId;
    fn card_html(&self) -> String;
    fn card_text(&self) -> String;
    fn edit_fields(&self) -> Vec<FormField>;
    /// Full-field update body built from a submitted edit form.
    fn update_payload(form: &EditForm) -> Value;

    /// Local records shown when the list cannot be fetched at all.
    fn fallback_records() -> Vec<Self> {
        Vec::new()
    }
}

impl ViewEntity for Spell {
    const KIND: RecordKind = RecordKind::Spell;
    const FILTER_PARAM: &'static str = "type";

    type Draft = SpellDraft;

    fn id(&self) -> RecordId {
        self.id
    }

    fn card_html(&self) -> String {
        render::spell_card(self)
    }

    fn card_text(&self) -> String {
        render::spell_line(self)
    }

    fn edit_fields(&self) -> Vec<FormField> {
        vec![
            FormField::new("name", self.name.as_str()),
            FormField::new("type", self.kind.as_str()),
            FormField::new("description", self.description.as_str()),
        ]
    }

    fn update_payload(form: &EditForm) -> Value {
        json!({
            "name": form.value("name"),
            "type": form.value("type"),
            "description": form.value("description"),
        })
    }

    fn fallback_records() -> Vec<Self> {
        [
            ("Expelliarmus", "Charm", "Disarms your opponent."),
            ("Lumos", "Charm", "Creates a beam of light from the wand tip."),
            ("Avada Kedavra", "Curse", "Causes instant, painless death."),
            ("Wingardium Leviosa", "Charm", "Makes objects levitate."),
            (
                "Expecto Patronum",
                "Defensive Charm",
                "Summons a Patronus to ward off Dementors.",
            ),
        ]
        .into_iter()
        .map(|(name, kind, description)| Spell::new(name, kind, description))
        .collect()
    }
}

impl ViewEntity for House {
    const KIND: RecordKind = RecordKind::House;
    const FILTER_PARAM: &'static str = "head";
    const SUPPORTS_TRAIT_FILTER: bool = true;

    type Draft = HouseDraft;

    fn id(&self) -> RecordId {
        self.id
    }

    fn card_html(&self) -> String {
        render::house_card(self)
    }

    fn card_text(&self) -> String {
        render::house_line(self)
    }

    fn edit_fields(&self) -> Vec<FormField> {
        let optional = |value: &Option<String>| value.clone().unwrap_or_default();
        vec![
            FormField::new("name", self.name.as_str()),
            FormField::new("colors", optional(&self.colors)),
            FormField::new("symbol", optional(&self.symbol)),
            FormField::new("head", optional(&self.head)),
            FormField::new("traits", self.traits.join(", ")),
            FormField::new("description", optional(&self.description)),
        ]
    }

    fn update_payload(form: &EditForm) -> Value {
        json!({
            "name": form.value("name"),
            "colors": form.value("colors"),
            "symbol": form.value("symbol"),
            "head": form.value("head"),
            "traits": parse_traits(form.value("traits")),
            "description": form.value("description"),
        })
    }
}
