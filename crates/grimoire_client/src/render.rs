//! Card rendering for the spell and house views.
//!
//! # Invariants
//! - Every user-supplied field is HTML-escaped before interpolation.

use crate::view::ViewEntity;
use grimoire_core::query::AppliedFilters;
use grimoire_core::{House, Spell};

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Crest image of a founding house.
pub fn crest_for(house_name: &str) -> Option<&'static str> {
    match house_name {
        "Gryffindor" => Some("G.png"),
        "Slytherin" => Some("S.png"),
        "Ravenclaw" => Some("R.png"),
        "Hufflepuff" => Some("H.png"),
        _ => None,
    }
}

/// Message shown in place of cards for an empty list.
pub fn empty_message<R: ViewEntity>() -> String {
    format!("No {} found", R::KIND.collection())
}

/// One HTML card per record, or the empty-list message.
pub fn render_cards<R: ViewEntity>(records: &[R]) -> String {
    if records.is_empty() {
        return format!("<p class=\"empty\">{}</p>", empty_message::<R>());
    }
    records
        .iter()
        .map(R::card_html)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Active filters from a server echo as `key=value` pairs, `None` when the
/// list is unfiltered and unsorted.
pub fn describe_filters(applied: &AppliedFilters) -> Option<String> {
    let (pairs, sort_by, order) = match applied {
        AppliedFilters::Spells(spells) => (
            vec![("search", &spells.search), ("type", &spells.kind)],
            &spells.sort_by,
            spells.order.as_str(),
        ),
        AppliedFilters::Houses(houses) => (
            vec![
                ("search", &houses.search),
                ("head", &houses.head),
                ("trait", &houses.trait_filter),
            ],
            &houses.sort_by,
            houses.order.as_str(),
        ),
    };
    let mut parts: Vec<String> = pairs
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|value| format!("{key}={value}")))
        .collect();
    if let Some(sort_by) = sort_by {
        parts.push(format!("sortBy={sort_by} order={order}"));
    }
    (!parts.is_empty()).then(|| parts.join(" "))
}

/// One line per record for terminal output.
pub fn render_text<R: ViewEntity>(records: &[R]) -> String {
    if records.is_empty() {
        return empty_message::<R>();
    }
    records
        .iter()
        .map(R::card_text)
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn spell_card(spell: &Spell) -> String {
    let id = escape_html(&spell.id.to_string());
    format!(
        r#"<div class="list-card" data-id="{id}">
  <div class="card-content">
    <h3>{name}</h3>
    <p><strong>Type:</strong> {kind}</p>
    <p>{description}</p>
  </div>
  {actions}
</div>"#,
        name = escape_html(&spell.name),
        kind = escape_html(&spell.kind),
        description = escape_html(&spell.description),
        actions = card_actions(&id),
    )
}

pub(crate) fn house_card(house: &House) -> String {
    let id = escape_html(&house.id.to_string());
    let name = escape_html(&house.name);
    let crest = crest_for(&house.name)
        .map(|src| format!("\n    <img class=\"crest\" src=\"{src}\" alt=\"{name}\">"))
        .unwrap_or_default();
    format!(
        r#"<div class="list-card" data-id="{id}">
  <div class="card-content">{crest}
    <h3>{name}</h3>
    <p><strong>Head:</strong> {head}</p>
    <p><strong>Symbol:</strong> {symbol}</p>
    <p><strong>Colors:</strong> {colors}</p>
    <p><strong>Traits:</strong> {traits}</p>
    <p>{description}</p>
  </div>
  {actions}
</div>"#,
        head = or_na(house.head.as_deref()),
        symbol = or_na(house.symbol.as_deref()),
        colors = or_na(house.colors.as_deref()),
        traits = escape_html(&house.traits_display()),
        description = escape_html(house.description.as_deref().unwrap_or_default()),
        actions = card_actions(&id),
    )
}

pub(crate) fn spell_line(spell: &Spell) -> String {
    format!(
        "{} [{}] {} ({})",
        spell.name, spell.kind, spell.description, spell.id
    )
}

pub(crate) fn house_line(house: &House) -> String {
    format!(
        "{} | head: {} | traits: {} ({})",
        house.name,
        house.head.as_deref().unwrap_or("N/A"),
        house.traits_display(),
        house.id
    )
}

fn card_actions(escaped_id: &str) -> String {
    format!(
        r#"<div class="card-actions">
    <button class="btn-edit" data-id="{escaped_id}">Edit</button>
    <button class="btn-delete" data-id="{escaped_id}">Delete</button>
  </div>"#
    )
}

fn or_na(value: Option<&str>) -> String {
    escape_html(value.unwrap_or("N/A"))
}
