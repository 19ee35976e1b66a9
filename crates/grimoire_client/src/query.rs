//! List controls and URL construction.
//!
//! Query strings are built through structured pair serialization, so
//! control text containing `&`, `=` or spaces is always encoded.

use crate::error::ClientError;
use crate::view::ViewEntity;
use grimoire_core::query::{AppliedFilters, SortOrder};
use grimoire_core::{RecordId, RecordKind};
use reqwest::Url;

/// Current values of a view's search, filter and sort controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListControls {
    pub search: String,
    /// `type` for spells, `head` for houses.
    pub filter: String,
    /// Houses only.
    pub trait_filter: String,
    pub sort_by: String,
    pub order: SortOrder,
}

impl From<&AppliedFilters> for ListControls {
    fn from(applied: &AppliedFilters) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        match applied {
            AppliedFilters::Spells(spells) => Self {
                search: text(&spells.search),
                filter: text(&spells.kind),
                trait_filter: String::new(),
                sort_by: text(&spells.sort_by),
                order: SortOrder::parse(Some(spells.order.as_str())),
            },
            AppliedFilters::Houses(houses) => Self {
                search: text(&houses.search),
                filter: text(&houses.head),
                trait_filter: text(&houses.trait_filter),
                sort_by: text(&houses.sort_by),
                order: SortOrder::parse(Some(houses.order.as_str())),
            },
        }
    }
}

impl ListControls {
    fn pairs<R: ViewEntity>(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::new();
        push_present(&mut pairs, "search", &self.search);
        push_present(&mut pairs, R::FILTER_PARAM, &self.filter);
        if R::SUPPORTS_TRAIT_FILTER {
            push_present(&mut pairs, "trait", &self.trait_filter);
        }
        if push_present(&mut pairs, "sortBy", &self.sort_by) {
            pairs.push(("order", self.order.as_str()));
        }
        pairs
    }
}

fn push_present<'a>(pairs: &mut Vec<(&'static str, &'a str)>, key: &'static str, value: &'a str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    pairs.push((key, value));
    true
}

/// Parses and checks a server base URL such as `http://localhost:3000`.
pub fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let url = Url::parse(raw.trim()).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ClientError::InvalidUrl(format!("`{raw}` cannot be a base URL")));
    }
    Ok(url)
}

/// `{base}/api/{collection}` or `{base}/api/{collection}/{id}`.
pub fn resource_url(base: &Url, kind: RecordKind, id: Option<RecordId>) -> Result<Url, ClientError> {
    let mut url = base.clone();
    url.set_query(None);
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(base.to_string()))?;
        segments.pop_if_empty().extend(["api", kind.collection()]);
        if let Some(id) = id {
            segments.push(&id.to_string());
        }
    }
    Ok(url)
}

/// List URL for `R` carrying every non-empty control.
pub fn build_list_url<R: ViewEntity>(base: &Url, controls: &ListControls) -> Result<Url, ClientError> {
    let mut url = resource_url(base, R::KIND, None)?;
    let pairs = controls.pairs::<R>();
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::{build_list_url, parse_base_url, resource_url, ListControls};
    use grimoire_core::query::{AppliedFilters, HouseFilters, SortOrder};
    use grimoire_core::{House, RecordKind, Spell};

    #[test]
    fn empty_controls_produce_bare_collection_url() {
        let base = parse_base_url("http://localhost:3000").unwrap();
        let url = build_list_url::<Spell>(&base, &ListControls::default()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/spells");
    }

    #[test]
    fn control_text_is_percent_encoded() {
        let base = parse_base_url("http://localhost:3000/").unwrap();
        let controls = ListControls {
            search: "fire & ice=1".to_string(),
            ..ListControls::default()
        };
        let url = build_list_url::<Spell>(&base, &controls).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/spells?search=fire+%26+ice%3D1"
        );
    }

    #[test]
    fn order_is_sent_only_with_sort_key() {
        let base = parse_base_url("http://localhost:3000").unwrap();
        let mut controls = ListControls {
            order: SortOrder::Desc,
            ..ListControls::default()
        };
        let url = build_list_url::<House>(&base, &controls).unwrap();
        assert_eq!(url.query(), None);

        controls.sort_by = "head".to_string();
        let url = build_list_url::<House>(&base, &controls).unwrap();
        assert_eq!(url.query(), Some("sortBy=head&order=desc"));
    }

    #[test]
    fn filter_parameter_name_follows_kind() {
        let base = parse_base_url("http://localhost:3000").unwrap();
        let controls = ListControls {
            filter: "charm".to_string(),
            trait_filter: "brave".to_string(),
            ..ListControls::default()
        };
        let spells = build_list_url::<Spell>(&base, &controls).unwrap();
        assert_eq!(spells.query(), Some("type=charm"));
        let houses = build_list_url::<House>(&base, &controls).unwrap();
        assert_eq!(houses.query(), Some("head=charm&trait=brave"));
    }

    #[test]
    fn echoed_filters_rebuild_the_same_query() {
        let applied = AppliedFilters::Houses(HouseFilters {
            search: Some("claw".to_string()),
            head: None,
            trait_filter: Some("wise".to_string()),
            sort_by: Some("name".to_string()),
            order: "desc".to_string(),
        });
        let controls = ListControls::from(&applied);
        assert_eq!(controls.filter, "");
        assert_eq!(controls.order, SortOrder::Desc);

        let base = parse_base_url("http://localhost:3000").unwrap();
        let url = build_list_url::<House>(&base, &controls).unwrap();
        assert_eq!(
            url.query(),
            Some("search=claw&trait=wise&sortBy=name&order=desc")
        );
    }

    #[test]
    fn resource_url_keeps_base_path_prefix() {
        let base = parse_base_url("http://example.test/grimoire/").unwrap();
        let id = uuid_for_test();
        let url = resource_url(&base, RecordKind::House, Some(id)).unwrap();
        assert_eq!(
            url.as_str(),
            format!("http://example.test/grimoire/api/houses/{id}")
        );
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(parse_base_url("mailto:wizard@example.test").is_err());
        assert!(parse_base_url("not a url").is_err());
    }

    fn uuid_for_test() -> grimoire_core::RecordId {
        grimoire_core::parse_record_id("6f1c1c5e-8d0b-4c7e-9a55-2b5f3c9d0e11").unwrap()
    }
}
