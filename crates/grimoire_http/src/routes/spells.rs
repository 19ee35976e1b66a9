//! `/api/spells` handlers.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use grimoire_core::{Envelope, ListOptions, Spell, SpellDraft, SpellPatch};
use serde::Deserialize;

/// Query parameters accepted by the spell list endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellQuery {
    search: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    sort_by: Option<String>,
    order: Option<String>,
}

impl From<SpellQuery> for ListOptions {
    fn from(query: SpellQuery) -> Self {
        Self {
            search: query.search,
            field_filter: query.kind,
            trait_filter: None,
            sort_by: query.sort_by,
            order: query.order,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<SpellQuery>, QueryRejection>,
) -> ApiResult<Json<Envelope<Vec<Spell>>>> {
    let Query(query) = query?;
    let options = ListOptions::from(query);
    let result = state.spells(move |service| service.list(&options)).await?;
    Ok(Json(Envelope::listing(result.items, result.filters)))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<SpellDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Envelope<Spell>>)> {
    let Json(draft) = payload?;
    let spell = state.spells(move |service| service.create(draft)).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(spell).with_message("Spell created successfully")),
    ))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<Spell>>> {
    let spell = state.spells(move |service| service.get(&id)).await?;
    Ok(Json(Envelope::ok(spell)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SpellPatch>, JsonRejection>,
) -> ApiResult<Json<Envelope<Spell>>> {
    let Json(patch) = payload?;
    let spell = state
        .spells(move |service| service.update(&id, patch))
        .await?;
    Ok(Json(
        Envelope::ok(spell).with_message("Spell updated successfully"),
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<Spell>>> {
    let spell = state.spells(move |service| service.delete(&id)).await?;
    Ok(Json(
        Envelope::ok(spell).with_message("Spell deleted successfully"),
    ))
}
