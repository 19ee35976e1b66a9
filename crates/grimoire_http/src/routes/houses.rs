//! `/api/houses` handlers.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use grimoire_core::{Envelope, House, HouseDraft, HousePatch, ListOptions};
use serde::Deserialize;

/// Query parameters accepted by the house list endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseQuery {
    search: Option<String>,
    head: Option<String>,
    #[serde(rename = "trait")]
    trait_filter: Option<String>,
    sort_by: Option<String>,
    order: Option<String>,
}

impl From<HouseQuery> for ListOptions {
    fn from(query: HouseQuery) -> Self {
        Self {
            search: query.search,
            field_filter: query.head,
            trait_filter: query.trait_filter,
            sort_by: query.sort_by,
            order: query.order,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<HouseQuery>, QueryRejection>,
) -> ApiResult<Json<Envelope<Vec<House>>>> {
    let Query(query) = query?;
    let options = ListOptions::from(query);
    let result = state.houses(move |service| service.list(&options)).await?;
    Ok(Json(Envelope::listing(result.items, result.filters)))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<HouseDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Envelope<House>>)> {
    let Json(draft) = payload?;
    let house = state.houses(move |service| service.create(draft)).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(house).with_message("House created successfully")),
    ))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<House>>> {
    let house = state.houses(move |service| service.get(&id)).await?;
    Ok(Json(Envelope::ok(house)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<HousePatch>, JsonRejection>,
) -> ApiResult<Json<Envelope<House>>> {
    let Json(patch) = payload?;
    let house = state
        .houses(move |service| service.update(&id, patch))
        .await?;
    Ok(Json(
        Envelope::ok(house).with_message("House updated successfully"),
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<House>>> {
    let house = state.houses(move |service| service.delete(&id)).await?;
    Ok(Json(
        Envelope::ok(house).with_message("House deleted successfully"),
    ))
}
