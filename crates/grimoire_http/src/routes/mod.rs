pub mod houses;
pub mod spells;

use axum::http::{StatusCode, Uri};
use axum::Json;
use grimoire_core::{core_version, Envelope};
use log::warn;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Health {
    status: &'static str,
    version: &'static str,
}

pub async fn root() -> &'static str {
    "API running"
}

pub async fn health() -> Json<Envelope<Health>> {
    Json(Envelope::ok(Health {
        status: "ok",
        version: core_version(),
    }))
}

pub async fn not_found(uri: Uri) -> (StatusCode, Json<Envelope<()>>) {
    warn!("event=http_response module=http status=404 path={uri}");
    (StatusCode::NOT_FOUND, Json(Envelope::failure("Route not found")))
}
