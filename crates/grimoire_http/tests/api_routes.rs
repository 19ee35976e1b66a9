use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use grimoire_http::{app, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app() -> Router {
    app(AppState::in_memory().unwrap())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = match to_bytes(response.into_body(), 1024 * 1024).await {
        Ok(bytes) => bytes,
        Err(err) => panic!("failed to read response body: {err}"),
    };
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::String(
        String::from_utf8_lossy(&bytes).into_owned(),
    ));
    (status, json)
}

#[tokio::test]
async fn root_and_health_respond() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("API running".to_string()));

    let (status, body) = send(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn lumos_scenario_over_http() {
    let app = test_app();

    let (status, created) = send(
        &app,
        "POST",
        "/api/spells",
        Some(json!({"name": "Lumos", "type": "Charm", "description": "Creates light"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["message"], "Spell created successfully");
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, listed) = send(&app, "GET", "/api/spells?search=lum", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["data"][0]["id"], id.as_str());
    assert_eq!(listed["filters"]["search"], "lum");
    assert_eq!(listed["filters"]["order"], "asc");

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/spells/{id}"),
        Some(json!({"description": "Emits a beam of light"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["description"], "Emits a beam of light");
    assert_eq!(updated["data"]["name"], "Lumos");
    assert_eq!(updated["data"]["type"], "Charm");

    let (status, deleted) = send(&app, "DELETE", &format!("/api/spells/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["data"]["name"], "Lumos");

    let (status, missing) = send(&app, "GET", &format!("/api/spells/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing, json!({"success": false, "error": "Spell not found"}));
}

#[tokio::test]
async fn duplicate_and_invalid_creates_are_bad_requests() {
    let app = test_app();
    let lumos = json!({"name": "Lumos", "type": "Charm", "description": "Creates light"});

    let (status, _) = send(&app, "POST", "/api/spells", Some(lumos.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "POST", "/api/spells", Some(lumos)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Spell already exists");

    let (status, body) = send(&app, "POST", "/api/spells", Some(json!({"name": "Nox"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "All fields (name, type, description) are required"
    );

    let (status, body) = send(&app, "POST", "/api/houses", Some(json!({"symbol": "Lion"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "House name is required");
}

#[tokio::test]
async fn malformed_json_is_bad_request_envelope() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/spells")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn repeated_query_parameter_is_bad_request_envelope() {
    let app = test_app();
    for uri in ["/api/spells?search=a&search=b", "/api/houses?head=x&head=y"] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["success"], false, "{uri}");
        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with("Malformed query string"), "{message}");
    }
}

#[tokio::test]
async fn malformed_id_is_not_found() {
    let app = test_app();
    let (status, body) = send(&app, "DELETE", "/api/houses/not-an-id", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "House not found");
}

#[tokio::test]
async fn gryffindor_trait_filter_over_http() {
    let app = test_app();
    let (status, _) = send(
        &app,
        "POST",
        "/api/houses",
        Some(json!({"name": "Gryffindor", "traits": ["brave", "bold"]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, brave) = send(&app, "GET", "/api/houses?trait=brav", None).await;
    assert_eq!(brave["count"], 1);
    assert_eq!(brave["data"][0]["traits"], json!(["brave", "bold"]));
    assert_eq!(brave["filters"]["trait"], "brav");
    assert!(brave["filters"]["head"].is_null());

    let (_, sly) = send(&app, "GET", "/api/houses?trait=sly", None).await;
    assert_eq!(sly["count"], 0);
    assert_eq!(sly["data"], json!([]));
}

#[tokio::test]
async fn list_sorts_and_encodes_search_text() {
    let app = test_app();
    for (name, kind) in [("Stupefy", "Charm"), ("Crucio", "Curse"), ("Accio", "Charm")] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/spells",
            Some(json!({"name": name, "type": kind, "description": "fire & ice"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = send(&app, "GET", "/api/spells?type=charm&sortBy=name&order=desc", None).await;
    let names: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|spell| spell["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Stupefy", "Accio"]);
    assert_eq!(body["filters"]["type"], "charm");
    assert_eq!(body["filters"]["sortBy"], "name");

    let (_, body) = send(&app, "GET", "/api/spells?search=fire%20%26%20ice", None).await;
    assert_eq!(body["count"], 3);
}

#[tokio::test]
async fn unknown_route_returns_envelope() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/api/wands", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn cors_preflight_allows_any_origin() {
    let app = test_app();
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/spells")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "PUT")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}
