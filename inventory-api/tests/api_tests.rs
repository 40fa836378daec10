//! Integration tests for inventory-api endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - Instrument CRUD, archive toggle, listing with filters/sort/pagination
//! - City and category endpoints, including the city delete guard
//! - JSON and CSV export
//! - Error envelope and status codes

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use inventory_api::{build_router, AppState};
use inventory_common::Store;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: app over a fresh database, authorization disabled
///
/// Returns (TempDir, Router) - TempDir must be kept alive for duration of test
async fn setup_app() -> (TempDir, axum::Router) {
    let temp_dir = TempDir::new().expect("Should create temp dir");
    let store = Store::open(&temp_dir.path().join("inventory.sqlite"))
        .await
        .expect("Should open store");
    (temp_dir, build_router(AppState::new(store, None)))
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Test helper: send a request and return status plus parsed body
async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, extract_json(response).await)
}

async fn create_instrument(app: &axum::Router, body: Value) -> Value {
    let (status, body) = send(app, json_request("POST", "/api/instruments", body)).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    body["data"].clone()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (_dir, app) = setup_app().await;

    let (status, body) = send(&app, test_request("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "inventory-api");
    assert!(body["version"].is_string());
}

// =============================================================================
// Instruments
// =============================================================================

#[tokio::test]
async fn test_create_and_get_instrument() {
    let (_dir, app) = setup_app().await;

    let created = create_instrument(
        &app,
        json!({
            "city_id": 1,
            "name": "Скальпель",
            "category": "Врачам",
            "quantity": 25,
            "received_at": "2024-03-05",
            "note": "Одноразовый"
        }),
    )
    .await;

    assert_eq!(created["city_name"], "Москва");
    assert_eq!(created["status"], "available");
    assert_eq!(created["lookup"], "скальпель врачам");
    assert_eq!(created["archived"], false);

    let id = created["id"].as_i64().unwrap();
    let (status, body) = send(&app, test_request("GET", &format!("/api/instruments/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], Value::Null);
    assert_eq!(body["data"], created);
}

#[tokio::test]
async fn test_listing_scenario() {
    let (_dir, app) = setup_app().await;

    let a = create_instrument(
        &app,
        json!({ "city_id": 1, "name": "Скальпель", "category": "Врачам", "quantity": 25 }),
    )
    .await;
    let b = create_instrument(
        &app,
        json!({ "city_id": 1, "name": "Зеркало", "category": "Студентам", "quantity": 0 }),
    )
    .await;
    assert_eq!(b["archived"], true);

    let (status, body) = send(&app, test_request("GET", "/api/instruments?cityId=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["totalPages"], 1);
    assert_eq!(body["data"]["pageSize"], 50);
    assert_eq!(body["data"]["items"][0]["id"], a["id"]);

    let (_, body) = send(&app, test_request("GET", "/api/instruments?cityId=1&archived=1")).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["id"], b["id"]);

    let (_, body) = send(
        &app,
        test_request("GET", "/api/instruments?cityId=1&q=%D0%A1%D0%9A%D0%90%D0%9B%D0%AC"),
    )
    .await;
    assert_eq!(body["data"]["total"], 1, "uppercase 'СКАЛЬ' matches");

    let b_id = b["id"].as_i64().unwrap();
    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/instruments/{}", b_id),
            json!({ "city_id": 1, "name": "Зеркало", "category": "Студентам", "quantity": 10 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["archived"], true, "raising quantity never restores");

    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            &format!("/api/instruments/{}/archive", b_id),
            json!({ "archived": false }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["archived"], false);
    assert_eq!(body["data"]["quantity"], 10);

    let (_, body) = send(&app, test_request("GET", "/api/instruments?cityId=1")).await;
    assert_eq!(body["data"]["total"], 2);
}

#[tokio::test]
async fn test_pagination_and_lenient_params() {
    let (_dir, app) = setup_app().await;
    for n in 1..=5 {
        create_instrument(&app, json!({ "city_id": 2, "name": format!("Бор {}", n), "quantity": n })).await;
    }

    let (_, body) = send(&app, test_request("GET", "/api/instruments?pageSize=2&page=3")).await;
    assert_eq!(body["data"]["total"], 5);
    assert_eq!(body["data"]["totalPages"], 3);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);

    // Unparsable numbers and unknown sort fall back to defaults
    let (status, body) = send(
        &app,
        test_request("GET", "/api/instruments?page=abc&pageSize=zzz&sortBy=DROP%20TABLE&order=up"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["page"], 1);
    assert_eq!(body["data"]["pageSize"], 50);
    let ids: Vec<i64> = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, [5, 4, 3, 2, 1]);

    let (_, body) = send(&app, test_request("GET", "/api/instruments?sortBy=quantity&order=ASC")).await;
    let quantities: Vec<i64> = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["quantity"].as_i64().unwrap())
        .collect();
    assert_eq!(quantities, [1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_status_filter() {
    let (_dir, app) = setup_app().await;
    create_instrument(&app, json!({ "city_id": 1, "name": "A", "quantity": 1, "status": "in_transit" })).await;
    create_instrument(&app, json!({ "city_id": 1, "name": "B", "quantity": 1 })).await;

    let (_, body) = send(&app, test_request("GET", "/api/instruments?status=in_transit")).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["name"], "A");

    let (status, body) = send(&app, test_request("GET", "/api/instruments?status=broken")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"], Value::Null);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_instrument_errors() {
    let (_dir, app) = setup_app().await;

    let (status, body) = send(&app, test_request("GET", "/api/instruments/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["data"], Value::Null);

    let (status, _) = send(&app, json_request("POST", "/api/instruments", json!({ "city_id": 1, "name": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        json_request("POST", "/api/instruments", json!({ "city_id": 1, "name": "x", "quantity": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        json_request("POST", "/api/instruments", json!({ "city_id": 1, "name": "x", "status": "lost" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, json_request("POST", "/api/instruments", json!({ "city_id": 77, "name": "x" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "unknown city");

    let (status, body) = send(&app, json_request("POST", "/api/instruments", json!({ "name": "no city" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_unparsable_id_uses_error_envelope() {
    let (_dir, app) = setup_app().await;

    for (method, uri) in [
        ("GET", "/api/instruments/abc"),
        ("DELETE", "/api/instruments/1.5"),
        ("DELETE", "/api/cities/xyz"),
        ("PUT", "/api/categories/-"),
    ] {
        let request = if method == "PUT" {
            json_request(method, uri, json!({ "name": "x" }))
        } else {
            test_request(method, uri)
        };
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", method, uri);
        assert_eq!(body["data"], Value::Null, "{} {}", method, uri);
        assert!(body["error"].is_string(), "{} {}", method, uri);
    }
}

#[tokio::test]
async fn test_blank_received_at_is_stored_as_null() {
    let (_dir, app) = setup_app().await;

    let created = create_instrument(
        &app,
        json!({ "city_id": 1, "name": "Зонд", "received_at": "", "quantity": 1 }),
    )
    .await;
    assert_eq!(created["received_at"], Value::Null);

    let uri = format!("/api/instruments/{}", created["id"]);
    let (status, body) = send(
        &app,
        json_request("PUT", &uri, json!({ "city_id": 1, "name": "Зонд", "received_at": "2024-03-05", "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["received_at"], "2024-03-05");

    let (status, body) = send(
        &app,
        json_request("PUT", &uri, json!({ "city_id": 1, "name": "Зонд", "received_at": "  ", "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["received_at"], Value::Null);

    let (status, body) = send(
        &app,
        json_request("POST", "/api/instruments", json!({ "city_id": 1, "name": "Зонд", "received_at": "05.03.2024" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_delete_instrument() {
    let (_dir, app) = setup_app().await;
    let created = create_instrument(&app, json!({ "city_id": 1, "name": "Щуп", "quantity": 1 })).await;
    let uri = format!("/api/instruments/{}", created["id"]);

    let (status, body) = send(&app, test_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], created["id"]);

    let (status, _) = send(&app, test_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Cities and categories
// =============================================================================

#[tokio::test]
async fn test_cities_with_counts() {
    let (_dir, app) = setup_app().await;
    create_instrument(&app, json!({ "city_id": 3, "name": "A", "quantity": 0 })).await;

    let (status, body) = send(&app, test_request("GET", "/api/cities")).await;
    assert_eq!(status, StatusCode::OK);

    let cities = body["data"].as_array().unwrap();
    assert_eq!(cities.len(), 3);
    let volgograd = cities.iter().find(|c| c["id"] == 3).unwrap();
    assert_eq!(volgograd["name"], "Волгоград");
    assert_eq!(volgograd["instruments_count"], 1);
}

#[tokio::test]
async fn test_city_lifecycle() {
    let (_dir, app) = setup_app().await;

    let (status, body) = send(&app, json_request("POST", "/api/cities", json!({ "name": "Тула" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = send(&app, json_request("POST", "/api/cities", json!({ "name": "Тула" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        json_request("PUT", &format!("/api/cities/{}", id), json!({ "name": "Тверь" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Тверь");

    create_instrument(&app, json!({ "city_id": id, "name": "Бор", "quantity": 1 })).await;

    let (status, body) = send(&app, test_request("DELETE", &format!("/api/cities/{}", id))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("1 instruments"));

    let (status, _) = send(&app, test_request("GET", &format!("/api/cities/{}", id))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, test_request("DELETE", "/api/cities/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_category_endpoints() {
    let (_dir, app) = setup_app().await;

    let (_, body) = send(&app, test_request("GET", "/api/categories")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let (status, body) = send(&app, json_request("POST", "/api/categories", json!({ "name": "Ортодонтам" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = send(&app, json_request("POST", "/api/categories", json!({ "name": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, test_request("DELETE", &format!("/api/categories/{}", id))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, test_request("GET", &format!("/api/categories/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Export
// =============================================================================

#[tokio::test]
async fn test_export_json_follows_filters() {
    let (_dir, app) = setup_app().await;
    create_instrument(&app, json!({ "city_id": 1, "name": "A", "quantity": 1, "status": "out_of_stock" })).await;
    create_instrument(&app, json!({ "city_id": 2, "name": "B", "quantity": 1 })).await;
    create_instrument(&app, json!({ "city_id": 1, "name": "C", "quantity": 0 })).await;

    let (status, body) = send(&app, test_request("GET", "/api/export/instruments")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["B", "A"], "active only, id desc");

    let (_, body) = send(&app, test_request("GET", "/api/export/instruments?cityId=1")).await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status"], "Отсутствует");
    assert_eq!(rows[0]["category"], "");

    let (_, body) = send(&app, test_request("GET", "/api/export/instruments?archived=1")).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["C"], "archived rows only on request");
}

#[tokio::test]
async fn test_export_csv() {
    let (_dir, app) = setup_app().await;
    create_instrument(
        &app,
        json!({ "city_id": 1, "name": "Скальпель", "category": "Врачам", "quantity": 25, "received_at": "2024-03-05" }),
    )
    .await;

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/export/instruments.csv"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        [
            "ID,Город,Наименование,Категория,Количество,Дата поступления,Состояние,Примечание",
            "1,Москва,Скальпель,Врачам,25,2024-03-05,В наличии,",
        ]
    );
}
