use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use mpk_api::{create_router, AppState};
use mpk_core::db::open_db_in_memory;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    let conn = open_db_in_memory().unwrap();
    create_router(AppState::new(conn), &[])
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn seed(app: &Router) -> Vec<Value> {
    let (status, body) = send(
        app,
        "POST",
        "/api/members/bulk",
        Some(json!([
            { "name": " Alice ab1 ", "org_unit": " Litbang " },
            { "name": "Budi ab1", "org_unit": "Akademik" },
            { "name": "", "org_unit": "ignored" },
            { "name": "Cici ab1", "org_unit": "Logistik" },
            { "name": "Dodi ab1" },
            { "name": "Eka ab1", "org_unit": null },
            { "name": "Feri ab1", "org_unit": "Litbang" },
            { "name": "Budi ab1", "org_unit": "Akademik Baru" },
            null
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "added_or_updated": 7 }));

    let (status, body) = send(app, "GET", "/api/members", None).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array().unwrap().clone()
}

#[tokio::test]
async fn health_reports_version() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].as_str().is_some());
}

#[tokio::test]
async fn bulk_then_list_returns_trimmed_sorted_members() {
    let app = app();
    let members = seed(&app).await;

    assert_eq!(members.len(), 6);
    assert_eq!(members[0]["name"], "Alice ab1");
    assert_eq!(members[0]["org_unit"], "Litbang");
    assert!(members[0]["id"].as_i64().unwrap() > 0);

    let eka = members.iter().find(|m| m["name"] == "Eka ab1").unwrap();
    assert_eq!(eka["org_unit"], Value::Null);
}

#[tokio::test]
async fn list_applies_query_filters() {
    let app = app();
    seed(&app).await;

    let (status, by_org) = send(&app, "GET", "/api/members?org_unit=litbang", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_org.as_array().unwrap().len(), 2);

    let (_, by_name) = send(&app, "GET", "/api/members?name=ci", None).await;
    let by_name = by_name.as_array().unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0]["name"], "Cici ab1");
}

#[tokio::test]
async fn reimport_updates_org_unit_and_keeps_id() {
    let app = app();
    let members = seed(&app).await;
    let budi = members.iter().find(|m| m["name"] == "Budi ab1").unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/members/bulk",
        Some(json!([{ "name": "Budi ab1", "org_unit": "Penelitian" }])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["added_or_updated"], 1);

    let (_, listed) = send(&app, "GET", "/api/members?name=budi", None).await;
    assert_eq!(listed[0]["org_unit"], "Penelitian");
    assert_eq!(listed[0]["id"], budi["id"]);
}

#[tokio::test]
async fn set_members_accepts_mixed_ids_and_deduplicates() {
    let app = app();
    let members = seed(&app).await;
    let id = |index: usize| members[index]["id"].as_i64().unwrap();

    let member_ids = json!([
        id(0).to_string(),
        id(1),
        format!("  {}  ", id(2)),
        id(3).to_string(),
        id(0).to_string()
    ]);
    let (status, body) = send(
        &app,
        "PUT",
        "/api/proposals/proposal-x/members",
        Some(json!({ "memberIds": member_ids })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "count": 4 }));

    let (status, stored) = send(&app, "GET", "/api/proposals/proposal-x/members", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["id"], "proposal-x");
    assert_eq!(stored["title"], "Draft");
    assert_eq!(stored["status"], "DRAFT");
    assert_eq!(stored["memberIds"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn set_members_validation_errors_are_bad_requests() {
    let app = app();
    let cases = [
        (json!({ "memberIds": [1, 2] }), "INSUFFICIENT_MEMBERS", "at least 3"),
        (json!({ "memberIds": [1, 2, 2] }), "INSUFFICIENT_MEMBERS", "at least 3"),
        (json!({ "memberIds": ["abc"] }), "NON_NUMERIC_IDENTIFIER", "index 0"),
        (json!({ "memberIds": [1, "  "] }), "EMPTY_IDENTIFIER", "index 1"),
        (json!({ "memberIds": [3.5, 1, 2] }), "INVALID_IDENTIFIER", "index 0"),
        (json!({ "memberIds": [1, 2, true] }), "INVALID_IDENTIFIER", "index 2"),
        (
            json!({ "memberIds": [9_007_199_254_741_001u64] }),
            "IDENTIFIER_TOO_LARGE",
            "too large",
        ),
        (json!({ "memberIds": null }), "NOT_AN_ARRAY", "memberIds must be an array"),
        (json!({ "memberIds": "1,2,3" }), "NOT_AN_ARRAY", "memberIds must be an array"),
        (json!({}), "NOT_AN_ARRAY", "memberIds must be an array"),
    ];

    for (payload, code, needle) in cases {
        let (status, body) = send(
            &app,
            "PUT",
            "/api/proposals/invalid-proposal/members",
            Some(payload.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
        assert_eq!(body["code"], code, "payload {payload}");
        let message = body["error"].as_str().unwrap();
        assert!(message.contains(needle), "`{message}` lacks `{needle}`");
    }

    let (status, _) = send(&app, "GET", "/api/proposals/invalid-proposal/members", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = app();
    let request = Request::builder()
        .method("PUT")
        .uri("/api/proposals/p1/members")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn negative_numeric_ids_are_accepted() {
    let app = app();
    let (status, body) = send(
        &app,
        "PUT",
        "/api/proposals/p-neg/members",
        Some(json!({ "memberIds": [-5, 2, "10"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "count": 3 }));

    let (_, stored) = send(&app, "GET", "/api/proposals/p-neg/members", None).await;
    assert_eq!(stored["memberIds"], json!(["-5", "2", "10"]));
}

#[tokio::test]
async fn replacing_members_discards_previous_set() {
    let app = app();
    for ids in [json!([1, 2, 3, 4]), json!(["7", "8", "9"])] {
        let (status, _) = send(
            &app,
            "PUT",
            "/api/proposals/p1/members",
            Some(json!({ "memberIds": ids })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, stored) = send(&app, "GET", "/api/proposals/p1/members", None).await;
    assert_eq!(stored["memberIds"], json!(["7", "8", "9"]));
}
