//! HTTP round trips against the full router.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use relief_hub::http::{self, AppState, USER_HEADER};

fn app() -> Router {
    http::router(AppState::new(common::service()))
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<u64>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = user {
        builder = builder.header(USER_HEADER, id.to_string());
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&value).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn register(app: &Router, name: &str, kind: &str) -> u64 {
    let domain = if kind == "poc" { "poc.com" } else { "example.org" };
    let (status, body) = call(
        app,
        Method::POST,
        "/api/users",
        None,
        Some(json!({
            "name": name,
            "email": format!("{}@{domain}", name.to_lowercase()),
            "type": kind,
            "district": "Chennai",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_u64().unwrap()
}

fn rice(quantity: u64) -> Value {
    json!({
        "category": "food-nutrition",
        "specificResource": "Rice",
        "quantity": quantity,
        "unit": "kg",
        "district": "Chennai",
    })
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_registration_rules() {
    let app = app();
    let id = register(&app, "Meera", "organization").await;

    let (status, body) = call(&app, Method::GET, "/api/users/me", Some(id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "organization");
    assert_eq!(body["trustScore"], 0);

    let duplicate = json!({ "name": "Other", "email": "MEERA@example.org", "type": "individual" });
    let (status, _) = call(&app, Method::POST, "/api/users", None, Some(duplicate)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let bad_poc = json!({ "name": "Karthik", "email": "karthik@gmail.com", "type": "poc" });
    let (status, body) = call(&app, Method::POST, "/api/users", None, Some(bad_poc)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "POC email must end with poc.com");

    let bad_email = json!({ "name": "Ravi", "email": "ravi-at-home", "type": "individual" });
    let (status, _) = call(&app, Method::POST, "/api/users", None, Some(bad_email)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_caller_must_be_identified() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/api/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "authentication required");

    let (status, _) = call(&app, Method::GET, "/api/users/me", Some(404), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, Method::POST, "/api/requests", None, Some(rice(5))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Listing is open to anonymous callers
    let (status, body) = call(&app, Method::GET, "/api/requests", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_request_is_matched_against_pool() {
    let app = app();
    let meera = register(&app, "Meera", "organization").await;
    let ravi = register(&app, "Ravi", "individual").await;

    let (status, body) =
        call(&app, Method::POST, "/api/donations", Some(meera), Some(rice(60))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["donation"]["status"], "available");

    let (status, request) =
        call(&app, Method::POST, "/api/requests", Some(ravi), Some(rice(100))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(request["status"], "active");
    assert_eq!(request["fulfilledQuantity"], "60");
    let request_id = request["id"].as_u64().unwrap();

    let (status, donations) = call(
        &app,
        Method::GET,
        &format!("/api/requests/{request_id}/donations"),
        Some(ravi),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(donations.as_array().unwrap().len(), 1);
    assert_eq!(donations[0]["kind"], "match");

    let (_, pools) = call(&app, Method::GET, "/api/donations", None, None).await;
    assert_eq!(pools, json!([]));

    let (status, helped) = call(&app, Method::GET, "/api/requests/helped", Some(meera), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(helped[0]["id"], request_id);

    let (_, inbox) = call(&app, Method::GET, "/api/notifications", Some(ravi), None).await;
    assert_eq!(inbox.as_array().unwrap().len(), 1);
    assert_eq!(inbox[0]["isRead"], false);
    let notification_id = inbox[0]["id"].as_u64().unwrap();

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/notifications/{notification_id}/read"),
        Some(ravi),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let (_, inbox) = call(&app, Method::GET, "/api/notifications", Some(ravi), None).await;
    assert_eq!(inbox[0]["isRead"], true);
}

#[tokio::test]
async fn test_direct_donation() {
    let app = app();
    let meera = register(&app, "Meera", "organization").await;
    let ravi = register(&app, "Ravi", "individual").await;

    let (_, request) = call(&app, Method::POST, "/api/requests", Some(ravi), Some(rice(10))).await;
    let id = request["id"].as_u64().unwrap();

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/requests/{id}/donate"),
        Some(meera),
        Some(json!({ "quantity": "10" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["request"]["status"], "matched");
    assert_eq!(body["donation"]["quantity"], "10");

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/requests/999/donate",
        Some(meera),
        Some(json!({ "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/api/requests/{id}/donate"),
        Some(meera),
        Some(json!({ "quantity": -3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verification_workflow() {
    let app = app();
    let poc = register(&app, "Karthik", "poc").await;
    let ravi = register(&app, "Ravi", "individual").await;

    let mut body = rice(2);
    body["specificResource"] = json!("Cash assistance");
    let (status, request) = call(&app, Method::POST, "/api/requests", Some(ravi), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(request["status"], "pending-verification");
    assert_eq!(request["assignedPoc"]["id"], poc);
    let id = request["id"].as_u64().unwrap();

    let approve = format!("/api/requests/{id}/approve");
    let (status, _) = call(&app, Method::POST, &approve, Some(ravi), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, approved) = call(&app, Method::POST, &approve, Some(poc), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "active");

    let (status, _) = call(&app, Method::POST, &approve, Some(poc), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, rejected) = call(
        &app,
        Method::POST,
        &format!("/api/requests/{id}/reject"),
        Some(poc),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rejected["status"], "rejected");

    let (status, _) = call(&app, Method::POST, "/api/requests/77/approve", Some(poc), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reject_with_reason() {
    let app = app();
    let poc = register(&app, "Karthik", "poc").await;
    let ravi = register(&app, "Ravi", "individual").await;

    let (_, request) = call(&app, Method::POST, "/api/requests", Some(ravi), Some(rice(800))).await;
    assert_eq!(request["status"], "pending-verification");
    let id = request["id"].as_u64().unwrap();

    let (status, rejected) = call(
        &app,
        Method::POST,
        &format!("/api/requests/{id}/reject"),
        Some(poc),
        Some(json!({ "reason": "duplicate request" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rejected["rejectionReason"], "duplicate request");
}

#[tokio::test]
async fn test_validation_and_roles() {
    let app = app();
    let ravi = register(&app, "Ravi", "individual").await;

    let mut body = rice(5);
    body.as_object_mut().unwrap().remove("category");
    let (status, err) = call(&app, Method::POST, "/api/requests", Some(ravi), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "category is required");

    let mut body = rice(5);
    body["urgency"] = json!("whenever");
    let (status, _) = call(&app, Method::POST, "/api/requests", Some(ravi), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::GET, "/api/requests/pinged", Some(ravi), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_pings_and_directories() {
    let app = app();
    let meera = register(&app, "Meera", "organization").await;
    let poc = register(&app, "Karthik", "poc").await;
    let ravi = register(&app, "Ravi", "individual").await;

    let mut body = rice(5);
    body["pingedOrganizations"] = json!([meera]);
    let (status, _) = call(&app, Method::POST, "/api/requests", Some(ravi), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, pinged) = call(&app, Method::GET, "/api/requests/pinged", Some(meera), None).await;
    assert_eq!(pinged.as_array().unwrap().len(), 1);

    let (_, filtered) = call(
        &app,
        Method::GET,
        &format!("/api/requests?orgId={meera}"),
        None,
        None,
    )
    .await;
    assert_eq!(filtered.as_array().unwrap().len(), 1);

    let (_, inbox) = call(&app, Method::GET, "/api/notifications", Some(meera), None).await;
    assert_eq!(inbox[0]["type"], "ping");

    let (_, orgs) = call(&app, Method::GET, "/api/organizations", None, None).await;
    assert_eq!(orgs[0]["id"], meera);
    let (_, pocs) = call(&app, Method::GET, "/api/pocs", None, None).await;
    assert_eq!(pocs[0]["id"], poc);

    let (_, urgency) = call(&app, Method::GET, "/api/stats/urgency", None, None).await;
    assert_eq!(
        urgency,
        json!({ "critical": 0, "high": 0, "low": 0, "medium": 1 })
    );
    let (_, categories) = call(&app, Method::GET, "/api/stats/categories", None, None).await;
    assert_eq!(categories, json!({ "food-nutrition": 1 }));
}
