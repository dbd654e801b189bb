use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use tourbook::engine::Engine;
use tourbook::http::{AppState, app};
use tourbook::store::MemoryBackend;

// ── Test infrastructure ──────────────────────────────────────────

fn test_app() -> Router {
    let engine = Engine::new(Arc::new(MemoryBackend::new()));
    app(AppState { engine: Arc::new(engine) })
}

const ADMIN: &[(&str, &str)] = &[("x-user-id", "root"), ("x-user-role", "admin")];

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
        builder = builder.header(*k, *v);
    }
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn sample_tour_body() -> Value {
    json!({
        "title": "River picnic",
        "description": "A walk along the river with a local guide.",
        "price": 30000,
        "duration": "3 hours",
        "guideName": "Kim",
        "availableDates": [{
            "date": "2025-01-15",
            "timeSlots": [
                { "startTime": "09:00", "endTime": "12:00", "maxParticipants": 5 },
                { "startTime": "14:00", "endTime": "17:00", "maxParticipants": 5 }
            ]
        }]
    })
}

fn booking_body(traveler: &str, tour_id: i64, participants: u32, total_price: i64) -> Value {
    json!({
        "tourId": tour_id,
        "tourTitle": "River picnic",
        "guideId": "guide-1",
        "guideName": "Kim",
        "travelerId": traveler,
        "travelerName": traveler,
        "date": "2025-01-15",
        "startTime": "09:00",
        "endTime": "12:00",
        "participants": participants,
        "totalPrice": total_price
    })
}

async fn create_tour(app: &Router) -> i64 {
    let (status, body) = send(app, "POST", "/tours", ADMIN, Some(sample_tour_body())).await;
    assert_eq!(status, StatusCode::OK);
    body["tour"]["id"].as_i64().unwrap()
}

// ── Signup & admin listings ──────────────────────────────────────

#[tokio::test]
async fn signup_then_admin_listing() {
    let app = test_app();

    let body = json!({
        "name": "Kim",
        "email": "kim@example.com",
        "password": "secret-pass",
        "userType": "traveler",
        "birthYear": 1990,
        "gender": "female"
    });
    let (status, resp) = send(&app, "POST", "/auth/signup", &[], Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["userId"], 1);

    // Same email again
    let (status, _) = send(&app, "POST", "/auth/signup", &[], Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Listing requires the admin role
    let (status, _) = send(&app, "GET", "/admin/users", &[], None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, resp) = send(&app, "GET", "/admin/users", ADMIN, None).await;
    assert_eq!(status, StatusCode::OK);
    let users = resp["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert!(users[0].get("password").is_none());
}

#[tokio::test]
async fn signup_validation_errors() {
    let app = test_app();

    let (status, resp) = send(
        &app,
        "POST",
        "/auth/signup",
        &[],
        Some(json!({ "name": "Kim", "email": "kim@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(resp["error"].as_str().unwrap().contains("password"));
}

// ── Tours ────────────────────────────────────────────────────────

#[tokio::test]
async fn tour_crud_is_admin_gated() {
    let app = test_app();

    let (status, _) = send(&app, "POST", "/tours", &[], Some(sample_tour_body())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let traveler = &[("x-user-id", "t1"), ("x-user-role", "customer")];
    let (status, _) = send(&app, "POST", "/tours", traveler, Some(sample_tour_body())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let tour_id = create_tour(&app).await;
    assert_eq!(tour_id, 1);

    // Public listing needs no identity
    let (status, resp) = send(&app, "GET", "/tours", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["tours"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn tour_delete_contract() {
    let app = test_app();
    let tour_id = create_tour(&app).await;

    let (status, _) = send(&app, "DELETE", "/tours", ADMIN, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "DELETE", "/tours?id=999", ADMIN, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &format!("/tours?id={tour_id}"), ADMIN, None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, resp) = send(&app, "GET", "/tours", &[], None).await;
    assert!(resp["tours"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn tour_update_roundtrip() {
    let app = test_app();
    let tour_id = create_tour(&app).await;

    let (_, fetched) = send(&app, "GET", &format!("/tours/{tour_id}"), &[], None).await;
    let mut tour = fetched["tour"].clone();
    tour["title"] = json!("Evening picnic");

    let (status, resp) = send(&app, "PUT", &format!("/tours/{tour_id}"), ADMIN, Some(tour)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["tour"]["title"], "Evening picnic");

    let (status, _) = send(&app, "PUT", "/tours/999", ADMIN, Some(fetched["tour"].clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Bookings ─────────────────────────────────────────────────────

#[tokio::test]
async fn booking_create_contract() {
    let app = test_app();
    let tour_id = create_tour(&app).await;

    // Missing fields → 400 naming the field
    let (status, resp) = send(
        &app,
        "POST",
        "/bookings",
        &[],
        Some(json!({ "tourId": tour_id, "travelerId": "t1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(resp["error"].as_str().unwrap().contains("tourTitle"));

    // Happy path
    let (status, resp) = send(
        &app,
        "POST",
        "/bookings",
        &[],
        Some(booking_body("t1", tour_id, 1, 30_000)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["success"], true);
    assert_eq!(resp["booking"]["status"], "pending");
    assert!(resp["booking"]["id"].as_str().unwrap().starts_with("booking-"));

    // Same traveler, same slot → 409
    let (status, _) = send(
        &app,
        "POST",
        "/bookings",
        &[],
        Some(booking_body("t1", tour_id, 1, 30_000)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Different traveler, same slot → 409 as well
    let (status, _) = send(
        &app,
        "POST",
        "/bookings",
        &[],
        Some(booking_body("t2", tour_id, 1, 30_000)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn booking_listing_contract() {
    let app = test_app();
    let tour_id = create_tour(&app).await;
    send(&app, "POST", "/bookings", &[], Some(booking_body("t1", tour_id, 1, 30_000))).await;

    let (status, _) = send(&app, "GET", "/bookings", &[], None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, resp) = send(&app, "GET", "/bookings?userId=t1&role=customer", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["bookings"].as_array().unwrap().len(), 1);

    let (_, resp) = send(&app, "GET", "/bookings?userId=t2&role=customer", &[], None).await;
    assert!(resp["bookings"].as_array().unwrap().is_empty());

    let (_, resp) = send(&app, "GET", "/bookings?userId=root&role=admin", &[], None).await;
    assert_eq!(resp["bookings"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "GET", "/bookings?userId=t1&role=wizard", &[], None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn booking_status_update_contract() {
    let app = test_app();
    let tour_id = create_tour(&app).await;
    let (_, resp) = send(&app, "POST", "/bookings", &[], Some(booking_body("t1", tour_id, 1, 30_000))).await;
    let id = resp["booking"]["id"].as_str().unwrap().to_string();

    // Unknown id
    let (status, _) = send(
        &app,
        "PATCH",
        "/bookings/booking-missing",
        ADMIN,
        Some(json!({ "status": "confirmed" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Unknown status value
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/bookings/{id}"),
        ADMIN,
        Some(json!({ "status": "held" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Stranger
    let stranger = &[("x-user-id", "t2"), ("x-user-role", "customer")];
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/bookings/{id}"),
        stranger,
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // No identity at all
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/bookings/{id}"),
        &[],
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admin confirms
    let (status, resp) = send(
        &app,
        "PATCH",
        &format!("/bookings/{id}"),
        ADMIN,
        Some(json!({ "status": "confirmed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["booking"]["status"], "confirmed");

    // Owner can no longer cancel a confirmed booking
    let owner = &[("x-user-id", "t1"), ("x-user-role", "customer")];
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/bookings/{id}"),
        owner,
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn booking_delete_contract() {
    let app = test_app();
    let tour_id = create_tour(&app).await;
    let (_, resp) = send(&app, "POST", "/bookings", &[], Some(booking_body("t1", tour_id, 1, 30_000))).await;
    let id = resp["booking"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, "DELETE", "/bookings/booking-missing", ADMIN, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let stranger = &[("x-user-id", "t2"), ("x-user-role", "customer")];
    let (status, _) = send(&app, "DELETE", &format!("/bookings/{id}"), stranger, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Confirm, then the owner may no longer delete — an admin may.
    send(&app, "PATCH", &format!("/bookings/{id}"), ADMIN, Some(json!({ "status": "confirmed" }))).await;

    let owner = &[("x-user-id", "t1"), ("x-user-role", "customer")];
    let (status, _) = send(&app, "DELETE", &format!("/bookings/{id}"), owner, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, resp) = send(&app, "DELETE", &format!("/bookings/{id}"), ADMIN, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["deletedBooking"]["id"], id.as_str());

    let (_, resp) = send(&app, "GET", "/admin/bookings", ADMIN, None).await;
    assert!(resp["bookings"].as_array().unwrap().is_empty());
}

// ── End to end ───────────────────────────────────────────────────

#[tokio::test]
async fn booking_flow_end_to_end() {
    let app = test_app();
    let tour_id = create_tour(&app).await;

    // t1 books 2 participants at 30000 each
    let (status, resp) = send(
        &app,
        "POST",
        "/bookings",
        &[],
        Some(booking_body("t1", tour_id, 2, 60_000)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["booking"]["totalPrice"], 60_000);
    assert_eq!(resp["booking"]["status"], "pending");
    let id = resp["booking"]["id"].as_str().unwrap().to_string();

    // Admin confirms
    let (_, resp) = send(
        &app,
        "PATCH",
        &format!("/bookings/{id}"),
        ADMIN,
        Some(json!({ "status": "confirmed" })),
    )
    .await;
    assert_eq!(resp["booking"]["status"], "confirmed");

    // t2 no longer sees the 09:00 slot...
    let (_, resp) = send(&app, "GET", "/tours?userId=t2", &[], None).await;
    let slots = resp["tours"][0]["availableDates"][0]["timeSlots"].as_array().unwrap();
    assert!(slots.iter().all(|s| s["startTime"] != "09:00"));

    // ...while t1 still does.
    let (_, resp) = send(&app, "GET", "/tours?userId=t1", &[], None).await;
    let slots = resp["tours"][0]["availableDates"][0]["timeSlots"].as_array().unwrap();
    assert!(slots.iter().any(|s| s["startTime"] == "09:00"));
}
