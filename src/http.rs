//! The HTTP surface: routing, identity extraction, engine-error → status
//! mapping, and the JSON response envelopes clients already expect.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{MatchedPath, Path, Query, Request, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::engine::{Engine, EngineError};
use crate::model::{
    Actor, BookingStatus, CreateBookingRequest, CreateTourRequest, Role, SignupRequest, Tour,
};
use crate::observability;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/auth/signup", post(signup))
        .route("/tours", get(list_tours).post(create_tour).delete(delete_tour))
        .route("/tours/{id}", get(get_tour).put(update_tour))
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/{id}", patch(update_booking).delete(delete_booking))
        .route("/admin/users", get(admin_users))
        .route("/admin/bookings", get(admin_bookings))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(track_metrics))
        .with_state(state)
}

async fn track_metrics(req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let start = Instant::now();

    let response = next.run(req).await;

    metrics::counter!(
        observability::REQUESTS_TOTAL,
        "route" => route.clone(),
        "status" => response.status().as_u16().to_string()
    )
    .increment(1);
    metrics::histogram!(observability::REQUEST_DURATION_SECONDS, "route" => route)
        .record(start.elapsed().as_secs_f64());
    response
}

// ── Error mapping ────────────────────────────────────────────────

pub struct ApiError(EngineError);

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            EngineError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            EngineError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            EngineError::NotFound(what) => (StatusCode::NOT_FOUND, format!("not found: {what}")),
            EngineError::Forbidden(msg) => (StatusCode::FORBIDDEN, (*msg).to_string()),
            EngineError::InvalidState(msg) => (StatusCode::BAD_REQUEST, (*msg).to_string()),
            EngineError::Storage(e) => {
                // Details go to the log, not to the client.
                tracing::error!("storage failure: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal storage error".to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

// ── Auth ─────────────────────────────────────────────────────────

async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<Value>, ApiError> {
    let user = state.engine.create_user(&req).await?;
    Ok(Json(json!({
        "message": "signup complete",
        "userId": user.id,
    })))
}

// ── Tours ────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToursQuery {
    user_id: Option<String>,
}

async fn list_tours(
    State(state): State<AppState>,
    Query(q): Query<ToursQuery>,
) -> Result<Json<Value>, ApiError> {
    let tours = state.engine.list_tours(q.user_id.as_deref())?;
    Ok(Json(json!({
        "success": true,
        "tours": tours,
        "message": "tour list fetched",
    })))
}

async fn get_tour(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(q): Query<ToursQuery>,
) -> Result<Json<Value>, ApiError> {
    let tour = state.engine.get_tour(id, q.user_id.as_deref())?;
    Ok(Json(json!({ "success": true, "tour": tour })))
}

async fn create_tour(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateTourRequest>,
) -> Result<Json<Value>, ApiError> {
    let actor = auth::actor_from_headers(&headers);
    let tour = state.engine.create_tour(&req, actor.as_ref()).await?;
    Ok(Json(json!({
        "success": true,
        "tour": tour,
        "message": "tour created",
    })))
}

async fn update_tour(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(tour): Json<Tour>,
) -> Result<Json<Value>, ApiError> {
    let actor = auth::actor_from_headers(&headers);
    let tour = state.engine.update_tour(id, tour, actor.as_ref()).await?;
    Ok(Json(json!({
        "success": true,
        "tour": tour,
        "message": "tour updated",
    })))
}

#[derive(Debug, Default, Deserialize)]
struct DeleteTourQuery {
    id: Option<String>,
}

async fn delete_tour(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<DeleteTourQuery>,
) -> Result<Json<Value>, ApiError> {
    let id_str = q
        .id
        .ok_or_else(|| EngineError::Validation("missing tour id".into()))?;
    let id: i64 = id_str
        .parse()
        .map_err(|_| EngineError::NotFound(format!("tour {id_str}")))?;
    let actor = auth::actor_from_headers(&headers);
    state.engine.delete_tour(id, actor.as_ref()).await?;
    Ok(Json(json!({ "success": true, "message": "tour deleted" })))
}

// ── Bookings ─────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingsQuery {
    user_id: Option<String>,
    role: Option<String>,
}

async fn list_bookings(
    State(state): State<AppState>,
    Query(q): Query<BookingsQuery>,
) -> Result<Json<Value>, ApiError> {
    let (Some(user_id), Some(role)) = (q.user_id, q.role) else {
        return Err(EngineError::Validation("userId and role are required".into()).into());
    };
    let role = Role::parse(&role)
        .ok_or_else(|| EngineError::Validation(format!("unknown role: {role}")))?;
    let bookings = state.engine.list_bookings(&Actor::new(user_id, role))?;
    Ok(Json(json!({
        "bookings": bookings,
        "message": "booking list fetched",
    })))
}

async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<Value>, ApiError> {
    let booking = state.engine.create_booking(&req).await?;
    Ok(Json(json!({
        "success": true,
        "booking": booking,
        "message": "booking created",
    })))
}

#[derive(Debug, Default, Deserialize)]
struct UpdateStatusRequest {
    status: Option<String>,
}

async fn update_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, ApiError> {
    let status = body
        .status
        .as_deref()
        .and_then(BookingStatus::parse)
        .ok_or_else(|| EngineError::Validation("missing or unknown status".into()))?;
    let actor = anonymous_or(auth::actor_from_headers(&headers));
    let booking = state.engine.update_booking_status(&id, status, &actor).await?;
    Ok(Json(json!({
        "success": true,
        "booking": booking,
        "message": "booking status updated",
    })))
}

async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let actor = anonymous_or(auth::actor_from_headers(&headers));
    let removed = state.engine.delete_booking(&id, &actor).await?;
    Ok(Json(json!({
        "success": true,
        "deletedBooking": removed,
        "message": "booking deleted",
    })))
}

/// An anonymous caller still reaches the ownership checks (and fails them);
/// the empty id matches no stored booking because travelerId is never empty.
fn anonymous_or(actor: Option<Actor>) -> Actor {
    actor.unwrap_or_else(|| Actor::new("", Role::Traveler))
}

// ── Admin ────────────────────────────────────────────────────────

async fn admin_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let actor = auth::actor_from_headers(&headers);
    let users = state.engine.list_users(actor.as_ref())?;
    Ok(Json(json!({ "users": users })))
}

async fn admin_bookings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let actor = auth::actor_from_headers(&headers);
    let bookings = state.engine.list_all_bookings(actor.as_ref())?;
    Ok(Json(json!({ "bookings": bookings })))
}
