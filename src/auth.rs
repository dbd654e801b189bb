//! Caller identity. Token issuance and verification live outside this
//! service; by the time a request arrives, the caller's resolved identity
//! rides in two headers.

use axum::http::HeaderMap;

use crate::model::{Actor, Role};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Resolve the caller from headers. An absent or empty id means anonymous —
/// `None` here, and the access filter then rejects anything that needs an
/// identity. A missing role header defaults to traveler, never to a
/// privileged role.
pub fn actor_from_headers(headers: &HeaderMap) -> Option<Actor> {
    let id = headers.get(USER_ID_HEADER)?.to_str().ok()?.trim();
    if id.is_empty() {
        return None;
    }
    let role = headers
        .get(USER_ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(Role::parse)
        .unwrap_or(Role::Traveler);
    Some(Actor::new(id, role))
}
