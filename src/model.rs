use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Roles & identity ─────────────────────────────────────────────

/// Role attached to every user and to every authenticated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Books tours. The legacy wire spelling `customer` is accepted on input.
    #[serde(alias = "customer")]
    Traveler,
    Guide,
    Admin,
}

impl Role {
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "traveler" | "customer" => Some(Role::Traveler),
            "guide" => Some(Role::Guide),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Caller identity as resolved by the transport layer. Token verification
/// happens upstream; by the time a request reaches the engine it is just
/// an id plus a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self { id: id.into(), role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// An id that may arrive as a JSON number or a string. The store always
/// keeps the string form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Num(i64),
    Text(String),
}

impl IdValue {
    pub fn as_string(&self) -> String {
        match self {
            IdValue::Num(n) => n.to_string(),
            IdValue::Text(s) => s.clone(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            IdValue::Num(n) => Some(*n),
            IdValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

// ── Booking status ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// Live bookings count against slot availability.
    pub fn is_live(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn parse(s: &str) -> Option<BookingStatus> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            "completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

// ── Tours ────────────────────────────────────────────────────────

/// A bookable capacity template within one calendar date. Capacity is binary:
/// one live booking takes the whole slot, `max_participants` only caps the
/// group size of that single booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`
    pub end_time: String,
    pub max_participants: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableDate {
    /// `YYYY-MM-DD`
    pub date: String,
    pub time_slots: Vec<TimeSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Price per participant in the smallest currency unit.
    pub price: i64,
    /// Human-readable duration label, e.g. "3 hours".
    pub duration: String,
    #[serde(default)]
    pub details: Vec<String>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub guide_id: String,
    pub guide_name: String,
    #[serde(default)]
    pub guide_description: String,
    #[serde(default)]
    pub guide_image: String,
    #[serde(default)]
    pub guide_rating: f64,
    #[serde(default)]
    pub guide_specialties: Vec<String>,
    #[serde(default = "default_tour_max_participants")]
    pub max_participants: u32,
    #[serde(default)]
    pub guide_language: String,
    #[serde(default)]
    pub available_dates: Vec<AvailableDate>,
}

fn default_tour_max_participants() -> u32 {
    10
}

// ── Users ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    /// Unique across all users.
    pub email: String,
    /// bcrypt hash, stored under the legacy `password` key. Listings strip it
    /// by going through [`UserInfo`].
    #[serde(rename = "password")]
    pub password_hash: String,
    #[serde(alias = "userType")]
    pub role: Role,
    #[serde(default)]
    pub birth_year: Option<i32>,
    #[serde(default)]
    pub gender: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User as returned by any listing — same shape minus the password hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub birth_year: Option<i32>,
    pub gender: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserInfo {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
            role: u.role,
            birth_year: u.birth_year,
            gender: u.gender.clone(),
            created_at: u.created_at,
        }
    }
}

// ── Bookings ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// `booking-<ULID>` — time-ordered, unique.
    pub id: String,
    pub tour_id: i64,
    pub tour_title: String,
    pub guide_id: String,
    pub guide_name: String,
    /// Always the string form, whatever the client sent.
    pub traveler_id: String,
    pub traveler_name: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`
    pub end_time: String,
    pub participants: u32,
    pub total_price: i64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ── Request payloads ─────────────────────────────────────────────

/// `POST /bookings` body. Every field is optional at the serde layer so a
/// missing one surfaces as a validation error naming the field, not as a
/// deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub tour_id: Option<IdValue>,
    pub tour_title: Option<String>,
    pub guide_id: Option<String>,
    pub guide_name: Option<String>,
    pub traveler_id: Option<IdValue>,
    pub traveler_name: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub participants: Option<u32>,
    pub total_price: Option<i64>,
    pub status: Option<BookingStatus>,
}

/// `POST /tours` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTourRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub duration: Option<String>,
    pub guide_name: Option<String>,
    pub details: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub guide_description: Option<String>,
    pub guide_image: Option<String>,
    pub max_participants: Option<u32>,
    pub guide_language: Option<String>,
    pub available_dates: Option<Vec<AvailableDate>>,
}

/// `POST /auth/signup` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(alias = "userType")]
    pub role: Option<Role>,
    pub birth_year: Option<i32>,
    pub gender: Option<String>,
}
