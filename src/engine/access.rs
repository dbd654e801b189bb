//! The access filter: every role/ownership comparison in the system lives
//! here, as pure predicates. The lifecycle manager and the listing endpoints
//! call these instead of comparing ids inline.

use crate::model::{Actor, Booking, BookingStatus, Role};

use super::EngineError;

/// Who may change a booking's status: admins, the owning traveler, and the
/// guide the booking was made with.
pub fn can_update_status(booking: &Booking, actor: &Actor) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Guide => booking.guide_id == actor.id || booking.traveler_id == actor.id,
        Role::Traveler => booking.traveler_id == actor.id,
    }
}

/// Who may remove a booking record entirely: admins and the owning traveler.
pub fn can_delete(booking: &Booking, actor: &Actor) -> bool {
    actor.is_admin() || booking.traveler_id == actor.id
}

pub fn can_view(booking: &Booking, actor: &Actor) -> bool {
    actor.is_admin() || booking.traveler_id == actor.id || booking.guide_id == actor.id
}

/// Which status moves the actor may perform. Admins are unrestricted; the
/// booking's guide may settle a pending booking either way; the owning
/// traveler may only cancel while still pending. Everything else is an
/// illegal transition (ownership itself is checked separately).
pub fn allowed_transition(booking: &Booking, actor: &Actor, new_status: BookingStatus) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Guide if booking.guide_id == actor.id => {
            booking.status == BookingStatus::Pending
                && matches!(new_status, BookingStatus::Confirmed | BookingStatus::Cancelled)
        }
        _ => {
            booking.traveler_id == actor.id
                && booking.status == BookingStatus::Pending
                && new_status == BookingStatus::Cancelled
        }
    }
}

/// Listing filter: admins see everything; everyone else sees their own
/// bookings minus the cancelled ones.
pub fn visible_bookings(bookings: Vec<Booking>, actor: &Actor) -> Vec<Booking> {
    if actor.is_admin() {
        return bookings;
    }
    bookings
        .into_iter()
        .filter(|b| b.traveler_id == actor.id && b.status != BookingStatus::Cancelled)
        .collect()
}

pub fn require_admin(actor: Option<&Actor>) -> Result<(), EngineError> {
    match actor {
        Some(a) if a.is_admin() => Ok(()),
        _ => Err(EngineError::Forbidden("admin role required")),
    }
}
