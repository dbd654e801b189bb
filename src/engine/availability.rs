use crate::model::{AvailableDate, Booking, Tour};

// ── Availability Algorithm ────────────────────────────────────────

/// Copy of `tour` with every slot live-held by a *different* traveler removed.
///
/// A slot survives when no pending/confirmed booking references it, or when
/// the only live booking on it belongs to `requesting_user` — a traveler
/// always still sees their own in-progress slot. Dates left with no slots
/// are dropped entirely.
pub fn filter_tour_availability(
    tour: &Tour,
    bookings: &[Booking],
    requesting_user: Option<&str>,
) -> Tour {
    let mut filtered = tour.clone();
    filtered.available_dates = tour
        .available_dates
        .iter()
        .filter_map(|day| {
            let slots: Vec<_> = day
                .time_slots
                .iter()
                .filter(|slot| {
                    !slot_held_by_other(
                        bookings,
                        tour.id,
                        &day.date,
                        &slot.start_time,
                        requesting_user,
                    )
                })
                .cloned()
                .collect();
            if slots.is_empty() {
                None
            } else {
                Some(AvailableDate { date: day.date.clone(), time_slots: slots })
            }
        })
        .collect();
    filtered
}

/// True if some live booking occupies (tour, date, start_time) and that
/// booking does not belong to `requesting_user`. With no requesting user,
/// any live booking hides the slot.
pub fn slot_held_by_other(
    bookings: &[Booking],
    tour_id: i64,
    date: &str,
    start_time: &str,
    requesting_user: Option<&str>,
) -> bool {
    bookings.iter().any(|b| {
        b.tour_id == tour_id
            && b.date == date
            && b.start_time == start_time
            && b.status.is_live()
            && requesting_user.is_none_or(|uid| b.traveler_id != uid)
    })
}
