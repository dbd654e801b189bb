use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::limits::*;
use crate::model::{Booking, BookingStatus, CreateBookingRequest};

use super::EngineError;

pub(crate) fn now() -> DateTime<Utc> {
    Utc::now()
}

// ── Conflict detection ───────────────────────────────────────────

/// The same traveler already live-holds this exact slot — the duplicate the
/// create path rejects with 409.
pub fn find_duplicate<'a>(
    bookings: &'a [Booking],
    traveler_id: &str,
    tour_id: i64,
    date: &str,
    start_time: &str,
) -> Option<&'a Booking> {
    bookings.iter().find(|b| {
        b.traveler_id == traveler_id
            && b.tour_id == tour_id
            && b.date == date
            && b.start_time == start_time
            && b.status.is_live()
    })
}

/// Some *other* traveler live-holds this slot. Checked under the bookings
/// write lock, which is what keeps two racing requests from both taking the
/// same slot.
pub fn find_slot_holder<'a>(
    bookings: &'a [Booking],
    tour_id: i64,
    date: &str,
    start_time: &str,
    traveler_id: &str,
) -> Option<&'a Booking> {
    bookings.iter().find(|b| {
        b.tour_id == tour_id
            && b.date == date
            && b.start_time == start_time
            && b.status.is_live()
            && b.traveler_id != traveler_id
    })
}

// ── Request validation ───────────────────────────────────────────

pub(crate) fn validate_date(s: &str) -> Result<(), EngineError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| EngineError::Validation(format!("malformed date: {s}")))
}

pub(crate) fn validate_time(s: &str) -> Result<(), EngineError> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .map(|_| ())
        .map_err(|_| EngineError::Validation(format!("malformed time: {s}")))
}

fn missing(field: &str) -> EngineError {
    EngineError::Validation(format!("missing required field: {field}"))
}

/// A create request with every field present, normalized and checked.
#[derive(Debug, Clone)]
pub(crate) struct NewBooking {
    pub tour_id: i64,
    pub tour_title: String,
    pub guide_id: String,
    pub guide_name: String,
    pub traveler_id: String,
    pub traveler_name: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub participants: u32,
    pub total_price: i64,
    pub status: BookingStatus,
}

/// Presence + shape checks for `POST /bookings`. Optional name fields get
/// placeholder defaults; travelerId is normalized to its string form.
pub(crate) fn validate_create(req: &CreateBookingRequest) -> Result<NewBooking, EngineError> {
    let tour_id = req
        .tour_id
        .as_ref()
        .ok_or_else(|| missing("tourId"))?
        .as_i64()
        .ok_or_else(|| EngineError::Validation("tourId must be numeric".into()))?;
    let tour_title = req.tour_title.clone().ok_or_else(|| missing("tourTitle"))?;
    let guide_id = req.guide_id.clone().ok_or_else(|| missing("guideId"))?;
    let traveler_id = req
        .traveler_id
        .as_ref()
        .ok_or_else(|| missing("travelerId"))?
        .as_string();
    let date = req.date.clone().ok_or_else(|| missing("date"))?;
    let start_time = req.start_time.clone().ok_or_else(|| missing("startTime"))?;
    let end_time = req.end_time.clone().ok_or_else(|| missing("endTime"))?;
    let participants = req.participants.ok_or_else(|| missing("participants"))?;
    let total_price = req.total_price.ok_or_else(|| missing("totalPrice"))?;

    if traveler_id.trim().is_empty() {
        return Err(missing("travelerId"));
    }
    if tour_title.is_empty() || tour_title.len() > MAX_TITLE_LEN {
        return Err(EngineError::Validation("tourTitle empty or too long".into()));
    }
    if guide_id.is_empty() || guide_id.len() > MAX_NAME_LEN {
        return Err(EngineError::Validation("guideId empty or too long".into()));
    }
    validate_date(&date)?;
    validate_time(&start_time)?;
    validate_time(&end_time)?;
    if participants == 0 || participants > MAX_PARTICIPANTS {
        return Err(EngineError::Validation(format!(
            "participants must be between 1 and {MAX_PARTICIPANTS}"
        )));
    }
    if total_price <= 0 {
        return Err(EngineError::Validation("totalPrice must be positive".into()));
    }

    Ok(NewBooking {
        tour_id,
        tour_title,
        guide_id,
        guide_name: req.guide_name.clone().unwrap_or_else(|| "Guide".into()),
        traveler_id,
        traveler_name: req.traveler_name.clone().unwrap_or_else(|| "Customer".into()),
        date,
        start_time,
        end_time,
        participants,
        total_price,
        status: req.status.unwrap_or(BookingStatus::Pending),
    })
}
