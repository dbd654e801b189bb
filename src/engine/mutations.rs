use ulid::Ulid;

use crate::limits::*;
use crate::model::{
    Actor, Booking, BookingStatus, CreateBookingRequest, CreateTourRequest, Role, SignupRequest,
    Tour, User, UserInfo,
};
use crate::observability;

use super::conflict::{self, validate_date, validate_time};
use super::{Engine, EngineError, access};

impl Engine {
    // ── Bookings ─────────────────────────────────────────────────

    /// Validate, check the slot, append, persist. The whole cycle runs under
    /// the bookings write guard so two racing requests for the same slot
    /// serialize and the loser sees the winner's record.
    pub async fn create_booking(&self, req: &CreateBookingRequest) -> Result<Booking, EngineError> {
        let new = conflict::validate_create(req)?;

        let _write = self.bookings.begin_write().await;
        let mut bookings = self.bookings.load()?;
        if bookings.len() >= MAX_RECORDS_PER_COLLECTION {
            return Err(EngineError::Validation("booking collection is full".into()));
        }

        if conflict::find_duplicate(&bookings, &new.traveler_id, new.tour_id, &new.date, &new.start_time)
            .is_some()
        {
            metrics::counter!(observability::BOOKING_CONFLICTS_TOTAL).increment(1);
            return Err(EngineError::Conflict(format!(
                "traveler {} already holds {} {} on tour {}",
                new.traveler_id, new.date, new.start_time, new.tour_id
            )));
        }
        if let Some(holder) =
            conflict::find_slot_holder(&bookings, new.tour_id, &new.date, &new.start_time, &new.traveler_id)
        {
            metrics::counter!(observability::BOOKING_CONFLICTS_TOTAL).increment(1);
            return Err(EngineError::Conflict(format!(
                "slot {} {} on tour {} is already booked by {}",
                new.date, new.start_time, new.tour_id, holder.traveler_name
            )));
        }

        let now = conflict::now();
        let booking = Booking {
            id: format!("booking-{}", Ulid::new()),
            tour_id: new.tour_id,
            tour_title: new.tour_title,
            guide_id: new.guide_id,
            guide_name: new.guide_name,
            traveler_id: new.traveler_id,
            traveler_name: new.traveler_name,
            date: new.date,
            start_time: new.start_time,
            end_time: new.end_time,
            participants: new.participants,
            total_price: new.total_price,
            status: new.status,
            created_at: now,
            updated_at: now,
        };
        bookings.push(booking.clone());
        self.bookings.save(&bookings)?;

        metrics::counter!(observability::BOOKINGS_CREATED_TOTAL).increment(1);
        tracing::info!(id = %booking.id, tour = booking.tour_id, traveler = %booking.traveler_id, "booking created");
        Ok(booking)
    }

    /// Move a booking to `new_status`. Ownership is checked before the
    /// transition rule, so a stranger always gets Forbidden and an owner
    /// attempting an illegal move gets InvalidState.
    pub async fn update_booking_status(
        &self,
        id: &str,
        new_status: BookingStatus,
        actor: &Actor,
    ) -> Result<Booking, EngineError> {
        let _write = self.bookings.begin_write().await;
        let mut bookings = self.bookings.load()?;
        let idx = bookings
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("booking {id}")))?;

        if !access::can_update_status(&bookings[idx], actor) {
            return Err(EngineError::Forbidden("not your booking"));
        }
        if !access::allowed_transition(&bookings[idx], actor, new_status) {
            return Err(EngineError::InvalidState(
                "only a pending booking can change status",
            ));
        }

        bookings[idx].status = new_status;
        bookings[idx].updated_at = conflict::now();
        self.bookings.save(&bookings)?;

        tracing::info!(id = %bookings[idx].id, status = new_status.as_str(), "booking status updated");
        Ok(bookings[idx].clone())
    }

    /// Remove a booking record entirely (distinct from status = cancelled).
    /// Non-admins may only delete their own *pending* bookings.
    pub async fn delete_booking(&self, id: &str, actor: &Actor) -> Result<Booking, EngineError> {
        let _write = self.bookings.begin_write().await;
        let mut bookings = self.bookings.load()?;
        let idx = bookings
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("booking {id}")))?;

        if !access::can_delete(&bookings[idx], actor) {
            return Err(EngineError::Forbidden("not your booking"));
        }
        if !actor.is_admin() && bookings[idx].status != BookingStatus::Pending {
            return Err(EngineError::InvalidState(
                "only a pending booking can be deleted",
            ));
        }

        let removed = bookings.remove(idx);
        self.bookings.save(&bookings)?;

        tracing::info!(id = %removed.id, "booking deleted");
        Ok(removed)
    }

    // ── Tours ────────────────────────────────────────────────────

    pub async fn create_tour(
        &self,
        req: &CreateTourRequest,
        actor: Option<&Actor>,
    ) -> Result<Tour, EngineError> {
        access::require_admin(actor)?;
        let title = required_text(&req.title, "title", MAX_TITLE_LEN)?;
        let description = required_text(&req.description, "description", MAX_TEXT_LEN)?;
        let duration = required_text(&req.duration, "duration", MAX_NAME_LEN)?;
        let guide_name = required_text(&req.guide_name, "guideName", MAX_NAME_LEN)?;
        let price = req.price.ok_or_else(|| {
            EngineError::Validation("missing required field: price".into())
        })?;
        if price <= 0 {
            return Err(EngineError::Validation("price must be positive".into()));
        }
        let available_dates = req.available_dates.clone().unwrap_or_default();
        validate_available_dates(&available_dates)?;
        let details = req.details.clone().unwrap_or_default();
        if details.len() > MAX_DETAIL_LINES {
            return Err(EngineError::Validation("too many detail lines".into()));
        }
        let images = req.images.clone().unwrap_or_default();
        if images.len() > MAX_IMAGES {
            return Err(EngineError::Validation("too many images".into()));
        }

        let _write = self.tours.begin_write().await;
        let mut tours = self.tours.load()?;
        if tours.len() >= MAX_RECORDS_PER_COLLECTION {
            return Err(EngineError::Validation("tour collection is full".into()));
        }

        let id = tours.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let tour = Tour {
            id,
            title,
            description,
            price,
            duration,
            details,
            image: images.first().cloned().unwrap_or_else(|| "/images/default.jpg".into()),
            images,
            guide_id: format!("guide-{id}"),
            guide_name,
            guide_description: req.guide_description.clone().unwrap_or_default(),
            guide_image: req.guide_image.clone().unwrap_or_default(),
            guide_rating: 0.0,
            guide_specialties: Vec::new(),
            max_participants: req.max_participants.unwrap_or(10),
            guide_language: req.guide_language.clone().unwrap_or_default(),
            available_dates,
        };
        tours.push(tour.clone());
        self.tours.save(&tours)?;

        tracing::info!(id = tour.id, title = %tour.title, "tour created");
        Ok(tour)
    }

    /// Full-record replacement; the path id wins over whatever id the body
    /// carries.
    pub async fn update_tour(
        &self,
        id: i64,
        mut tour: Tour,
        actor: Option<&Actor>,
    ) -> Result<Tour, EngineError> {
        access::require_admin(actor)?;
        if tour.price <= 0 {
            return Err(EngineError::Validation("price must be positive".into()));
        }
        validate_available_dates(&tour.available_dates)?;

        let _write = self.tours.begin_write().await;
        let mut tours = self.tours.load()?;
        let idx = tours
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("tour {id}")))?;

        tour.id = id;
        tours[idx] = tour.clone();
        self.tours.save(&tours)?;

        tracing::info!(id, "tour updated");
        Ok(tour)
    }

    pub async fn delete_tour(&self, id: i64, actor: Option<&Actor>) -> Result<(), EngineError> {
        access::require_admin(actor)?;

        let _write = self.tours.begin_write().await;
        let mut tours = self.tours.load()?;
        let before = tours.len();
        tours.retain(|t| t.id != id);
        if tours.len() == before {
            return Err(EngineError::NotFound(format!("tour {id}")));
        }
        self.tours.save(&tours)?;

        tracing::info!(id, "tour deleted");
        Ok(())
    }

    // ── Users ────────────────────────────────────────────────────

    /// Signup: unique email, bcrypt-hashed password, id assigned max+1.
    pub async fn create_user(&self, req: &SignupRequest) -> Result<UserInfo, EngineError> {
        let name = required_text(&req.name, "name", MAX_NAME_LEN)?;
        let email = required_text(&req.email, "email", MAX_EMAIL_LEN)?;
        let password = req
            .password
            .clone()
            .ok_or_else(|| EngineError::Validation("missing required field: password".into()))?;
        let role = req.role.unwrap_or(Role::Traveler);
        let birth_year = req
            .birth_year
            .ok_or_else(|| EngineError::Validation("missing required field: birthYear".into()))?;
        let gender = required_text(&req.gender, "gender", MAX_NAME_LEN)?;

        if !email_shape_ok(&email) {
            return Err(EngineError::Validation(format!("malformed email: {email}")));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(EngineError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let _write = self.users.begin_write().await;
        let mut users = self.users.load()?;
        if users.len() >= MAX_RECORDS_PER_COLLECTION {
            return Err(EngineError::Validation("user collection is full".into()));
        }
        if users.iter().any(|u| u.email == email) {
            return Err(EngineError::Validation("email already registered".into()));
        }

        let password_hash = bcrypt::hash(&password, PASSWORD_HASH_COST)
            .map_err(|e| EngineError::Storage(crate::store::StoreError::Io(std::io::Error::other(e))))?;

        let now = conflict::now();
        let user = User {
            id: users.iter().map(|u| u.id).max().unwrap_or(0) + 1,
            name,
            email,
            password_hash,
            role,
            birth_year: Some(birth_year),
            gender: Some(gender),
            created_at: now,
            updated_at: now,
        };
        let info = UserInfo::from(&user);
        users.push(user);
        self.users.save(&users)?;

        tracing::info!(id = info.id, "user created");
        Ok(info)
    }
}

fn required_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<String, EngineError> {
    let s = value
        .clone()
        .ok_or_else(|| EngineError::Validation(format!("missing required field: {field}")))?;
    if s.trim().is_empty() {
        return Err(EngineError::Validation(format!("missing required field: {field}")));
    }
    if s.len() > max_len {
        return Err(EngineError::Validation(format!("{field} too long")));
    }
    Ok(s)
}

/// Minimal shape check: something@domain.tld, no whitespace.
fn email_shape_ok(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
        && !domain.contains('@')
}

fn validate_available_dates(dates: &[crate::model::AvailableDate]) -> Result<(), EngineError> {
    if dates.len() > MAX_AVAILABLE_DATES {
        return Err(EngineError::Validation("too many available dates".into()));
    }
    for day in dates {
        validate_date(&day.date)?;
        if day.time_slots.len() > MAX_TIME_SLOTS_PER_DATE {
            return Err(EngineError::Validation(format!(
                "too many time slots on {}",
                day.date
            )));
        }
        for slot in &day.time_slots {
            validate_time(&slot.start_time)?;
            validate_time(&slot.end_time)?;
        }
    }
    Ok(())
}
