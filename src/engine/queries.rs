use crate::model::{Actor, Booking, Tour, UserInfo};

use super::availability::filter_tour_availability;
use super::{Engine, EngineError, access};

impl Engine {
    /// Role-filtered listing: admins see every booking, everyone else sees
    /// their own non-cancelled ones.
    pub fn list_bookings(&self, actor: &Actor) -> Result<Vec<Booking>, EngineError> {
        let bookings = self.bookings.load()?;
        Ok(access::visible_bookings(bookings, actor))
    }

    /// The unfiltered admin listing.
    pub fn list_all_bookings(&self, actor: Option<&Actor>) -> Result<Vec<Booking>, EngineError> {
        access::require_admin(actor)?;
        Ok(self.bookings.load()?)
    }

    /// All tours with availability filtered for `requesting_user`: slots
    /// live-held by someone else disappear, the caller's own held slots
    /// stay visible.
    pub fn list_tours(&self, requesting_user: Option<&str>) -> Result<Vec<Tour>, EngineError> {
        let tours = self.tours.load()?;
        let bookings = self.bookings.load()?;
        Ok(tours
            .iter()
            .map(|t| filter_tour_availability(t, &bookings, requesting_user))
            .collect())
    }

    pub fn get_tour(&self, id: i64, requesting_user: Option<&str>) -> Result<Tour, EngineError> {
        let tours = self.tours.load()?;
        let bookings = self.bookings.load()?;
        tours
            .iter()
            .find(|t| t.id == id)
            .map(|t| filter_tour_availability(t, &bookings, requesting_user))
            .ok_or_else(|| EngineError::NotFound(format!("tour {id}")))
    }

    /// Admin listing of all users, password hashes stripped.
    pub fn list_users(&self, actor: Option<&Actor>) -> Result<Vec<UserInfo>, EngineError> {
        access::require_admin(actor)?;
        let users = self.users.load()?;
        Ok(users.iter().map(UserInfo::from).collect())
    }
}
