mod access;
mod availability;
mod conflict;
mod error;
mod mutations;
mod queries;

pub use access::{
    allowed_transition, can_delete, can_update_status, can_view, require_admin, visible_bookings,
};
pub use availability::{filter_tour_availability, slot_held_by_other};
pub use conflict::{find_duplicate, find_slot_holder};
pub use error::EngineError;

use std::io;
use std::path::Path;
use std::sync::Arc;

use crate::model::{Booking, Tour, User};
use crate::store::{Backend, Collection, FileBackend};

/// The booking engine: three persistent collections plus the reservation,
/// lifecycle and access rules that operate on them. Every mutation is one
/// read-modify-write cycle under that collection's write guard.
pub struct Engine {
    users: Collection<User>,
    tours: Collection<Tour>,
    bookings: Collection<Booking>,
}

impl Engine {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            users: Collection::new("users", backend.clone()),
            tours: Collection::new("tours", backend.clone()),
            bookings: Collection::new("bookings", backend),
        }
    }

    /// Engine over JSON files in `data_dir`, created if needed. Collections
    /// that do not exist yet are simply empty.
    pub fn open(data_dir: &Path) -> io::Result<Self> {
        Ok(Self::new(Arc::new(FileBackend::new(data_dir)?)))
    }
}
