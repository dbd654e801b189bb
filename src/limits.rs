//! Hard limits on inputs and collection sizes. Every bound is enforced at the
//! engine boundary and surfaces as a validation error, never a panic.

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_TITLE_LEN: usize = 200;
/// Descriptions, detail lines and other free text.
pub const MAX_TEXT_LEN: usize = 4000;
pub const MAX_DETAIL_LINES: usize = 50;
pub const MAX_IMAGES: usize = 20;
pub const MAX_AVAILABLE_DATES: usize = 366;
pub const MAX_TIME_SLOTS_PER_DATE: usize = 24;
pub const MAX_PARTICIPANTS: u32 = 100;
pub const MAX_RECORDS_PER_COLLECTION: usize = 100_000;

pub const MIN_PASSWORD_LEN: usize = 6;
/// bcrypt work factor for stored password hashes.
pub const PASSWORD_HASH_COST: u32 = 10;
