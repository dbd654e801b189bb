use crate::store::StoreError;

#[derive(Debug)]
pub enum EngineError {
    /// Missing or malformed input.
    Validation(String),
    /// The request would create a second live booking on an occupied slot.
    Conflict(String),
    NotFound(String),
    /// Role or ownership violation.
    Forbidden(&'static str),
    /// Legal request, illegal transition from the record's current status.
    InvalidState(&'static str),
    Storage(StoreError),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Validation(msg) => write!(f, "invalid request: {msg}"),
            EngineError::Conflict(msg) => write!(f, "conflict: {msg}"),
            EngineError::NotFound(what) => write!(f, "not found: {what}"),
            EngineError::Forbidden(msg) => write!(f, "forbidden: {msg}"),
            EngineError::InvalidState(msg) => write!(f, "invalid state: {msg}"),
            EngineError::Storage(e) => write!(f, "storage error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        EngineError::Storage(e)
    }
}
