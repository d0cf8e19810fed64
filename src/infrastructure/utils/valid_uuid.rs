use uuid::Uuid;

use crate::errors::AppError;

/// Parses a path id. A malformed id cannot name a stored record, so it is
/// reported the same way as a missing one.
pub fn valid_uuid(id: &str, not_found: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id.trim()).map_err(|_| AppError::NotFound(not_found.to_string()))
}
