pub mod auth;
pub mod photos;
pub mod uploads;
pub mod users;

use uuid::Uuid;

use crate::api::errors::ApiError;

/// Parses a path id, rejecting malformed values before any store access
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid {} id", what)))
}
