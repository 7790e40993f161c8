//! HTTP API
//! Mission: Blog resource handlers and the router that ties them to the auth gate

pub mod comments;
pub mod likes;
pub mod notifications;
pub mod posts;
pub mod routes;

pub use routes::create_router;

use crate::error::ApiError;
use uuid::Uuid;

/// Parse a path id; anything that is not a UUID is a 400.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::InvalidInput("Invalid id".to_string()))
}

/// Trimmed value, or `None` when absent or blank.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Required text field: blank counts as missing.
pub fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    non_empty(value).ok_or_else(|| ApiError::InvalidInput(message.to_string()))
}
