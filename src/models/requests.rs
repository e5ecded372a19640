//! Request DTOs for the ops API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::cache::MAX_KEY_LENGTH;

/// Request body for category invalidation (POST /invalidate)
///
/// # Fields
/// - `prefix`: Key prefix naming the category to drop, e.g. `"product:"`
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    /// Category key prefix
    pub prefix: String,
}

impl InvalidateRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.prefix.is_empty() {
            return Some("Prefix cannot be empty".to_string());
        }
        if self.prefix.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Prefix exceeds maximum length of {} characters",
                MAX_KEY_LENGTH
            ));
        }
        None
    }
}
