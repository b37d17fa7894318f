//! Request parameter validators.
//!
//! Each validator fails with a [`ServiceError::Parameter`] citing the
//! offending field name, before any persistence work happens.

use crate::ServiceError;

/// Require a non-empty string parameter.
pub fn require_non_empty(value: &str, field: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::Parameter(format!("{} is required", field)));
    }
    Ok(())
}

/// Require a numeric parameter, returning the parsed value.
pub fn require_number(value: &str, field: &str) -> Result<i64, ServiceError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| ServiceError::Parameter(format!("{} must be numeric", field)))
}
