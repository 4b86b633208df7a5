//! Custom validation functions for configuration.

use dcsim_core::DispatchPolicy;
use validator::ValidationError;

/// Validate that a dispatch policy name is recognized.
pub fn validate_policy(name: &str) -> Result<(), ValidationError> {
    name.parse::<DispatchPolicy>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("unknown_dispatch_policy"))
}

/// Validate every entry of a policy list.
pub fn validate_policy_list(names: &[String]) -> Result<(), ValidationError> {
    if names.is_empty() {
        return Err(ValidationError::new("empty_policy_list"));
    }
    names.iter().try_for_each(|name| validate_policy(name))
}

/// Validate that a rate or time value is a finite number.
pub fn validate_finite(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_finite"))
    }
}
