//! Configuration validation

use crate::schema::RawConfig;
use crate::settings::{DEFAULT_BUFFER_MINUTES, DEFAULT_WORK_DURATION_HOURS};
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("office_network must not be blank")]
    BlankOfficeNetwork,

    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("target of {hours} hours + {buffer} minutes is too large")]
    TargetOverflow { hours: u64, buffer: u64 },

    #[error("test_duration_minutes {0} is too large")]
    TestDurationOverflow(u64),
}

/// Validate a raw configuration, collecting every problem found
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(name) = &config.office_network
        && name.trim().is_empty()
    {
        errors.push(ValidationError::BlankOfficeNetwork);
    }

    let positive = [
        (
            "polling.network_interval_seconds",
            config.polling.network_interval_seconds,
        ),
        (
            "polling.timer_interval_seconds",
            config.polling.timer_interval_seconds,
        ),
        ("store.rotate_size_bytes", config.store.rotate_size_bytes),
    ];
    for (field, value) in positive {
        if value == Some(0) {
            errors.push(ValidationError::ZeroValue { field });
        }
    }

    let hours = config
        .target
        .work_duration_hours
        .unwrap_or(DEFAULT_WORK_DURATION_HOURS);
    let buffer = config
        .target
        .buffer_minutes
        .unwrap_or(DEFAULT_BUFFER_MINUTES);
    let target_secs = hours
        .checked_mul(60)
        .and_then(|m| m.checked_add(buffer))
        .and_then(|m| m.checked_mul(60));
    if target_secs.is_none() {
        errors.push(ValidationError::TargetOverflow { hours, buffer });
    }

    if let Some(minutes) = config.target.test_duration_minutes
        && minutes.checked_mul(60).is_none()
    {
        errors.push(ValidationError::TestDurationOverflow(minutes));
    }

    errors
}
