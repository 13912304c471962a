//! Engine configuration validation.
//!
//! Every field is checked and all problems are reported together, so a user
//! fixing a config file sees the full list at once.
//!
//! # Example
//!
//! ```rust
//! use aural_config::{EngineConfig, ValidationError};
//!
//! let mut config = EngineConfig::default();
//! assert!(config.validate().is_ok());
//!
//! config.quantum_size = 100;
//! assert!(matches!(
//!     config.validate(),
//!     Err(ValidationError::NotPowerOfTwo { .. })
//! ));
//! ```

use std::ops::RangeInclusive;

use thiserror::Error;

use crate::engine::EngineConfig;

/// Accepted sample rates in Hz.
pub const SAMPLE_RATE_RANGE: RangeInclusive<u64> = 3_000..=768_000;

/// Accepted channel-count clamps.
pub const MAX_CHANNEL_COUNT_RANGE: RangeInclusive<u64> = 1..=32;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Value outside its accepted range.
    #[error("'{field}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the field.
        field: String,
        /// The rejected value.
        value: u64,
        /// Minimum allowed value.
        min: u64,
        /// Maximum allowed value.
        max: u64,
    },

    /// Value that must be a power of two.
    #[error("'{field}' must be a power of two, got {value}")]
    NotPowerOfTwo {
        /// Name of the field.
        field: String,
        /// The rejected value.
        value: u64,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn check_range(
    errors: &mut Vec<ValidationError>,
    field: &str,
    value: u64,
    range: RangeInclusive<u64>,
) {
    if !range.contains(&value) {
        errors.push(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min: *range.start(),
            max: *range.end(),
        });
    }
}

/// Checks every field of `config`.
///
/// Returns the single error if only one field is bad, otherwise
/// [`ValidationError::Multiple`].
pub fn validate_engine_config(config: &EngineConfig) -> ValidationResult<()> {
    let mut errors = Vec::new();

    check_range(&mut errors, "sample_rate", u64::from(config.sample_rate), SAMPLE_RATE_RANGE);

    let quantum = config.quantum_size as u64;
    if !config.quantum_size.is_power_of_two() {
        errors.push(ValidationError::NotPowerOfTwo {
            field: "quantum_size".to_string(),
            value: quantum,
        });
    }

    check_range(
        &mut errors,
        "limits.max_channel_count",
        config.limits.max_channel_count as u64,
        MAX_CHANNEL_COUNT_RANGE,
    );
    check_range(
        &mut errors,
        "limits.max_wire_array_len",
        u64::from(config.limits.max_wire_array_len),
        1..=u64::from(u32::MAX),
    );

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}
