//! Validation helper functions for configuration types.

use ahash::AHashSet;

use crate::core::errors::{NomenError, Result};

/// Validate that a usize value is greater than zero.
pub fn validate_positive_usize(value: usize, field: &str) -> Result<()> {
    if value == 0 {
        return Err(NomenError::validation(format!(
            "{} must be greater than 0",
            field
        )));
    }
    Ok(())
}

/// Validate that a usize value is within a bounded range (inclusive).
pub fn validate_bounded_usize(value: usize, min: usize, max: usize, field: &str) -> Result<()> {
    if value < min || value > max {
        return Err(NomenError::validation(format!(
            "{} must be between {} and {}",
            field, min, max
        )));
    }
    Ok(())
}

/// Validate that a list of names has at least one entry.
pub fn validate_non_empty(names: &[String], field: &str) -> Result<()> {
    if names.is_empty() {
        return Err(NomenError::validation(format!(
            "{} must name at least one algorithm",
            field
        )));
    }
    Ok(())
}

/// Validate that no name is blank or listed twice.
pub fn validate_unique_names(names: &[String], field: &str) -> Result<()> {
    let mut seen = AHashSet::with_capacity(names.len());
    for name in names {
        if name.trim().is_empty() {
            return Err(NomenError::validation(format!(
                "{} contains a blank name",
                field
            )));
        }
        if !seen.insert(name.as_str()) {
            return Err(NomenError::validation(format!(
                "{} lists '{}' more than once",
                field, name
            )));
        }
    }
    Ok(())
}
