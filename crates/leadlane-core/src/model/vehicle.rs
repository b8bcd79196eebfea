//! Vehicle catalog entry used to populate the vehicle-interest selector.
//!
//! The catalog is a plain reference list; leads keep whatever name they
//! were created with even if the catalog entry is later removed.

use serde::{Deserialize, Serialize};

use super::lead::EmptyField;

/// A catalog row: opaque id plus the display name leads reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub name: String,
}

/// Validate a vehicle name before sending it to the catalog.
///
/// # Errors
///
/// Fails on an empty or whitespace-only name.
pub fn validate_vehicle_name(name: &str) -> Result<(), EmptyField> {
    if name.trim().is_empty() {
        return Err(EmptyField { field: "name" });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_names() {
        assert!(validate_vehicle_name("").is_err());
        assert!(validate_vehicle_name("   ").is_err());
        assert!(validate_vehicle_name("Toyota Corolla").is_ok());
    }
}
