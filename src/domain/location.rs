// ==========================================
// Altar Rota - Location value type
// ==========================================

use crate::domain::types::DomainError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

const MAX_LOCATION_LEN: usize = 100;

/// Validated location name (trimmed, non-empty)
///
/// Locations are registered in the `location` table; events and
/// availability sets reference them by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Location(String);

impl Location {
    pub fn new(name: impl AsRef<str>) -> Result<Self, DomainError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidLocation("empty name".to_string()));
        }
        if trimmed.chars().count() > MAX_LOCATION_LEN {
            return Err(DomainError::InvalidLocation(format!(
                "name longer than {} characters",
                MAX_LOCATION_LEN
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Location {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Location::new(value)
    }
}

impl From<Location> for String {
    fn from(value: Location) -> Self {
        value.0
    }
}

impl Borrow<str> for Location {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_location_trims_and_rejects_empty() {
        assert_eq!(Location::new("  Matriz ").unwrap().as_str(), "Matriz");
        assert!(Location::new("   ").is_err());
        assert!(Location::new("x".repeat(101)).is_err());
    }

    #[test]
    fn test_location_set_lookup_by_str() {
        let set: BTreeSet<Location> = [Location::new("Matriz").unwrap()].into_iter().collect();
        assert!(set.contains("Matriz"));
        assert!(!set.contains("Capela"));
    }

    #[test]
    fn test_location_deserialize_validates() {
        let ok: Location = serde_json::from_str("\"Capela\"").unwrap();
        assert_eq!(ok.as_str(), "Capela");
        assert!(serde_json::from_str::<Location>("\"\"").is_err());
    }
}
