// ==========================================
// Altar Rota - rotation rule parameters
// ==========================================

use crate::engine::error::EngineError;
use serde::{Deserialize, Serialize};

/// Upper bound for the daily limit
pub const MAX_DAILY_LIMIT: u32 = 3;

// ==========================================
// RotationRules - per-run rule parameters
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationRules {
    pub minimum_primary: u32,  // primary-role candidates reserved per event
    pub daily_limit: u32,      // max active assignments per candidate per date
    pub prioritize_roles: bool, // fill secondary before other
}

impl Default for RotationRules {
    fn default() -> Self {
        Self {
            minimum_primary: 1,
            daily_limit: 2,
            prioritize_roles: true,
        }
    }
}

impl RotationRules {
    /// Reject malformed parameters before any processing
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.daily_limit == 0 {
            return Err(EngineError::Validation(
                "daily_limit must be at least 1".to_string(),
            ));
        }
        if self.daily_limit > MAX_DAILY_LIMIT {
            return Err(EngineError::Validation(format!(
                "daily_limit must be at most {} (got {})",
                MAX_DAILY_LIMIT, self.daily_limit
            )));
        }
        Ok(())
    }

    pub fn to_json(&self) -> String {
        serde_json::json!({
            "minimum_primary": self.minimum_primary,
            "daily_limit": self.daily_limit,
            "prioritize_roles": self.prioritize_roles,
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_are_valid() {
        let rules = RotationRules::default();
        assert_eq!(rules.minimum_primary, 1);
        assert_eq!(rules.daily_limit, 2);
        assert!(rules.prioritize_roles);
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn test_daily_limit_bounds() {
        let zero = RotationRules { daily_limit: 0, ..Default::default() };
        assert!(matches!(zero.validate(), Err(EngineError::Validation(_))));

        let too_high = RotationRules { daily_limit: 4, ..Default::default() };
        assert!(matches!(too_high.validate(), Err(EngineError::Validation(_))));

        let max = RotationRules { daily_limit: MAX_DAILY_LIMIT, ..Default::default() };
        assert!(max.validate().is_ok());
    }

    #[test]
    fn test_rules_json() {
        let parsed: serde_json::Value =
            serde_json::from_str(&RotationRules::default().to_json()).unwrap();
        assert_eq!(parsed["daily_limit"], 2);
        assert_eq!(parsed["prioritize_roles"], true);
    }
}
