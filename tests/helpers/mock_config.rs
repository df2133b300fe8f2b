// ==========================================
// Mock rotation config for integration tests
// ==========================================

use altar_rota::config::{ConfigResult, RotationConfigReader};
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct MockConfig {
    pub minimum_primary: u32,
    pub daily_limit: u32,
    pub prioritize_roles: bool,
    pub weekday_headcount: u32,
    pub weekend_headcount: u32,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            minimum_primary: 1,
            daily_limit: 2,
            prioritize_roles: true,
            weekday_headcount: 3,
            weekend_headcount: 4,
        }
    }
}

impl MockConfig {
    pub fn with_daily_limit(daily_limit: u32) -> Self {
        Self {
            daily_limit,
            ..Self::default()
        }
    }
}

#[async_trait]
impl RotationConfigReader for MockConfig {
    async fn get_default_minimum_primary(&self) -> ConfigResult<u32> {
        Ok(self.minimum_primary)
    }

    async fn get_default_daily_limit(&self) -> ConfigResult<u32> {
        Ok(self.daily_limit)
    }

    async fn get_prioritize_roles(&self) -> ConfigResult<bool> {
        Ok(self.prioritize_roles)
    }

    async fn get_weekday_headcount(&self) -> ConfigResult<u32> {
        Ok(self.weekday_headcount)
    }

    async fn get_weekend_headcount(&self) -> ConfigResult<u32> {
        Ok(self.weekend_headcount)
    }
}
