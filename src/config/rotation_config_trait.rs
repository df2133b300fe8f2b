// ==========================================
// Altar Rota - rotation config reader trait
// ==========================================
// Read-only interface used by the api layer to obtain default rule
// parameters. Implemented by ConfigManager (config_kv table); tests
// provide their own implementation.
// ==========================================

use crate::config::rotation_rules::{RotationRules, MAX_DAILY_LIMIT};
use crate::domain::period::HeadcountDefaults;
use async_trait::async_trait;
use std::error::Error;
use tracing::warn;

pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[async_trait]
pub trait RotationConfigReader: Send + Sync {
    /// Primary-role candidates reserved per event
    ///
    /// # Default
    /// - 1
    async fn get_default_minimum_primary(&self) -> ConfigResult<u32>;

    /// Active assignments allowed per candidate per date
    ///
    /// # Default
    /// - 2 (valid range 1..=3)
    async fn get_default_daily_limit(&self) -> ConfigResult<u32>;

    /// Fill from the secondary tier before the unranked tier
    ///
    /// # Default
    /// - true
    async fn get_prioritize_roles(&self) -> ConfigResult<bool>;

    /// Headcount for Monday..Friday events created without one
    ///
    /// # Default
    /// - 3
    async fn get_weekday_headcount(&self) -> ConfigResult<u32>;

    /// Headcount for Saturday/Sunday events created without one
    ///
    /// # Default
    /// - 4
    async fn get_weekend_headcount(&self) -> ConfigResult<u32>;
}

/// Default RotationRules from any reader
///
/// An out-of-range daily limit is clamped to 1..=MAX_DAILY_LIMIT.
pub async fn load_rules<C: RotationConfigReader + ?Sized>(config: &C) -> ConfigResult<RotationRules> {
    let daily_limit = config.get_default_daily_limit().await?;
    let clamped = daily_limit.clamp(1, MAX_DAILY_LIMIT);
    if clamped != daily_limit {
        warn!(configured = daily_limit, used = clamped, "daily_limit out of range, clamped");
    }

    Ok(RotationRules {
        minimum_primary: config.get_default_minimum_primary().await?,
        daily_limit: clamped,
        prioritize_roles: config.get_prioritize_roles().await?,
    })
}

pub async fn load_headcount_defaults<C: RotationConfigReader + ?Sized>(
    config: &C,
) -> ConfigResult<HeadcountDefaults> {
    Ok(HeadcountDefaults {
        weekday: config.get_weekday_headcount().await?,
        weekend: config.get_weekend_headcount().await?,
    })
}
