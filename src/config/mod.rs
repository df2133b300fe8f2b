// ==========================================
// Altar Rota - configuration layer
// ==========================================
// Storage: config_kv table
// ==========================================

pub mod config_manager;
pub mod rotation_config_trait;
pub mod rotation_rules;

pub use config_manager::{config_keys, ConfigManager};
pub use rotation_config_trait::{
    load_headcount_defaults, load_rules, ConfigResult, RotationConfigReader,
};
pub use rotation_rules::{RotationRules, MAX_DAILY_LIMIT};
