// ==========================================
// Altar Rota - configuration manager
// ==========================================
// Storage: config_kv table (key-value + scope)
// Only the 'global' scope is used.
// ==========================================

use crate::config::rotation_config_trait::{
    load_headcount_defaults, load_rules, ConfigResult, RotationConfigReader,
};
use crate::config::rotation_rules::RotationRules;
use crate::db::open_sqlite_connection;
use crate::domain::period::HeadcountDefaults;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::warn;

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// Open a dedicated connection
    ///
    /// # Arguments
    /// - db_path: database file path
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Share an existing connection (PRAGMAs are re-applied, idempotent)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// Read a global config value
    ///
    /// # Returns
    /// - Some(String): stored value
    /// - None: key not set
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Insert or replace a global config value
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// All global values as a JSON object (sorted by key)
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// Assemble default RotationRules from config
    pub async fn load_rules(&self) -> ConfigResult<RotationRules> {
        load_rules(self).await
    }

    pub async fn load_headcount_defaults(&self) -> ConfigResult<HeadcountDefaults> {
        load_headcount_defaults(self).await
    }

    /// Parse a stored value, falling back to the default when missing
    /// or malformed
    fn parse_or_default<T: FromStr>(&self, key: &str, default: T) -> ConfigResult<T> {
        match self.get_global_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(value) => Ok(value),
                Err(_) => {
                    warn!(key, value = %raw, "malformed config value, using default");
                    Ok(default)
                }
            },
        }
    }
}

// ==========================================
// RotationConfigReader implementation
// ==========================================
#[async_trait]
impl RotationConfigReader for ConfigManager {
    async fn get_default_minimum_primary(&self) -> ConfigResult<u32> {
        self.parse_or_default(config_keys::MINIMUM_PRIMARY, 1)
    }

    async fn get_default_daily_limit(&self) -> ConfigResult<u32> {
        self.parse_or_default(config_keys::DAILY_LIMIT, 2)
    }

    async fn get_prioritize_roles(&self) -> ConfigResult<bool> {
        self.parse_or_default(config_keys::PRIORITIZE_ROLES, true)
    }

    async fn get_weekday_headcount(&self) -> ConfigResult<u32> {
        let value = self.parse_or_default(config_keys::WEEKDAY_HEADCOUNT, 3)?;
        Ok(if value == 0 { 3 } else { value })
    }

    async fn get_weekend_headcount(&self) -> ConfigResult<u32> {
        let value = self.parse_or_default(config_keys::WEEKEND_HEADCOUNT, 4)?;
        Ok(if value == 0 { 4 } else { value })
    }
}

// ==========================================
// Config keys
// ==========================================
pub mod config_keys {
    // rule parameters
    pub const MINIMUM_PRIMARY: &str = "minimum_primary";
    pub const DAILY_LIMIT: &str = "daily_limit";
    pub const PRIORITIZE_ROLES: &str = "prioritize_roles";

    // default event headcount
    pub const WEEKDAY_HEADCOUNT: &str = "weekday_headcount";
    pub const WEEKEND_HEADCOUNT: &str = "weekend_headcount";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::rotation_rules::MAX_DAILY_LIMIT;

    fn setup() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_when_empty() {
        let config = setup();

        assert_eq!(config.load_rules().await.unwrap(), RotationRules::default());
        assert_eq!(
            config.load_headcount_defaults().await.unwrap(),
            HeadcountDefaults::default()
        );
    }

    #[tokio::test]
    async fn test_set_and_load_rules() {
        let config = setup();
        config.set_global_config_value(config_keys::MINIMUM_PRIMARY, "2").unwrap();
        config.set_global_config_value(config_keys::DAILY_LIMIT, "1").unwrap();
        config.set_global_config_value(config_keys::PRIORITIZE_ROLES, "false").unwrap();

        let rules = config.load_rules().await.unwrap();
        assert_eq!(rules.minimum_primary, 2);
        assert_eq!(rules.daily_limit, 1);
        assert!(!rules.prioritize_roles);
    }

    #[tokio::test]
    async fn test_malformed_and_out_of_range_values() {
        let config = setup();
        config.set_global_config_value(config_keys::MINIMUM_PRIMARY, "many").unwrap();
        config.set_global_config_value(config_keys::DAILY_LIMIT, "9").unwrap();

        let rules = config.load_rules().await.unwrap();
        assert_eq!(rules.minimum_primary, 1);
        assert_eq!(rules.daily_limit, MAX_DAILY_LIMIT);
    }

    #[test]
    fn test_snapshot_and_overwrite() {
        let config = setup();
        config.set_global_config_value(config_keys::DAILY_LIMIT, "1").unwrap();
        config.set_global_config_value(config_keys::DAILY_LIMIT, "3").unwrap();

        let snapshot: serde_json::Value =
            serde_json::from_str(&config.get_config_snapshot().unwrap()).unwrap();
        assert_eq!(snapshot[config_keys::DAILY_LIMIT], "3");
        assert_eq!(
            config.get_global_config_value("missing").unwrap(),
            None
        );
    }
}
