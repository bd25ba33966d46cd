use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub enable_tracing: bool,
    /// Ledger connection and confirmation settings
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Balance polling settings
    #[serde(default)]
    pub oracle: OracleConfig,
    /// Receipt store settings
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LedgerConfig {
    /// Cluster label, used for log context only
    pub cluster: String,
    /// Commitment level required before a transfer counts as settled
    pub commitment: String,
    /// Upper bound on the confirmation wait, in seconds
    pub confirmation_timeout_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            cluster: "devnet".to_string(),
            commitment: "confirmed".to_string(),
            confirmation_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OracleConfig {
    /// Seconds between balance polls while a session is active
    pub poll_interval_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 15,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StoreConfig {
    /// Collection receipts are appended to
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            collection: "tips".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: "./logs".to_string(),
            log_file: "tipline.log".to_string(),
            use_json: false,
            rotation: "daily".to_string(),
            enable_tracing: true,
            ledger: LedgerConfig::default(),
            oracle: OracleConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.oracle.poll_interval_secs, 15);
        assert_eq!(config.ledger.commitment, "confirmed");
        assert_eq!(config.store.collection, "tips");
    }

    #[test]
    fn test_partial_yaml_uses_section_defaults() {
        let yaml = r#"
log_level: "debug"
log_dir: "./logs"
log_file: "tipline.log"
use_json: false
rotation: "never"
enable_tracing: true
oracle:
  poll_interval_secs: 5
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.oracle.poll_interval_secs, 5);
        assert_eq!(config.ledger.confirmation_timeout_secs, 30);
        assert_eq!(config.store.collection, "tips");
    }
}
