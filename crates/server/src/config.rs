//! Server configuration

use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub node_url: String,
    pub contract_address: [u8; 20],
    pub chain_call_timeout: Duration,
    pub cors_origins: Vec<String>,
    pub vr_app_name: String,
    pub vr_enabled: bool,
    /// Abort startup when the node probe or VR bootstrap fails.
    pub strict_startup: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let contract_address =
            lookup("CONTRACT_ADDRESS").ok_or(ConfigError::Missing("CONTRACT_ADDRESS"))?;

        let timeout_ms: u64 = parse_or(&lookup, "CHAIN_CALL_TIMEOUT_MS", 10_000)?;
        if timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                name: "CHAIN_CALL_TIMEOUT_MS",
                reason: "timeout must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:5000".into()),
            node_url: lookup("NODE_URL").unwrap_or_else(|| "http://127.0.0.1:8545".into()),
            contract_address: parse_address(&contract_address).map_err(|reason| {
                ConfigError::Invalid {
                    name: "CONTRACT_ADDRESS",
                    reason,
                }
            })?,
            chain_call_timeout: Duration::from_millis(timeout_ms),
            cors_origins: lookup("CORS_ORIGINS")
                .unwrap_or_else(|| "*".into())
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            vr_app_name: lookup("VR_APP_NAME").unwrap_or_else(|| "VR Blockchain World".into()),
            vr_enabled: parse_or(&lookup, "VR_ENABLED", true)?,
            strict_startup: parse_or(&lookup, "STRICT_STARTUP", false)?,
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Parse a `0x`-prefixed 20-byte hex address
pub fn parse_address(raw: &str) -> Result<[u8; 20], String> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let mut addr = [0u8; 20];
    hex::decode_to_slice(digits, &mut addr).map_err(|e| e.to_string())?;
    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[("CONTRACT_ADDRESS", ADDRESS)]).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:5000");
        assert_eq!(config.node_url, "http://127.0.0.1:8545");
        assert_eq!(config.chain_call_timeout, Duration::from_secs(10));
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
        assert_eq!(config.vr_app_name, "VR Blockchain World");
        assert!(config.vr_enabled);
        assert!(!config.strict_startup);
        assert_eq!(config.contract_address[0], 0x5f);
        assert_eq!(config.contract_address[19], 0xa3);
    }

    #[test]
    fn contract_address_is_required() {
        assert!(matches!(
            load(&[]),
            Err(ConfigError::Missing("CONTRACT_ADDRESS"))
        ));
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(matches!(
            load(&[("CONTRACT_ADDRESS", "0x1234")]),
            Err(ConfigError::Invalid { name: "CONTRACT_ADDRESS", .. })
        ));
        assert!(matches!(
            load(&[("CONTRACT_ADDRESS", ADDRESS), ("CHAIN_CALL_TIMEOUT_MS", "0")]),
            Err(ConfigError::Invalid { name: "CHAIN_CALL_TIMEOUT_MS", .. })
        ));
        assert!(matches!(
            load(&[("CONTRACT_ADDRESS", ADDRESS), ("STRICT_STARTUP", "maybe")]),
            Err(ConfigError::Invalid { name: "STRICT_STARTUP", .. })
        ));
    }

    #[test]
    fn overrides() {
        let config = load(&[
            ("CONTRACT_ADDRESS", ADDRESS),
            ("CHAIN_CALL_TIMEOUT_MS", "250"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("VR_ENABLED", "false"),
            ("STRICT_STARTUP", "true"),
        ])
        .unwrap();
        assert_eq!(config.chain_call_timeout, Duration::from_millis(250));
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.cors_origins[1], "https://b.example");
        assert!(!config.vr_enabled);
        assert!(config.strict_startup);
    }
}
