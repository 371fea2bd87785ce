/// Configuration utilities - loading from disk and credential lookup
///
/// Configuration is returned as a plain value. Callers pass it (or the
/// request built from it) into each run; nothing here is global.
use super::schemas::TrackerConfig;
use crate::errors::TrackerError;
use crate::logger::{LogTag, Logger};
use std::path::Path;

/// Default configuration file path
pub const CONFIG_FILE_PATH: &str = "config.toml";

/// Env files consulted for the API key, in order
pub const ENV_FILES: [&str; 2] = ["config.env", ".env"];

/// Environment variables holding the API key, in order of preference
pub const API_KEY_VARS: [&str; 2] = ["ETHERSCAN_API_KEY", "ETHERSCAN_APIKEY"];

/// Parse configuration from TOML text
pub fn parse_config(contents: &str) -> Result<TrackerConfig, TrackerError> {
    toml::from_str::<TrackerConfig>(contents)
        .map_err(|e| TrackerError::Config(format!("Failed to parse config: {}", e)))
}

/// Load configuration from a specific file path
///
/// A missing file is not an error: defaults are used and a warning is logged.
pub fn load_config_from_path(path: &str, logger: &Logger) -> Result<TrackerConfig, TrackerError> {
    if !Path::new(path).exists() {
        logger.warning(
            LogTag::Config,
            &format!("Config file '{}' not found, using default values", path),
        );
        return Ok(TrackerConfig::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| {
        TrackerError::Config(format!("Failed to read config file '{}': {}", path, e))
    })?;

    toml::from_str::<TrackerConfig>(&contents)
        .map_err(|e| TrackerError::Config(format!("Failed to parse config file '{}': {}", path, e)))
}

/// Save configuration as pretty TOML
pub fn save_config(config: &TrackerConfig, path: &str) -> Result<(), TrackerError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| TrackerError::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Resolve the provider API key
///
/// Loads `config.env` / `.env` into the process environment (existing
/// variables win), then checks the environment, then the config file value.
pub fn resolve_api_key(config: &TrackerConfig) -> Option<String> {
    for file in ENV_FILES {
        if Path::new(file).exists() {
            dotenv::from_filename(file).ok();
        }
    }

    API_KEY_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .chain(config.api.api_key.clone())
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_TOKEN_CONTRACT, DEFAULT_TX_HASHES};
    use std::io::Write;

    const SAMPLE: &str = r#"
[api]
chain_id = 1
max_retries = 5

[token]
contract = "0x01791F726B4103694969820be083196cC7c045fF"
decimals = 18
symbol = "YB"

[run]
tx_hashes = ["0xd237693e624f9703f9ea7e825677979e2bb3ff9dfa90d2feaedbdba1095b6421"]

[[activity]]
address = "0x8235c179e9e84688fbd8b12295efc26834dac211"
category = "staking"
functions = ["increase_amount", "create_lock"]

[[activity]]
address = "0xec977F46467a3021785Cff88894886E617abd65b"
category = "liquidity"
functions = ["add_liquidity"]
"#;

    #[test]
    fn test_parse_config_sections() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.api.max_retries, 5);
        // Untouched fields keep their defaults
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.token.symbol.as_deref(), Some("YB"));
        assert_eq!(config.run.tx_hashes.len(), 1);
        assert_eq!(config.run.holder_page_size, 10_000);
        assert_eq!(config.activity.len(), 2);
        assert_eq!(config.activity[0].category, "staking");
        assert_eq!(config.activity[1].functions, vec!["add_liquidity"]);
    }

    #[test]
    fn test_parse_config_rejects_bad_toml() {
        let err = parse_config("[api\nchain_id = ").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config =
            load_config_from_path("/nonexistent/airdrop/config.toml", &Logger::null()).unwrap();
        assert_eq!(config, TrackerConfig::default());
        assert_eq!(config.token.contract, DEFAULT_TOKEN_CONTRACT);
        assert_eq!(config.run.tx_hashes.len(), DEFAULT_TX_HASHES.len());
        assert_eq!(config.activity.len(), 2);
    }

    #[test]
    fn test_empty_activity_list_overrides_defaults() {
        let config = parse_config("activity = []\n").unwrap();
        assert!(config.activity.is_empty());
        assert_eq!(config.token.contract, DEFAULT_TOKEN_CONTRACT);
    }

    #[test]
    fn test_load_and_save_roundtrip_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = load_config_from_path(&path, &Logger::null()).unwrap();
        assert_eq!(config.token.decimals, 18);

        let out = tempfile::NamedTempFile::new().unwrap();
        let out_path = out.path().to_str().unwrap().to_string();
        save_config(&config, &out_path).unwrap();
        let reloaded = load_config_from_path(&out_path, &Logger::null()).unwrap();
        assert_eq!(reloaded, config);
    }
}
