//! Configuration: TOML-backed settings with embedded defaults

pub mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::{
    ActivityContractConfig, ApiConfig, RunConfig, TokenConfig, TrackerConfig,
    DEFAULT_TOKEN_CONTRACT, DEFAULT_TX_HASHES, ETHERSCAN_V2_URL,
};
pub use utils::{
    load_config_from_path, parse_config, resolve_api_key, save_config, CONFIG_FILE_PATH,
};
