/// Configuration schemas - every section defined once with its defaults
use crate::config_struct;

/// Etherscan v2 multichain endpoint
pub const ETHERSCAN_V2_URL: &str = "https://api.etherscan.io/v2/api";

/// YB token on Ethereum mainnet
pub const DEFAULT_TOKEN_CONTRACT: &str = "0x01791f726b4103694969820be083196cc7c045ff";

/// Seed transactions of the YB airdrop
pub const DEFAULT_TX_HASHES: [&str; 8] = [
    "0xd237693e624f9703f9ea7e825677979e2bb3ff9dfa90d2feaedbdba1095b6421",
    "0x49221e43c6e052ca363cd6a11cb3bd4e6103cad263b4e7dbcb153684be8f7430",
    "0x4992e07a5fc08679e78a8cf31bca71439f1e291dba8abcd3794dfc8bf4252a86",
    "0x8d5309864c224dfbd1e16fa158e40147611ebbaea1ce03de757ce4519c7ecbc0",
    "0xbc358060f75b9ef1bf92c500e891d5f02ab70e44b08209f340ed26ae9775a3e6",
    "0x27417dfb374d9041f3bb3923f21d670488cbdc23cc674c4e965708ed5ea52d57",
    "0xab8629e7fef19281ae290de54d0cdcf5d7545722dce544e3d089e6052a4995c1",
    "0x098d225c5a663f108edea82ce8097b7196c12206792af99d0c30745083b8295b",
];

// ============================================================================
// API CONFIGURATION
// ============================================================================

config_struct! {
    /// Upstream data provider access and pacing
    pub struct ApiConfig {
        base_url: String = ETHERSCAN_V2_URL.to_string(),
        chain_id: u64 = 1,
        /// Prefer ETHERSCAN_API_KEY in the environment or config.env
        api_key: Option<String> = None,

        // Request behaviour
        timeout_secs: u64 = 30,
        max_retries: u32 = 3,
        retry_delay_ms: u64 = 2_000,
        rate_limit_delay_ms: u64 = 5_000,

        // Optional exponential backoff (off = fixed retry_delay_ms)
        exponential_backoff: bool = false,
        max_retry_delay_ms: u64 = 30_000,
        retry_jitter_ms: u64 = 0,

        // Courtesy pacing
        max_requests_per_second: u32 = 8,
        page_delay_ms: u64 = 500,
        receipt_delay_ms: u64 = 1_000,
    }
}

// ============================================================================
// TOKEN CONFIGURATION
// ============================================================================

config_struct! {
    /// The airdropped token being tracked
    pub struct TokenConfig {
        contract: String = DEFAULT_TOKEN_CONTRACT.to_string(),
        decimals: u32 = 18,
        /// Appended to amount column names, e.g. received_total_YB
        symbol: Option<String> = Some("YB".to_string()),
    }
}

// ============================================================================
// RUN CONFIGURATION
// ============================================================================

config_struct! {
    /// Inputs and limits for one reconciliation run
    pub struct RunConfig {
        tx_hashes: Vec<String> = DEFAULT_TX_HASHES.iter().map(|h| h.to_string()).collect(),
        output: String = "yb_airdrop_balances.csv".to_string(),
        /// Test mode keeps only the first N recipients
        max_recipients: Option<usize> = None,
        holder_page_size: u32 = 10_000,
        max_holders: Option<usize> = None,
        fetch_holder_count: bool = true,
    }
}

// ============================================================================
// ACTIVITY CONFIGURATION
// ============================================================================

config_struct! {
    /// One smart contract whose inbound token transfers are attributed to a category
    pub struct ActivityContractConfig {
        address: String = String::new(),
        category: String = String::new(),
        /// Case-insensitive substrings of the decoded function name
        functions: Vec<String> = Vec::new(),
    }
}

config_struct! {
    /// Root configuration
    pub struct TrackerConfig {
        api: ApiConfig = ApiConfig::default(),
        token: TokenConfig = TokenConfig::default(),
        run: RunConfig = RunConfig::default(),
        /// An explicit empty list (`activity = []`) disables attribution
        activity: Vec<ActivityContractConfig> = default_activity(),
    }
}

/// Staking and liquidity contracts tracked out of the box
fn default_activity() -> Vec<ActivityContractConfig> {
    vec![
        ActivityContractConfig {
            address: "0x8235c179e9e84688fbd8b12295efc26834dac211".to_string(),
            category: "staking".to_string(),
            functions: vec!["increase_amount".to_string(), "create_lock".to_string()],
        },
        ActivityContractConfig {
            address: "0xec977F46467a3021785Cff88894886E617abd65b".to_string(),
            category: "liquidity".to_string(),
            functions: vec!["add_liquidity".to_string()],
        },
    ]
}
