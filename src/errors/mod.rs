/// Error types for the airdrop tracker
///
/// Two layers:
/// - `ApiError` is produced by the HTTP access layer and describes what the
///   provider (or the network) did.
/// - `TrackerError` is what a pipeline run surfaces to its caller. Only the
///   conditions that abort a run live here; enrichment failures are logged
///   and degrade instead.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("No API key configured")]
    MissingApiKey,

    #[error("Transient network failure after {attempts} attempt(s): {message}")]
    Transient { attempts: u32, message: String },

    #[error("Rate limited by provider after {attempts} attempt(s)")]
    RateLimited { attempts: u32 },

    #[error("Provider error: {message} ({result})")]
    Provider { message: String, result: String },

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Provider answered "No transactions found", which paged listings treat as end of data
    pub fn is_no_records(&self) -> bool {
        match self {
            ApiError::Provider { message, result } => {
                let message = message.to_lowercase();
                let result = result.to_lowercase();
                message.contains("no transactions found")
                    || message.contains("no records found")
                    || result.contains("no transactions found")
            }
            _ => false,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ApiError::Transient { .. } | ApiError::RateLimited { .. }
        )
    }
}

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to fetch receipt for {tx_hash}: {reason}")]
    FatalFetch { tx_hash: String, reason: String },

    #[error("API error: {0}")]
    Api(ApiError),

    #[error("Report error: {0}")]
    Report(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl TrackerError {
    pub fn is_config(&self) -> bool {
        matches!(self, TrackerError::Config(_))
    }

    pub fn is_fatal_fetch(&self) -> bool {
        matches!(self, TrackerError::FatalFetch { .. })
    }
}

impl From<ApiError> for TrackerError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::MissingApiKey => {
                TrackerError::Config("Set ETHERSCAN_API_KEY in config.env or environment".into())
            }
            other => TrackerError::Api(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
