//! Upstream data provider access

pub mod client;
pub mod etherscan;
pub mod stats;

#[cfg(test)]
pub mod mock;

pub use client::{ApiTransport, HttpClient, RateLimiter, TransportError, TransportResponse};
pub use etherscan::EtherscanClient;
pub use stats::ApiCallCounter;
