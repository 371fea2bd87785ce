/// Etherscan v2 API client
///
/// API Documentation: https://docs.etherscan.io/etherscan-v2
///
/// Endpoints used:
/// 1. proxy/eth_getTransactionReceipt - seed receipts
/// 2. token/tokenholderlist - paginated holder balances
/// 3. token/tokenholdercount - total holder count
/// 4. account/tokentx - paginated token transfer history
///
/// Every request goes through `call`, which owns retries, rate-limit
/// handling, pacing and call accounting. Page walking lives in the
/// fetcher modules.
pub mod types;

pub use self::types::{
    ApiEnvelope, HolderRecord, ReceiptLog, TokenTransfer, TransactionReceipt,
};

use crate::apis::client::{ApiTransport, HttpClient, RateLimiter};
use crate::apis::stats::ApiCallCounter;
use crate::config::ApiConfig;
use crate::errors::ApiError;
use crate::logger::{LogTag, Logger};
use crate::transfers::TransferQuery;
use crate::types::Address;
use rand::Rng;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Why the last attempt failed, kept until the retry budget runs out
enum AttemptFailure {
    Transient(String),
    RateLimited,
}

/// Retry and pacing knobs taken from `ApiConfig`
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub rate_limit_delay: Duration,
    pub exponential_backoff: bool,
    pub max_retry_delay: Duration,
    pub jitter: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            rate_limit_delay: Duration::from_millis(config.rate_limit_delay_ms),
            exponential_backoff: config.exponential_backoff,
            max_retry_delay: Duration::from_millis(config.max_retry_delay_ms),
            jitter: Duration::from_millis(config.retry_jitter_ms),
        }
    }

    /// Delay before the attempt following `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let base = if self.exponential_backoff {
            let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
            self.retry_delay
                .saturating_mul(factor)
                .min(self.max_retry_delay)
        } else {
            self.retry_delay
        };

        if self.jitter.is_zero() {
            return base;
        }
        let jitter_ms = rand::thread_rng().gen_range(0..=self.jitter.as_millis() as u64);
        base + Duration::from_millis(jitter_ms)
    }
}

pub struct EtherscanClient {
    transport: Arc<dyn ApiTransport>,
    base_url: String,
    chain_id: u64,
    api_key: String,
    policy: RetryPolicy,
    rate_limiter: RateLimiter,
    page_delay: Duration,
    receipt_delay: Duration,
    calls: ApiCallCounter,
    logger: Logger,
}

impl EtherscanClient {
    /// Client over a fresh reqwest transport
    pub fn new(config: &ApiConfig, api_key: Option<String>, logger: Logger) -> Result<Self, ApiError> {
        let transport = HttpClient::new(config.timeout_secs).map_err(ApiError::InvalidResponse)?;
        Self::with_transport(Arc::new(transport), config, api_key, logger)
    }

    /// Client over an existing transport
    ///
    /// Runs that execute concurrently can share one transport while each
    /// keeps its own counter, pacing and log sink.
    pub fn with_transport(
        transport: Arc<dyn ApiTransport>,
        config: &ApiConfig,
        api_key: Option<String>,
        logger: Logger,
    ) -> Result<Self, ApiError> {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ApiError::MissingApiKey)?;

        Ok(Self {
            transport,
            base_url: config.base_url.clone(),
            chain_id: config.chain_id,
            api_key,
            policy: RetryPolicy::from_config(config),
            rate_limiter: RateLimiter::new(config.max_requests_per_second),
            page_delay: Duration::from_millis(config.page_delay_ms),
            receipt_delay: Duration::from_millis(config.receipt_delay_ms),
            calls: ApiCallCounter::new(),
            logger,
        })
    }

    pub fn api_calls(&self) -> u64 {
        self.calls.get()
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Pause between pages of a paged listing
    pub fn page_delay(&self) -> Duration {
        self.page_delay
    }

    /// Pause between seed receipt requests
    pub fn receipt_delay(&self) -> Duration {
        self.receipt_delay
    }

    fn build_query(&self, params: &[(&str, String)]) -> Vec<(String, String)> {
        let mut query = Vec::with_capacity(params.len() + 2);
        query.push(("chainid".to_string(), self.chain_id.to_string()));
        query.extend(params.iter().map(|(k, v)| (k.to_string(), v.clone())));
        query.push(("apikey".to_string(), self.api_key.clone()));
        query
    }

    /// Issue one logical request
    ///
    /// Transport failures and HTTP 429/5xx are retried after the backoff
    /// delay; a rate-limit notice in the payload waits the longer
    /// `rate_limit_delay`. Both share the same attempt budget.
    /// Provider errors and other HTTP statuses return immediately.
    pub async fn call(&self, params: &[(&str, String)]) -> Result<ApiEnvelope, ApiError> {
        let query = self.build_query(params);
        let endpoint = params
            .iter()
            .find(|(k, _)| *k == "action")
            .map(|(_, v)| v.as_str())
            .unwrap_or("unknown");

        let mut last_failure = AttemptFailure::Transient("no attempt made".to_string());

        for attempt in 1..=self.policy.max_attempts {
            let is_last = attempt == self.policy.max_attempts;

            self.rate_limiter.acquire().await;
            let total = self.calls.increment();
            self.logger.debug(
                LogTag::Api,
                &format!(
                    "[ETHERSCAN] {} attempt {}/{} (call #{})",
                    endpoint, attempt, self.policy.max_attempts, total
                ),
            );

            let response = match self.transport.get(&self.base_url, &query).await {
                Ok(response) => response,
                Err(err) => {
                    self.logger.warning(
                        LogTag::Api,
                        &format!(
                            "{} attempt {} failed: {}",
                            endpoint, attempt, err
                        ),
                    );
                    last_failure = AttemptFailure::Transient(err.to_string());
                    if !is_last {
                        tokio::time::sleep(self.policy.backoff(attempt)).await;
                    }
                    continue;
                }
            };

            if response.status == 429 {
                self.logger
                    .warning(LogTag::Api, &format!("{} rate limited (HTTP 429), waiting...", endpoint));
                last_failure = AttemptFailure::RateLimited;
                if !is_last {
                    tokio::time::sleep(self.policy.backoff(attempt)).await;
                }
                continue;
            }

            if response.status >= 500 {
                self.logger.warning(
                    LogTag::Api,
                    &format!("{} attempt {} got HTTP {}", endpoint, attempt, response.status),
                );
                last_failure = AttemptFailure::Transient(format!("HTTP {}", response.status));
                if !is_last {
                    tokio::time::sleep(self.policy.backoff(attempt)).await;
                }
                continue;
            }

            if !response.is_success() {
                return Err(ApiError::Http {
                    status: response.status,
                    body: response.body,
                });
            }

            let envelope: ApiEnvelope = serde_json::from_str(&response.body).map_err(|e| {
                ApiError::InvalidResponse(format!("{} returned unparsable body: {}", endpoint, e))
            })?;
            self.logger
                .verbose(LogTag::Api, &format!("{} response: {}", endpoint, response.body));

            if envelope.is_rate_limited() {
                self.logger
                    .warning(LogTag::Api, &format!("{} rate limited, waiting...", endpoint));
                last_failure = AttemptFailure::RateLimited;
                if !is_last {
                    tokio::time::sleep(self.policy.rate_limit_delay).await;
                }
                continue;
            }

            if let Some(err) = envelope.provider_error() {
                return Err(err);
            }

            return Ok(envelope);
        }

        let attempts = self.policy.max_attempts;
        Err(match last_failure {
            AttemptFailure::RateLimited => ApiError::RateLimited { attempts },
            AttemptFailure::Transient(message) => ApiError::Transient { attempts, message },
        })
    }
}

// ============================================================================
// ENDPOINTS
// ============================================================================

impl EtherscanClient {
    /// `proxy/eth_getTransactionReceipt`; `Ok(None)` when the node knows no such tx
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: &str,
    ) -> Result<Option<TransactionReceipt>, ApiError> {
        let envelope = self
            .call(&[
                ("module", "proxy".to_string()),
                ("action", "eth_getTransactionReceipt".to_string()),
                ("txhash", tx_hash.to_string()),
            ])
            .await?;

        match &envelope.result {
            Value::Null => Ok(None),
            Value::Object(_) => serde_json::from_value(envelope.result.clone())
                .map(Some)
                .map_err(|e| ApiError::InvalidResponse(format!("Malformed receipt: {}", e))),
            other => Err(ApiError::InvalidResponse(format!(
                "Unexpected receipt payload: {}",
                types::value_to_display(other)
            ))),
        }
    }

    /// One `token/tokenholderlist` page as raw entries; `Ok(None)` for a non-array result
    pub async fn get_token_holder_page(
        &self,
        contract: &Address,
        page: u32,
        offset: u32,
    ) -> Result<Option<Vec<Value>>, ApiError> {
        let envelope = self
            .call(&[
                ("module", "token".to_string()),
                ("action", "tokenholderlist".to_string()),
                ("contractaddress", contract.to_string()),
                ("page", page.to_string()),
                ("offset", offset.to_string()),
            ])
            .await?;

        Ok(envelope.result_list().cloned())
    }

    /// `token/tokenholdercount`
    pub async fn get_token_holder_count(&self, contract: &Address) -> Result<u64, ApiError> {
        let envelope = self
            .call(&[
                ("module", "token".to_string()),
                ("action", "tokenholdercount".to_string()),
                ("contractaddress", contract.to_string()),
            ])
            .await?;

        let raw = types::value_to_display(&envelope.result);
        raw.trim()
            .parse::<u64>()
            .map_err(|_| ApiError::InvalidResponse(format!("Holder count is not a number: {}", raw)))
    }

    /// One `account/tokentx` page as raw entries
    ///
    /// "No transactions found" is end of data and comes back as an empty page.
    pub async fn get_token_transfers_page(
        &self,
        query: &TransferQuery,
        page: u32,
    ) -> Result<Option<Vec<Value>>, ApiError> {
        let mut params = vec![
            ("module", "account".to_string()),
            ("action", "tokentx".to_string()),
            ("address", query.address.to_string()),
        ];
        if let Some(contract) = &query.contract {
            params.push(("contractaddress", contract.to_string()));
        }
        params.extend([
            ("startblock", query.start_block.to_string()),
            ("endblock", query.end_block.to_string()),
            ("page", page.to_string()),
            ("offset", query.page_size.to_string()),
            ("sort", query.sort.as_str().to_string()),
        ]);

        match self.call(&params).await {
            Ok(envelope) => Ok(envelope.result_list().cloned()),
            Err(err) if err.is_no_records() => Ok(Some(Vec::new())),
            Err(err) => Err(err),
        }
    }
}
