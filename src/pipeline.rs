/// End-to-end reconciliation run
///
/// Receipts -> recipients -> holder snapshot -> activity -> rows.
/// Everything a run accumulates lives on its own stack; the only shared
/// piece between concurrent runs is whatever transport the caller hands in.
use crate::activity::{aggregate_activity, ActivityConfig};
use crate::apis::EtherscanClient;
use crate::config::TrackerConfig;
use crate::errors::TrackerError;
use crate::holders::{fetch_all_holders, fetch_holder_count};
use crate::logger::LogTag;
use crate::receipts::{fetch_receipt, parse_receipt};
use crate::reconcile::{reconcile, Reconciliation};
use crate::types::{normalize_tx_hash, Address, ReceivedTotals};

/// Recipients kept in test mode
pub const TEST_MODE_RECIPIENTS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct TokenSpec {
    pub contract: Address,
    pub decimals: u32,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Keep only the first N recipients
    pub max_recipients: Option<usize>,
    pub holder_page_size: u32,
    pub max_holders: Option<usize>,
    pub fetch_holder_count: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_recipients: None,
            holder_page_size: 10_000,
            max_holders: None,
            fetch_holder_count: true,
        }
    }
}

/// Validated inputs for one run
#[derive(Debug, Clone, PartialEq)]
pub struct AirdropRequest {
    /// Normalized seed transaction hashes, in input order
    pub tx_hashes: Vec<String>,
    pub token: TokenSpec,
    pub activity: ActivityConfig,
    pub options: RunOptions,
}

impl AirdropRequest {
    /// Validate a loaded configuration without touching the network
    pub fn from_config(config: &TrackerConfig) -> Result<Self, TrackerError> {
        let contract = Address::parse(&config.token.contract).ok_or_else(|| {
            TrackerError::Config(format!(
                "Token contract '{}' is not a valid address",
                config.token.contract
            ))
        })?;

        let tx_hashes = normalize_tx_hashes(&config.run.tx_hashes)?;

        let activity = ActivityConfig::from_config(&config.activity)?;

        Ok(Self {
            tx_hashes,
            token: TokenSpec {
                contract,
                decimals: config.token.decimals,
                symbol: config.token.symbol.clone(),
            },
            activity,
            options: RunOptions {
                max_recipients: config.run.max_recipients,
                holder_page_size: config.run.holder_page_size,
                max_holders: config.run.max_holders,
                fetch_holder_count: config.run.fetch_holder_count,
            },
        })
    }
}

fn normalize_tx_hashes(raw: &[String]) -> Result<Vec<String>, TrackerError> {
    if raw.is_empty() {
        return Err(TrackerError::Config(
            "No airdrop transaction hashes configured".to_string(),
        ));
    }
    raw.iter()
        .map(|hash| {
            normalize_tx_hash(hash).ok_or_else(|| {
                TrackerError::Config(format!("'{}' is not a valid transaction hash", hash))
            })
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct AirdropReport {
    pub reconciliation: Reconciliation,
    /// Attempts that reached the network during this run
    pub api_calls: u64,
    /// Recipients reconciled (after any test-mode cut)
    pub recipients: usize,
    pub holder_count: Option<u64>,
    /// False when the holder listing ended on an error
    pub snapshot_complete: bool,
}

/// Run one reconciliation, logging through the client's logger
///
/// Hashes are re-checked here since `AirdropRequest` can be built by hand;
/// a malformed one fails as a config error before any request is sent.
pub async fn fetch_airdrop_data(
    client: &EtherscanClient,
    request: &AirdropRequest,
) -> Result<AirdropReport, TrackerError> {
    let logger = client.logger();
    let token = &request.token.contract;
    let tx_hashes = normalize_tx_hashes(&request.tx_hashes)?;
    let calls_at_start = client.api_calls();

    // 1. Seed receipts, strictly sequential
    logger.info(
        LogTag::Receipts,
        &format!("Fetching {} airdrop transaction receipts", tx_hashes.len()),
    );
    let mut received = ReceivedTotals::new();
    for (index, tx_hash) in tx_hashes.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(client.receipt_delay()).await;
        }

        let receipt = match fetch_receipt(client, tx_hash).await {
            Ok(receipt) => receipt,
            Err(err) => {
                logger.error(LogTag::Receipts, &err.to_string());
                return Err(err);
            }
        };
        let events = parse_receipt(&receipt, token, logger);
        logger.info(
            LogTag::Receipts,
            &format!(
                "[{}/{}] {}: {} transfers",
                index + 1,
                tx_hashes.len(),
                tx_hash.get(..18).unwrap_or(tx_hash),
                events.len()
            ),
        );
        received.extend(events);
    }
    logger.info(
        LogTag::Receipts,
        &format!("Found {} unique recipients", received.len()),
    );

    if let Some(limit) = request.options.max_recipients {
        if received.len() > limit {
            logger.info(
                LogTag::Receipts,
                &format!("Test mode: keeping the first {} of {} recipients", limit, received.len()),
            );
            received.truncate(limit);
        }
    }

    // 2. Current balances
    let holder_count = if request.options.fetch_holder_count {
        fetch_holder_count(client, token).await
    } else {
        None
    };
    let snapshot = fetch_all_holders(
        client,
        token,
        request.options.holder_page_size,
        request.options.max_holders,
    )
    .await;
    if !snapshot.complete {
        logger.warning(
            LogTag::Holders,
            "Holder snapshot is partial; some recipients may show a zero balance",
        );
    }

    // 3. Activity attribution
    let activity = if request.activity.is_empty() {
        Default::default()
    } else {
        aggregate_activity(client, received.addresses(), &request.activity, token).await
    };

    // 4. Join
    let reconciliation = reconcile(&received, &snapshot, &activity, request.token.decimals);
    if reconciliation.not_found > 0 {
        logger.info(
            LogTag::Reconcile,
            &format!(
                "{} recipients not in holder list (balance counted as 0)",
                reconciliation.not_found
            ),
        );
    }

    let api_calls = client.api_calls() - calls_at_start;
    logger.info(
        LogTag::Reconcile,
        &format!(
            "Reconciled {} recipients using {} API calls",
            reconciliation.rows.len(),
            api_calls
        ),
    );

    Ok(AirdropReport {
        recipients: reconciliation.rows.len(),
        reconciliation,
        api_calls,
        holder_count,
        snapshot_complete: snapshot.complete,
    })
}
