/// Current token balances from the paginated holder listing
use crate::apis::etherscan::HolderRecord;
use crate::apis::EtherscanClient;
use crate::logger::{LogTag, Logger};
use crate::types::{Address, HolderSnapshot, TokenAmount};
use serde_json::Value;

/// Walk `tokenholderlist` until the listing runs out or `max_holders` is reached
///
/// Provider or transport failures end the walk early; whatever was collected
/// is returned with `complete` cleared.
pub async fn fetch_all_holders(
    client: &EtherscanClient,
    contract: &Address,
    page_size: u32,
    max_holders: Option<usize>,
) -> HolderSnapshot {
    let logger = client.logger();
    let page_size = page_size.max(1);
    let mut snapshot = HolderSnapshot::new();
    let mut page: u32 = 1;

    logger.info(
        LogTag::Holders,
        &format!("Fetching holder list for {} ({} per page)", contract, page_size),
    );

    loop {
        let entries = match client.get_token_holder_page(contract, page, page_size).await {
            Ok(entries) => entries,
            Err(err) => {
                logger.warning(
                    LogTag::Holders,
                    &format!(
                        "Holder listing stopped at page {}: {} (keeping {} holders)",
                        page,
                        err,
                        snapshot.len()
                    ),
                );
                snapshot.complete = false;
                break;
            }
        };
        snapshot.pages_fetched += 1;

        let entries = match entries {
            Some(entries) if !entries.is_empty() => entries,
            _ => break,
        };
        let received = entries.len();

        let mut capped = false;
        for entry in &entries {
            if let Some(max) = max_holders {
                if snapshot.len() >= max {
                    capped = true;
                    break;
                }
            }
            if let Some((address, balance)) = parse_holder(entry, logger) {
                snapshot.insert(address, balance);
            }
        }

        logger.debug(
            LogTag::Holders,
            &format!(
                "Page {}: {} records, {} holders so far",
                page,
                received,
                snapshot.len()
            ),
        );

        if capped || max_holders.map(|max| snapshot.len() >= max).unwrap_or(false) {
            logger.info(
                LogTag::Holders,
                &format!("Reached holder limit of {}", snapshot.len()),
            );
            break;
        }

        if received < page_size as usize {
            break;
        }

        page += 1;
        tokio::time::sleep(client.page_delay()).await;
    }

    logger.info(
        LogTag::Holders,
        &format!(
            "Collected {} holders over {} page(s)",
            snapshot.len(),
            snapshot.pages_fetched
        ),
    );
    snapshot
}

fn parse_holder(entry: &Value, logger: &Logger) -> Option<(Address, TokenAmount)> {
    let record: HolderRecord = match serde_json::from_value(entry.clone()) {
        Ok(record) => record,
        Err(e) => {
            logger.warning(LogTag::Holders, &format!("Skipping malformed holder entry: {}", e));
            return None;
        }
    };

    let raw_address = record.address.unwrap_or_default();
    let address = match Address::parse(&raw_address) {
        Some(address) => address,
        None => {
            logger.warning(
                LogTag::Holders,
                &format!("Skipping holder with invalid address '{}'", raw_address),
            );
            return None;
        }
    };

    let balance = match record.quantity.as_deref().and_then(TokenAmount::from_dec_str) {
        Some(balance) => balance,
        None => {
            logger.warning(
                LogTag::Holders,
                &format!(
                    "Holder {} has unreadable quantity {:?}, counting as 0",
                    address.short(),
                    record.quantity
                ),
            );
            TokenAmount::zero()
        }
    };

    Some((address, balance))
}

/// Total holder count, informational only
pub async fn fetch_holder_count(client: &EtherscanClient, contract: &Address) -> Option<u64> {
    match client.get_token_holder_count(contract).await {
        Ok(count) => {
            client
                .logger()
                .info(LogTag::Holders, &format!("Token reports {} holders", count));
            Some(count)
        }
        Err(err) => {
            client
                .logger()
                .warning(LogTag::Holders, &format!("Could not fetch holder count: {}", err));
            None
        }
    }
}
