/// Attribution of recipients' token movements into tracked contracts
///
/// Each configured contract names a category (e.g. "staking") and the
/// function-name fragments that count as that activity. A recipient's
/// transfer of the tracked token into the contract is credited to the
/// category when its decoded function name matches.
use crate::apis::EtherscanClient;
use crate::config::ActivityContractConfig;
use crate::errors::TrackerError;
use crate::logger::LogTag;
use crate::transfers::{fetch_all_transfers, TransferQuery};
use crate::types::{ActivityTotals, Address, TokenAmount};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityContract {
    pub address: Address,
    pub category: String,
    pub functions: Vec<String>,
}

impl ActivityContract {
    pub fn new(address: Address, category: &str, functions: &[&str]) -> Self {
        Self {
            address,
            category: category.to_string(),
            functions: functions.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Pattern that `function_name` matches, case-insensitively
    pub fn matching_pattern(&self, function_name: &str) -> Option<&str> {
        let name = function_name.to_lowercase();
        self.functions
            .iter()
            .find(|pattern| !pattern.is_empty() && name.contains(&pattern.to_lowercase()))
            .map(String::as_str)
    }

    fn is_usable(&self) -> bool {
        !self.category.trim().is_empty() && self.functions.iter().any(|f| !f.is_empty())
    }
}

/// Tracked contracts in configuration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityConfig {
    pub contracts: Vec<ActivityContract>,
}

impl ActivityConfig {
    pub fn new(contracts: Vec<ActivityContract>) -> Self {
        Self { contracts }
    }

    /// Validate contract addresses from the config file
    pub fn from_config(entries: &[ActivityContractConfig]) -> Result<Self, TrackerError> {
        let contracts = entries
            .iter()
            .map(|entry| {
                let address = Address::parse(&entry.address).ok_or_else(|| {
                    TrackerError::Config(format!(
                        "Activity contract '{}' ({}) is not a valid address",
                        entry.address, entry.category
                    ))
                })?;
                Ok(ActivityContract {
                    address,
                    category: entry.category.trim().to_string(),
                    functions: entry.functions.clone(),
                })
            })
            .collect::<Result<Vec<_>, TrackerError>>()?;
        Ok(Self { contracts })
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

/// Sum qualifying transfers per recipient and category
pub async fn aggregate_activity(
    client: &EtherscanClient,
    recipients: &[Address],
    config: &ActivityConfig,
    token: &Address,
) -> ActivityTotals {
    let logger = client.logger();
    let mut totals = ActivityTotals::new();
    let recipients: HashSet<&Address> = recipients.iter().collect();

    for contract in &config.contracts {
        if !contract.is_usable() {
            logger.warning(
                LogTag::Activity,
                &format!(
                    "Skipping activity contract {}: category and function patterns are required",
                    contract.address
                ),
            );
            continue;
        }

        logger.info(
            LogTag::Activity,
            &format!(
                "Scanning {} transfers into {}",
                contract.category, contract.address
            ),
        );

        let query = TransferQuery::new(contract.address.clone()).with_contract(token.clone());
        let history = fetch_all_transfers(client, &query).await;
        if !history.complete {
            logger.warning(
                LogTag::Activity,
                &format!(
                    "{} history for {} is partial ({} transfers)",
                    contract.category,
                    contract.address,
                    history.transfers.len()
                ),
            );
        }

        let mut matched = 0usize;
        for transfer in &history.transfers {
            let Some(sender) = Address::parse(&transfer.from) else {
                continue;
            };
            if !recipients.contains(&sender) {
                continue;
            }
            if contract.matching_pattern(&transfer.function_name).is_none() {
                continue;
            }

            let amount = match transfer.value.as_deref().and_then(TokenAmount::from_dec_str) {
                Some(amount) => amount,
                None => {
                    logger.warning(
                        LogTag::Activity,
                        &format!(
                            "Transfer {} from {} has unreadable value {:?}, counting as 0",
                            transfer.hash.as_deref().unwrap_or("?"),
                            sender.short(),
                            transfer.value
                        ),
                    );
                    TokenAmount::zero()
                }
            };
            totals.credit(&sender, &contract.category, &amount);
            matched += 1;
        }

        logger.info(
            LogTag::Activity,
            &format!(
                "{}: {} qualifying transfers out of {}",
                contract.category,
                matched,
                history.transfers.len()
            ),
        );
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::mock::{ok_envelope, test_api_config, RecordedRequest, ScriptedTransport};
    use crate::logger::Logger;
    use serde_json::json;
    use std::sync::Arc;

    const TOKEN: &str = "0x01791f726b4103694969820be083196cc7c045ff";
    const STAKING: &str = "0x8235c179e9e84688fbd8b12295efc26834dac211";
    const LIQUIDITY: &str = "0xec977f46467a3021785cff88894886e617abd65b";
    const ALICE: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const BOB: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
    const STRANGER: &str = "0xcccccccccccccccccccccccccccccccccccccccc";

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    fn transfer(from: &str, value: &str, function: &str) -> serde_json::Value {
        json!({"from": from, "to": STAKING, "value": value, "functionName": function})
    }

    fn activity_transport() -> Arc<ScriptedTransport> {
        Arc::new(ScriptedTransport::with_handler(|req: &RecordedRequest| {
            let records = match req.param("address") {
                Some(STAKING) => json!([
                    transfer(&ALICE.to_uppercase().replace("0X", "0x"), "100", "Create_Lock(uint256 _value, uint256 _unlock_time)"),
                    transfer(ALICE, "50", "increase_amount(uint256 _value)"),
                    transfer(ALICE, "999", "withdraw()"),
                    transfer(STRANGER, "700", "create_lock(uint256,uint256)"),
                    transfer(BOB, "oops", "create_lock(uint256,uint256)"),
                ]),
                Some(LIQUIDITY) => json!([transfer(BOB, "30", "add_liquidity(uint256[2],uint256)")]),
                _ => json!([]),
            };
            Ok(ok_envelope(records))
        }))
    }

    fn client(transport: Arc<ScriptedTransport>) -> EtherscanClient {
        EtherscanClient::with_transport(
            transport,
            &test_api_config(),
            Some("KEY".to_string()),
            Logger::null(),
        )
        .unwrap()
    }

    fn default_config() -> ActivityConfig {
        ActivityConfig::new(vec![
            ActivityContract::new(addr(STAKING), "staking", &["increase_amount", "create_lock"]),
            ActivityContract::new(addr(LIQUIDITY), "liquidity", &["add_liquidity"]),
        ])
    }

    #[test]
    fn test_pattern_match_is_case_insensitive_substring() {
        let contract = ActivityContract::new(addr(STAKING), "staking", &["increase_amount", "create_lock"]);
        assert_eq!(
            contract.matching_pattern("CREATE_LOCK(uint256,uint256)"),
            Some("create_lock")
        );
        assert_eq!(contract.matching_pattern("withdraw()"), None);
        assert_eq!(contract.matching_pattern(""), None);
    }

    #[tokio::test]
    async fn test_aggregates_qualifying_transfers() {
        let transport = activity_transport();
        let client = client(transport.clone());
        let recipients = vec![addr(ALICE), addr(BOB)];

        let totals = aggregate_activity(&client, &recipients, &default_config(), &addr(TOKEN)).await;

        assert_eq!(totals.get(&addr(ALICE), "staking"), Some(&TokenAmount::from_u128(150)));
        assert_eq!(totals.get(&addr(BOB), "staking"), Some(&TokenAmount::zero()));
        assert_eq!(totals.get(&addr(BOB), "liquidity"), Some(&TokenAmount::from_u128(30)));
        assert!(totals.for_address(&addr(STRANGER)).is_none());
        assert_eq!(totals.categories(), vec!["liquidity".to_string(), "staking".to_string()]);

        for request in transport.requests() {
            assert_eq!(request.param("contractaddress"), Some(TOKEN));
        }
    }

    #[tokio::test]
    async fn test_unusable_entries_are_skipped() {
        let transport = activity_transport();
        let client = client(transport.clone());
        let config = ActivityConfig::new(vec![
            ActivityContract::new(addr(STAKING), "", &["create_lock"]),
            ActivityContract::new(addr(LIQUIDITY), "liquidity", &[]),
        ]);

        let totals = aggregate_activity(&client, &[addr(ALICE)], &config, &addr(TOKEN)).await;
        assert!(totals.is_empty());
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn test_from_config_rejects_bad_address() {
        let entries = vec![ActivityContractConfig {
            address: "0x1234".to_string(),
            category: "staking".to_string(),
            functions: vec!["create_lock".to_string()],
        }];
        let err = ActivityConfig::from_config(&entries).unwrap_err();
        assert!(err.is_config());

        let entries = vec![ActivityContractConfig {
            address: STAKING.to_uppercase().replace("0X", "0x"),
            category: " staking ".to_string(),
            functions: vec!["create_lock".to_string()],
        }];
        let config = ActivityConfig::from_config(&entries).unwrap();
        assert_eq!(config.contracts[0].address, addr(STAKING));
        assert_eq!(config.contracts[0].category, "staking");
    }
}
