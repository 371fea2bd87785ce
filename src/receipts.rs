/// Seed receipt retrieval and Transfer log extraction
use crate::apis::etherscan::{ReceiptLog, TransactionReceipt};
use crate::apis::EtherscanClient;
use crate::errors::TrackerError;
use crate::logger::{LogTag, Logger};
use crate::types::{parse_word, Address, TokenAmount, TransferEvent};

/// keccak256("Transfer(address,address,uint256)")
pub const TRANSFER_TOPIC: &str =
    "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

/// Fetch one seed receipt; any failure here aborts the run
pub async fn fetch_receipt(
    client: &EtherscanClient,
    tx_hash: &str,
) -> Result<TransactionReceipt, TrackerError> {
    match client.get_transaction_receipt(tx_hash).await {
        Ok(Some(receipt)) => Ok(receipt),
        Ok(None) => Err(TrackerError::FatalFetch {
            tx_hash: tx_hash.to_string(),
            reason: "receipt not found".to_string(),
        }),
        Err(err) => Err(TrackerError::FatalFetch {
            tx_hash: tx_hash.to_string(),
            reason: err.to_string(),
        }),
    }
}

/// Transfer events of `token` recorded in `receipt`, in log order
pub fn parse_receipt(
    receipt: &TransactionReceipt,
    token: &Address,
    logger: &Logger,
) -> Vec<TransferEvent> {
    receipt
        .logs
        .iter()
        .filter(|log| is_token_transfer(log, token))
        .filter_map(|log| parse_transfer_log(log, logger))
        .collect()
}

fn is_token_transfer(log: &ReceiptLog, token: &Address) -> bool {
    if Address::parse(&log.address).as_ref() != Some(token) {
        return false;
    }
    match (log.topics.first(), parse_word(TRANSFER_TOPIC)) {
        (Some(topic), Some(transfer)) => parse_word(topic) == Some(transfer),
        _ => false,
    }
}

fn parse_transfer_log(log: &ReceiptLog, logger: &Logger) -> Option<TransferEvent> {
    let position = log.log_index.as_deref().unwrap_or("?");

    let recipient = match log.topics.get(2).and_then(|t| Address::from_topic(t)) {
        Some(address) => address,
        None => {
            logger.warning(
                LogTag::Receipts,
                &format!(
                    "Skipping Transfer log {} without a readable recipient topic",
                    position
                ),
            );
            return None;
        }
    };

    let amount = match log.data.as_deref().and_then(TokenAmount::from_hex_str) {
        Some(amount) => amount,
        None => {
            logger.warning(
                LogTag::Receipts,
                &format!(
                    "Transfer log {} to {} has unreadable amount {:?}, counting as 0",
                    position,
                    recipient.short(),
                    log.data
                ),
            );
            TokenAmount::zero()
        }
    };

    Some(TransferEvent { recipient, amount })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::mock::{rpc_envelope, test_api_config, ScriptedTransport};
    use crate::logger::{LogLevel, MemorySink};
    use std::sync::Arc;

    const TOKEN: &str = "0x01791f726b4103694969820be083196cc7c045ff";
    const OTHER: &str = "0x8235c179e9e84688fbd8b12295efc26834dac211";
    const SENDER_TOPIC: &str =
        "0x0000000000000000000000009999999999999999999999999999999999999999";

    fn recipient_topic(hex40: &str) -> String {
        format!("0x000000000000000000000000{}", hex40)
    }

    fn transfer_log(emitter: &str, topics: Vec<String>, data: Option<&str>) -> ReceiptLog {
        ReceiptLog {
            address: emitter.to_string(),
            topics,
            data: data.map(str::to_string),
            log_index: Some("0x0".to_string()),
        }
    }

    fn token() -> Address {
        Address::parse(TOKEN).unwrap()
    }

    #[test]
    fn test_parse_keeps_only_token_transfers() {
        let receipt = TransactionReceipt {
            logs: vec![
                transfer_log(
                    &TOKEN.to_uppercase().replace("0X", "0x"),
                    vec![
                        TRANSFER_TOPIC.to_uppercase().replace("0X", "0x"),
                        SENDER_TOPIC.to_string(),
                        recipient_topic("aAaAaAaAaAaAaAaAaAaAaAaAaAaAaAaAaAaAaAaA"),
                    ],
                    Some("0x3e8"),
                ),
                // Other contract
                transfer_log(
                    OTHER,
                    vec![
                        TRANSFER_TOPIC.to_string(),
                        SENDER_TOPIC.to_string(),
                        recipient_topic("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"),
                    ],
                    Some("0x1"),
                ),
                // Approval event from the token
                transfer_log(
                    TOKEN,
                    vec![
                        "0x8c5be1e5ebec7d5bd14f71427d1e84f3dd0314c0f7b2291e5b200ac8c7c3b925"
                            .to_string(),
                        SENDER_TOPIC.to_string(),
                        recipient_topic("cccccccccccccccccccccccccccccccccccccccc"),
                    ],
                    Some("0x1"),
                ),
            ],
            ..Default::default()
        };

        let events = parse_receipt(&receipt, &token(), &Logger::null());
        assert_eq!(
            events,
            vec![TransferEvent {
                recipient: Address::parse("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap(),
                amount: TokenAmount::from_u128(1000),
            }]
        );
    }

    #[test]
    fn test_parse_degrades_malformed_entries() {
        let sink = Arc::new(MemorySink::new());
        let logger = Logger::from_arc(sink.clone());
        let receipt = TransactionReceipt {
            logs: vec![
                // Missing recipient topic
                transfer_log(
                    TOKEN,
                    vec![TRANSFER_TOPIC.to_string(), SENDER_TOPIC.to_string()],
                    Some("0x10"),
                ),
                // Unreadable data
                transfer_log(
                    TOKEN,
                    vec![
                        TRANSFER_TOPIC.to_string(),
                        SENDER_TOPIC.to_string(),
                        recipient_topic("dddddddddddddddddddddddddddddddddddddddd"),
                    ],
                    Some("0x"),
                ),
            ],
            ..Default::default()
        };

        let events = parse_receipt(&receipt, &token(), &logger);
        assert_eq!(events.len(), 1);
        assert!(events[0].amount.is_zero());
        assert_eq!(sink.count_at(LogLevel::Warning), 2);
    }

    #[test]
    fn test_parse_receipt_without_logs() {
        let receipt = TransactionReceipt::default();
        assert!(parse_receipt(&receipt, &token(), &Logger::null()).is_empty());
    }

    #[tokio::test]
    async fn test_fetch_null_receipt_is_fatal() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_response(rpc_envelope(serde_json::Value::Null));
        let client = EtherscanClient::with_transport(
            transport,
            &test_api_config(),
            Some("KEY".to_string()),
            Logger::null(),
        )
        .unwrap();

        let err = fetch_receipt(&client, "0xdead").await.unwrap_err();
        assert!(err.is_fatal_fetch());
    }

    #[tokio::test]
    async fn test_fetch_receipt_after_exhausted_retries_is_fatal() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = EtherscanClient::with_transport(
            transport.clone(),
            &test_api_config(),
            Some("KEY".to_string()),
            Logger::null(),
        )
        .unwrap();

        // Empty script: every attempt fails at the transport
        let err = fetch_receipt(&client, "0xdead").await.unwrap_err();
        assert!(err.is_fatal_fetch());
        assert_eq!(transport.request_count(), 3);
    }
}
