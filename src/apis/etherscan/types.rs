/// Etherscan API response types
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::errors::ApiError;

// ============================================================================
// CUSTOM DESERIALIZERS - Handle API inconsistencies
// ============================================================================

/// Accept a string, a number or null for fields like `status`
///
/// The v2 API returns `"1"`/`"0"` strings, but some proxies relay numbers.
fn deserialize_loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Render a result payload for error messages without JSON quoting of plain strings
pub fn value_to_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// ============================================================================
// ENVELOPE
// ============================================================================

/// Top-level response shape
///
/// Module endpoints answer `{status, message, result}`; proxy endpoints
/// answer JSON-RPC `{jsonrpc, id, result}` or `{jsonrpc, id, error}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiEnvelope {
    /// Provider embedded a rate-limit notice in the payload
    pub fn is_rate_limited(&self) -> bool {
        let in_result = match &self.result {
            Value::String(s) => s.to_lowercase().contains("rate limit"),
            _ => false,
        };
        let in_message = self
            .message
            .as_deref()
            .map(|m| m.to_lowercase().contains("rate limit"))
            .unwrap_or(false);
        in_result || in_message
    }

    /// Application-level failure reported by the provider, if any
    pub fn provider_error(&self) -> Option<ApiError> {
        if let Some(err) = &self.error {
            return Some(ApiError::Provider {
                message: err
                    .message
                    .clone()
                    .unwrap_or_else(|| "JSON-RPC error".to_string()),
                result: err.code.map(|c| c.to_string()).unwrap_or_default(),
            });
        }

        if self.status.as_deref() == Some("0") {
            return Some(ApiError::Provider {
                message: self
                    .message
                    .clone()
                    .unwrap_or_else(|| "Unknown error".to_string()),
                result: value_to_display(&self.result),
            });
        }

        None
    }

    /// Result entries when the payload is an array
    pub fn result_list(&self) -> Option<&Vec<Value>> {
        self.result.as_array()
    }
}

// ============================================================================
// RECEIPTS
// ============================================================================

/// `eth_getTransactionReceipt` result (only the fields the parser reads)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    #[serde(default)]
    pub transaction_hash: Option<String>,
    #[serde(default)]
    pub block_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub logs: Vec<ReceiptLog>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLog {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub log_index: Option<String>,
}

// ============================================================================
// HOLDER LIST
// ============================================================================

/// One `tokenholderlist` entry
#[derive(Debug, Clone, Deserialize)]
pub struct HolderRecord {
    #[serde(rename = "TokenHolderAddress", default)]
    pub address: Option<String>,
    #[serde(
        rename = "TokenHolderQuantity",
        default,
        deserialize_with = "deserialize_loose_string"
    )]
    pub quantity: Option<String>,
}

// ============================================================================
// TOKEN TRANSFERS
// ============================================================================

/// One `tokentx` entry, kept close to the provider's shape
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransfer {
    #[serde(default)]
    pub block_number: Option<String>,
    #[serde(default)]
    pub time_stamp: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub value: Option<String>,
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(default)]
    pub token_symbol: Option<String>,
    #[serde(default)]
    pub token_decimal: Option<String>,
    #[serde(default)]
    pub function_name: String,
    #[serde(default)]
    pub method_id: Option<String>,
}
