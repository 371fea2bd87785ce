/// Core domain types shared by every pipeline stage
use bigdecimal::BigDecimal;
use ethers::types::{H160, H256};
use num_bigint::{BigInt, BigUint};
use num_traits::{Num, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

// ============================================================================
// ADDRESS
// ============================================================================

/// 20-byte account identifier; renders as lowercase `0x` + 40 hex digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    raw: H160,
    text: String,
}

impl Address {
    /// Parse and normalize; accepts any hex casing, with or without `0x`
    pub fn parse(raw: &str) -> Option<Self> {
        H160::from_str(strip_hex_prefix(raw)).ok().map(Self::from_h160)
    }

    /// Address encoded in the low 20 bytes of a 32-byte indexed topic
    pub fn from_topic(topic: &str) -> Option<Self> {
        let word = parse_word(topic)?;
        Some(Self::from_h160(H160::from_slice(&word.as_bytes()[12..])))
    }

    pub fn from_h160(raw: H160) -> Self {
        Self {
            raw,
            text: format!("{:#x}", raw),
        }
    }

    pub fn as_h160(&self) -> &H160 {
        &self.raw
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// First 10 characters, for log lines
    pub fn short(&self) -> &str {
        &self.text[..10]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Address {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s).ok_or_else(|| format!("Invalid address: {}", s))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Address::parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid address '{}'", raw)))
    }
}

fn strip_hex_prefix(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
}

/// 32-byte word such as a log topic or transaction hash
pub fn parse_word(raw: &str) -> Option<H256> {
    H256::from_str(strip_hex_prefix(raw)).ok()
}

/// Transaction hash: `0x` + 64 hex digits, lowercase
pub fn normalize_tx_hash(raw: &str) -> Option<String> {
    parse_word(raw).map(|hash| format!("{:#x}", hash))
}

// ============================================================================
// TOKEN AMOUNT
// ============================================================================

/// Unsigned token quantity in base units (wei scale), arbitrary precision
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TokenAmount(BigUint);

impl TokenAmount {
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn from_u128(value: u128) -> Self {
        Self(BigUint::from(value))
    }

    /// Parse a base-10 integer string such as the `value` field of a transfer record
    pub fn from_dec_str(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        BigUint::from_str_radix(trimmed, 10).ok().map(Self)
    }

    /// Parse a `0x`-prefixed hex quantity such as a log's `data` field
    pub fn from_hex_str(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))?;
        if hex.is_empty() {
            return None;
        }
        BigUint::from_str_radix(hex, 16).ok().map(Self)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Exact decimal value after dividing by `10^decimals`
    pub fn to_decimal(&self, decimals: u32) -> BigDecimal {
        BigDecimal::new(BigInt::from(self.0.clone()), i64::from(decimals))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for TokenAmount {
    type Output = TokenAmount;

    fn add(self, rhs: TokenAmount) -> TokenAmount {
        TokenAmount(self.0 + rhs.0)
    }
}

impl AddAssign<&TokenAmount> for TokenAmount {
    fn add_assign(&mut self, rhs: &TokenAmount) {
        self.0 += &rhs.0;
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

// ============================================================================
// AGGREGATES
// ============================================================================

/// One tracked-token Transfer log from a seed receipt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    pub recipient: Address,
    pub amount: TokenAmount,
}

/// Sum of airdropped amounts per recipient, in first-seen order
#[derive(Debug, Clone, Default)]
pub struct ReceivedTotals {
    order: Vec<Address>,
    amounts: HashMap<Address, TokenAmount>,
}

impl ReceivedTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credit(&mut self, recipient: Address, amount: &TokenAmount) {
        match self.amounts.get_mut(&recipient) {
            Some(total) => *total += amount,
            None => {
                self.order.push(recipient.clone());
                self.amounts.insert(recipient, amount.clone());
            }
        }
    }

    pub fn extend<I: IntoIterator<Item = TransferEvent>>(&mut self, events: I) {
        for event in events {
            self.credit(event.recipient, &event.amount);
        }
    }

    pub fn get(&self, address: &Address) -> Option<&TokenAmount> {
        self.amounts.get(address)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.amounts.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Recipients in first-seen order
    pub fn addresses(&self) -> &[Address] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &TokenAmount)> {
        self.order
            .iter()
            .filter_map(move |addr| self.amounts.get(addr).map(|amount| (addr, amount)))
    }

    /// Keep only the first `limit` recipients
    pub fn truncate(&mut self, limit: usize) {
        if self.order.len() <= limit {
            return;
        }
        for dropped in self.order.drain(limit..) {
            self.amounts.remove(&dropped);
        }
    }
}

/// Current balances from the holder list
#[derive(Debug, Clone, Default)]
pub struct HolderSnapshot {
    balances: HashMap<Address, TokenAmount>,
    /// Pages requested while building the snapshot
    pub pages_fetched: u32,
    /// False when the listing ended on an error instead of a stop condition
    pub complete: bool,
}

impl HolderSnapshot {
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
            pages_fetched: 0,
            complete: true,
        }
    }

    /// Insert a balance; a repeated address keeps the last value seen
    pub fn insert(&mut self, address: Address, balance: TokenAmount) {
        self.balances.insert(address, balance);
    }

    pub fn get(&self, address: &Address) -> Option<&TokenAmount> {
        self.balances.get(address)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.balances.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

impl FromIterator<(Address, TokenAmount)> for HolderSnapshot {
    fn from_iter<I: IntoIterator<Item = (Address, TokenAmount)>>(iter: I) -> Self {
        let mut snapshot = HolderSnapshot::new();
        for (address, balance) in iter {
            snapshot.insert(address, balance);
        }
        snapshot
    }
}

/// Per-recipient, per-category totals of tokens moved into tracked contracts
#[derive(Debug, Clone, Default)]
pub struct ActivityTotals {
    totals: HashMap<Address, BTreeMap<String, TokenAmount>>,
}

impl ActivityTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credit(&mut self, address: &Address, category: &str, amount: &TokenAmount) {
        let bucket = self
            .totals
            .entry(address.clone())
            .or_default()
            .entry(category.to_string())
            .or_insert_with(TokenAmount::zero);
        *bucket += amount;
    }

    pub fn get(&self, address: &Address, category: &str) -> Option<&TokenAmount> {
        self.totals.get(address).and_then(|c| c.get(category))
    }

    pub fn for_address(&self, address: &Address) -> Option<&BTreeMap<String, TokenAmount>> {
        self.totals.get(address)
    }

    /// Every category label observed for any address, sorted
    pub fn categories(&self) -> Vec<String> {
        self.totals
            .values()
            .flat_map(|c| c.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIXED: &str = "0xAbCdEf0123456789aBcDeF0123456789ABCDEF01";

    #[test]
    fn test_address_normalizes_case() {
        let addr = Address::parse(MIXED).unwrap();
        assert_eq!(addr.as_str(), "0xabcdef0123456789abcdef0123456789abcdef01");
        assert_eq!(addr, Address::parse(&MIXED.to_lowercase()).unwrap());
    }

    #[test]
    fn test_address_rejects_bad_input() {
        assert!(Address::parse("0x1234").is_none());
        assert!(Address::parse("0xzzcdef0123456789abcdef0123456789abcdef01").is_none());
        assert!(Address::parse("").is_none());
    }

    #[test]
    fn test_address_from_topic() {
        let topic = "0x000000000000000000000000AbCdEf0123456789aBcDeF0123456789ABCDEF01";
        let addr = Address::from_topic(topic).unwrap();
        assert_eq!(addr.as_str(), "0xabcdef0123456789abcdef0123456789abcdef01");
        assert!(Address::from_topic("0x1234").is_none());
        assert!(Address::from_topic(&topic[..64]).is_none());
    }

    #[test]
    fn test_address_round_trips_through_h160() {
        let addr = Address::parse(MIXED).unwrap();
        let again = Address::from_h160(*addr.as_h160());
        assert_eq!(addr, again);
        assert_eq!(again.to_string(), "0xabcdef0123456789abcdef0123456789abcdef01");
        assert_eq!(again.short(), "0xabcdef01");
    }

    #[test]
    fn test_normalize_tx_hash() {
        let upper = "0XD237693E624F9703F9EA7E825677979E2BB3FF9DFA90D2FEAEDBDBA1095B6421";
        assert_eq!(
            normalize_tx_hash(upper).as_deref(),
            Some("0xd237693e624f9703f9ea7e825677979e2bb3ff9dfa90d2feaedbdba1095b6421")
        );
        assert_eq!(
            normalize_tx_hash(&upper[2..]),
            normalize_tx_hash(upper)
        );
        assert!(normalize_tx_hash("0xabc").is_none());
        assert!(normalize_tx_hash("").is_none());
    }

    #[test]
    fn test_token_amount_parsing() {
        assert_eq!(
            TokenAmount::from_hex_str("0x3e8"),
            Some(TokenAmount::from_u128(1000))
        );
        assert_eq!(TokenAmount::from_hex_str("0x"), None);
        assert_eq!(TokenAmount::from_hex_str("zz"), None);
        assert_eq!(
            TokenAmount::from_dec_str("1000000000000000000"),
            Some(TokenAmount::from_u128(1_000_000_000_000_000_000))
        );
        assert_eq!(TokenAmount::from_dec_str("-5"), None);
        assert_eq!(TokenAmount::from_dec_str("1.5"), None);
    }

    #[test]
    fn test_token_amount_beyond_u128() {
        // 2^200, well past any primitive integer
        let raw = "1606938044258990275541962092341162602522202993782792835301376";
        let amount = TokenAmount::from_dec_str(raw).unwrap();
        let doubled = amount.clone() + amount;
        assert_eq!(
            doubled.to_string(),
            "3213876088517980551083924184682325205044405987565585670602752"
        );
    }

    #[test]
    fn test_to_decimal_is_exact() {
        let amount = TokenAmount::from_u128(1_500_000_000_000_000_000);
        assert_eq!(amount.to_decimal(18), BigDecimal::from_str("1.5").unwrap());
    }

    #[test]
    fn test_received_totals_preserves_first_seen_order() {
        let a = Address::parse("0x1111111111111111111111111111111111111111").unwrap();
        let b = Address::parse("0x2222222222222222222222222222222222222222").unwrap();

        let mut totals = ReceivedTotals::new();
        totals.credit(b.clone(), &TokenAmount::from_u128(5));
        totals.credit(a.clone(), &TokenAmount::from_u128(1));
        totals.credit(b.clone(), &TokenAmount::from_u128(7));

        assert_eq!(totals.addresses(), &[b.clone(), a.clone()]);
        assert_eq!(totals.get(&b), Some(&TokenAmount::from_u128(12)));

        totals.truncate(1);
        assert_eq!(totals.len(), 1);
        assert!(!totals.contains(&a));
    }

    #[test]
    fn test_activity_categories_sorted_union() {
        let x = Address::parse("0x1111111111111111111111111111111111111111").unwrap();
        let y = Address::parse("0x2222222222222222222222222222222222222222").unwrap();

        let mut activity = ActivityTotals::new();
        activity.credit(&x, "staking", &TokenAmount::from_u128(3));
        activity.credit(&y, "liquidity", &TokenAmount::from_u128(4));
        activity.credit(&x, "staking", &TokenAmount::from_u128(3));

        assert_eq!(activity.categories(), vec!["liquidity", "staking"]);
        assert_eq!(
            activity.get(&x, "staking"),
            Some(&TokenAmount::from_u128(6))
        );
    }
}
