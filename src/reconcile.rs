/// Join of airdropped amounts, current balances and activity into report rows
///
/// Pure and deterministic: same inputs, same rows in the same order.
/// All arithmetic is exact; rounding happens only when a value is rendered.
use crate::types::{ActivityTotals, Address, HolderSnapshot, ReceivedTotals, TokenAmount};
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{ToPrimitive, Zero};

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub address: Address,
    pub received: BigDecimal,
    pub current: BigDecimal,
    pub delta: BigDecimal,
    /// Share of the airdrop still held, scaled to two decimals
    pub percent_remaining: BigDecimal,
    /// One value per `Reconciliation::categories` entry
    pub category_values: Vec<BigDecimal>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reconciliation {
    /// Sorted union of activity labels
    pub categories: Vec<String>,
    /// Sorted by current balance, largest first
    pub rows: Vec<ReportRow>,
    /// Recipients absent from the holder snapshot
    pub not_found: usize,
}

pub fn reconcile(
    received: &ReceivedTotals,
    snapshot: &HolderSnapshot,
    activity: &ActivityTotals,
    decimals: u32,
) -> Reconciliation {
    let categories = activity.categories();
    let zero = TokenAmount::zero();
    let mut not_found = 0usize;

    let mut rows: Vec<ReportRow> = received
        .iter()
        .map(|(address, received_raw)| {
            let current_raw = match snapshot.get(address) {
                Some(balance) => balance,
                None => {
                    not_found += 1;
                    &zero
                }
            };

            let received = received_raw.to_decimal(decimals);
            let current = current_raw.to_decimal(decimals);
            let delta = &current - &received;
            let category_values = categories
                .iter()
                .map(|category| {
                    activity
                        .get(address, category)
                        .unwrap_or(&zero)
                        .to_decimal(decimals)
                })
                .collect();

            ReportRow {
                address: address.clone(),
                received,
                current,
                delta,
                percent_remaining: percent_of(current_raw, received_raw),
                category_values,
            }
        })
        .collect();

    // Stable: equal balances keep first-seen order
    rows.sort_by(|a, b| b.current.cmp(&a.current));

    Reconciliation {
        categories,
        rows,
        not_found,
    }
}

/// `part / whole * 100` rounded half-up to two decimals; zero when `whole` is zero
pub fn percent_of(part: &TokenAmount, whole: &TokenAmount) -> BigDecimal {
    if whole.is_zero() {
        return BigDecimal::zero();
    }
    let whole = whole.as_biguint();
    let scaled = part.as_biguint() * BigUint::from(10_000u32);
    let hundredths = div_round_half_up(&scaled, whole);
    BigDecimal::new(BigInt::from(hundredths), 2)
}

/// Render with at most two decimals, half-up, trailing zeros dropped
///
/// `12.50 -> 12.5`, `12.00 -> 12`, `12.505 -> 12.51`, `-12.505 -> -12.51`
pub fn format_decimal(value: &BigDecimal) -> String {
    let (digits, scale) = value.as_bigint_and_exponent();
    let negative = digits.sign() == Sign::Minus;
    let magnitude = digits.magnitude();

    let hundredths = if scale <= 2 {
        magnitude * pow10((2 - scale) as u64)
    } else {
        div_round_half_up(magnitude, &pow10((scale - 2) as u64))
    };

    let hundred = BigUint::from(100u32);
    let whole = &hundredths / &hundred;
    let fraction = (&hundredths % &hundred).to_u32().unwrap_or(0);

    let mut out = String::new();
    if negative && !hundredths.is_zero() {
        out.push('-');
    }
    out.push_str(&whole.to_string());
    if fraction != 0 {
        let fraction = format!("{:02}", fraction);
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out
}

/// Percent rendering: `format_decimal` plus `%`
pub fn format_percent(value: &BigDecimal) -> String {
    format!("{}%", format_decimal(value))
}

fn pow10(exp: u64) -> BigUint {
    num_traits::pow(BigUint::from(10u32), exp as usize)
}

/// Ties round away from zero
fn div_round_half_up(numerator: &BigUint, denominator: &BigUint) -> BigUint {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder * 2u32 >= *denominator {
        quotient + 1u32
    } else {
        quotient
    }
}
