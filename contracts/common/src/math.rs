//! Mathematical Utilities for the goldmine client
//!
//! Decimal parsing, the stake split and display formatting. Everything is
//! integer arithmetic on [`U256`]; division always truncates.

use chrono::DateTime;

use crate::bn::U256;
use crate::constants::{display, precision, stable_token};
use crate::errors::{AmountErrorReason, GoldError, GoldResult};
use crate::types::{PriceQuote, Proportion, Quote};

/// Parse a user-entered decimal amount into base units
///
/// Accepts plain decimals (`"1000"`, `"12.5"`, `".5"`). Fraction digits
/// beyond `decimals` are dropped. Anything that is empty, signed, not a
/// number, or zero once scaled is rejected.
pub fn parse_units(input: &str, decimals: u8) -> GoldResult<U256> {
    let err = |reason| GoldError::InvalidAmount { input: input.to_string(), reason };
    let text = input.trim();

    if text.is_empty() {
        return Err(err(AmountErrorReason::Empty));
    }
    if text.starts_with('-') {
        return Err(err(AmountErrorReason::Negative));
    }

    let (whole, fraction) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(err(AmountErrorReason::Malformed));
    }

    let places = decimals as usize;
    let kept: String = fraction.chars().take(places).collect();
    let digits = format!("{}{}{}", whole, kept, "0".repeat(places - kept.len()));
    let digits = digits.trim_start_matches('0');

    if digits.is_empty() {
        return Err(err(AmountErrorReason::Zero));
    }

    U256::from_dec_str(digits).map_err(|_| err(AmountErrorReason::TooLarge))
}

/// Parse a stake amount into stablecoin base units (10^6)
pub fn parse_stake_amount(input: &str) -> GoldResult<U256> {
    parse_units(input, stable_token::DECIMALS)
}

/// Split a gross stake into its stablecoin and reward-token parts
///
/// stable_amount = gross * stable% / 100
/// reward_amount = gross * reward% * stable_price * 10^12 / (100 * reward_price)
///
/// # Arguments
/// * `gross` - Gross stake in stablecoin base units
/// * `proportion` - Split read from the stake contract
/// * `prices` - Prices read from the oracle, both scaled by 100
pub fn quote_split(gross: U256, proportion: &Proportion, prices: &PriceQuote) -> GoldResult<Quote> {
    proportion.validate()?;

    if prices.reward_price.is_zero() {
        return Err(GoldError::DivisionByZero);
    }

    let hundred = U256::from(precision::PERCENT_DENOMINATOR);

    let stable_amount = gross
        .checked_mul(U256::from(proportion.stable_share_pct))
        .ok_or(GoldError::Overflow)?
        / hundred;

    let numerator = gross
        .checked_mul(U256::from(proportion.reward_share_pct))
        .and_then(|v| v.checked_mul(prices.stable_price))
        .and_then(|v| v.checked_mul(U256::from(precision::DECIMALS_GAP_FACTOR)))
        .ok_or(GoldError::Overflow)?;

    let denominator = hundred
        .checked_mul(prices.reward_price)
        .ok_or(GoldError::Overflow)?;

    Ok(Quote {
        gross,
        stable_amount,
        reward_amount: numerator / denominator,
    })
}

/// Format base units as a decimal string with `places` fraction digits
///
/// Extra precision is truncated, never rounded up.
pub fn format_units(value: U256, decimals: u8, places: usize) -> String {
    let scale = U256::exp10(decimals as usize);
    let (whole, remainder) = value.div_mod(scale);

    if places == 0 {
        return whole.to_string();
    }

    let fraction = format!("{:0>width$}", remainder.to_string(), width = decimals as usize);
    let mut shown: String = fraction.chars().take(places).collect();
    while shown.len() < places {
        shown.push('0');
    }

    format!("{}.{}", whole, shown)
}

/// Format a price scaled by 100 (e.g. 700 -> "7.00")
pub fn format_price(price: U256, places: usize) -> String {
    format_units(price, precision::PRICE_DECIMALS, places)
}

/// Format unix seconds as a UTC date and minute; out-of-range values print raw
pub fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|time| time.format(display::TIME_FORMAT).to_string())
        .unwrap_or_else(|| secs.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::reward_token;
    use test_case::test_case;

    fn prices(stable: u64, reward: u64) -> PriceQuote {
        PriceQuote {
            stable_price: U256::from(stable),
            reward_price: U256::from(reward),
        }
    }

    /// Stablecoin value of a reward amount, the inverse of the reward half of the split
    fn reward_value_in_stable(reward_amount: U256, prices: &PriceQuote) -> GoldResult<U256> {
        let divisor = prices
            .stable_price
            .checked_mul(U256::from(precision::DECIMALS_GAP_FACTOR))
            .ok_or(GoldError::Overflow)?;

        if divisor.is_zero() {
            return Err(GoldError::DivisionByZero);
        }

        let value = reward_amount
            .checked_mul(prices.reward_price)
            .ok_or(GoldError::Overflow)?;

        Ok(value / divisor)
    }

    fn split(stable: u64, reward: u64) -> Proportion {
        Proportion { stable_share_pct: stable, reward_share_pct: reward }
    }

    #[test_case("1000", 1_000_000_000 ; "whole number")]
    #[test_case("12.5", 12_500_000 ; "one fraction digit")]
    #[test_case(".5", 500_000 ; "leading dot")]
    #[test_case("0.0000019", 1 ; "extra digits truncated")]
    #[test_case(" 7 ", 7_000_000 ; "surrounding whitespace")]
    fn test_parse_stake_amount_valid(input: &str, expected: u64) {
        assert_eq!(parse_stake_amount(input).unwrap(), U256::from(expected));
    }

    #[test_case("", AmountErrorReason::Empty ; "empty")]
    #[test_case("-5", AmountErrorReason::Negative ; "negative")]
    #[test_case("0", AmountErrorReason::Zero ; "zero")]
    #[test_case("0.0000001", AmountErrorReason::Zero ; "rounds to zero")]
    #[test_case("1e3", AmountErrorReason::Malformed ; "exponent")]
    #[test_case("1.2.3", AmountErrorReason::Malformed ; "two dots")]
    #[test_case(".", AmountErrorReason::Malformed ; "lone dot")]
    fn test_parse_stake_amount_rejects(input: &str, reason: AmountErrorReason) {
        assert_eq!(
            parse_stake_amount(input),
            Err(GoldError::InvalidAmount { input: input.to_string(), reason })
        );
    }

    #[test]
    fn test_quote_reference_scenario() {
        // 1000 USDT, 80/20 split, USDT 1.00, HJL 7.00
        let gross = parse_stake_amount("1000").unwrap();
        let quote = quote_split(gross, &split(80, 20), &prices(100, 700)).unwrap();

        assert_eq!(quote.stable_amount, U256::from(800_000_000u64));
        // 1000 * 20 * 100 / (100 * 700) = 28.571428... HJL, truncated at 18 decimals
        assert_eq!(
            quote.reward_amount,
            U256::from_dec_str("28571428571428571428").unwrap()
        );
        assert_eq!(format_units(quote.reward_amount, reward_token::DECIMALS, 2), "28.57");
    }

    #[test]
    fn test_quote_is_idempotent() {
        let gross = U256::from(123_456_789u64);
        let a = quote_split(gross, &split(65, 35), &prices(101, 733)).unwrap();
        let b = quote_split(gross, &split(65, 35), &prices(101, 733)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_quote_value_is_conserved_within_truncation() {
        let cases = [
            (1u64, split(80, 20), prices(100, 700)),
            (999_999_999, split(80, 20), prices(100, 700)),
            (1_000_000_000, split(50, 50), prices(99, 1234)),
            (31_415_926_535, split(70, 30), prices(100, 1)),
            (7, split(0, 100), prices(100, 300)),
            (10_000_000, split(100, 0), prices(100, 300)),
        ];

        for (gross, proportion, quote_prices) in cases {
            let gross = U256::from(gross);
            let quote = quote_split(gross, &proportion, &quote_prices).unwrap();
            let reward_value = reward_value_in_stable(quote.reward_amount, &quote_prices).unwrap();
            let total = quote.stable_amount + reward_value;

            assert!(total <= gross, "split must never exceed the gross amount");
            assert!(gross - total <= U256::from(2), "at most one unit lost per split");
        }
    }

    #[test]
    fn test_quote_rejects_bad_inputs() {
        let gross = U256::from(1_000_000u64);
        assert_eq!(
            quote_split(gross, &split(80, 20), &prices(100, 0)),
            Err(GoldError::DivisionByZero)
        );
        assert!(matches!(
            quote_split(gross, &split(90, 20), &prices(100, 700)),
            Err(GoldError::InvalidProportion { .. })
        ));
        assert_eq!(
            quote_split(U256::MAX, &split(80, 20), &prices(100, 700)),
            Err(GoldError::Overflow)
        );
    }

    #[test_case(0, 6, 2, "0.00")]
    #[test_case(1_234_567, 6, 2, "1.23")]
    #[test_case(1_239_999, 6, 3, "1.239")]
    #[test_case(5, 0, 2, "5.00")]
    #[test_case(123_456, 2, 0, "1234")]
    fn test_format_units(value: u64, decimals: u8, places: usize, expected: &str) {
        assert_eq!(format_units(U256::from(value), decimals, places), expected);
    }

    #[test_case(0, "1970-01-01 00:00" ; "epoch")]
    #[test_case(1_600_000_000, "2020-09-13 12:26" ; "seconds dropped")]
    #[test_case(u64::MAX, "18446744073709551615" ; "out of range")]
    fn test_format_timestamp(secs: u64, expected: &str) {
        assert_eq!(format_timestamp(secs), expected);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(U256::from(700), 2), "7.00");
        assert_eq!(format_price(U256::from(1_234), 2), "12.34");
    }
}
