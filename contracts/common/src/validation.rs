//! Validation Helpers
//!
//! The `check!` guard macro plus input checks shared by every handler.
//!
//! ```rust,ignore
//! use goldmine_common::validation::check;
//!
//! check!(gas > 0, GoldError::InvalidConfig { param: "gas", reason: "zero" });
//! ```

use crate::errors::{GoldError, GoldResult};
use crate::types::Address;

/// Check a condition and return an error if it fails.
#[macro_export]
macro_rules! check {
    ($condition:expr, $error:expr) => {
        if !($condition) {
            return Err($error);
        }
    };
}

pub use check;

/// Parse an optional address field; blank means "not given"
pub fn parse_optional_address(input: &str) -> GoldResult<Option<Address>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse().map(Some)
}

/// Parse a required, non-zero address
pub fn parse_required_address(input: &str) -> GoldResult<Address> {
    let address = parse_optional_address(input)?
        .ok_or_else(|| GoldError::InvalidAddress { input: input.to_string() })?;

    check!(!address.is_zero(), GoldError::InvalidAddress { input: input.to_string() });
    Ok(address)
}

/// Parse a unix timestamp entered by an admin
pub fn parse_timestamp(input: &str) -> GoldResult<u64> {
    input.trim().parse::<u64>().map_err(|_| GoldError::InvalidAmount {
        input: input.to_string(),
        reason: crate::errors::AmountErrorReason::Malformed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_address_blank_is_none() {
        assert_eq!(parse_optional_address("   ").unwrap(), None);
        assert!(parse_optional_address("0x0913249bE694F0681aBcaa972DC8Cec03814f20b")
            .unwrap()
            .is_some());
        assert!(parse_optional_address("nope").is_err());
    }

    #[test]
    fn test_required_address_rejects_zero() {
        assert!(parse_required_address("0x0000000000000000000000000000000000000000").is_err());
        assert!(parse_required_address("").is_err());
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp(" 1700000000 ").unwrap(), 1_700_000_000);
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("-1").is_err());
    }
}
