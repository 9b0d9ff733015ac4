//! Backend Bonus Read
//!
//! The site backend reports the account's accumulated bonus and which of
//! the two mining buttons the account may use. Display only: nothing here
//! gates a transaction.

use serde::Deserialize;
use serde_json::Value;

use goldmine_common::{
    constants::{display, network},
    errors::{GoldError, GoldResult},
    types::Address,
};

use crate::transport::Transport;

/// Which mining buttons are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonVisibility {
    pub invest: bool,
    pub reinvest: bool,
}

impl ButtonVisibility {
    /// 0 hides both, 1 hides reinvest, 2 hides invest
    pub fn from_status(status: i64) -> Self {
        match status {
            0 => Self { invest: false, reinvest: false },
            1 => Self { invest: true, reinvest: false },
            2 => Self { invest: false, reinvest: true },
            _ => Self { invest: true, reinvest: true },
        }
    }
}

/// Parsed backend answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BonusStatus {
    /// Accumulated bonus, 2 places
    pub sum_bonus: String,
    pub visibility: ButtonVisibility,
}

#[derive(Deserialize)]
struct Envelope {
    data: BonusData,
}

#[derive(Deserialize)]
struct BonusData {
    #[serde(default)]
    sumbonus: Value,
    #[serde(default)]
    tzstatus: Value,
}

fn numeric_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.trim().to_string()),
        Value::Null => Some("0".to_string()),
        _ => None,
    }
}

/// Missing, null or unreadable statuses show both buttons
fn visibility_status(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .unwrap_or(-1)
}

/// Format a plain decimal to `places` fraction digits, truncating
fn truncate_decimal(text: &str, places: usize) -> Option<String> {
    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
    let whole = if whole.is_empty() { "0" } else { whole };
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    let unsigned = whole.strip_prefix('-').unwrap_or(whole);
    if unsigned.is_empty() || !digits(unsigned) || !digits(fraction) {
        return None;
    }

    let mut shown: String = fraction.chars().take(places).collect();
    while shown.len() < places {
        shown.push('0');
    }
    Some(format!("{}.{}", whole, shown))
}

/// Parse the backend response body
pub fn parse_bonus_response(body: &str) -> GoldResult<BonusStatus> {
    let invalid = |reason: &str| GoldError::InvalidResponse {
        reason: format!("bonus backend: {}", reason),
    };

    let envelope: Envelope = serde_json::from_str(body).map_err(|err| invalid(&err.to_string()))?;

    let sum_bonus = numeric_text(&envelope.data.sumbonus)
        .and_then(|text| truncate_decimal(&text, display::AMOUNT_PLACES))
        .ok_or_else(|| invalid("sumbonus is not a number"))?;

    let status = visibility_status(&envelope.data.tzstatus);

    Ok(BonusStatus {
        sum_bonus,
        visibility: ButtonVisibility::from_status(status),
    })
}

/// POST the account to `<origin>/index.php/DmsUser/Public/getTotalBonus`
pub fn fetch_bonus<T: Transport>(transport: &T, origin: &str, account: Address) -> GoldResult<BonusStatus> {
    let url = format!("{}{}", origin.trim_end_matches('/'), network::BONUS_PATH);
    let account = account.to_string();
    let body = transport.post_form(&url, &[("eth_address", account.as_str())])?;
    parse_bonus_response(&body)
}
