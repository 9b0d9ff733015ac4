//! Position Refresh
//!
//! After a confirmed action the client re-reads everything it shows about
//! the account: current position, history, and withdrawal eligibility.
//! This re-read is the only way the UI catches up with transactions that
//! landed after it stopped waiting.

use goldmine_common::{
    constants::{display, reward_token, stable_token},
    errors::GoldResult,
    math::{format_timestamp, format_units},
    types::{Address, InvestmentRecord, UserInfo},
    U256,
};

use crate::DataOracle;

/// Everything shown about one account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionSnapshot {
    pub account: Address,
    /// Current position, only when active
    pub current: Option<InvestmentRecord>,
    /// Records listed by `getUser`, in contract order
    pub history: Vec<InvestmentRecord>,
    /// Stablecoin base units withdrawable now
    pub withdrawable: U256,
    pub user: UserInfo,
}

/// One rendered position row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionRow {
    /// Gross amount, stablecoin units, 2 places
    pub amount: String,
    /// Dynamic amount, stablecoin units, 3 places
    pub dynamic: String,
    /// Withdrawn amount, reward-token units, 3 places
    pub withdrawn: String,
    /// Unix seconds
    pub start_time: u64,
}

impl PositionRow {
    pub fn from_record(record: &InvestmentRecord) -> Self {
        Self {
            amount: format_units(record.amount, stable_token::DECIMALS, display::AMOUNT_PLACES),
            dynamic: format_units(record.dynamic, stable_token::DECIMALS, display::CONSUMED_PLACES),
            withdrawn: format_units(record.withdrawn, reward_token::DECIMALS, display::CONSUMED_PLACES),
            start_time: record.start_time,
        }
    }

    /// Start time as `Y-m-d h:i`, UTC
    pub fn start_time_display(&self) -> String {
        format_timestamp(self.start_time)
    }
}

impl PositionSnapshot {
    /// Current position first, then history
    pub fn rows(&self) -> Vec<PositionRow> {
        self.current
            .iter()
            .chain(self.history.iter())
            .map(PositionRow::from_record)
            .collect()
    }

    /// Reward token held, 2 places
    pub fn reward_held_display(&self) -> String {
        format_units(self.user.reward_held, reward_token::DECIMALS, display::AMOUNT_PLACES)
    }

    /// Withdrawable stablecoin, 2 places
    pub fn withdrawable_display(&self) -> String {
        format_units(self.withdrawable, stable_token::DECIMALS, display::AMOUNT_PLACES)
    }
}

/// Load a full snapshot for `account`
pub async fn load_positions<D: DataOracle>(oracle: &D, account: Address) -> GoldResult<PositionSnapshot> {
    let record = oracle.investment(account).await?;
    let current = record.active.then_some(record);

    let user = oracle.user(account).await?;

    let mut history = Vec::with_capacity(user.record_ids.len());
    for record_id in &user.record_ids {
        history.push(oracle.investment_history(account, *record_id).await?);
    }

    let withdrawable = oracle.withdrawable_amount(account).await?;

    Ok(PositionSnapshot {
        account,
        current,
        history,
        withdrawable,
        user,
    })
}
