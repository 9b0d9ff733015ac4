//! Core Types for the goldmine client
//!
//! Addresses, token identities and the values read from the stake and
//! data contracts before each action.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bn::U256;
use crate::constants::{reward_token, stable_token};
use crate::errors::{GoldError, GoldResult};

// ============ Addresses and Hashes ============

/// 20-byte account or contract address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address
    pub const ZERO: Address = Address([0u8; 20]);

    /// Returns true for the zero address
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = GoldError;

    fn from_str(s: &str) -> GoldResult<Self> {
        let invalid = || GoldError::InvalidAddress { input: s.to_string() };
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.len() != 40 {
            return Err(invalid());
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| invalid())?;
        Ok(Address(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = GoldError;

    fn try_from(value: String) -> GoldResult<Self> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// 32-byte transaction hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TxHash(pub [u8; 32]);

impl FromStr for TxHash {
    type Err = GoldError;

    fn from_str(s: &str) -> GoldResult<Self> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| GoldError::InvalidResponse {
            reason: format!("bad transaction hash {:?}", s),
        })?;
        Ok(TxHash(bytes))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// ============ Tokens ============

/// The two ERC20 tokens a stake is split between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    /// Stablecoin (USDT, 6 decimals)
    Stable,
    /// Reward token (HJL, 18 decimals)
    Reward,
}

impl TokenKind {
    /// Ticker shown to the user
    pub fn symbol(&self) -> &'static str {
        match self {
            TokenKind::Stable => stable_token::SYMBOL,
            TokenKind::Reward => reward_token::SYMBOL,
        }
    }

    /// Decimal places of the on-chain unit
    pub fn decimals(&self) -> u8 {
        match self {
            TokenKind::Stable => stable_token::DECIMALS,
            TokenKind::Reward => reward_token::DECIMALS,
        }
    }
}

// ============ Quote Inputs ============

/// Percentage split of a gross stake between the two tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proportion {
    /// Share paid in the stablecoin
    pub stable_share_pct: u64,
    /// Share paid in the reward token
    pub reward_share_pct: u64,
}

impl Proportion {
    /// Build from the raw contract words, rejecting splits that do not sum to 100
    pub fn from_contract(stable: U256, reward: U256) -> GoldResult<Self> {
        let invalid = || GoldError::InvalidProportion {
            stable_share_pct: stable,
            reward_share_pct: reward,
        };

        let stable_share_pct = stable.to_u64().ok_or_else(invalid)?;
        let reward_share_pct = reward.to_u64().ok_or_else(invalid)?;

        let proportion = Self { stable_share_pct, reward_share_pct };
        proportion.validate()?;
        Ok(proportion)
    }

    /// Shares must sum to exactly 100
    pub fn validate(&self) -> GoldResult<()> {
        let sum = self.stable_share_pct.checked_add(self.reward_share_pct);
        if sum != Some(crate::constants::precision::PERCENT_DENOMINATOR) {
            return Err(GoldError::InvalidProportion {
                stable_share_pct: U256::from(self.stable_share_pct),
                reward_share_pct: U256::from(self.reward_share_pct),
            });
        }
        Ok(())
    }
}

/// Oracle prices, fixed-point scaled by 100
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    /// Stablecoin price (100 = 1.00)
    pub stable_price: U256,
    /// Reward token price (700 = 7.00)
    pub reward_price: U256,
}

/// Required token amounts for one gross stake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    /// Gross stake in stablecoin base units
    pub gross: U256,
    /// Stablecoin part in stablecoin base units
    pub stable_amount: U256,
    /// Reward token part in reward base units
    pub reward_amount: U256,
}

impl Quote {
    /// Amount required of the given token
    pub fn required(&self, token: TokenKind) -> U256 {
        match token {
            TokenKind::Stable => self.stable_amount,
            TokenKind::Reward => self.reward_amount,
        }
    }
}

/// Balance and allowance of one token for the connected account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowanceState {
    pub token: TokenKind,
    pub balance: U256,
    pub allowance: U256,
}

impl AllowanceState {
    /// Check if balance covers the required amount
    pub fn has_sufficient_balance(&self, required: U256) -> bool {
        self.balance >= required
    }

    /// Check if an approval must be sent first
    pub fn needs_approval(&self, required: U256) -> bool {
        self.allowance < required
    }
}

// ============ Position Types ============

/// One investment position as stored by the data contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvestmentRecord {
    /// Gross amount in stablecoin base units
    pub amount: U256,
    /// Start time (unix seconds)
    pub start_time: u64,
    /// Whether the position is live
    pub active: bool,
    /// Stablecoin base units currently withdrawable
    pub withdrawable: U256,
    /// Dynamic / bonus amount
    pub dynamic: U256,
    /// Amount already withdrawn
    pub withdrawn: U256,
}

/// Per-user summary returned by `getUser`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    /// Who referred this user
    pub referrer: Address,
    /// Cumulative invested amount
    pub invested_total: U256,
    /// Cumulative bonus amount
    pub bonus_total: U256,
    /// Ids accepted by `getInvesHistory`
    pub record_ids: Vec<U256>,
    /// Reward token held for the user, reward base units
    pub reward_held: U256,
}

// ============ Actions ============

/// User-triggered actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    /// New investment
    Invest,
    /// Reinvest from an existing position
    Reinvest,
    /// Withdraw from a position
    Withdraw,
    /// Admin: shift time-based eligibility
    SetBackTime,
    /// Admin: grant data-contract access
    AllowAccess,
    /// Token approval
    Approve,
}

/// Per-action state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    Idle,
    Validating,
    Quoting,
    AllowanceCheck,
    Approving,
    Submitting,
    Confirmed,
    Failed,
}

impl ActionState {
    /// Valid forward transitions of the action state machine
    pub fn can_transition_to(&self, next: ActionState) -> bool {
        use ActionState::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Quoting)
                | (Validating, Submitting)
                | (Validating, Failed)
                | (Quoting, AllowanceCheck)
                | (Quoting, Failed)
                | (AllowanceCheck, Approving)
                | (AllowanceCheck, Submitting)
                | (AllowanceCheck, Failed)
                | (Approving, Submitting)
                | (Approving, Failed)
                | (Submitting, Confirmed)
                | (Submitting, Failed)
                | (Confirmed, Idle)
                | (Failed, Idle)
        )
    }
}

// ============ Transactions ============

/// Transaction handed to the wallet for signing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: Vec<u8>,
    pub gas: u64,
}

/// Mined transaction outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    /// true when the transaction did not revert
    pub success: bool,
    pub block_number: u64,
    pub gas_used: U256,
}
