//! Error Types for the goldmine client
//!
//! Every failure a handler can meet is a [`GoldError`] variant. Handlers
//! stop errors at the action boundary and turn them into UI signals, so
//! each variant maps onto one [`ErrorCategory`].

use core::fmt;

use crate::bn::U256;
use crate::types::{ActionKind, TokenKind, TxHash};

/// Result type alias for goldmine operations
pub type GoldResult<T> = Result<T, GoldError>;

/// Main error enum for all client errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoldError {
    // ============ Validation Errors ============
    /// User-entered amount is malformed or not positive
    InvalidAmount { input: String, reason: AmountErrorReason },

    /// Address string is not a 20-byte hex address
    InvalidAddress { input: String },

    /// Stake contract returned a split that does not sum to 100
    InvalidProportion { stable_share_pct: U256, reward_share_pct: U256 },

    // ============ Balance Errors ============
    /// On-chain balance is below what the action needs
    InsufficientBalance {
        token: TokenKind,
        available: U256,
        required: U256,
    },

    // ============ Submission Errors ============
    /// An approval transaction was rejected or reverted
    ApprovalFailed { token: TokenKind, reason: String },

    /// The main transaction was rejected or reverted
    SubmissionFailed { action: ActionKind, reason: String },

    /// Mined with status 0
    TransactionReverted { tx_hash: TxHash },

    /// No receipt after the configured number of polls
    ReceiptTimeout { tx_hash: TxHash, attempts: u32 },

    // ============ Provider Errors ============
    /// No injected wallet and the fallback endpoint cannot be reached
    ProviderUnavailable { reason: String },

    /// The provider reports no unlocked account
    NoAccount,

    /// JSON-RPC error object
    Rpc { code: i64, message: String },

    /// Transport-level failure (connection, HTTP status, body)
    Transport { reason: String },

    // ============ Codec Errors ============
    /// Return data does not match the expected ABI layout
    AbiDecode { reason: &'static str },

    /// Provider response does not have the expected JSON shape
    InvalidResponse { reason: String },

    // ============ Configuration Errors ============
    /// Artifact file missing or unreadable
    ArtifactUnavailable { contract: &'static str, reason: String },

    /// Artifact ABI lacks a method the client calls
    MissingMethod { contract: &'static str, method: &'static str },

    /// Artifact has no deployment for the active network
    NoDeployment { contract: &'static str, network_id: String },

    /// Invalid configuration value
    InvalidConfig { param: &'static str, reason: &'static str },

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    Overflow,

    /// Division by zero
    DivisionByZero,
}

/// Reasons for amount-related errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountErrorReason {
    /// Empty input
    Empty,
    /// Not a plain decimal number
    Malformed,
    /// Leading minus sign
    Negative,
    /// Zero, or rounds to zero base units
    Zero,
    /// Does not fit in 256 bits once scaled
    TooLarge,
}

/// Error taxonomy as seen by the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rejected before any network call
    Validation,
    /// Balance check failed, nothing submitted
    InsufficientBalance,
    /// An approval failed, main action not sent
    AllowanceSubmission,
    /// Main transaction or a read around it failed
    ActionSubmission,
    /// Startup connection failed
    ProviderUnavailable,
    /// Artifacts or config are unusable
    Configuration,
}

impl GoldError {
    /// Returns a human-readable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAmount { .. } => "E001_INVALID_AMOUNT",
            Self::InvalidAddress { .. } => "E002_INVALID_ADDRESS",
            Self::InvalidProportion { .. } => "E003_INVALID_PROPORTION",
            Self::InsufficientBalance { .. } => "E010_INSUFFICIENT_BALANCE",
            Self::ApprovalFailed { .. } => "E020_APPROVAL_FAILED",
            Self::SubmissionFailed { .. } => "E021_SUBMISSION_FAILED",
            Self::TransactionReverted { .. } => "E022_TX_REVERTED",
            Self::ReceiptTimeout { .. } => "E023_RECEIPT_TIMEOUT",
            Self::ProviderUnavailable { .. } => "E030_PROVIDER_UNAVAILABLE",
            Self::NoAccount => "E031_NO_ACCOUNT",
            Self::Rpc { .. } => "E032_RPC",
            Self::Transport { .. } => "E033_TRANSPORT",
            Self::AbiDecode { .. } => "E040_ABI_DECODE",
            Self::InvalidResponse { .. } => "E041_INVALID_RESPONSE",
            Self::ArtifactUnavailable { .. } => "E050_ARTIFACT_UNAVAILABLE",
            Self::MissingMethod { .. } => "E051_MISSING_METHOD",
            Self::NoDeployment { .. } => "E052_NO_DEPLOYMENT",
            Self::InvalidConfig { .. } => "E053_INVALID_CONFIG",
            Self::Overflow => "E080_OVERFLOW",
            Self::DivisionByZero => "E082_DIV_ZERO",
        }
    }

    /// Where this error sits in the UI taxonomy
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidAmount { .. } | Self::InvalidAddress { .. } => ErrorCategory::Validation,
            Self::InsufficientBalance { .. } => ErrorCategory::InsufficientBalance,
            Self::ApprovalFailed { .. } => ErrorCategory::AllowanceSubmission,
            Self::ProviderUnavailable { .. } | Self::NoAccount => ErrorCategory::ProviderUnavailable,
            Self::ArtifactUnavailable { .. }
            | Self::MissingMethod { .. }
            | Self::NoDeployment { .. }
            | Self::InvalidConfig { .. } => ErrorCategory::Configuration,
            _ => ErrorCategory::ActionSubmission,
        }
    }
}

impl fmt::Display for GoldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAmount { input, reason } => {
                write!(f, "invalid amount {:?}: {:?}", input, reason)
            }
            Self::InvalidAddress { input } => write!(f, "invalid address {:?}", input),
            Self::InvalidProportion { stable_share_pct, reward_share_pct } => write!(
                f,
                "proportion {}/{} does not sum to 100",
                stable_share_pct, reward_share_pct
            ),
            Self::InsufficientBalance { token, available, required } => write!(
                f,
                "insufficient {} balance: have {}, need {}",
                token.symbol(),
                available,
                required
            ),
            Self::ApprovalFailed { token, reason } => {
                write!(f, "{} approval failed: {}", token.symbol(), reason)
            }
            Self::SubmissionFailed { action, reason } => {
                write!(f, "{:?} failed: {}", action, reason)
            }
            Self::TransactionReverted { tx_hash } => write!(f, "transaction {} reverted", tx_hash),
            Self::ReceiptTimeout { tx_hash, attempts } => {
                write!(f, "no receipt for {} after {} polls", tx_hash, attempts)
            }
            Self::ProviderUnavailable { reason } => write!(f, "provider unavailable: {}", reason),
            Self::NoAccount => write!(f, "provider exposes no account"),
            Self::Rpc { code, message } => write!(f, "rpc error {}: {}", code, message),
            Self::Transport { reason } => write!(f, "transport error: {}", reason),
            Self::AbiDecode { reason } => write!(f, "abi decode: {}", reason),
            Self::InvalidResponse { reason } => write!(f, "invalid response: {}", reason),
            Self::ArtifactUnavailable { contract, reason } => {
                write!(f, "{} artifact unavailable: {}", contract, reason)
            }
            Self::MissingMethod { contract, method } => {
                write!(f, "{} artifact has no method {}", contract, method)
            }
            Self::NoDeployment { contract, network_id } => {
                write!(f, "{} not deployed on network {}", contract, network_id)
            }
            Self::InvalidConfig { param, reason } => write!(f, "config {}: {}", param, reason),
            Self::Overflow => write!(f, "arithmetic overflow"),
            Self::DivisionByZero => write!(f, "division by zero"),
        }
    }
}

impl std::error::Error for GoldError {}
