//! Client Configuration
//!
//! One parameterized configuration replaces per-deployment copies of the
//! client: addresses, artifact locations and gas budgets all live here.
//! Every field has a default from [`crate::constants`], so an empty JSON
//! object is a valid config for a local development chain.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{gas, network, polling};
use crate::errors::{GoldError, GoldResult};
use crate::types::{ActionKind, Address};
use crate::validation::check;

/// Gas limits per action class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasLimits {
    /// Approvals and admin setters
    pub standard: u64,
    /// invest / reinvest / withdraw
    pub heavy: u64,
}

impl Default for GasLimits {
    fn default() -> Self {
        Self {
            standard: gas::STANDARD_LIMIT,
            heavy: gas::HEAVY_LIMIT,
        }
    }
}

impl GasLimits {
    /// Budget for one action
    pub fn for_action(&self, action: ActionKind) -> u64 {
        match action {
            ActionKind::Invest | ActionKind::Reinvest | ActionKind::Withdraw => self.heavy,
            ActionKind::SetBackTime | ActionKind::AllowAccess | ActionKind::Approve => self.standard,
        }
    }
}

/// Artifact file names, relative to `artifacts_dir`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactFiles {
    pub stake: String,
    pub data: String,
    pub reward_token: String,
    pub stable_token: String,
}

impl Default for ArtifactFiles {
    fn default() -> Self {
        Self {
            stake: network::STAKE_ARTIFACT.to_string(),
            data: network::DATA_ARTIFACT.to_string(),
            reward_token: network::REWARD_TOKEN_ARTIFACT.to_string(),
            stable_token: network::STABLE_TOKEN_ARTIFACT.to_string(),
        }
    }
}

/// Address pins that win over the artifact's `networks` table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressOverrides {
    pub stake: Option<Address>,
    pub data: Option<Address>,
    pub reward_token: Option<Address>,
    pub stable_token: Option<Address>,
}

/// Receipt polling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptPolling {
    pub interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for ReceiptPolling {
    fn default() -> Self {
        Self {
            interval_ms: polling::RECEIPT_INTERVAL_MS,
            max_attempts: polling::RECEIPT_MAX_ATTEMPTS,
        }
    }
}

/// Full client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Fallback JSON-RPC endpoint
    pub rpc_url: String,
    /// Network id to resolve artifact addresses for; asked from the node when unset
    pub network_id: Option<String>,
    /// Directory with the Truffle artifacts
    pub artifacts_dir: PathBuf,
    pub artifacts: ArtifactFiles,
    pub addresses: AddressOverrides,
    /// Spender every token approval targets
    pub spender: Address,
    /// Referrer used when the investor gives none
    pub default_referrer: Address,
    pub gas: GasLimits,
    pub receipts: ReceiptPolling,
    /// Origin of the bonus backend, e.g. `https://example.org`
    pub backend_origin: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: network::DEFAULT_RPC_URL.to_string(),
            network_id: None,
            artifacts_dir: PathBuf::from(network::DEFAULT_ARTIFACTS_DIR),
            artifacts: ArtifactFiles::default(),
            addresses: AddressOverrides::default(),
            spender: parse_default(network::DEFAULT_SPENDER),
            default_referrer: parse_default(network::DEFAULT_REFERRER),
            gas: GasLimits::default(),
            receipts: ReceiptPolling::default(),
            backend_origin: None,
        }
    }
}

fn parse_default(address: &str) -> Address {
    address.parse().unwrap_or(Address::ZERO)
}

impl ClientConfig {
    /// Parse a JSON config document and validate it
    pub fn from_json(text: &str) -> GoldResult<Self> {
        let config: ClientConfig = serde_json::from_str(text).map_err(|_| GoldError::InvalidConfig {
            param: "config",
            reason: "not a valid JSON config document",
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every action fail
    pub fn validate(&self) -> GoldResult<()> {
        check!(
            !self.rpc_url.trim().is_empty(),
            GoldError::InvalidConfig { param: "rpc_url", reason: "empty" }
        );
        check!(
            self.gas.standard > 0 && self.gas.heavy > 0,
            GoldError::InvalidConfig { param: "gas", reason: "limits must be positive" }
        );
        check!(
            self.receipts.max_attempts > 0,
            GoldError::InvalidConfig { param: "receipts.max_attempts", reason: "must be positive" }
        );
        check!(
            !self.spender.is_zero(),
            GoldError::InvalidConfig { param: "spender", reason: "zero address" }
        );
        Ok(())
    }

    /// Path of one artifact file
    pub fn artifact_path(&self, file: &str) -> PathBuf {
        self.artifacts_dir.join(file)
    }
}
