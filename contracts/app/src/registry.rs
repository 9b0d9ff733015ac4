//! Contract Registry
//!
//! Loads the four Truffle artifacts, checks that each ABI declares every
//! method the typed clients call, resolves deployed addresses for the
//! active network and binds the clients to one shared provider.

use std::collections::HashMap;
use std::fs;

use serde::Deserialize;

use goldmine_common::{
    abi::abi_has_function,
    config::{AddressOverrides, ClientConfig},
    errors::{GoldError, GoldResult},
    provider::Provider,
    types::{Address, TokenKind},
};
use goldmine_data_oracle::RpcDataOracle;
use goldmine_stake::RpcStake;
use goldmine_token::RpcErc20;

/// Contract names used in errors
pub mod names {
    pub use goldmine_data_oracle::CONTRACT_NAME as DATA;
    pub use goldmine_stake::CONTRACT_NAME as STAKE;

    pub const REWARD_TOKEN: &str = "CompassCpcToken";
    pub const STABLE_TOKEN: &str = "Usdt";
}

// ============ Artifacts ============

#[derive(Debug, Clone, Deserialize)]
struct Deployment {
    address: Address,
}

/// The parts of a Truffle build artifact the client reads
#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    pub abi: serde_json::Value,
    #[serde(default)]
    networks: HashMap<String, Deployment>,
}

impl Artifact {
    /// Parse artifact JSON for `contract`
    pub fn from_json(text: &str, contract: &'static str) -> GoldResult<Self> {
        serde_json::from_str(text).map_err(|err| GoldError::ArtifactUnavailable {
            contract,
            reason: err.to_string(),
        })
    }

    /// Read and parse an artifact file
    pub fn load(path: &std::path::Path, contract: &'static str) -> GoldResult<Self> {
        let text = fs::read_to_string(path).map_err(|err| GoldError::ArtifactUnavailable {
            contract,
            reason: format!("{}: {}", path.display(), err),
        })?;
        Self::from_json(&text, contract)
    }

    /// Fail on the first required method the ABI lacks
    pub fn require_methods(&self, contract: &'static str, methods: &[&'static str]) -> GoldResult<()> {
        for &method in methods {
            if !abi_has_function(&self.abi, method) {
                return Err(GoldError::MissingMethod { contract, method });
            }
        }
        Ok(())
    }

    /// Override if pinned, else the deployment recorded for `network_id`
    pub fn resolve_address(
        &self,
        contract: &'static str,
        network_id: &str,
        pinned: Option<Address>,
    ) -> GoldResult<Address> {
        if let Some(address) = pinned {
            return Ok(address);
        }
        self.networks
            .get(network_id)
            .map(|deployment| deployment.address)
            .ok_or_else(|| GoldError::NoDeployment {
                contract,
                network_id: network_id.to_string(),
            })
    }
}

/// All four artifacts
#[derive(Debug, Clone)]
pub struct ArtifactSet {
    pub stake: Artifact,
    pub data: Artifact,
    pub reward_token: Artifact,
    pub stable_token: Artifact,
}

impl ArtifactSet {
    /// Load every artifact named in `config`
    pub fn load(config: &ClientConfig) -> GoldResult<Self> {
        let files = &config.artifacts;
        Ok(Self {
            stake: Artifact::load(&config.artifact_path(&files.stake), names::STAKE)?,
            data: Artifact::load(&config.artifact_path(&files.data), names::DATA)?,
            reward_token: Artifact::load(&config.artifact_path(&files.reward_token), names::REWARD_TOKEN)?,
            stable_token: Artifact::load(&config.artifact_path(&files.stable_token), names::STABLE_TOKEN)?,
        })
    }
}

// ============ Registry ============

/// Typed clients bound to one provider
pub struct ContractRegistry<P> {
    pub stake: RpcStake<P>,
    pub data: RpcDataOracle<P>,
    pub stable_token: RpcErc20<P>,
    pub reward_token: RpcErc20<P>,
}

impl<P: Provider + Clone> ContractRegistry<P> {
    /// Verify method sets, resolve addresses, bind clients
    pub fn bind(
        provider: P,
        artifacts: &ArtifactSet,
        overrides: &AddressOverrides,
        network_id: &str,
    ) -> GoldResult<Self> {
        artifacts.stake.require_methods(names::STAKE, &goldmine_stake::methods::REQUIRED)?;
        artifacts.data.require_methods(names::DATA, &goldmine_data_oracle::methods::REQUIRED)?;
        artifacts
            .reward_token
            .require_methods(names::REWARD_TOKEN, &goldmine_token::methods::REQUIRED)?;
        artifacts
            .stable_token
            .require_methods(names::STABLE_TOKEN, &goldmine_token::methods::REQUIRED)?;

        let stake = artifacts.stake.resolve_address(names::STAKE, network_id, overrides.stake)?;
        let data = artifacts.data.resolve_address(names::DATA, network_id, overrides.data)?;
        let reward = artifacts
            .reward_token
            .resolve_address(names::REWARD_TOKEN, network_id, overrides.reward_token)?;
        let stable = artifacts
            .stable_token
            .resolve_address(names::STABLE_TOKEN, network_id, overrides.stable_token)?;

        Ok(Self {
            stake: RpcStake::new(provider.clone(), stake),
            data: RpcDataOracle::new(provider.clone(), data),
            stable_token: RpcErc20::new(provider.clone(), stable, TokenKind::Stable),
            reward_token: RpcErc20::new(provider, reward, TokenKind::Reward),
        })
    }

    /// Load artifacts from disk and bind
    pub fn load(provider: P, config: &ClientConfig, network_id: &str) -> GoldResult<Self> {
        let artifacts = ArtifactSet::load(config)?;
        Self::bind(provider, &artifacts, &config.addresses, network_id)
    }
}
