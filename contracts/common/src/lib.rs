//! goldmine Common Library
//!
//! Shared types, constants, and utilities for the goldmine client crates.
//!
//! The client drives four contracts: the `Gold` stake contract, the
//! `GoldData` price/data oracle, and two ERC20 tokens (USDT and HJL). All
//! accounting lives on-chain; this layer reads state, computes the stake
//! split, and submits transactions.
//!
//! ## Modules
//!
//! - **bn**: 256-bit integer type for every on-chain amount
//! - **math**: decimal parsing, the stake split, display formatting
//! - **abi**: selector hashing and word encoding for contract calls
//! - **provider**: the wallet/node interface contract clients are generic over
//! - **events**: UI signals and diagnostics collected per action
//! - **config**: JSON configuration with defaults for a local chain

pub mod abi;
pub mod bn;
pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod math;
pub mod provider;
pub mod types;
pub mod validation;

#[cfg(any(test, feature = "testutils"))]
pub mod testing;

// Re-exports for convenience
pub use bn::U256;
pub use config::*;
pub use errors::*;
pub use events::*;
pub use math::*;
pub use provider::*;
pub use types::*;
