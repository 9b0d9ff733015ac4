//! Provider Interface
//!
//! The wallet or node the client talks to. An injected wallet and the
//! JSON-RPC fallback both implement [`Provider`]; typed contract clients are
//! generic over it.

use std::rc::Rc;

use crate::bn::U256;
use crate::errors::{GoldError, GoldResult};
use crate::types::{Address, TransactionRequest, TxHash, TxReceipt};

/// Wallet / node operations the client depends on
#[allow(async_fn_in_trait)]
pub trait Provider {
    /// Accounts the wallet exposes, primary first
    async fn accounts(&self) -> GoldResult<Vec<Address>>;

    /// Network id used to pick artifact deployments (`net_version`)
    async fn network_id(&self) -> GoldResult<String>;

    /// Current gas price in wei
    async fn gas_price(&self) -> GoldResult<U256>;

    /// Read-only contract call against the latest block
    async fn call(&self, to: Address, data: Vec<u8>) -> GoldResult<Vec<u8>>;

    /// Hand a transaction to the wallet for signing and broadcast
    async fn send_transaction(&self, tx: TransactionRequest) -> GoldResult<TxHash>;

    /// Wait until the transaction is mined
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> GoldResult<TxReceipt>;
}

impl<P: Provider> Provider for Rc<P> {
    async fn accounts(&self) -> GoldResult<Vec<Address>> {
        (**self).accounts().await
    }

    async fn network_id(&self) -> GoldResult<String> {
        (**self).network_id().await
    }

    async fn gas_price(&self) -> GoldResult<U256> {
        (**self).gas_price().await
    }

    async fn call(&self, to: Address, data: Vec<u8>) -> GoldResult<Vec<u8>> {
        (**self).call(to, data).await
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> GoldResult<TxHash> {
        (**self).send_transaction(tx).await
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> GoldResult<TxReceipt> {
        (**self).wait_for_receipt(tx_hash).await
    }
}

/// Wait for a sent transaction; a mined revert is an error
pub async fn confirm<P: Provider>(provider: &P, tx_hash: TxHash) -> GoldResult<TxReceipt> {
    let receipt = provider.wait_for_receipt(tx_hash).await?;

    if !receipt.success {
        return Err(GoldError::TransactionReverted { tx_hash });
    }
    Ok(receipt)
}

/// Send a transaction and wait for it
pub async fn send_and_confirm<P: Provider>(provider: &P, tx: TransactionRequest) -> GoldResult<TxReceipt> {
    let tx_hash = provider.send_transaction(tx).await?;
    confirm(provider, tx_hash).await
}
