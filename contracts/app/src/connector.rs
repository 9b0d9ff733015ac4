//! Provider Connector
//!
//! Picks the wallet the app talks to and proves it is usable: an injected
//! provider when the host supplies one, else the JSON-RPC fallback at the
//! configured URL. A connection that cannot report its gas price or any
//! account is unavailable.

use goldmine_common::{
    config::ClientConfig,
    errors::{GoldError, GoldResult},
    events::{EventLog, GoldEvent},
    provider::Provider,
    types::{Address, TransactionRequest, TxHash, TxReceipt},
    U256,
};

use crate::rpc::JsonRpcProvider;
use crate::transport::{HttpTransport, Transport};

/// The provider in use
pub enum ActiveProvider<I, T = HttpTransport> {
    /// Supplied by the host
    Injected(I),
    /// JSON-RPC over HTTP
    Fallback(JsonRpcProvider<T>),
}

impl<I, T> ActiveProvider<I, T> {
    pub fn is_injected(&self) -> bool {
        matches!(self, Self::Injected(_))
    }
}

/// Injected provider if present, else the HTTP fallback from `config`
pub fn select_provider<I: Provider>(injected: Option<I>, config: &ClientConfig) -> ActiveProvider<I> {
    match injected {
        Some(provider) => ActiveProvider::Injected(provider),
        None => ActiveProvider::Fallback(JsonRpcProvider::new(
            HttpTransport::default(),
            config.rpc_url.clone(),
            config.receipts,
        )),
    }
}

impl<I: Provider, T: Transport> Provider for ActiveProvider<I, T> {
    async fn accounts(&self) -> GoldResult<Vec<Address>> {
        match self {
            Self::Injected(p) => p.accounts().await,
            Self::Fallback(p) => p.accounts().await,
        }
    }

    async fn network_id(&self) -> GoldResult<String> {
        match self {
            Self::Injected(p) => p.network_id().await,
            Self::Fallback(p) => p.network_id().await,
        }
    }

    async fn gas_price(&self) -> GoldResult<U256> {
        match self {
            Self::Injected(p) => p.gas_price().await,
            Self::Fallback(p) => p.gas_price().await,
        }
    }

    async fn call(&self, to: Address, data: Vec<u8>) -> GoldResult<Vec<u8>> {
        match self {
            Self::Injected(p) => p.call(to, data).await,
            Self::Fallback(p) => p.call(to, data).await,
        }
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> GoldResult<TxHash> {
        match self {
            Self::Injected(p) => p.send_transaction(tx).await,
            Self::Fallback(p) => p.send_transaction(tx).await,
        }
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> GoldResult<TxReceipt> {
        match self {
            Self::Injected(p) => p.wait_for_receipt(tx_hash).await,
            Self::Fallback(p) => p.wait_for_receipt(tx_hash).await,
        }
    }
}

/// A verified connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// First account the wallet exposes
    pub account: Address,
    /// Network id artifacts are resolved against
    pub network_id: String,
    pub gas_price: U256,
}

/// Probe the provider and select the primary account
///
/// `network_override` wins over `net_version`. Every probe failure is
/// reported as [`GoldError::ProviderUnavailable`].
pub async fn connect<P: Provider>(
    provider: &P,
    injected: bool,
    network_override: Option<&str>,
    events: &mut EventLog,
) -> GoldResult<Connection> {
    let unavailable = |err: GoldError| GoldError::ProviderUnavailable { reason: err.to_string() };

    let gas_price = provider.gas_price().await.map_err(unavailable)?;
    events.emit(GoldEvent::GasPriceObserved { wei: gas_price });

    let accounts = provider.accounts().await.map_err(unavailable)?;
    let account = accounts.first().copied().ok_or(GoldError::NoAccount)?;

    let network_id = match network_override {
        Some(id) => id.to_string(),
        None => provider.network_id().await.map_err(unavailable)?,
    };

    events.emit(GoldEvent::Connected {
        account,
        network_id: network_id.clone(),
        injected,
    });

    Ok(Connection {
        account,
        network_id,
        gas_price,
    })
}
