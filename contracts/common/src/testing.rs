//! Test utilities
//!
//! An in-memory [`Provider`] with scripted call results, used by the
//! contract-client tests of every crate. Enabled for other crates through
//! the `testutils` feature.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::abi::selector;
use crate::bn::U256;
use crate::errors::{GoldError, GoldResult};
use crate::provider::Provider;
use crate::types::{Address, TransactionRequest, TxHash, TxReceipt};

/// Future that is pending exactly once, so concurrent work can interleave
pub struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// Suspend the current task once
pub fn yield_now() -> YieldNow {
    YieldNow { yielded: false }
}

/// Encode return data made of static words
pub fn words(values: &[U256]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_word()).collect()
}

/// Deterministic test address
pub fn address(byte: u8) -> Address {
    Address([byte; 20])
}

/// Scripted provider
#[derive(Default)]
pub struct MockProvider {
    pub accounts: Vec<Address>,
    pub network_id: String,
    pub gas_price: U256,
    responses: RefCell<HashMap<(Address, [u8; 4]), Vec<u8>>>,
    rejected: RefCell<HashSet<[u8; 4]>>,
    rejected_to: RefCell<HashSet<Address>>,
    reverted: RefCell<HashSet<[u8; 4]>>,
    calls: RefCell<Vec<(Address, Vec<u8>)>>,
    sent: RefCell<Vec<TransactionRequest>>,
    unavailable: Cell<bool>,
    in_flight: Cell<usize>,
    max_in_flight: Cell<usize>,
}

impl MockProvider {
    pub fn new(account: Address) -> Self {
        Self {
            accounts: vec![account],
            network_id: "5777".to_string(),
            gas_price: U256::from(20_000_000_000u64),
            ..Self::default()
        }
    }

    /// Script the return data of `signature` on contract `to`
    pub fn respond(&self, to: Address, signature: &str, data: Vec<u8>) {
        self.responses.borrow_mut().insert((to, selector(signature)), data);
    }

    /// Wallet refuses transactions calling `signature`
    pub fn reject(&self, signature: &str) {
        self.rejected.borrow_mut().insert(selector(signature));
    }

    /// Wallet refuses every transaction sent to contract `to`
    pub fn reject_to(&self, to: Address) {
        self.rejected_to.borrow_mut().insert(to);
    }

    /// Transactions calling `signature` are mined with status 0
    pub fn revert(&self, signature: &str) {
        self.reverted.borrow_mut().insert(selector(signature));
    }

    /// Every request fails as if the node were down
    pub fn go_offline(&self) {
        self.unavailable.set(true);
    }

    /// Read calls made so far
    pub fn calls(&self) -> Vec<(Address, Vec<u8>)> {
        self.calls.borrow().clone()
    }

    /// Transactions handed to the wallet so far
    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.sent.borrow().clone()
    }

    /// Transactions whose calldata starts with the selector of `signature`
    pub fn sent_to(&self, signature: &str) -> Vec<TransactionRequest> {
        let sel = selector(signature);
        self.sent
            .borrow()
            .iter()
            .filter(|tx| tx.data.starts_with(&sel))
            .cloned()
            .collect()
    }

    /// Most receipts awaited at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.get()
    }

    fn ensure_online(&self) -> GoldResult<()> {
        if self.unavailable.get() {
            return Err(GoldError::Transport { reason: "connection refused".into() });
        }
        Ok(())
    }
}

impl Provider for MockProvider {
    async fn accounts(&self) -> GoldResult<Vec<Address>> {
        self.ensure_online()?;
        Ok(self.accounts.clone())
    }

    async fn network_id(&self) -> GoldResult<String> {
        self.ensure_online()?;
        Ok(self.network_id.clone())
    }

    async fn gas_price(&self) -> GoldResult<U256> {
        self.ensure_online()?;
        Ok(self.gas_price)
    }

    async fn call(&self, to: Address, data: Vec<u8>) -> GoldResult<Vec<u8>> {
        self.ensure_online()?;
        let mut sel = [0u8; 4];
        sel.copy_from_slice(data.get(..4).ok_or(GoldError::AbiDecode { reason: "no selector" })?);
        self.calls.borrow_mut().push((to, data));

        self.responses
            .borrow()
            .get(&(to, sel))
            .cloned()
            .ok_or_else(|| GoldError::Rpc { code: -32000, message: "execution reverted".into() })
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> GoldResult<TxHash> {
        self.ensure_online()?;
        let rejected = tx
            .data
            .get(..4)
            .map(|sel| self.rejected.borrow().iter().any(|r| r == sel))
            .unwrap_or(false)
            || self.rejected_to.borrow().contains(&tx.to);
        if rejected {
            return Err(GoldError::Rpc { code: 4001, message: "User denied transaction signature".into() });
        }

        let mut sent = self.sent.borrow_mut();
        sent.push(tx);
        let mut hash = [0u8; 32];
        hash[24..].copy_from_slice(&(sent.len() as u64).to_be_bytes());
        Ok(TxHash(hash))
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> GoldResult<TxReceipt> {
        let in_flight = self.in_flight.get() + 1;
        self.in_flight.set(in_flight);
        self.max_in_flight.set(self.max_in_flight.get().max(in_flight));
        yield_now().await;
        self.in_flight.set(self.in_flight.get() - 1);
        self.ensure_online()?;

        let mut index_bytes = [0u8; 8];
        index_bytes.copy_from_slice(&tx_hash.0[24..]);
        let index = u64::from_be_bytes(index_bytes) as usize;

        let sent = self.sent.borrow();
        let tx = sent
            .get(index.wrapping_sub(1))
            .ok_or_else(|| GoldError::InvalidResponse { reason: "unknown transaction".into() })?;
        let success = !tx
            .data
            .get(..4)
            .map(|sel| self.reverted.borrow().iter().any(|r| r == sel))
            .unwrap_or(false);

        Ok(TxReceipt {
            tx_hash,
            success,
            block_number: index as u64,
            gas_used: U256::from(tx.gas),
        })
    }
}
