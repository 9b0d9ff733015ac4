//! ERC20 Token Client
//!
//! Typed `balanceOf` / `allowance` / `approve` access to the two tokens a
//! stake is paid in, plus the [`gate`] that checks both against a quote
//! before any stake transaction is sent.

pub mod gate;

use goldmine_common::{
    abi::{encode_call, AbiReader, Token},
    errors::GoldResult,
    provider::{confirm, Provider},
    types::{Address, AllowanceState, TokenKind, TransactionRequest, TxHash, TxReceipt},
    U256,
};

/// Canonical signatures of the methods the client calls
pub mod methods {
    pub const BALANCE_OF: &str = "balanceOf(address)";
    pub const ALLOWANCE: &str = "allowance(address,address)";
    pub const APPROVE: &str = "approve(address,uint256)";

    /// ABI names the artifact must declare
    pub const REQUIRED: [&str; 3] = ["balanceOf", "allowance", "approve"];
}

// ============ Client Interface ============

/// Operations of an ERC20 token
#[allow(async_fn_in_trait)]
pub trait Erc20 {
    /// Which of the two stake tokens this is
    fn kind(&self) -> TokenKind;

    async fn balance_of(&self, owner: Address) -> GoldResult<U256>;

    async fn allowance(&self, owner: Address, spender: Address) -> GoldResult<U256>;

    /// Hand an approval of exactly `amount` to the wallet
    async fn send_approve(&self, spender: Address, amount: U256, from: Address, gas: u64) -> GoldResult<TxHash>;

    /// Wait for a sent approval to be mined
    async fn confirm(&self, tx_hash: TxHash) -> GoldResult<TxReceipt>;

    /// Balance then allowance of `owner` toward `spender`
    async fn allowance_state(&self, owner: Address, spender: Address) -> GoldResult<AllowanceState> {
        let balance = self.balance_of(owner).await?;
        let allowance = self.allowance(owner, spender).await?;
        Ok(AllowanceState {
            token: self.kind(),
            balance,
            allowance,
        })
    }
}

// ============ JSON-RPC Binding ============

/// [`Erc20`] over any [`Provider`]
#[derive(Debug, Clone)]
pub struct RpcErc20<P> {
    provider: P,
    address: Address,
    kind: TokenKind,
}

impl<P: Provider> RpcErc20<P> {
    pub fn new(provider: P, address: Address, kind: TokenKind) -> Self {
        Self { provider, address, kind }
    }

    /// Deployed contract address
    pub fn address(&self) -> Address {
        self.address
    }

    async fn read_uint(&self, signature: &str, args: &[Token]) -> GoldResult<U256> {
        let data = self.provider.call(self.address, encode_call(signature, args)).await?;
        AbiReader::new(&data).uint(0)
    }
}

impl<P: Provider> Erc20 for RpcErc20<P> {
    fn kind(&self) -> TokenKind {
        self.kind
    }

    async fn balance_of(&self, owner: Address) -> GoldResult<U256> {
        self.read_uint(methods::BALANCE_OF, &[Token::Address(owner)]).await
    }

    async fn allowance(&self, owner: Address, spender: Address) -> GoldResult<U256> {
        self.read_uint(methods::ALLOWANCE, &[Token::Address(owner), Token::Address(spender)])
            .await
    }

    async fn send_approve(&self, spender: Address, amount: U256, from: Address, gas: u64) -> GoldResult<TxHash> {
        let tx = TransactionRequest {
            from,
            to: self.address,
            data: encode_call(methods::APPROVE, &[Token::Address(spender), Token::Uint(amount)]),
            gas,
        };
        self.provider.send_transaction(tx).await
    }

    async fn confirm(&self, tx_hash: TxHash) -> GoldResult<TxReceipt> {
        confirm(&self.provider, tx_hash).await
    }
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use goldmine_common::testing::{address, words, MockProvider};
    use pretty_assertions::assert_eq;

    const USDT: u8 = 0xA1;

    fn setup() -> RpcErc20<MockProvider> {
        RpcErc20::new(MockProvider::new(address(1)), address(USDT), TokenKind::Stable)
    }

    #[test]
    fn test_allowance_state_reads_balance_then_allowance() {
        let token = setup();
        token.provider.respond(address(USDT), methods::BALANCE_OF, words(&[U256::from(900)]));
        token.provider.respond(address(USDT), methods::ALLOWANCE, words(&[U256::from(50)]));

        let state = block_on(token.allowance_state(address(1), address(2))).unwrap();
        assert_eq!(
            state,
            AllowanceState {
                token: TokenKind::Stable,
                balance: U256::from(900),
                allowance: U256::from(50),
            }
        );

        let calls = token.provider.calls();
        assert_eq!(calls.len(), 2);
        // allowance(owner, spender)
        assert_eq!(&calls[1].1[16..36], address(1).as_bytes());
        assert_eq!(&calls[1].1[48..68], address(2).as_bytes());
    }

    #[test]
    fn test_approve_sends_exact_amount() {
        let token = setup();
        let amount = U256::from(800_000_000u64);
        let tx_hash = block_on(token.send_approve(address(2), amount, address(1), 100_000)).unwrap();
        assert!(block_on(token.confirm(tx_hash)).unwrap().success);

        let sent = token.provider.sent_to(methods::APPROVE);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, address(1));
        assert_eq!(sent[0].to, address(USDT));
        assert_eq!(U256::from_big_endian(&sent[0].data[36..68]), amount);
    }
}
