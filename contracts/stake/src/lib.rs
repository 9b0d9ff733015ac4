//! Gold Stake Contract Client
//!
//! Typed access to the staking contract: the token split it currently
//! applies and the three position-changing calls. The [`submitter`]
//! routes user actions onto this client and the data contract.

pub mod submitter;

use goldmine_common::{
    abi::{encode_call, AbiReader, Token},
    errors::GoldResult,
    math::quote_split,
    provider::{send_and_confirm, Provider},
    types::{Address, Proportion, Quote, TransactionRequest, TxReceipt},
    U256,
};
use goldmine_data_oracle::DataOracle;

/// Canonical signatures of the methods the client calls
pub mod methods {
    pub const GET_USDT_PROPORTION: &str = "getUsdtProportion()";
    pub const INVEST: &str = "invest(uint256,address)";
    pub const REINVEST: &str = "ReInvest(uint256)";
    pub const WITHDRAWAL: &str = "withdrawal(uint256)";

    /// ABI names the artifact must declare
    pub const REQUIRED: [&str; 4] = ["getUsdtProportion", "invest", "ReInvest", "withdrawal"];
}

/// Contract name used in errors and artifact lookup
pub const CONTRACT_NAME: &str = "Gold";

// ============ Client Interface ============

/// Operations of the stake contract
#[allow(async_fn_in_trait)]
pub trait StakeContract {
    /// Current split, validated to sum to 100
    async fn proportion(&self) -> GoldResult<Proportion>;

    /// Open a position of `amount` stablecoin base units
    async fn invest(&self, amount: U256, referrer: Address, from: Address, gas: u64) -> GoldResult<TxReceipt>;

    /// Add `amount` to the existing position
    async fn reinvest(&self, amount: U256, from: Address, gas: u64) -> GoldResult<TxReceipt>;

    /// Withdraw `amount` stablecoin base units
    async fn withdraw(&self, amount: U256, from: Address, gas: u64) -> GoldResult<TxReceipt>;
}

// ============ JSON-RPC Binding ============

/// [`StakeContract`] over any [`Provider`]
#[derive(Debug, Clone)]
pub struct RpcStake<P> {
    provider: P,
    address: Address,
}

impl<P: Provider> RpcStake<P> {
    pub fn new(provider: P, address: Address) -> Self {
        Self { provider, address }
    }

    /// Deployed contract address
    pub fn address(&self) -> Address {
        self.address
    }

    async fn write(&self, signature: &str, args: &[Token], from: Address, gas: u64) -> GoldResult<TxReceipt> {
        let tx = TransactionRequest {
            from,
            to: self.address,
            data: encode_call(signature, args),
            gas,
        };
        send_and_confirm(&self.provider, tx).await
    }
}

impl<P: Provider> StakeContract for RpcStake<P> {
    async fn proportion(&self) -> GoldResult<Proportion> {
        let data = self
            .provider
            .call(self.address, encode_call(methods::GET_USDT_PROPORTION, &[]))
            .await?;
        let reader = AbiReader::new(&data);
        Proportion::from_contract(reader.uint(0)?, reader.uint(1)?)
    }

    async fn invest(&self, amount: U256, referrer: Address, from: Address, gas: u64) -> GoldResult<TxReceipt> {
        self.write(
            methods::INVEST,
            &[Token::Uint(amount), Token::Address(referrer)],
            from,
            gas,
        )
        .await
    }

    async fn reinvest(&self, amount: U256, from: Address, gas: u64) -> GoldResult<TxReceipt> {
        self.write(methods::REINVEST, &[Token::Uint(amount)], from, gas).await
    }

    async fn withdraw(&self, amount: U256, from: Address, gas: u64) -> GoldResult<TxReceipt> {
        self.write(methods::WITHDRAWAL, &[Token::Uint(amount)], from, gas).await
    }
}

// ============ Quoting ============

/// Fresh quote for `gross`: proportion, then stablecoin price, then reward price
///
/// Nothing is cached, so two calls around a price update give two
/// different quotes.
pub async fn fetch_quote<G: StakeContract, D: DataOracle>(stake: &G, data: &D, gross: U256) -> GoldResult<Quote> {
    let proportion = stake.proportion().await?;
    let prices = data.price_quote().await?;
    quote_split(gross, &proportion, &prices)
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use goldmine_common::testing::{address, words, MockProvider};
    use goldmine_common::GoldError;
    use goldmine_data_oracle::{methods as data_methods, RpcDataOracle};
    use pretty_assertions::assert_eq;
    use std::rc::Rc;
    use test_case::test_case;

    const GOLD: u8 = 0xC0;
    const DATA: u8 = 0xDD;

    fn setup() -> (Rc<MockProvider>, RpcStake<Rc<MockProvider>>, RpcDataOracle<Rc<MockProvider>>) {
        let provider = Rc::new(MockProvider::new(address(1)));
        let stake = RpcStake::new(provider.clone(), address(GOLD));
        let data = RpcDataOracle::new(provider.clone(), address(DATA));
        (provider, stake, data)
    }

    fn script_prices(provider: &MockProvider, stable_price: u64, reward_price: u64) {
        provider.respond(address(DATA), data_methods::GET_USDT_PRICE, words(&[U256::from(stable_price)]));
        provider.respond(address(DATA), data_methods::GET_HJL_PRICE, words(&[U256::from(reward_price)]));
    }

    #[test_case(80, 20 ; "eighty twenty")]
    #[test_case(100, 0 ; "all stable")]
    #[test_case(0, 100 ; "all reward")]
    fn test_proportion_accepts_full_splits(stable: u64, reward: u64) {
        let (provider, stake, _) = setup();
        provider.respond(
            address(GOLD),
            methods::GET_USDT_PROPORTION,
            words(&[U256::from(stable), U256::from(reward)]),
        );
        let proportion = block_on(stake.proportion()).unwrap();
        assert_eq!(proportion.stable_share_pct, stable);
        assert_eq!(proportion.reward_share_pct, reward);
    }

    #[test]
    fn test_proportion_not_summing_to_hundred_is_rejected() {
        let (provider, stake, _) = setup();
        provider.respond(
            address(GOLD),
            methods::GET_USDT_PROPORTION,
            words(&[U256::from(70), U256::from(20)]),
        );
        assert!(matches!(
            block_on(stake.proportion()),
            Err(GoldError::InvalidProportion { .. })
        ));
    }

    #[test]
    fn test_fetch_quote_reference_scenario() {
        let (provider, stake, data) = setup();
        provider.respond(
            address(GOLD),
            methods::GET_USDT_PROPORTION,
            words(&[U256::from(80), U256::from(20)]),
        );
        script_prices(&provider, 100, 700);

        let quote = block_on(fetch_quote(&stake, &data, U256::from(1_000_000_000u64))).unwrap();
        assert_eq!(quote.stable_amount, U256::from(800_000_000u64));
        assert_eq!(quote.reward_amount, U256::from(28_571_428_571_428_571_428u128));

        // proportion, stablecoin price, reward price
        let targets: Vec<_> = provider.calls().into_iter().map(|(to, _)| to).collect();
        assert_eq!(targets, vec![address(GOLD), address(DATA), address(DATA)]);
    }

    #[test]
    fn test_invest_encodes_amount_and_referrer() {
        let (provider, stake, _) = setup();
        block_on(stake.invest(U256::from(1_000_000_000u64), address(9), address(1), 500_000)).unwrap();

        let sent = provider.sent_to(methods::INVEST);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].gas, 500_000);
        assert_eq!(U256::from_big_endian(&sent[0].data[4..36]), U256::from(1_000_000_000u64));
        assert_eq!(&sent[0].data[48..68], address(9).as_bytes());
    }

    #[test]
    fn test_withdraw_revert_is_error() {
        let (provider, stake, _) = setup();
        provider.revert(methods::WITHDRAWAL);
        assert!(matches!(
            block_on(stake.withdraw(U256::from(5_000_000u64), address(1), 500_000)),
            Err(GoldError::TransactionReverted { .. })
        ));
    }
}
