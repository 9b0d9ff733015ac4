//! GoldData Contract Client
//!
//! Typed access to the price/data oracle: the two token prices used by the
//! stake split, per-user investment records, withdrawal eligibility, and
//! the two admin setters.
//!
//! ## Freshness
//!
//! Prices are never cached. Every quote preview and every submission reads
//! them again, so the amount approved always matches the price the stake
//! contract will see at that moment.

pub mod positions;

use goldmine_common::{
    abi::{encode_call, AbiReader, Token},
    constants::display,
    errors::GoldResult,
    math::format_price,
    provider::{send_and_confirm, Provider},
    types::{Address, InvestmentRecord, PriceQuote, TransactionRequest, TxReceipt, UserInfo},
    U256,
};

/// Canonical signatures of the methods the client calls
pub mod methods {
    pub const GET_USDT_PRICE: &str = "getUsdtPrice()";
    pub const GET_HJL_PRICE: &str = "getHjlPrice()";
    pub const GET_USER: &str = "getUser(address)";
    pub const GET_INVESTMENT: &str = "getInvestment(address)";
    pub const GET_INVES_HISTORY: &str = "getInvesHistory(address,uint256)";
    pub const GET_CAN_WITHDRAWAL_AMOUNT: &str = "getCanWithdrawalAmount(address)";
    pub const ALLOW_ACCESS: &str = "allowAccess(address)";
    pub const CHANGE_BACK_TIME: &str = "changeBackTime(uint256)";

    /// ABI names the artifact must declare
    pub const REQUIRED: [&str; 8] = [
        "getUsdtPrice",
        "getHjlPrice",
        "getUser",
        "getInvestment",
        "getInvesHistory",
        "getCanWithdrawalAmount",
        "allowAccess",
        "changeBackTime",
    ];
}

/// Contract name used in errors and artifact lookup
pub const CONTRACT_NAME: &str = "GoldData";

// ============ Client Interface ============

/// Operations of the data/oracle contract
#[allow(async_fn_in_trait)]
pub trait DataOracle {
    /// Stablecoin price, scaled by 100
    async fn stable_price(&self) -> GoldResult<U256>;

    /// Reward token price, scaled by 100
    async fn reward_price(&self) -> GoldResult<U256>;

    /// Both prices, stablecoin first
    async fn price_quote(&self) -> GoldResult<PriceQuote> {
        let stable_price = self.stable_price().await?;
        let reward_price = self.reward_price().await?;
        Ok(PriceQuote { stable_price, reward_price })
    }

    async fn user(&self, account: Address) -> GoldResult<UserInfo>;

    /// Current position of `account`
    async fn investment(&self, account: Address) -> GoldResult<InvestmentRecord>;

    /// Historic position `record_id` of `account`
    async fn investment_history(&self, account: Address, record_id: U256) -> GoldResult<InvestmentRecord>;

    /// Stablecoin base units `account` may withdraw now
    async fn withdrawable_amount(&self, account: Address) -> GoldResult<U256>;

    /// Admin: grant `grantee` access to the data contract
    async fn allow_access(&self, grantee: Address, from: Address, gas: u64) -> GoldResult<TxReceipt>;

    /// Admin: set the backdated time used by eligibility checks
    async fn change_back_time(&self, time: u64, from: Address, gas: u64) -> GoldResult<TxReceipt>;
}

// ============ JSON-RPC Binding ============

/// [`DataOracle`] over any [`Provider`]
#[derive(Debug, Clone)]
pub struct RpcDataOracle<P> {
    provider: P,
    address: Address,
}

impl<P: Provider> RpcDataOracle<P> {
    pub fn new(provider: P, address: Address) -> Self {
        Self { provider, address }
    }

    /// Deployed contract address
    pub fn address(&self) -> Address {
        self.address
    }

    async fn read(&self, signature: &str, args: &[Token]) -> GoldResult<Vec<u8>> {
        self.provider.call(self.address, encode_call(signature, args)).await
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

/// Decode the six-word investment tuple
fn decode_investment(data: &[u8]) -> GoldResult<InvestmentRecord> {
    let reader = AbiReader::new(data);
    Ok(InvestmentRecord {
        amount: reader.uint(0)?,
        start_time: reader.u64(1)?,
        active: reader.bool(2)?,
        withdrawable: reader.uint(3)?,
        dynamic: reader.uint(4)?,
        withdrawn: reader.uint(5)?,
    })
}

/// Decode `(address, uint256, uint256, uint256[], uint256)`
fn decode_user(data: &[u8]) -> GoldResult<UserInfo> {
    let reader = AbiReader::new(data);
    Ok(UserInfo {
        referrer: reader.address(0)?,
        invested_total: reader.uint(1)?,
        bonus_total: reader.uint(2)?,
        record_ids: reader.uint_array(3)?,
        reward_held: reader.uint(4)?,
    })
}

impl<P: Provider> DataOracle for RpcDataOracle<P> {
    async fn stable_price(&self) -> GoldResult<U256> {
        let data = self.read(methods::GET_USDT_PRICE, &[]).await?;
        AbiReader::new(&data).uint(0)
    }

    async fn reward_price(&self) -> GoldResult<U256> {
        let data = self.read(methods::GET_HJL_PRICE, &[]).await?;
        AbiReader::new(&data).uint(0)
    }

    async fn user(&self, account: Address) -> GoldResult<UserInfo> {
        let data = self.read(methods::GET_USER, &[Token::Address(account)]).await?;
        decode_user(&data)
    }

    async fn investment(&self, account: Address) -> GoldResult<InvestmentRecord> {
        let data = self.read(methods::GET_INVESTMENT, &[Token::Address(account)]).await?;
        decode_investment(&data)
    }

    async fn investment_history(&self, account: Address, record_id: U256) -> GoldResult<InvestmentRecord> {
        let data = self
            .read(
                methods::GET_INVES_HISTORY,
                &[Token::Address(account), Token::Uint(record_id)],
            )
            .await?;
        decode_investment(&data)
    }

    async fn withdrawable_amount(&self, account: Address) -> GoldResult<U256> {
        let data = self
            .read(methods::GET_CAN_WITHDRAWAL_AMOUNT, &[Token::Address(account)])
            .await?;
        AbiReader::new(&data).uint(0)
    }

    async fn allow_access(&self, grantee: Address, from: Address, gas: u64) -> GoldResult<TxReceipt> {
        self.write(methods::ALLOW_ACCESS, &[Token::Address(grantee)], from, gas)
            .await
    }

    async fn change_back_time(&self, time: u64, from: Address, gas: u64) -> GoldResult<TxReceipt> {
        self.write(methods::CHANGE_BACK_TIME, &[Token::Uint(U256::from(time))], from, gas)
            .await
    }
}

// ============ Query Helpers ============

/// Reward token price for display (700 -> "7.00")
pub async fn reward_price_for_display<D: DataOracle>(oracle: &D) -> GoldResult<String> {
    let price = oracle.reward_price().await?;
    Ok(format_price(price, display::AMOUNT_PLACES))
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use goldmine_common::abi::selector;
    use goldmine_common::testing::{address, words, MockProvider};
    use goldmine_common::GoldError;
    use pretty_assertions::assert_eq;

    const ORACLE: u8 = 0xDD;

    fn setup() -> RpcDataOracle<MockProvider> {
        RpcDataOracle::new(MockProvider::new(address(1)), address(ORACLE))
    }

    fn investment_words(amount: u64, start: u64, active: bool) -> Vec<u8> {
        words(&[
            U256::from(amount),
            U256::from(start),
            U256::from(active as u64),
            U256::from(5_000_000u64),
            U256::from(1_500_000u64),
            U256::from(2_000_000_000_000_000_000u128),
        ])
    }

    #[test]
    fn test_price_quote_reads_both_prices() {
        let oracle = setup();
        oracle.provider.respond(address(ORACLE), methods::GET_USDT_PRICE, words(&[U256::from(100)]));
        oracle.provider.respond(address(ORACLE), methods::GET_HJL_PRICE, words(&[U256::from(700)]));

        let quote = block_on(oracle.price_quote()).unwrap();
        assert_eq!(quote.stable_price, U256::from(100));
        assert_eq!(quote.reward_price, U256::from(700));
        assert_eq!(oracle.provider.calls().len(), 2);
        assert_eq!(block_on(reward_price_for_display(&oracle)).unwrap(), "7.00");
    }

    #[test]
    fn test_investment_decodes_six_words() {
        let oracle = setup();
        oracle.provider.respond(
            address(ORACLE),
            methods::GET_INVESTMENT,
            investment_words(1_000_000_000, 1_600_000_000, true),
        );

        let record = block_on(oracle.investment(address(1))).unwrap();
        assert_eq!(
            record,
            InvestmentRecord {
                amount: U256::from(1_000_000_000u64),
                start_time: 1_600_000_000,
                active: true,
                withdrawable: U256::from(5_000_000u64),
                dynamic: U256::from(1_500_000u64),
                withdrawn: U256::from(2_000_000_000_000_000_000u128),
            }
        );

        let (to, data) = &oracle.provider.calls()[0];
        assert_eq!(*to, address(ORACLE));
        assert_eq!(&data[..4], &selector(methods::GET_INVESTMENT));
        assert_eq!(&data[16..36], address(1).as_bytes());
    }

    #[test]
    fn test_user_decodes_record_ids() {
        let oracle = setup();
        let mut data = Vec::new();
        data.extend(address_word(address(7)));
        data.extend(words(&[
            U256::from(3_000_000_000u64),
            U256::from(12u64),
            U256::from(5 * 32u64),
            U256::from(4_200_000_000_000_000_000u128),
            U256::from(2u64),
            U256::from(0u64),
            U256::from(1u64),
        ]));
        oracle.provider.respond(address(ORACLE), methods::GET_USER, data);

        let user = block_on(oracle.user(address(1))).unwrap();
        assert_eq!(user.referrer, address(7));
        assert_eq!(user.record_ids, vec![U256::zero(), U256::one()]);
        assert_eq!(user.reward_held, U256::from(4_200_000_000_000_000_000u128));
    }

    fn address_word(addr: Address) -> Vec<u8> {
        let mut word = vec![0u8; 12];
        word.extend_from_slice(addr.as_bytes());
        word
    }

    #[test]
    fn test_short_return_data_is_decode_error() {
        let oracle = setup();
        oracle.provider.respond(address(ORACLE), methods::GET_INVESTMENT, words(&[U256::one()]));
        assert!(matches!(
            block_on(oracle.investment(address(1))),
            Err(GoldError::AbiDecode { .. })
        ));
    }

    #[test]
    fn test_change_back_time_sends_standard_transaction() {
        let oracle = setup();
        let receipt = block_on(oracle.change_back_time(1_700_000_000, address(1), 100_000)).unwrap();
        assert!(receipt.success);

        let sent = oracle.provider.sent_to(methods::CHANGE_BACK_TIME);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].gas, 100_000);
        assert_eq!(sent[0].to, address(ORACLE));
        assert_eq!(U256::from_big_endian(&sent[0].data[4..36]), U256::from(1_700_000_000u64));
    }

    #[test]
    fn test_allow_access_revert_is_error() {
        let oracle = setup();
        oracle.provider.revert(methods::ALLOW_ACCESS);
        assert!(matches!(
            block_on(oracle.allow_access(address(3), address(1), 100_000)),
            Err(GoldError::TransactionReverted { .. })
        ));
    }
}
