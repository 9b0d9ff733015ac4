//! Action Submitter
//!
//! Turns one validated user action into exactly one transaction against the
//! stake or data contract. Gas comes from [`GasLimits`]; failures come back
//! as [`GoldError::SubmissionFailed`] and are never retried.

use goldmine_common::{
    config::GasLimits,
    errors::{GoldError, GoldResult},
    types::{ActionKind, Address, TxReceipt},
    U256,
};
use goldmine_data_oracle::DataOracle;

use crate::StakeContract;

/// A validated action ready to send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionRequest {
    Invest { amount: U256, referrer: Address },
    Reinvest { amount: U256 },
    Withdraw { amount: U256 },
    SetBackTime { time: u64 },
    AllowAccess { grantee: Address },
}

impl ActionRequest {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Invest { .. } => ActionKind::Invest,
            Self::Reinvest { .. } => ActionKind::Reinvest,
            Self::Withdraw { .. } => ActionKind::Withdraw,
            Self::SetBackTime { .. } => ActionKind::SetBackTime,
            Self::AllowAccess { .. } => ActionKind::AllowAccess,
        }
    }
}

/// Sends [`ActionRequest`]s from one account
pub struct ActionSubmitter<'a, G: StakeContract, D: DataOracle> {
    stake: &'a G,
    data: &'a D,
    from: Address,
    gas: GasLimits,
}

impl<'a, G: StakeContract, D: DataOracle> ActionSubmitter<'a, G, D> {
    pub fn new(stake: &'a G, data: &'a D, from: Address, gas: GasLimits) -> Self {
        Self { stake, data, from, gas }
    }

    /// Gas limit the request will be sent with
    pub fn gas_for(&self, request: &ActionRequest) -> u64 {
        self.gas.for_action(request.kind())
    }

    /// Send the request and wait for its receipt
    pub async fn submit(&self, request: ActionRequest) -> GoldResult<TxReceipt> {
        let gas = self.gas_for(&request);
        let from = self.from;

        let result = match request {
            ActionRequest::Invest { amount, referrer } => self.stake.invest(amount, referrer, from, gas).await,
            ActionRequest::Reinvest { amount } => self.stake.reinvest(amount, from, gas).await,
            ActionRequest::Withdraw { amount } => self.stake.withdraw(amount, from, gas).await,
            ActionRequest::SetBackTime { time } => self.data.change_back_time(time, from, gas).await,
            ActionRequest::AllowAccess { grantee } => self.data.allow_access(grantee, from, gas).await,
        };

        result.map_err(|err| GoldError::SubmissionFailed {
            action: request.kind(),
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{methods, RpcStake};
    use futures::executor::block_on;
    use goldmine_common::testing::{address, MockProvider};
    use goldmine_data_oracle::{methods as data_methods, RpcDataOracle};
    use pretty_assertions::assert_eq;
    use std::rc::Rc;
    use test_case::test_case;

    const GOLD: u8 = 0xC0;
    const DATA: u8 = 0xDD;

    struct Fixture {
        provider: Rc<MockProvider>,
        stake: RpcStake<Rc<MockProvider>>,
        data: RpcDataOracle<Rc<MockProvider>>,
    }

    impl Fixture {
        fn new() -> Self {
            let provider = Rc::new(MockProvider::new(address(1)));
            Self {
                stake: RpcStake::new(provider.clone(), address(GOLD)),
                data: RpcDataOracle::new(provider.clone(), address(DATA)),
                provider,
            }
        }

        fn submitter(&self) -> ActionSubmitter<'_, RpcStake<Rc<MockProvider>>, RpcDataOracle<Rc<MockProvider>>> {
            ActionSubmitter::new(&self.stake, &self.data, address(1), GasLimits::default())
        }
    }

    #[test_case(ActionRequest::Invest { amount: U256::one(), referrer: address(9) }, methods::INVEST, GOLD, 500_000 ; "invest")]
    #[test_case(ActionRequest::Reinvest { amount: U256::one() }, methods::REINVEST, GOLD, 500_000 ; "reinvest")]
    #[test_case(ActionRequest::Withdraw { amount: U256::one() }, methods::WITHDRAWAL, GOLD, 500_000 ; "withdraw")]
    #[test_case(ActionRequest::SetBackTime { time: 1_700_000_000 }, data_methods::CHANGE_BACK_TIME, DATA, 100_000 ; "set back time")]
    #[test_case(ActionRequest::AllowAccess { grantee: address(7) }, data_methods::ALLOW_ACCESS, DATA, 100_000 ; "allow access")]
    fn test_request_routing(request: ActionRequest, signature: &str, contract: u8, gas: u64) {
        let fx = Fixture::new();
        block_on(fx.submitter().submit(request)).unwrap();

        let sent = fx.provider.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(fx.provider.sent_to(signature).len(), 1);
        assert_eq!(sent[0].to, address(contract));
        assert_eq!(sent[0].from, address(1));
        assert_eq!(sent[0].gas, gas);
    }

    #[test]
    fn test_custom_gas_limits_are_used() {
        let fx = Fixture::new();
        let gas = GasLimits { standard: 60_000, heavy: 900_000 };
        let submitter = ActionSubmitter::new(&fx.stake, &fx.data, address(1), gas);

        block_on(submitter.submit(ActionRequest::Reinvest { amount: U256::one() })).unwrap();
        block_on(submitter.submit(ActionRequest::SetBackTime { time: 1 })).unwrap();

        let sent = fx.provider.sent();
        assert_eq!(sent[0].gas, 900_000);
        assert_eq!(sent[1].gas, 60_000);
    }

    #[test]
    fn test_wallet_rejection_is_submission_failure() {
        let fx = Fixture::new();
        fx.provider.reject(methods::INVEST);

        let err = block_on(fx.submitter().submit(ActionRequest::Invest {
            amount: U256::one(),
            referrer: address(9),
        }))
        .unwrap_err();

        assert!(matches!(
            err,
            GoldError::SubmissionFailed { action: ActionKind::Invest, .. }
        ));
        assert!(fx.provider.sent().is_empty());
    }

    #[test]
    fn test_revert_is_submission_failure_and_not_retried() {
        let fx = Fixture::new();
        fx.provider.revert(methods::WITHDRAWAL);

        let err = block_on(fx.submitter().submit(ActionRequest::Withdraw { amount: U256::one() })).unwrap_err();
        assert_eq!(err.code(), "E021_SUBMISSION_FAILED");
        assert_eq!(fx.provider.sent().len(), 1);
    }
}
