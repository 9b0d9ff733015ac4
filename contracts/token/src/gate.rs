//! Allowance Gate
//!
//! Before a stake is submitted both token allowances toward the spender
//! must cover the quote. The gate runs in two steps:
//!
//! 1. [`AllowanceGate::inspect`] reads balance and allowance of each token
//!    and fails on the first balance shortfall. Nothing is sent.
//! 2. [`AllowanceGate::approve`] hands every approval the plan lists to the
//!    wallet, each for exactly the required amount, before awaiting any
//!    receipt. The receipts are then awaited together. It returns only
//!    after all of them settle; any failure fails the whole step.

use futures::future::join;

use goldmine_common::{
    errors::{GoldError, GoldResult},
    types::{Address, AllowanceState, Quote, TokenKind, TxHash, TxReceipt},
    U256,
};

use crate::Erc20;

/// One approval the gate must send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingApproval {
    pub token: TokenKind,
    pub amount: U256,
}

/// Result of [`AllowanceGate::inspect`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalPlan {
    /// Stablecoin then reward token
    pub states: [AllowanceState; 2],
    pub pending: Vec<PendingApproval>,
}

impl ApprovalPlan {
    /// Both allowances already cover the quote
    pub fn is_ready(&self) -> bool {
        self.pending.is_empty()
    }

    fn amount_for(&self, token: TokenKind) -> Option<U256> {
        self.pending.iter().find(|p| p.token == token).map(|p| p.amount)
    }
}

/// Approval mined for one token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalReceipt {
    pub token: TokenKind,
    pub amount: U256,
    pub receipt: TxReceipt,
}

/// Checks and tops up both allowances for one account
pub struct AllowanceGate<'a, S: Erc20, R: Erc20> {
    stable: &'a S,
    reward: &'a R,
    owner: Address,
    spender: Address,
    gas: u64,
}

impl<'a, S: Erc20, R: Erc20> AllowanceGate<'a, S, R> {
    pub fn new(stable: &'a S, reward: &'a R, owner: Address, spender: Address, gas: u64) -> Self {
        Self {
            stable,
            reward,
            owner,
            spender,
            gas,
        }
    }

    /// Read both tokens and work out which approvals are missing
    pub async fn inspect(&self, quote: &Quote) -> GoldResult<ApprovalPlan> {
        let stable = self.stable.allowance_state(self.owner, self.spender).await?;
        ensure_balance(&stable, quote)?;

        let reward = self.reward.allowance_state(self.owner, self.spender).await?;
        ensure_balance(&reward, quote)?;

        let pending = [stable, reward]
            .iter()
            .filter(|state| state.needs_approval(quote.required(state.token)))
            .map(|state| PendingApproval {
                token: state.token,
                amount: quote.required(state.token),
            })
            .collect();

        Ok(ApprovalPlan {
            states: [stable, reward],
            pending,
        })
    }

    /// Send every pending approval and wait for all of them
    pub async fn approve(&self, plan: &ApprovalPlan) -> GoldResult<Vec<ApprovalReceipt>> {
        // a refused send does not stop the other token's approval
        let stable = send_one(self.stable, plan.amount_for(TokenKind::Stable), self).await;
        let reward = send_one(self.reward, plan.amount_for(TokenKind::Reward), self).await;

        let (stable, reward) = join(confirm_one(self.stable, stable), confirm_one(self.reward, reward)).await;

        let mut receipts = Vec::with_capacity(plan.pending.len());
        for result in [stable, reward] {
            if let Some(receipt) = result? {
                receipts.push(receipt);
            }
        }
        Ok(receipts)
    }
}

fn ensure_balance(state: &AllowanceState, quote: &Quote) -> GoldResult<()> {
    let required = quote.required(state.token);
    if !state.has_sufficient_balance(required) {
        return Err(GoldError::InsufficientBalance {
            token: state.token,
            available: state.balance,
            required,
        });
    }
    Ok(())
}

fn approval_failed(token: TokenKind, err: GoldError) -> GoldError {
    GoldError::ApprovalFailed {
        token,
        reason: err.to_string(),
    }
}

async fn send_one<T: Erc20, S: Erc20, R: Erc20>(
    token: &T,
    amount: Option<U256>,
    gate: &AllowanceGate<'_, S, R>,
) -> GoldResult<Option<(U256, TxHash)>> {
    let Some(amount) = amount else {
        return Ok(None);
    };

    let tx_hash = token
        .send_approve(gate.spender, amount, gate.owner, gate.gas)
        .await
        .map_err(|err| approval_failed(token.kind(), err))?;
    Ok(Some((amount, tx_hash)))
}

async fn confirm_one<T: Erc20>(
    token: &T,
    sent: GoldResult<Option<(U256, TxHash)>>,
) -> GoldResult<Option<ApprovalReceipt>> {
    let Some((amount, tx_hash)) = sent? else {
        return Ok(None);
    };

    let receipt = token.confirm(tx_hash).await.map_err(|err| approval_failed(token.kind(), err))?;
    Ok(Some(ApprovalReceipt {
        token: token.kind(),
        amount,
        receipt,
    }))
}

// ============ Tests ============
