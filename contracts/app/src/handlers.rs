//! Action Handlers
//!
//! One async handler per UI control. Each runs the action state machine
//!
//! ```text
//! Idle -> Validating -> Quoting -> AllowanceCheck -> [Approving] -> Submitting -> Confirmed | Failed -> Idle
//! ```
//!
//! recording every transition in the context's event log. Withdraw and the
//! admin setters go straight from Validating to Submitting.
//!
//! Errors never leave a handler: every path ends in an [`ActionOutcome`]
//! with the control enabled again.

use std::cell::Cell;

use goldmine_common::{
    constants::display,
    errors::{ErrorCategory, GoldError, GoldResult},
    events::GoldEvent,
    math::{format_units, parse_stake_amount},
    provider::Provider,
    types::{ActionKind, ActionState, Quote, TokenKind, TxReceipt},
    validation::{parse_optional_address, parse_required_address, parse_timestamp},
    U256,
};
use goldmine_data_oracle::positions::{load_positions, PositionSnapshot};
use goldmine_stake::{
    fetch_quote,
    submitter::{ActionRequest, ActionSubmitter},
};
use goldmine_token::gate::AllowanceGate;

use crate::context::AppContext;

/// How one click ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Main transaction mined
    Confirmed(TxReceipt),
    /// Stopped by validation, balance, approval or submission failure
    Rejected(GoldError),
    /// Control was disabled; nothing happened
    Ignored,
}

impl ActionOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }
}

// ============ State Tracking ============

struct ActionRun<'a, P> {
    ctx: &'a AppContext<P>,
    action: ActionKind,
    state: Cell<ActionState>,
}

impl<'a, P> ActionRun<'a, P> {
    fn start(ctx: &'a AppContext<P>, action: ActionKind) -> Self {
        let run = Self {
            ctx,
            action,
            state: Cell::new(ActionState::Idle),
        };
        run.advance(ActionState::Validating);
        run
    }

    fn advance(&self, to: ActionState) {
        let from = self.state.replace(to);
        debug_assert!(from.can_transition_to(to), "{:?} -> {:?}", from, to);
        self.ctx.emit(GoldEvent::StateChanged {
            action: self.action,
            from,
            to,
        });
    }

    /// Emit the signal for the error's category and return to Idle
    fn fail(&self, err: GoldError) -> ActionOutcome {
        let signal = match (err.category(), &err) {
            (ErrorCategory::Validation, _) => GoldEvent::ValidationFailed {
                action: self.action,
                code: err.code(),
            },
            (ErrorCategory::InsufficientBalance, GoldError::InsufficientBalance { token, .. }) => {
                GoldEvent::InsufficientBalance {
                    action: self.action,
                    token: *token,
                }
            }
            _ => GoldEvent::SubmissionFailed {
                action: self.action,
                code: err.code(),
                reason: err.to_string(),
            },
        };
        self.ctx.emit(signal);
        self.advance(ActionState::Failed);
        self.advance(ActionState::Idle);
        ActionOutcome::Rejected(err)
    }
}

fn ignored<P>(ctx: &AppContext<P>, action: ActionKind) -> ActionOutcome {
    ctx.emit(GoldEvent::ActionIgnored { action });
    ActionOutcome::Ignored
}

// ============ Quote Preview ============

/// Live split preview for the amount being typed
pub async fn preview_quote<P: Provider>(ctx: &AppContext<P>, amount: &str) -> GoldResult<Quote> {
    let gross = parse_stake_amount(amount)?;
    let quote = fetch_quote(&ctx.contracts.stake, &ctx.contracts.data, gross).await?;

    ctx.emit(GoldEvent::QuoteDisplayed {
        stable: format_units(quote.stable_amount, TokenKind::Stable.decimals(), display::AMOUNT_PLACES),
        reward: format_units(quote.reward_amount, TokenKind::Reward.decimals(), display::AMOUNT_PLACES),
    });
    Ok(quote)
}

// ============ Staking Actions ============

/// Invest `amount` stablecoin units, crediting `referrer` (blank for the default)
pub async fn invest<P: Provider>(ctx: &AppContext<P>, amount: &str, referrer: &str) -> ActionOutcome {
    let action = ActionKind::Invest;
    let control = ctx.controls.for_action(action);
    if !control.is_enabled() {
        return ignored(ctx, action);
    }

    let run = ActionRun::start(ctx, action);
    let parsed = parse_stake_amount(amount).and_then(|gross| {
        let referrer = parse_optional_address(referrer)?.unwrap_or(ctx.config.default_referrer);
        Ok((gross, referrer))
    });
    let (gross, referrer) = match parsed {
        Ok(values) => values,
        Err(err) => return run.fail(err),
    };

    let Some(_guard) = control.try_acquire() else {
        return ignored(ctx, action);
    };
    ctx.emit(GoldEvent::QuoteCleared);

    run_staked(&run, gross, ActionRequest::Invest { amount: gross, referrer }).await
}

/// Reinvest `amount` stablecoin units into the existing position
pub async fn reinvest<P: Provider>(ctx: &AppContext<P>, amount: &str) -> ActionOutcome {
    let action = ActionKind::Reinvest;
    let control = ctx.controls.for_action(action);
    if !control.is_enabled() {
        return ignored(ctx, action);
    }

    let run = ActionRun::start(ctx, action);
    let gross = match parse_stake_amount(amount) {
        Ok(gross) => gross,
        Err(err) => return run.fail(err),
    };

    let Some(_guard) = control.try_acquire() else {
        return ignored(ctx, action);
    };
    ctx.emit(GoldEvent::QuoteCleared);

    run_staked(&run, gross, ActionRequest::Reinvest { amount: gross }).await
}

/// Quote, gate, then submit
async fn run_staked<P: Provider>(run: &ActionRun<'_, P>, gross: U256, request: ActionRequest) -> ActionOutcome {
    let ctx = run.ctx;
    let contracts = &ctx.contracts;

    run.advance(ActionState::Quoting);
    let quote = match fetch_quote(&contracts.stake, &contracts.data, gross).await {
        Ok(quote) => quote,
        Err(err) => return run.fail(err),
    };

    run.advance(ActionState::AllowanceCheck);
    let gate = AllowanceGate::new(
        &contracts.stable_token,
        &contracts.reward_token,
        ctx.account,
        ctx.config.spender,
        ctx.config.gas.for_action(ActionKind::Approve),
    );
    let plan = match gate.inspect(&quote).await {
        Ok(plan) => plan,
        Err(err) => return run.fail(err),
    };

    if !plan.is_ready() {
        run.advance(ActionState::Approving);
        for pending in &plan.pending {
            ctx.emit(GoldEvent::ApprovalSubmitted {
                token: pending.token,
                amount: pending.amount,
            });
        }

        match gate.approve(&plan).await {
            Ok(approvals) => {
                for approval in approvals {
                    ctx.emit(GoldEvent::ApprovalConfirmed {
                        token: approval.token,
                        tx_hash: approval.receipt.tx_hash,
                    });
                }
            }
            Err(err) => return run.fail(err),
        }
    }

    submit(run, request).await
}

// ============ Direct Actions ============

/// Withdraw `amount` stablecoin units
pub async fn withdraw<P: Provider>(ctx: &AppContext<P>, amount: &str) -> ActionOutcome {
    direct_action(ctx, ActionKind::Withdraw, || {
        parse_stake_amount(amount).map(|amount| ActionRequest::Withdraw { amount })
    })
    .await
}

/// Admin: set the backdated time (unix seconds)
pub async fn set_back_time<P: Provider>(ctx: &AppContext<P>, time: &str) -> ActionOutcome {
    direct_action(ctx, ActionKind::SetBackTime, || {
        parse_timestamp(time).map(|time| ActionRequest::SetBackTime { time })
    })
    .await
}

/// Admin: grant `grantee` access to the data contract
pub async fn allow_access<P: Provider>(ctx: &AppContext<P>, grantee: &str) -> ActionOutcome {
    direct_action(ctx, ActionKind::AllowAccess, || {
        parse_required_address(grantee).map(|grantee| ActionRequest::AllowAccess { grantee })
    })
    .await
}

async fn direct_action<P: Provider>(
    ctx: &AppContext<P>,
    action: ActionKind,
    validate: impl FnOnce() -> GoldResult<ActionRequest>,
) -> ActionOutcome {
    let control = ctx.controls.for_action(action);
    if !control.is_enabled() {
        return ignored(ctx, action);
    }

    let run = ActionRun::start(ctx, action);
    let request = match validate() {
        Ok(request) => request,
        Err(err) => return run.fail(err),
    };

    let Some(_guard) = control.try_acquire() else {
        return ignored(ctx, action);
    };

    submit(&run, request).await
}

async fn submit<P: Provider>(run: &ActionRun<'_, P>, request: ActionRequest) -> ActionOutcome {
    let ctx = run.ctx;
    let submitter = ActionSubmitter::new(&ctx.contracts.stake, &ctx.contracts.data, ctx.account, ctx.config.gas);

    run.advance(ActionState::Submitting);
    ctx.emit(GoldEvent::TransactionSubmitted {
        action: run.action,
        gas: submitter.gas_for(&request),
    });

    let receipt = match submitter.submit(request).await {
        Ok(receipt) => receipt,
        Err(err) => return run.fail(err),
    };

    run.advance(ActionState::Confirmed);
    ctx.emit(GoldEvent::SubmissionConfirmed {
        action: run.action,
        tx_hash: receipt.tx_hash,
    });

    // a failed re-read keeps what is already shown
    let _ = refresh_positions(ctx).await;

    run.advance(ActionState::Idle);
    ActionOutcome::Confirmed(receipt)
}

// ============ Position Refresh ============

/// Re-read positions and withdrawal eligibility for the connected account
pub async fn refresh_positions<P: Provider>(ctx: &AppContext<P>) -> GoldResult<PositionSnapshot> {
    let account = ctx.account;
    match load_positions(&ctx.contracts.data, account).await {
        Ok(snapshot) => {
            ctx.emit(GoldEvent::PositionsRefreshed {
                account,
                history_len: snapshot.history.len(),
            });
            ctx.store_positions(snapshot.clone());
            Ok(snapshot)
        }
        Err(err) => {
            ctx.emit(GoldEvent::RefreshFailed {
                account,
                reason: err.to_string(),
            });
            Err(err)
        }
    }
}
