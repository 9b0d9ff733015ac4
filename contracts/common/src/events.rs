//! Client Events
//!
//! Handlers never touch the UI directly. They emit [`GoldEvent`]s into an
//! [`EventLog`]; the view layer drains the log and renders what it needs.
//! Diagnostic events (state transitions, gas price, failure reasons) share
//! the same log so one drain gives the full trace of an action.

use crate::bn::U256;
use crate::types::{ActionKind, ActionState, Address, TokenKind, TxHash};

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EventType {
    // UI Signals (0x01 - 0x1F)
    QuoteDisplayed = 0x01,
    QuoteCleared = 0x02,
    ValidationFailed = 0x03,
    InsufficientBalance = 0x04,
    SubmissionFailed = 0x05,
    SubmissionConfirmed = 0x06,
    ActionIgnored = 0x07,

    // Connection Events (0x20 - 0x3F)
    Connected = 0x20,
    GasPriceObserved = 0x21,

    // Action Lifecycle Events (0x40 - 0x5F)
    StateChanged = 0x40,
    ApprovalSubmitted = 0x41,
    ApprovalConfirmed = 0x42,
    TransactionSubmitted = 0x43,

    // Position Events (0x60 - 0x7F)
    PositionsRefreshed = 0x60,
    RefreshFailed = 0x61,
}

/// Main event enum containing all client events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoldEvent {
    // ============ UI Signals ============

    /// Quote preview, both amounts in user units
    QuoteDisplayed { stable: String, reward: String },

    /// Quote preview reset to zero once an action starts
    QuoteCleared,

    /// Input rejected before any contract access
    ValidationFailed { action: ActionKind, code: &'static str },

    /// Balance below the quoted requirement
    InsufficientBalance { action: ActionKind, token: TokenKind },

    /// Approval or main transaction failed; the control is enabled again
    SubmissionFailed { action: ActionKind, code: &'static str, reason: String },

    /// Main transaction mined successfully
    SubmissionConfirmed { action: ActionKind, tx_hash: TxHash },

    /// Click arrived while the control was disabled
    ActionIgnored { action: ActionKind },

    // ============ Connection Events ============

    /// Provider and account selected
    Connected { account: Address, network_id: String, injected: bool },

    /// Gas price reported by the provider at startup
    GasPriceObserved { wei: U256 },

    // ============ Action Lifecycle Events ============

    /// Action state machine moved
    StateChanged { action: ActionKind, from: ActionState, to: ActionState },

    /// Approval sent for exactly the required amount
    ApprovalSubmitted { token: TokenKind, amount: U256 },

    /// Approval mined
    ApprovalConfirmed { token: TokenKind, tx_hash: TxHash },

    /// Main transaction handed to the wallet
    TransactionSubmitted { action: ActionKind, gas: u64 },

    // ============ Position Events ============

    /// Position data re-read after a confirmed action
    PositionsRefreshed { account: Address, history_len: usize },

    /// The re-read failed; earlier rendered state is kept
    RefreshFailed { account: Address, reason: String },
}

impl GoldEvent {
    /// Get the event type
    pub fn event_type(&self) -> EventType {
        match self {
            Self::QuoteDisplayed { .. } => EventType::QuoteDisplayed,
            Self::QuoteCleared => EventType::QuoteCleared,
            Self::ValidationFailed { .. } => EventType::ValidationFailed,
            Self::InsufficientBalance { .. } => EventType::InsufficientBalance,
            Self::SubmissionFailed { .. } => EventType::SubmissionFailed,
            Self::SubmissionConfirmed { .. } => EventType::SubmissionConfirmed,
            Self::ActionIgnored { .. } => EventType::ActionIgnored,
            Self::Connected { .. } => EventType::Connected,
            Self::GasPriceObserved { .. } => EventType::GasPriceObserved,
            Self::StateChanged { .. } => EventType::StateChanged,
            Self::ApprovalSubmitted { .. } => EventType::ApprovalSubmitted,
            Self::ApprovalConfirmed { .. } => EventType::ApprovalConfirmed,
            Self::TransactionSubmitted { .. } => EventType::TransactionSubmitted,
            Self::PositionsRefreshed { .. } => EventType::PositionsRefreshed,
            Self::RefreshFailed { .. } => EventType::RefreshFailed,
        }
    }

    /// Returns true for events the UI layer reacts to
    pub fn is_signal(&self) -> bool {
        (self.event_type() as u8) < 0x20
    }
}

/// Event log for collecting events during an action
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<GoldEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: GoldEvent) {
        self.events.push(event);
    }

    /// Get all events
    pub fn events(&self) -> &[GoldEvent] {
        &self.events
    }

    /// Take every event, leaving the log empty
    pub fn drain(&mut self) -> Vec<GoldEvent> {
        core::mem::take(&mut self.events)
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&GoldEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Only the UI signals
    pub fn signals(&self) -> Vec<&GoldEvent> {
        self.events.iter().filter(|e| e.is_signal()).collect()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
