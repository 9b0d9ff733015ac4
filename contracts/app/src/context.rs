//! Application Context
//!
//! Built once at startup and passed to every handler: configuration, the
//! connected account, bound contracts, the event log, and one exclusion
//! lock per UI control.

use std::cell::{Cell, RefCell};

use goldmine_common::{
    config::ClientConfig,
    events::{EventLog, GoldEvent},
    types::{ActionKind, Address},
};
use goldmine_data_oracle::positions::PositionSnapshot;

use crate::registry::ContractRegistry;

// ============ Controls ============

/// One UI control; disabled while its action runs
#[derive(Debug)]
pub struct Control {
    enabled: Cell<bool>,
}

impl Default for Control {
    fn default() -> Self {
        Self { enabled: Cell::new(true) }
    }
}

impl Control {
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Disable the control; `None` if it already is
    pub fn try_acquire(&self) -> Option<ControlGuard<'_>> {
        if !self.enabled.replace(false) {
            return None;
        }
        Some(ControlGuard { control: self })
    }
}

/// Re-enables its control when dropped
#[derive(Debug)]
pub struct ControlGuard<'a> {
    control: &'a Control,
}

impl Drop for ControlGuard<'_> {
    fn drop(&mut self) {
        self.control.enabled.set(true);
    }
}

/// Controls of the mining page
#[derive(Debug, Default)]
pub struct Controls {
    pub invest: Control,
    pub reinvest: Control,
    pub withdraw: Control,
    pub back_time: Control,
    pub allow_access: Control,
}

impl Controls {
    /// Control that triggers `action`
    ///
    /// Approvals have no control of their own; they run under the control
    /// of the action that needs them, so they map to `invest`.
    pub fn for_action(&self, action: ActionKind) -> &Control {
        match action {
            ActionKind::Invest | ActionKind::Approve => &self.invest,
            ActionKind::Reinvest => &self.reinvest,
            ActionKind::Withdraw => &self.withdraw,
            ActionKind::SetBackTime => &self.back_time,
            ActionKind::AllowAccess => &self.allow_access,
        }
    }
}

// ============ Context ============

/// Everything a handler needs
pub struct AppContext<P> {
    pub config: ClientConfig,
    pub account: Address,
    pub contracts: ContractRegistry<P>,
    pub controls: Controls,
    events: RefCell<EventLog>,
    positions: RefCell<Option<PositionSnapshot>>,
}

impl<P> AppContext<P> {
    pub fn new(config: ClientConfig, account: Address, contracts: ContractRegistry<P>) -> Self {
        Self {
            config,
            account,
            contracts,
            controls: Controls::default(),
            events: RefCell::new(EventLog::new()),
            positions: RefCell::new(None),
        }
    }

    /// Start from a log that already holds connection events
    pub fn with_events(mut self, events: EventLog) -> Self {
        self.events = RefCell::new(events);
        self
    }

    pub fn emit(&self, event: GoldEvent) {
        self.events.borrow_mut().emit(event);
    }

    /// Take every event collected so far
    pub fn drain_events(&self) -> Vec<GoldEvent> {
        self.events.borrow_mut().drain()
    }

    /// Copy of the collected events, leaving the log intact
    pub fn events(&self) -> Vec<GoldEvent> {
        self.events.borrow().events().to_vec()
    }

    /// Last successfully loaded positions
    pub fn positions(&self) -> Option<PositionSnapshot> {
        self.positions.borrow().clone()
    }

    pub(crate) fn store_positions(&self, snapshot: PositionSnapshot) {
        *self.positions.borrow_mut() = Some(snapshot);
    }
}
