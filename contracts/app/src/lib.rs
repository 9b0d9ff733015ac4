//! goldmine Client Application
//!
//! Wires the typed contract clients into a running client:
//!
//! ```text
//! connector -> registry -> context -> handlers (quote -> gate -> submit) -> events
//! ```
//!
//! ## Modules
//!
//! - **connector**: injected wallet or JSON-RPC fallback, startup probe
//! - **registry**: Truffle artifacts, method checks, address resolution
//! - **context**: state shared by handlers and the per-control locks
//! - **handlers**: one async handler per UI control
//! - **bonus** / **referral**: backend bonus read and invite-link parsing

pub mod bonus;
pub mod connector;
pub mod context;
pub mod handlers;
pub mod referral;
pub mod registry;
pub mod rpc;
pub mod transport;


use std::rc::Rc;

use goldmine_common::{config::ClientConfig, errors::GoldResult, events::EventLog, provider::Provider};

use connector::{connect, select_provider, ActiveProvider};
use context::AppContext;
use registry::ContractRegistry;

/// Context over whichever provider [`start`] selected
pub type Client<I> = AppContext<Rc<ActiveProvider<I>>>;

/// Connect, load contracts and read the initial positions
///
/// Connection and artifact failures are returned; a failed first position
/// read is only recorded as an event.
pub async fn start<I: Provider>(injected: Option<I>, config: ClientConfig) -> GoldResult<Client<I>> {
    config.validate()?;

    let provider = Rc::new(select_provider(injected, &config));
    let mut events = EventLog::new();
    let connection = connect(
        &provider,
        provider.is_injected(),
        config.network_id.as_deref(),
        &mut events,
    )
    .await?;

    let contracts = ContractRegistry::load(provider, &config, &connection.network_id)?;
    let ctx = AppContext::new(config, connection.account, contracts).with_events(events);

    let _ = handlers::refresh_positions(&ctx).await;
    Ok(ctx)
}
