//! goldmine - command line front end
//!
//! ```text
//! goldmine [--config <file>] <command> [args]
//!
//!   status                       account, positions, withdrawable amount
//!   price                        reward token price
//!   quote <amount>               split preview for a stake
//!   invest <amount> [referrer]   invest, referrer may be an invite link query
//!   reinvest <amount>
//!   withdraw <amount>
//!   set-back-time <unix-seconds> admin
//!   allow-access <address>       admin
//!   bonus                        backend bonus and button visibility
//! ```
//!
//! The fallback JSON-RPC endpoint signs with the node's unlocked account.

use std::env;
use std::fs;
use std::process::ExitCode;

use futures::executor::block_on;

use goldmine_app::{
    bonus::fetch_bonus,
    handlers::{self, ActionOutcome},
    referral::referrer_input,
    rpc::JsonRpcProvider,
    start,
    transport::HttpTransport,
    Client,
};
use goldmine_common::{
    config::ClientConfig,
    errors::{GoldError, GoldResult},
};
use goldmine_data_oracle::reward_price_for_display;

/// No wallet is injected on the command line
type NoWallet = JsonRpcProvider<HttpTransport>;

fn load_config(path: Option<&str>) -> GoldResult<ClientConfig> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|_| GoldError::InvalidConfig {
                param: "config",
                reason: "cannot read config file",
            })?;
            ClientConfig::from_json(&text)
        }
        None => Ok(ClientConfig::default()),
    }
}

fn print_events(ctx: &Client<NoWallet>) {
    for event in ctx.drain_events() {
        if event.is_signal() {
            println!("{:?}", event);
        } else {
            eprintln!("[{:?}] {:?}", event.event_type(), event);
        }
    }
}

fn print_status(ctx: &Client<NoWallet>) {
    println!("account: {}", ctx.account);
    let Some(snapshot) = ctx.positions() else {
        return;
    };
    println!("withdrawable: {}", snapshot.withdrawable_display());
    println!("reward held: {}", snapshot.reward_held_display());
    for row in snapshot.rows() {
        println!(
            "{}  consumed USDT {}  consumed HJL {}  since {}",
            row.amount,
            row.dynamic,
            row.withdrawn,
            row.start_time_display()
        );
    }
}

fn usage() -> ExitCode {
    eprintln!("usage: goldmine [--config <file>] <status|price|quote|invest|reinvest|withdraw|set-back-time|allow-access|bonus> [args]");
    ExitCode::from(2)
}

fn run(ctx: &Client<NoWallet>, command: &str, args: &[String]) -> GoldResult<Option<ActionOutcome>> {
    let arg = |i: usize| args.get(i).map(String::as_str).unwrap_or_default();

    let outcome = match command {
        "status" => {
            print_status(ctx);
            return Ok(None);
        }
        "price" => {
            println!("HJL price: {}", block_on(reward_price_for_display(&ctx.contracts.data))?);
            return Ok(None);
        }
        "quote" => {
            block_on(handlers::preview_quote(ctx, arg(0)))?;
            return Ok(None);
        }
        "bonus" => {
            let origin = ctx.config.backend_origin.as_deref().ok_or(GoldError::InvalidConfig {
                param: "backend_origin",
                reason: "not configured",
            })?;
            let status = fetch_bonus(&HttpTransport::default(), origin, ctx.account)?;
            println!(
                "bonus: {}  invest: {}  reinvest: {}",
                status.sum_bonus, status.visibility.invest, status.visibility.reinvest
            );
            return Ok(None);
        }
        "invest" => block_on(handlers::invest(ctx, arg(0), &referrer_input(arg(1)))),
        "reinvest" => block_on(handlers::reinvest(ctx, arg(0))),
        "withdraw" => block_on(handlers::withdraw(ctx, arg(0))),
        "set-back-time" => block_on(handlers::set_back_time(ctx, arg(0))),
        "allow-access" => block_on(handlers::allow_access(ctx, arg(0))),
        _ => return Err(GoldError::InvalidConfig { param: "command", reason: "unknown command" }),
    };
    Ok(Some(outcome))
}

fn main() -> ExitCode {
    let mut args: Vec<String> = env::args().skip(1).collect();

    let config_path = match args.iter().position(|a| a == "--config") {
        Some(i) if i + 1 < args.len() => {
            let path = args.remove(i + 1);
            args.remove(i);
            Some(path)
        }
        Some(_) => return usage(),
        None => None,
    };
    if args.is_empty() {
        return usage();
    }
    let command = args.remove(0);

    let config = match load_config(config_path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{} ({})", err, err.code());
            return ExitCode::FAILURE;
        }
    };

    let ctx = match block_on(start::<NoWallet>(None, config)) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("{} ({})", err, err.code());
            return ExitCode::FAILURE;
        }
    };

    let result = run(&ctx, &command, &args);
    print_events(&ctx);

    match result {
        Ok(None) | Ok(Some(ActionOutcome::Confirmed(_))) => ExitCode::SUCCESS,
        Ok(Some(ActionOutcome::Ignored)) => ExitCode::SUCCESS,
        Ok(Some(ActionOutcome::Rejected(err))) | Err(err) => {
            eprintln!("{} ({})", err, err.code());
            ExitCode::FAILURE
        }
    }
}

