//! Client Constants
//!
//! Token metadata, scaling factors and the default values every
//! [`ClientConfig`](crate::config::ClientConfig) field falls back to.

/// Stablecoin (USDT) metadata
pub mod stable_token {
    /// Token symbol
    pub const SYMBOL: &str = "USDT";
    /// Decimal places of the on-chain integer unit
    pub const DECIMALS: u8 = 6;
}

/// Reward token (HJL) metadata
pub mod reward_token {
    /// Token symbol
    pub const SYMBOL: &str = "HJL";
    /// Decimal places of the on-chain integer unit
    pub const DECIMALS: u8 = 18;
}

/// Precision constants used by the quote math
pub mod precision {
    /// Proportions are whole percentages
    pub const PERCENT_DENOMINATOR: u64 = 100;

    /// Rescales a stablecoin-unit value into reward-token units (18 - 6 = 12)
    pub const DECIMALS_GAP_FACTOR: u64 = 1_000_000_000_000;

    /// Oracle prices are fixed-point with two decimals (100 = 1.00)
    pub const PRICE_DECIMALS: u8 = 2;
}

/// Gas budgets (overridable through config)
pub mod gas {
    /// Approvals and simple setters
    pub const STANDARD_LIMIT: u64 = 100_000;

    /// invest / reinvest / withdraw, which do the heavy on-chain accounting
    pub const HEAVY_LIMIT: u64 = 500_000;
}

/// Display formatting
pub mod display {
    /// Places used for quote previews, prices and position amounts
    pub const AMOUNT_PLACES: usize = 2;

    /// Places used for per-token consumption in history rows
    pub const CONSUMED_PLACES: usize = 3;

    /// Position start time, UTC (`Y-m-d h:i`)
    pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
}

/// Connection and artifact defaults
pub mod network {
    /// Fallback JSON-RPC endpoint when no wallet is injected
    pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:7545";

    /// Directory holding the Truffle build artifacts
    pub const DEFAULT_ARTIFACTS_DIR: &str = "build/contracts";

    /// Stake contract artifact
    pub const STAKE_ARTIFACT: &str = "Gold.json";

    /// Data/oracle contract artifact
    pub const DATA_ARTIFACT: &str = "GoldData.json";

    /// Reward token artifact
    pub const REWARD_TOKEN_ARTIFACT: &str = "CompassCpcToken.json";

    /// Stablecoin artifact
    pub const STABLE_TOKEN_ARTIFACT: &str = "Usdt.json";

    /// Spender the tokens are approved to
    pub const DEFAULT_SPENDER: &str = "0x6F18cED823e527a229546ccCe72701D0bD082705";

    /// Referrer used when the investor leaves the field empty
    pub const DEFAULT_REFERRER: &str = "0x0913249bE694F0681aBcaa972DC8Cec03814f20b";

    /// Backend path returning the bonus figures
    pub const BONUS_PATH: &str = "/index.php/DmsUser/Public/getTotalBonus";

    /// HTTP request timeout for the fallback endpoint and the backend
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
}

/// Receipt polling
pub mod polling {
    /// Milliseconds between `eth_getTransactionReceipt` polls
    pub const RECEIPT_INTERVAL_MS: u64 = 1_000;

    /// Polls before a pending transaction is reported as timed out
    pub const RECEIPT_MAX_ATTEMPTS: u32 = 120;
}
