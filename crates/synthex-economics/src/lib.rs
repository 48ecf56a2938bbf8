// crates/synthex-economics/src/lib.rs
//
// synthex-economics: debt-share ledger, price oracle adapter, exchange
// engine, issuance controller, and supply schedule for the Synthex protocol.
//
// All amounts and rates are 18-decimal fixed point (see synthex_core::decimal).
// `SynthSystem` owns every piece of state and is the single entry point for
// the host; the other modules hold the components it composes.

pub mod config;
pub mod debt_ledger;
pub mod escrow;
pub mod events;
pub mod exchange;
pub mod fee_pool;
pub mod issuance;
pub mod oracle;
pub mod registry;
pub mod rewards;
pub mod supply;
pub mod system;
pub mod token;

// Re-export key types for ergonomic access from downstream crates.
pub use config::SystemConfig;
pub use debt_ledger::{DebtChange, DebtLedger, IssuanceRecord};
pub use escrow::EscrowBook;
pub use events::SynthEvent;
pub use exchange::{fee_multiplier, ExchangeQuote, ExchangeSettings, MAX_EXCHANGE_FEE_RATE};
pub use fee_pool::FeePool;
pub use issuance::{IssuanceSettings, MAX_ISSUANCE_RATIO};
pub use oracle::{
    FeeTag, InversePricing, PriceFeed, PricingKind, RateSnapshot, RateTable,
    DEFAULT_STALE_PERIOD, ORACLE_FUTURE_LIMIT,
};
pub use registry::{CurrencyRegistry, SynthEntry};
pub use rewards::{RewardRecipient, RewardsDistribution};
pub use supply::{SupplySchedule, INFLATION_START_DATE, MAX_MINTER_REWARD, WEEK};
pub use system::{SynthSystem, SynthSystemBuilder};
pub use token::TokenBook;
