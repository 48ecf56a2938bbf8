// crates/synthex-economics/src/config.rs
//
// Process-wide protocol configuration.
//
// Every field has a default, so a configuration file only needs to name the
// values it overrides. Amounts are written as decimal strings ("0.2").

use serde::{Deserialize, Serialize};
use synthex_core::decimal::{as_units, Amount, UNIT};
use synthex_core::{CurrencyKey, SynthError};

use crate::exchange::MAX_EXCHANGE_FEE_RATE;
use crate::issuance::MAX_ISSUANCE_RATIO;
use crate::oracle::DEFAULT_STALE_PERIOD;
use crate::supply::{INFLATION_START_DATE, MAX_MINTER_REWARD};

/// Runtime configuration for a `SynthSystem`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Internal accounting currency. Fixed rate of 1, never stale.
    #[serde(default = "default_base_currency")]
    pub base_currency: CurrencyKey,

    /// Currency exchange fees are settled in. Cannot be removed.
    #[serde(default = "default_settlement_currency")]
    pub settlement_currency: CurrencyKey,

    /// Price key of the collateral asset.
    #[serde(default = "default_collateral_currency")]
    pub collateral_currency: CurrencyKey,

    /// Maximum age of a rate, in seconds, before it is stale.
    #[serde(default = "default_stale_period")]
    pub stale_period_secs: u64,

    /// Fraction of collateral value that may be issued as debt.
    #[serde(default = "default_issuance_ratio", with = "as_units")]
    pub issuance_ratio: Amount,

    /// Base exchange fee rate, before swing-trade doubling.
    #[serde(default = "default_exchange_fee_rate", with = "as_units")]
    pub exchange_fee_rate: Amount,

    /// Remaining debt at or below this value clears the ownership record.
    #[serde(default, with = "as_units")]
    pub negligible_debt: Amount,

    /// Collateral supply credited to the genesis account.
    #[serde(default = "default_initial_collateral_supply", with = "as_units")]
    pub initial_collateral_supply: Amount,

    /// Unix timestamp of week 0 of the supply schedule.
    #[serde(default = "default_inflation_start")]
    pub inflation_start: u64,

    /// Collateral paid to whoever triggers a mint.
    #[serde(default = "default_minter_reward", with = "as_units")]
    pub minter_reward: Amount,

    #[serde(default = "default_true")]
    pub exchange_enabled: bool,

    #[serde(default = "default_true")]
    pub issuance_enabled: bool,
}

fn default_base_currency() -> CurrencyKey {
    CurrencyKey::new("sUSD").unwrap_or_else(|_| unreachable!("static symbol"))
}

fn default_settlement_currency() -> CurrencyKey {
    CurrencyKey::new("XDR").unwrap_or_else(|_| unreachable!("static symbol"))
}

fn default_collateral_currency() -> CurrencyKey {
    CurrencyKey::new("SNX").unwrap_or_else(|_| unreachable!("static symbol"))
}

fn default_stale_period() -> u64 {
    DEFAULT_STALE_PERIOD
}

fn default_issuance_ratio() -> Amount {
    UNIT / 5
}

fn default_exchange_fee_rate() -> Amount {
    3 * UNIT / 1000
}

fn default_initial_collateral_supply() -> Amount {
    100_000_000 * UNIT
}

fn default_inflation_start() -> u64 {
    INFLATION_START_DATE
}

fn default_minter_reward() -> Amount {
    MAX_MINTER_REWARD
}

fn default_true() -> bool {
    true
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            base_currency: default_base_currency(),
            settlement_currency: default_settlement_currency(),
            collateral_currency: default_collateral_currency(),
            stale_period_secs: default_stale_period(),
            issuance_ratio: default_issuance_ratio(),
            exchange_fee_rate: default_exchange_fee_rate(),
            negligible_debt: 0,
            initial_collateral_supply: default_initial_collateral_supply(),
            inflation_start: default_inflation_start(),
            minter_reward: default_minter_reward(),
            exchange_enabled: true,
            issuance_enabled: true,
        }
    }
}

impl SystemConfig {
    /// Check cross-field constraints.
    ///
    /// # Errors
    /// Returns `SynthError::Config` describing the first violated constraint.
    pub fn validate(&self) -> Result<(), SynthError> {
        if self.base_currency == self.settlement_currency
            || self.base_currency == self.collateral_currency
            || self.settlement_currency == self.collateral_currency
        {
            return Err(SynthError::Config(
                "base, settlement, and collateral currencies must be distinct".to_string(),
            ));
        }
        if self.stale_period_secs == 0 {
            return Err(SynthError::Config("stale period must be non-zero".to_string()));
        }
        if self.issuance_ratio > MAX_ISSUANCE_RATIO {
            return Err(SynthError::Config(format!(
                "issuance ratio {} exceeds the maximum {}",
                self.issuance_ratio, MAX_ISSUANCE_RATIO
            )));
        }
        if self.exchange_fee_rate > MAX_EXCHANGE_FEE_RATE {
            return Err(SynthError::Config(format!(
                "exchange fee rate {} exceeds the maximum {}",
                self.exchange_fee_rate, MAX_EXCHANGE_FEE_RATE
            )));
        }
        if self.minter_reward > MAX_MINTER_REWARD {
            return Err(SynthError::Config(format!(
                "minter reward {} exceeds the maximum {}",
                self.minter_reward, MAX_MINTER_REWARD
            )));
        }
        Ok(())
    }
}
