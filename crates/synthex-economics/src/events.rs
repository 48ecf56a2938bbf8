// crates/synthex-economics/src/events.rs
//
// Events emitted by `SynthSystem` operations, in commit order.

use serde::{Deserialize, Serialize};
use synthex_core::decimal::{as_units, Amount};
use synthex_core::{Address, CurrencyKey, SynthError};

/// A committed state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SynthEvent {
    RatesUpdated {
        currencies: Vec<CurrencyKey>,
        timestamp: u64,
    },
    InverseFrozen {
        currency: CurrencyKey,
        #[serde(with = "as_units")]
        rate: Amount,
    },
    Issued {
        participant: Address,
        currency: CurrencyKey,
        #[serde(with = "as_units")]
        amount: Amount,
    },
    Burned {
        participant: Address,
        currency: CurrencyKey,
        #[serde(with = "as_units")]
        amount: Amount,
    },
    Exchange {
        participant: Address,
        from: CurrencyKey,
        #[serde(with = "as_units")]
        from_amount: Amount,
        to: CurrencyKey,
        #[serde(with = "as_units")]
        to_amount: Amount,
        destination: Address,
    },
    /// Source amount burned while the protection circuit was on.
    ExchangeReclaimed {
        participant: Address,
        currency: CurrencyKey,
        #[serde(with = "as_units")]
        amount: Amount,
    },
    /// Exchange fee credited to the fee address, in the settlement currency.
    FeeAccrued {
        currency: CurrencyKey,
        #[serde(with = "as_units")]
        amount: Amount,
    },
    SupplyMinted {
        #[serde(with = "as_units")]
        supply: Amount,
        minter: Address,
        #[serde(with = "as_units")]
        minter_reward: Amount,
        week_counter: u64,
        timestamp: u64,
    },
    CollateralTransferred {
        from: Address,
        to: Address,
        #[serde(with = "as_units")]
        amount: Amount,
    },
    CurrencyRegistered {
        currency: CurrencyKey,
        token: Address,
    },
    CurrencyRemoved {
        currency: CurrencyKey,
    },
    CurrencyEnabled {
        currency: CurrencyKey,
        enabled: bool,
    },
    ProtectionCircuit {
        enabled: bool,
    },
}

/// Render events as a pretty-printed JSON array.
pub fn to_json(events: &[SynthEvent]) -> Result<String, SynthError> {
    Ok(serde_json::to_string_pretty(events)?)
}
