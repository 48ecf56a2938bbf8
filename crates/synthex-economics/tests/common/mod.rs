// crates/synthex-economics/tests/common/mod.rs
//
// Shared fixtures for the synthex-economics integration tests.

#![allow(dead_code)]

use synthex_core::{Address, Amount, CurrencyKey, Roles, UNIT};
use synthex_economics::{SynthSystem, SystemConfig};

/// Clock value every fixture starts at.
pub const T0: u64 = 1_600_000_000;

/// Collateral given to each of alice and bob.
pub const STARTING_COLLATERAL: Amount = 100_000 * UNIT;

pub fn key(symbol: &str) -> CurrencyKey {
    CurrencyKey::new(symbol).unwrap()
}

pub fn owner() -> Address {
    Address::from_label("owner")
}

pub fn oracle() -> Address {
    Address::from_label("oracle")
}

pub fn gas_oracle() -> Address {
    Address::from_label("gas-oracle")
}

pub fn alice() -> Address {
    Address::from_label("alice")
}

pub fn bob() -> Address {
    Address::from_label("bob")
}

pub fn carol() -> Address {
    Address::from_label("carol")
}

pub fn roles() -> Roles {
    Roles {
        owner: owner(),
        oracle: oracle(),
        priority_fee_oracle: gas_oracle(),
    }
}

/// Prices at the start of every fixture. iBTC is inverse around 4000, so a
/// 5000 price gives it a rate of 3000.
pub fn starting_prices() -> Vec<(&'static str, Amount)> {
    vec![
        ("SNX", UNIT / 10),
        ("XDR", UNIT),
        ("sAUD", UNIT / 2),
        ("sEUR", 5 * UNIT / 4),
        ("sBTC", 5000 * UNIT),
        ("iBTC", 5000 * UNIT),
    ]
}

/// Submit `prices` at the current clock value.
pub fn push_prices(sys: &mut SynthSystem, prices: &[(&str, Amount)]) {
    let keys: Vec<CurrencyKey> = prices.iter().map(|(symbol, _)| key(symbol)).collect();
    let values: Vec<Amount> = prices.iter().map(|(_, price)| *price).collect();
    let now = sys.now();
    sys.update_rates(&oracle(), &keys, &values, now).unwrap();
}

/// Move the clock forward by `seconds`.
pub fn advance(sys: &mut SynthSystem, seconds: u64) {
    let now = sys.now();
    sys.set_time(now + seconds).unwrap();
}

/// A system with sAUD, sEUR, sBTC, and iBTC registered, all rates fresh, and
/// alice and bob holding `STARTING_COLLATERAL` each.
pub fn setup() -> SynthSystem {
    let mut sys = SynthSystem::builder(SystemConfig::default(), roles())
        .time(T0)
        .build()
        .unwrap();
    for symbol in ["sAUD", "sEUR", "sBTC", "iBTC"] {
        sys.register_currency(&owner(), key(symbol), Address::from_label(symbol))
            .unwrap();
    }
    sys.set_inverse_pricing(
        &owner(),
        key("iBTC"),
        4000 * UNIT,
        6500 * UNIT,
        1000 * UNIT,
        false,
        false,
    )
    .unwrap();
    push_prices(&mut sys, &starting_prices());
    for who in [alice(), bob()] {
        sys.transfer_collateral(&owner(), &who, STARTING_COLLATERAL)
            .unwrap();
    }
    sys.drain_events();
    sys
}
