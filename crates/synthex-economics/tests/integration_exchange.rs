// crates/synthex-economics/tests/integration_exchange.rs
//
// Exchanges between synths: pricing, fees, inverse currencies, and the
// switches that gate the exchange path.

mod common;

use common::*;
use synthex_core::{FeeSink, SynthError, UNIT};
use synthex_economics::{SynthEvent, SynthSystem, DEFAULT_STALE_PERIOD};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `setup()` with alice holding 1000 sUSD of debt.
fn funded() -> SynthSystem {
    let mut sys = setup();
    sys.issue(&alice(), &key("sUSD"), 1000 * UNIT).unwrap();
    sys.drain_events();
    sys
}

// ---------------------------------------------------------------------------
// Standard exchanges
// ---------------------------------------------------------------------------

#[test]
fn test_exchange_charges_fee_in_settlement_currency() {
    let mut sys = funded();
    let received = sys
        .exchange(&alice(), &key("sUSD"), 100 * UNIT, &key("sAUD"), 0)
        .unwrap();

    assert_eq!(received, 1994 * UNIT / 10);
    assert_eq!(sys.synth_balance(&key("sUSD"), &alice()).unwrap(), 900 * UNIT);
    assert_eq!(sys.synth_balance(&key("sAUD"), &alice()).unwrap(), 1994 * UNIT / 10);
    assert_eq!(sys.fee_pool().fees_to_distribute(), 3 * UNIT / 10);
    assert_eq!(sys.total_issued_value(&key("XDR")).unwrap(), 9997 * UNIT / 10);

    // No synth is minted for the fee: total debt drops by its value.
    assert_eq!(sys.total_system_debt().unwrap(), 9997 * UNIT / 10);
    assert_eq!(sys.debt_balance_of(&alice(), &key("sUSD")).unwrap(), 9997 * UNIT / 10);

    let events = sys.drain_events();
    assert_eq!(
        events,
        vec![
            SynthEvent::FeeAccrued {
                currency: key("XDR"),
                amount: 3 * UNIT / 10,
            },
            SynthEvent::Exchange {
                participant: alice(),
                from: key("sUSD"),
                from_amount: 100 * UNIT,
                to: key("sAUD"),
                to_amount: 1994 * UNIT / 10,
                destination: alice(),
            },
        ]
    );
}

#[test]
fn test_quotes_match_execution() {
    let mut sys = funded();
    let from = key("sUSD");
    let to = key("sEUR");
    let received = sys.amount_received_from_exchange(&from, 250 * UNIT, &to).unwrap();
    let fee = sys.exchange_fee_incurred(&from, 250 * UNIT, &to).unwrap();
    assert_eq!(received + fee, 200 * UNIT);
    assert_eq!(sys.fee_rate_for_exchange(&from, &to), 3 * UNIT / 1000);

    let executed = sys.exchange(&alice(), &from, 250 * UNIT, &to, 0).unwrap();
    assert_eq!(executed, received);
}

// ---------------------------------------------------------------------------
// Inverse currencies
// ---------------------------------------------------------------------------

#[test]
fn test_swing_trade_pays_double_fee() {
    let mut sys = funded();
    // Base to inverse pays the standard fee.
    let ibtc = sys
        .exchange(&alice(), &key("sUSD"), 300 * UNIT, &key("iBTC"), 0)
        .unwrap();
    assert_eq!(ibtc, 997 * UNIT / 10_000);

    // Inverse to standard pays double.
    assert_eq!(
        sys.fee_rate_for_exchange(&key("iBTC"), &key("sAUD")),
        6 * UNIT / 1000
    );
    let aud = sys
        .exchange(&alice(), &key("iBTC"), 5 * UNIT / 100, &key("sAUD"), 0)
        .unwrap();
    assert_eq!(aud, 2982 * UNIT / 10);
    assert_eq!(
        sys.synth_balance(&key("iBTC"), &alice()).unwrap(),
        997 * UNIT / 10_000 - 5 * UNIT / 100
    );
}

#[test]
fn test_frozen_inverse_trades_at_limit() {
    let mut sys = funded();
    sys.exchange(&alice(), &key("sUSD"), 300 * UNIT, &key("iBTC"), 0)
        .unwrap();
    sys.drain_events();

    // 7500 mirrors below the lower limit, so iBTC freezes at 1000.
    advance(&mut sys, 60);
    push_prices(&mut sys, &[("iBTC", 7500 * UNIT)]);
    assert!(sys.rates().is_frozen(&key("iBTC")));
    assert_eq!(sys.rates().rate(&key("iBTC")), 1000 * UNIT);
    assert!(sys.drain_events().contains(&SynthEvent::InverseFrozen {
        currency: key("iBTC"),
        rate: 1000 * UNIT,
    }));

    // Later prices do not move a frozen rate.
    advance(&mut sys, 60);
    push_prices(&mut sys, &[("iBTC", 4000 * UNIT)]);
    assert_eq!(sys.rates().rate(&key("iBTC")), 1000 * UNIT);

    let eur = sys
        .exchange(&alice(), &key("iBTC"), UNIT / 100, &key("sEUR"), 0)
        .unwrap();
    assert_eq!(eur, 7952 * UNIT / 1000);
}

// ---------------------------------------------------------------------------
// No-ops and rejections
// ---------------------------------------------------------------------------

#[test]
fn test_noop_exchanges_return_zero() {
    let mut sys = funded();
    assert_eq!(
        sys.exchange(&alice(), &key("sUSD"), 10 * UNIT, &key("sUSD"), 0).unwrap(),
        0
    );
    assert_eq!(
        sys.exchange(&alice(), &key("sUSD"), 0, &key("sAUD"), 0).unwrap(),
        0
    );
    assert!(sys.events().is_empty());
    assert_eq!(sys.synth_balance(&key("sUSD"), &alice()).unwrap(), 1000 * UNIT);
}

#[test]
fn test_exchange_rejections() {
    let mut sys = funded();
    assert!(matches!(
        sys.exchange(&alice(), &key("sUSD"), 10 * UNIT, &key("sJPY"), 0),
        Err(SynthError::UnknownCurrency(_))
    ));
    assert!(matches!(
        sys.exchange(&alice(), &key("sUSD"), 1001 * UNIT, &key("sAUD"), 0),
        Err(SynthError::InsufficientBalance(_))
    ));
    assert!(matches!(
        sys.exchange(&bob(), &key("sUSD"), UNIT, &key("sAUD"), 0),
        Err(SynthError::InsufficientBalance(_))
    ));

    sys.set_currency_enabled(&owner(), &key("sAUD"), false).unwrap();
    assert!(matches!(
        sys.exchange(&alice(), &key("sUSD"), UNIT, &key("sAUD"), 0),
        Err(SynthError::Disabled(_))
    ));
    sys.set_currency_enabled(&owner(), &key("sAUD"), true).unwrap();

    sys.set_exchange_enabled(&owner(), false).unwrap();
    assert!(matches!(
        sys.exchange(&alice(), &key("sUSD"), UNIT, &key("sAUD"), 0),
        Err(SynthError::Disabled(_))
    ));
    sys.set_exchange_enabled(&owner(), true).unwrap();

    assert_eq!(sys.synth_balance(&key("sUSD"), &alice()).unwrap(), 1000 * UNIT);
    assert_eq!(sys.fee_pool().fees_to_distribute(), 0);
}

#[test]
fn test_disabled_source_blocks_exchange() {
    let mut sys = funded();
    sys.exchange(&alice(), &key("sUSD"), 100 * UNIT, &key("sAUD"), 0)
        .unwrap();
    sys.set_currency_enabled(&owner(), &key("sAUD"), false).unwrap();
    assert!(matches!(
        sys.exchange(&alice(), &key("sAUD"), UNIT, &key("sUSD"), 0),
        Err(SynthError::Disabled(_))
    ));
}

#[test]
fn test_stale_destination_blocks_exchange() {
    let mut sys = funded();
    advance(&mut sys, DEFAULT_STALE_PERIOD + 1);
    assert!(matches!(
        sys.exchange(&alice(), &key("sUSD"), UNIT, &key("sAUD"), 0),
        Err(SynthError::StaleRate(_))
    ));
    assert_eq!(sys.synth_balance(&key("sAUD"), &alice()).unwrap(), 0);
}

#[test]
fn test_fee_rate_is_owner_gated_and_bounded() {
    let mut sys = funded();
    assert!(matches!(
        sys.set_exchange_fee_rate(&alice(), UNIT / 100),
        Err(SynthError::Unauthorized(_))
    ));
    assert!(sys.set_exchange_fee_rate(&owner(), UNIT / 10 + 1).is_err());
    sys.set_exchange_fee_rate(&owner(), 0).unwrap();
    let received = sys
        .exchange(&alice(), &key("sUSD"), 100 * UNIT, &key("sAUD"), 0)
        .unwrap();
    assert_eq!(received, 200 * UNIT);
    assert_eq!(sys.fee_pool().fees_to_distribute(), 0);
    assert!(sys
        .events()
        .iter()
        .all(|e| !matches!(e, SynthEvent::FeeAccrued { .. })));
}

// ---------------------------------------------------------------------------
// Priority fee ceiling and protection circuit
// ---------------------------------------------------------------------------

#[test]
fn test_priority_fee_ceiling() {
    let mut sys = funded();
    // Unlimited until set.
    sys.exchange(&alice(), &key("sUSD"), UNIT, &key("sAUD"), u128::MAX)
        .unwrap();

    assert!(matches!(
        sys.set_priority_fee_ceiling(&owner(), 50),
        Err(SynthError::Unauthorized(_))
    ));
    assert!(matches!(
        sys.set_priority_fee_ceiling(&gas_oracle(), 0),
        Err(SynthError::InvalidParameter(_))
    ));
    sys.set_priority_fee_ceiling(&gas_oracle(), 50).unwrap();

    assert!(matches!(
        sys.exchange(&alice(), &key("sUSD"), UNIT, &key("sAUD"), 51),
        Err(SynthError::PriorityFeeExceeded(_))
    ));
    sys.exchange(&alice(), &key("sUSD"), UNIT, &key("sAUD"), 50)
        .unwrap();
    assert_eq!(sys.synth_balance(&key("sUSD"), &alice()).unwrap(), 998 * UNIT);
}

#[test]
fn test_protection_circuit_reclaims_source() {
    let mut sys = funded();
    assert!(matches!(
        sys.set_protection_circuit(&owner(), true),
        Err(SynthError::Unauthorized(_))
    ));
    sys.set_protection_circuit(&oracle(), true).unwrap();

    let received = sys
        .exchange(&alice(), &key("sUSD"), 100 * UNIT, &key("sAUD"), 0)
        .unwrap();
    assert_eq!(received, 0);
    assert_eq!(sys.synth_balance(&key("sUSD"), &alice()).unwrap(), 900 * UNIT);
    assert_eq!(sys.synth_balance(&key("sAUD"), &alice()).unwrap(), 0);
    assert_eq!(sys.fee_pool().fees_to_distribute(), 0);
    assert_eq!(
        sys.drain_events(),
        vec![
            SynthEvent::ProtectionCircuit { enabled: true },
            SynthEvent::ExchangeReclaimed {
                participant: alice(),
                currency: key("sUSD"),
                amount: 100 * UNIT,
            },
        ]
    );

    sys.set_protection_circuit(&oracle(), false).unwrap();
    assert_eq!(
        sys.exchange(&alice(), &key("sUSD"), 100 * UNIT, &key("sAUD"), 0)
            .unwrap(),
        1994 * UNIT / 10
    );
}
