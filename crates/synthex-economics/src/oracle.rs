// crates/synthex-economics/src/oracle.rs
//
// Price oracle adapter.
//
// Holds the latest rate and update timestamp per currency, answers rate and
// staleness queries, and derives the rate of inverse currencies from the
// submitted price of their underlying. The base currency is fixed at 1.0 and
// is never stale.
//
// An inverse rate mirrors the underlying around its entry point:
//   inverse = 2 * entry_point - price
// Once the mirrored value reaches either limit it is clamped there and the
// currency freezes. A frozen currency keeps its rate until the owner resets
// its pricing; later updates only refresh the timestamp.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use synthex_core::decimal::{divide_decimal_round, multiply_decimal_round, Amount, UNIT};
use synthex_core::{CurrencyKey, SynthError, Units};

/// Default maximum rate age: 3 hours.
pub const DEFAULT_STALE_PERIOD: u64 = 3 * 60 * 60;

/// How far in the future a submitted timestamp may be: 10 minutes.
pub const ORACLE_FUTURE_LIMIT: u64 = 10 * 60;

/// A stored rate and when it was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub rate: Amount,
    pub updated_at: u64,
}

/// Band parameters of an inverse currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InversePricing {
    pub entry_point: Amount,
    pub upper_limit: Amount,
    pub lower_limit: Amount,
    /// Set once the mirrored rate hits a limit.
    pub frozen_rate: Option<Amount>,
}

impl InversePricing {
    pub fn is_frozen(&self) -> bool {
        self.frozen_rate.is_some()
    }

    /// Mirror `price` around the entry point and clamp it to the band.
    /// Returns the rate and whether it was clamped.
    fn mirror(&self, price: Amount) -> (Amount, bool) {
        let inverse = self.entry_point.saturating_mul(2).saturating_sub(price);
        if inverse >= self.upper_limit {
            (self.upper_limit, true)
        } else if inverse <= self.lower_limit {
            (self.lower_limit, true)
        } else {
            (inverse, false)
        }
    }
}

/// How a currency's rate is derived from submitted prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PricingKind {
    Standard,
    Inverse(InversePricing),
}

/// Rate state for one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceFeed {
    pub kind: PricingKind,
    pub latest: Option<RateSnapshot>,
}

impl PriceFeed {
    fn standard() -> Self {
        Self {
            kind: PricingKind::Standard,
            latest: None,
        }
    }

    /// Rate in effect, 0 if nothing was ever recorded.
    fn effective_rate(&self) -> Amount {
        match (&self.kind, &self.latest) {
            (_, None) => 0,
            (PricingKind::Inverse(InversePricing { frozen_rate: Some(frozen), .. }), Some(_)) => {
                *frozen
            }
            (_, Some(snapshot)) => snapshot.rate,
        }
    }
}

/// Pricing category used to decide exchange fee doubling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeeTag {
    Base,
    Standard,
    Inverse,
}

/// The oracle's rate table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTable {
    base: CurrencyKey,
    stale_period: u64,
    feeds: HashMap<CurrencyKey, PriceFeed>,
}

impl RateTable {
    /// Create an empty table with `base` fixed at 1.0.
    pub fn new(base: CurrencyKey, stale_period: u64) -> Self {
        Self {
            base,
            stale_period,
            feeds: HashMap::new(),
        }
    }

    pub fn base(&self) -> CurrencyKey {
        self.base
    }

    pub fn stale_period(&self) -> u64 {
        self.stale_period
    }

    pub fn set_stale_period(&mut self, period: u64) -> Result<(), SynthError> {
        if period == 0 {
            return Err(SynthError::InvalidParameter(
                "stale period must be non-zero".to_string(),
            ));
        }
        self.stale_period = period;
        tracing::info!(period, "Stale period updated");
        Ok(())
    }

    /// Effective rate of `key` in base units. Inverse-aware; 0 if no rate was
    /// ever recorded. Does not check staleness.
    pub fn rate(&self, key: &CurrencyKey) -> Amount {
        if *key == self.base {
            return UNIT;
        }
        self.feeds.get(key).map(PriceFeed::effective_rate).unwrap_or(0)
    }

    /// Effective rates of several currencies, in order.
    pub fn rates_for(&self, keys: &[CurrencyKey]) -> Vec<Amount> {
        keys.iter().map(|k| self.rate(k)).collect()
    }

    /// Timestamp of the last accepted update for `key`.
    pub fn last_update(&self, key: &CurrencyKey) -> Option<u64> {
        self.feeds
            .get(key)
            .and_then(|feed| feed.latest)
            .map(|snapshot| snapshot.updated_at)
    }

    pub fn pricing_kind(&self, key: &CurrencyKey) -> Option<&PricingKind> {
        self.feeds.get(key).map(|feed| &feed.kind)
    }

    pub fn is_frozen(&self, key: &CurrencyKey) -> bool {
        matches!(
            self.pricing_kind(key),
            Some(PricingKind::Inverse(inverse)) if inverse.is_frozen()
        )
    }

    /// Whether the rate of `key` is too old to use at `now`.
    pub fn is_stale(&self, key: &CurrencyKey, now: u64) -> bool {
        if *key == self.base {
            return false;
        }
        match self.last_update(key) {
            Some(updated_at) => now.saturating_sub(updated_at) > self.stale_period,
            None => true,
        }
    }

    /// Short-circuiting OR of `is_stale` over `keys`.
    pub fn any_stale(&self, keys: &[CurrencyKey], now: u64) -> bool {
        keys.iter().any(|k| self.is_stale(k, now))
    }

    /// Effective rate of `key`, failing if it is stale.
    pub fn fresh_rate(&self, key: &CurrencyKey, now: u64) -> Result<Amount, SynthError> {
        if self.is_stale(key, now) {
            return Err(SynthError::StaleRate(match self.last_update(key) {
                Some(updated_at) => format!(
                    "{} last updated at {}, now {} (stale period {}s)",
                    key, updated_at, now, self.stale_period
                ),
                None => format!("{} has never been priced", key),
            }));
        }
        Ok(self.rate(key))
    }

    /// Convert `amount` of `from` into `to` at current rates.
    ///
    /// Both legs round half up: `amount * rate(from)`, then `/ rate(to)`.
    ///
    /// # Errors
    /// Returns `SynthError::StaleRate` if either rate is stale.
    pub fn effective_value(
        &self,
        from: &CurrencyKey,
        amount: Amount,
        to: &CurrencyKey,
        now: u64,
    ) -> Result<Amount, SynthError> {
        let rate_from = self.fresh_rate(from, now)?;
        let rate_to = self.fresh_rate(to, now)?;
        let base_value = multiply_decimal_round(amount, rate_from)?;
        divide_decimal_round(base_value, rate_to)
    }

    /// Fee category of `key`.
    pub fn fee_tag(&self, key: &CurrencyKey) -> FeeTag {
        if *key == self.base {
            return FeeTag::Base;
        }
        match self.pricing_kind(key) {
            Some(PricingKind::Inverse(_)) => FeeTag::Inverse,
            _ => FeeTag::Standard,
        }
    }

    /// Store a batch of prices submitted at `timestamp`.
    ///
    /// The whole batch is validated before anything is stored. Returns the
    /// currencies that froze as a result of this batch.
    ///
    /// # Errors
    /// Returns `SynthError::InvalidRateUpdate` if the lengths differ, a key
    /// repeats, a price is zero, the base currency is included, the timestamp
    /// is more than `ORACLE_FUTURE_LIMIT` ahead of `now`, or the timestamp is
    /// not newer than a currency's existing one.
    pub fn update_rates(
        &mut self,
        keys: &[CurrencyKey],
        prices: &[Amount],
        timestamp: u64,
        now: u64,
    ) -> Result<Vec<CurrencyKey>, SynthError> {
        if let Err(e) = self.validate_update(keys, prices, timestamp, now) {
            tracing::warn!(error = %e, "Rejected rate update");
            return Err(e);
        }

        let mut newly_frozen = Vec::new();
        for (key, price) in keys.iter().zip(prices) {
            let feed = self.feeds.entry(*key).or_insert_with(PriceFeed::standard);
            let rate = match &mut feed.kind {
                PricingKind::Standard => *price,
                PricingKind::Inverse(inverse) => match inverse.frozen_rate {
                    Some(frozen) => frozen,
                    None => {
                        let (rate, clamped) = inverse.mirror(*price);
                        if clamped {
                            inverse.frozen_rate = Some(rate);
                            newly_frozen.push(*key);
                            tracing::info!(
                                currency = %key,
                                price = %Units(*price),
                                rate = %Units(rate),
                                "Inverse currency frozen"
                            );
                        }
                        rate
                    }
                },
            };
            feed.latest = Some(RateSnapshot {
                rate,
                updated_at: timestamp,
            });
            tracing::debug!(currency = %key, rate = %Units(rate), timestamp, "Rate stored");
        }
        Ok(newly_frozen)
    }

    fn validate_update(
        &self,
        keys: &[CurrencyKey],
        prices: &[Amount],
        timestamp: u64,
        now: u64,
    ) -> Result<(), SynthError> {
        if keys.len() != prices.len() {
            return Err(SynthError::InvalidRateUpdate(format!(
                "{} currencies but {} prices",
                keys.len(),
                prices.len()
            )));
        }
        if timestamp > now.saturating_add(ORACLE_FUTURE_LIMIT) {
            return Err(SynthError::InvalidRateUpdate(format!(
                "timestamp {} is too far ahead of {}",
                timestamp, now
            )));
        }
        let mut seen = HashSet::with_capacity(keys.len());
        for (key, price) in keys.iter().zip(prices) {
            if *key == self.base {
                return Err(SynthError::InvalidRateUpdate(format!(
                    "rate of the base currency {} cannot be updated",
                    key
                )));
            }
            if !seen.insert(*key) {
                return Err(SynthError::InvalidRateUpdate(format!(
                    "{} appears more than once",
                    key
                )));
            }
            if *price == 0 {
                return Err(SynthError::InvalidRateUpdate(format!(
                    "zero price for {}",
                    key
                )));
            }
            if let Some(previous) = self.last_update(key) {
                if timestamp <= previous {
                    return Err(SynthError::InvalidRateUpdate(format!(
                        "{} already updated at {}, got {}",
                        key, previous, timestamp
                    )));
                }
            }
        }
        Ok(())
    }

    /// Forget the stored rate of `key`. Pricing parameters are kept.
    pub fn delete_rate(&mut self, key: &CurrencyKey) -> Result<RateSnapshot, SynthError> {
        let removed = self.feeds.get_mut(key).and_then(|feed| feed.latest.take());
        removed.ok_or_else(|| SynthError::InvalidRateUpdate(format!("{} has no rate to delete", key)))
    }

    /// Configure `key` as an inverse currency.
    ///
    /// With `freeze`, the currency starts frozen at the upper or lower limit.
    /// Calling again with `freeze = false` unfreezes it; the next price update
    /// recomputes the mirrored rate.
    ///
    /// # Errors
    /// Returns `SynthError::InvalidParameter` unless
    /// `0 < lower_limit < entry_point < upper_limit < 2 * entry_point`, or if
    /// `key` is the base currency.
    pub fn set_inverse_pricing(
        &mut self,
        key: CurrencyKey,
        entry_point: Amount,
        upper_limit: Amount,
        lower_limit: Amount,
        freeze: bool,
        freeze_at_upper: bool,
    ) -> Result<(), SynthError> {
        if key == self.base {
            return Err(SynthError::InvalidParameter(format!(
                "base currency {} cannot be inverse",
                key
            )));
        }
        let double_entry = entry_point.checked_mul(2).ok_or_else(|| {
            SynthError::InvalidParameter(format!("entry point {} is too large", entry_point))
        })?;
        if entry_point == 0
            || lower_limit == 0
            || lower_limit >= entry_point
            || upper_limit <= entry_point
            || upper_limit >= double_entry
        {
            return Err(SynthError::InvalidParameter(format!(
                "inverse band for {} must satisfy 0 < lower {} < entry {} < upper {} < 2 x entry",
                key,
                Units(lower_limit),
                Units(entry_point),
                Units(upper_limit)
            )));
        }

        let frozen_rate = freeze.then(|| if freeze_at_upper { upper_limit } else { lower_limit });
        let feed = self.feeds.entry(key).or_insert_with(PriceFeed::standard);
        feed.kind = PricingKind::Inverse(InversePricing {
            entry_point,
            upper_limit,
            lower_limit,
            frozen_rate,
        });
        tracing::info!(
            currency = %key,
            entry = %Units(entry_point),
            upper = %Units(upper_limit),
            lower = %Units(lower_limit),
            frozen = freeze,
            "Inverse pricing set"
        );
        Ok(())
    }

    /// Revert `key` to standard pricing.
    pub fn remove_inverse_pricing(&mut self, key: &CurrencyKey) -> Result<(), SynthError> {
        match self.feeds.get_mut(key) {
            Some(feed) if matches!(feed.kind, PricingKind::Inverse(_)) => {
                feed.kind = PricingKind::Standard;
                tracing::info!(currency = %key, "Inverse pricing removed");
                Ok(())
            }
            _ => Err(SynthError::InvalidParameter(format!(
                "{} has no inverse pricing",
                key
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_600_000_000;

    fn key(s: &str) -> CurrencyKey {
        CurrencyKey::new(s).unwrap()
    }

    fn table() -> RateTable {
        RateTable::new(key("sUSD"), DEFAULT_STALE_PERIOD)
    }

    #[test]
    fn test_base_rate_is_fixed_and_fresh() {
        let rates = table();
        assert_eq!(rates.rate(&key("sUSD")), UNIT);
        assert!(!rates.is_stale(&key("sUSD"), u64::MAX));
        assert_eq!(rates.fee_tag(&key("sUSD")), FeeTag::Base);
    }

    #[test]
    fn test_unpriced_currency_is_stale() {
        let rates = table();
        assert_eq!(rates.rate(&key("sAUD")), 0);
        assert!(rates.is_stale(&key("sAUD"), NOW));
        assert!(matches!(
            rates.fresh_rate(&key("sAUD"), NOW),
            Err(SynthError::StaleRate(_))
        ));
    }

    #[test]
    fn test_staleness_boundary() {
        let mut rates = table();
        rates.update_rates(&[key("sAUD")], &[UNIT / 2], NOW, NOW).unwrap();
        assert!(!rates.is_stale(&key("sAUD"), NOW + DEFAULT_STALE_PERIOD));
        assert!(rates.is_stale(&key("sAUD"), NOW + DEFAULT_STALE_PERIOD + 1));
        assert!(rates.any_stale(&[key("sUSD"), key("sEUR")], NOW));
        assert!(!rates.any_stale(&[key("sUSD"), key("sAUD")], NOW));
    }

    #[test]
    fn test_update_rejects_replay_and_out_of_order() {
        let mut rates = table();
        rates.update_rates(&[key("sAUD")], &[UNIT / 2], NOW, NOW).unwrap();
        let replay = rates.update_rates(&[key("sAUD")], &[UNIT], NOW, NOW);
        assert!(matches!(replay, Err(SynthError::InvalidRateUpdate(_))));
        let older = rates.update_rates(&[key("sAUD")], &[UNIT], NOW - 1, NOW);
        assert!(older.is_err());
        assert_eq!(rates.rate(&key("sAUD")), UNIT / 2);
    }

    #[test]
    fn test_update_is_atomic() {
        let mut rates = table();
        rates.update_rates(&[key("sEUR")], &[UNIT], NOW, NOW).unwrap();
        // sAUD is fine, sEUR is a replay: nothing in the batch is stored.
        let result = rates.update_rates(&[key("sAUD"), key("sEUR")], &[2 * UNIT, 3 * UNIT], NOW, NOW);
        assert!(result.is_err());
        assert_eq!(rates.rate(&key("sAUD")), 0);
        assert_eq!(rates.rate(&key("sEUR")), UNIT);
    }

    #[test]
    fn test_update_rejects_malformed_batches() {
        let mut rates = table();
        assert!(rates.update_rates(&[key("sAUD")], &[], NOW, NOW).is_err());
        assert!(rates
            .update_rates(&[key("sAUD"), key("sAUD")], &[UNIT, UNIT], NOW, NOW)
            .is_err());
        assert!(rates.update_rates(&[key("sAUD")], &[0], NOW, NOW).is_err());
        assert!(rates.update_rates(&[key("sUSD")], &[UNIT], NOW, NOW).is_err());
        assert!(rates
            .update_rates(&[key("sAUD")], &[UNIT], NOW + ORACLE_FUTURE_LIMIT + 1, NOW)
            .is_err());
        assert!(rates
            .update_rates(&[key("sAUD")], &[UNIT], NOW + ORACLE_FUTURE_LIMIT, NOW)
            .is_ok());
    }

    #[test]
    fn test_effective_value() {
        let mut rates = table();
        rates
            .update_rates(&[key("sAUD"), key("SNX")], &[UNIT / 2, UNIT / 10], NOW, NOW)
            .unwrap();
        // 10 sAUD at 0.5 = 5 sUSD = 50 SNX at 0.1
        assert_eq!(
            rates.effective_value(&key("sAUD"), 10 * UNIT, &key("SNX"), NOW).unwrap(),
            50 * UNIT
        );
        assert_eq!(
            rates.effective_value(&key("sAUD"), 10 * UNIT, &key("sUSD"), NOW).unwrap(),
            5 * UNIT
        );
        let later = NOW + DEFAULT_STALE_PERIOD + 1;
        assert!(matches!(
            rates.effective_value(&key("sAUD"), UNIT, &key("sUSD"), later),
            Err(SynthError::StaleRate(_))
        ));
    }

    #[test]
    fn test_inverse_rate_mirrors_entry_point() {
        let mut rates = table();
        rates
            .set_inverse_pricing(key("iBTC"), 4000 * UNIT, 6500 * UNIT, 1000 * UNIT, false, false)
            .unwrap();
        let frozen = rates.update_rates(&[key("iBTC")], &[3500 * UNIT], NOW, NOW).unwrap();
        assert!(frozen.is_empty());
        assert_eq!(rates.rate(&key("iBTC")), 4500 * UNIT);
        assert_eq!(rates.fee_tag(&key("iBTC")), FeeTag::Inverse);
    }

    #[test]
    fn test_inverse_freezes_at_lower_limit() {
        let mut rates = table();
        rates
            .set_inverse_pricing(key("iBTC"), 4000 * UNIT, 6500 * UNIT, 1000 * UNIT, false, false)
            .unwrap();
        rates.update_rates(&[key("iBTC")], &[6000 * UNIT], NOW, NOW).unwrap();
        assert_eq!(rates.rate(&key("iBTC")), 2000 * UNIT);

        let frozen = rates.update_rates(&[key("iBTC")], &[7500 * UNIT], NOW + 1, NOW + 1).unwrap();
        assert_eq!(frozen, vec![key("iBTC")]);
        assert!(rates.is_frozen(&key("iBTC")));
        assert_eq!(rates.rate(&key("iBTC")), 1000 * UNIT);

        // Later prices do not move a frozen rate, but do refresh it.
        rates.update_rates(&[key("iBTC")], &[4000 * UNIT], NOW + 2, NOW + 2).unwrap();
        assert_eq!(rates.rate(&key("iBTC")), 1000 * UNIT);
        assert_eq!(rates.last_update(&key("iBTC")), Some(NOW + 2));
    }

    #[test]
    fn test_inverse_freezes_at_upper_limit() {
        let mut rates = table();
        rates
            .set_inverse_pricing(key("iBTC"), 4000 * UNIT, 6500 * UNIT, 1000 * UNIT, false, false)
            .unwrap();
        rates.update_rates(&[key("iBTC")], &[1000 * UNIT], NOW, NOW).unwrap();
        assert_eq!(rates.rate(&key("iBTC")), 6500 * UNIT);
        assert!(rates.is_frozen(&key("iBTC")));
    }

    #[test]
    fn test_reset_inverse_pricing_unfreezes() {
        let mut rates = table();
        rates
            .set_inverse_pricing(key("iBTC"), 4000 * UNIT, 6500 * UNIT, 1000 * UNIT, true, true)
            .unwrap();
        rates.update_rates(&[key("iBTC")], &[4000 * UNIT], NOW, NOW).unwrap();
        assert_eq!(rates.rate(&key("iBTC")), 6500 * UNIT);

        rates
            .set_inverse_pricing(key("iBTC"), 4000 * UNIT, 6500 * UNIT, 1000 * UNIT, false, false)
            .unwrap();
        assert!(!rates.is_frozen(&key("iBTC")));
        rates.update_rates(&[key("iBTC")], &[4200 * UNIT], NOW + 1, NOW + 1).unwrap();
        assert_eq!(rates.rate(&key("iBTC")), 3800 * UNIT);

        rates.remove_inverse_pricing(&key("iBTC")).unwrap();
        assert_eq!(rates.fee_tag(&key("iBTC")), FeeTag::Standard);
        assert!(rates.remove_inverse_pricing(&key("iBTC")).is_err());
    }

    #[test]
    fn test_inverse_band_validation() {
        let mut rates = table();
        let ibtc = key("iBTC");
        assert!(rates.set_inverse_pricing(ibtc, 0, UNIT, 1, false, false).is_err());
        assert!(rates.set_inverse_pricing(ibtc, 4 * UNIT, 8 * UNIT, UNIT, false, false).is_err());
        assert!(rates.set_inverse_pricing(ibtc, 4 * UNIT, 5 * UNIT, 4 * UNIT, false, false).is_err());
        assert!(rates.set_inverse_pricing(ibtc, 4 * UNIT, 4 * UNIT, UNIT, false, false).is_err());
        assert!(rates.set_inverse_pricing(ibtc, 4 * UNIT, 5 * UNIT, 0, false, false).is_err());
        assert!(rates.set_inverse_pricing(key("sUSD"), 4 * UNIT, 5 * UNIT, UNIT, false, false).is_err());
    }

    #[test]
    fn test_delete_rate() {
        let mut rates = table();
        rates.update_rates(&[key("sAUD")], &[UNIT], NOW, NOW).unwrap();
        let removed = rates.delete_rate(&key("sAUD")).unwrap();
        assert_eq!(removed.rate, UNIT);
        assert!(rates.is_stale(&key("sAUD"), NOW));
        assert!(rates.delete_rate(&key("sAUD")).is_err());
        // A deleted rate can be re-submitted at any newer-than-nothing time.
        rates.update_rates(&[key("sAUD")], &[UNIT], NOW - 5, NOW).unwrap();
    }

    #[test]
    fn test_set_stale_period() {
        let mut rates = table();
        assert!(rates.set_stale_period(0).is_err());
        rates.set_stale_period(60).unwrap();
        rates.update_rates(&[key("sAUD")], &[UNIT], NOW, NOW).unwrap();
        assert!(rates.is_stale(&key("sAUD"), NOW + 61));
    }
}
