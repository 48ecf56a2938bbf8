// crates/synthex-economics/src/exchange.rs
//
// Exchange engine.
//
// Converts a synth balance from one currency to another at oracle rates and
// charges a fee on the converted amount. Only the amount after the fee is
// credited, so an exchange lowers total issued value by the fee. The fee is
// valued in the settlement currency and reported to the fee pool.
//
// Swing trades (any trade with an inverse leg, unless the other leg is the
// base currency) pay double the fee rate.

use serde::{Deserialize, Serialize};
use synthex_core::decimal::{multiply_decimal, Amount, UNIT};
use synthex_core::{Address, CurrencyKey, FeeSink, SynthError, Units};

use crate::events::SynthEvent;
use crate::oracle::{FeeTag, RateTable};
use crate::system::SynthSystem;

/// Upper bound on the base exchange fee rate: 10%.
pub const MAX_EXCHANGE_FEE_RATE: Amount = UNIT / 10;

/// Exchange switches and fee parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeSettings {
    pub enabled: bool,
    /// Base fee rate before doubling (18 decimals).
    pub fee_rate: Amount,
    /// Maximum priority fee an exchange may declare. `None` is unlimited.
    pub priority_fee_ceiling: Option<Amount>,
    /// While set, exchanges burn the source amount and credit nothing.
    pub protection_circuit: bool,
}

/// Fee-rate multiplier for a trade between two pricing categories.
pub fn fee_multiplier(from: FeeTag, to: FeeTag) -> Amount {
    let has_inverse = from == FeeTag::Inverse || to == FeeTag::Inverse;
    let has_base = from == FeeTag::Base || to == FeeTag::Base;
    if has_inverse && !has_base {
        2
    } else {
        1
    }
}

/// Breakdown of an exchange at current rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeQuote {
    pub from: CurrencyKey,
    pub to: CurrencyKey,
    pub from_amount: Amount,
    /// Converted amount before fees, in `to`.
    pub gross: Amount,
    /// Fee rate applied, after any doubling.
    pub fee_rate: Amount,
    /// Fee in `to`.
    pub fee: Amount,
    /// Amount credited in `to`.
    pub received: Amount,
}

impl ExchangeQuote {
    /// Price an exchange of `amount` from `from` to `to`.
    ///
    /// # Errors
    /// Returns `SynthError::StaleRate` if either rate is stale.
    pub fn compute(
        rates: &RateTable,
        base_fee_rate: Amount,
        from: CurrencyKey,
        amount: Amount,
        to: CurrencyKey,
        now: u64,
    ) -> Result<Self, SynthError> {
        let gross = rates.effective_value(&from, amount, &to, now)?;
        let fee_rate = base_fee_rate * fee_multiplier(rates.fee_tag(&from), rates.fee_tag(&to));
        let fee = multiply_decimal(gross, fee_rate)?;
        Ok(Self {
            from,
            to,
            from_amount: amount,
            gross,
            fee_rate,
            fee,
            received: gross - fee,
        })
    }
}

impl SynthSystem {
    pub fn exchange_settings(&self) -> &ExchangeSettings {
        &self.exchange
    }

    /// Fee rate an exchange between `from` and `to` would pay.
    pub fn fee_rate_for_exchange(&self, from: &CurrencyKey, to: &CurrencyKey) -> Amount {
        self.exchange.fee_rate * fee_multiplier(self.rates.fee_tag(from), self.rates.fee_tag(to))
    }

    /// Price an exchange at current rates without executing it.
    pub fn quote_exchange(
        &self,
        from: &CurrencyKey,
        amount: Amount,
        to: &CurrencyKey,
    ) -> Result<ExchangeQuote, SynthError> {
        ExchangeQuote::compute(&self.rates, self.exchange.fee_rate, *from, amount, *to, self.now)
    }

    pub fn amount_received_from_exchange(
        &self,
        from: &CurrencyKey,
        amount: Amount,
        to: &CurrencyKey,
    ) -> Result<Amount, SynthError> {
        Ok(self.quote_exchange(from, amount, to)?.received)
    }

    pub fn exchange_fee_incurred(
        &self,
        from: &CurrencyKey,
        amount: Amount,
        to: &CurrencyKey,
    ) -> Result<Amount, SynthError> {
        Ok(self.quote_exchange(from, amount, to)?.fee)
    }

    /// Exchange `amount` of `from` held by `participant` into `to`.
    ///
    /// Returns the amount of `to` credited. Exchanging a currency into itself
    /// or exchanging zero does nothing and returns 0. While the protection
    /// circuit is on, the source amount is burned and 0 is returned.
    ///
    /// # Errors
    /// - `PriorityFeeExceeded` if `priority_fee` is above the ceiling.
    /// - `Disabled` if exchanges or either currency are disabled.
    /// - `UnknownCurrency` if either currency is not registered.
    /// - `InsufficientBalance` if `participant` holds less than `amount`.
    /// - `StaleRate` if a rate the exchange needs is stale.
    pub fn exchange(
        &mut self,
        participant: &Address,
        from: &CurrencyKey,
        amount: Amount,
        to: &CurrencyKey,
        priority_fee: Amount,
    ) -> Result<Amount, SynthError> {
        if from == to || amount == 0 {
            return Ok(0);
        }
        if let Some(ceiling) = self.exchange.priority_fee_ceiling {
            if priority_fee > ceiling {
                return Err(SynthError::PriorityFeeExceeded(format!(
                    "priority fee {} is above the ceiling {}",
                    priority_fee, ceiling
                )));
            }
        }
        if !self.exchange.enabled {
            return Err(SynthError::Disabled("exchanges are disabled".to_string()));
        }
        self.registry.require_enabled(from)?;
        self.registry.require_enabled(to)?;
        let balance = self.registry.balance_of(from, participant)?;
        if balance < amount {
            return Err(SynthError::InsufficientBalance(format!(
                "{:?} holds {} {} but tried to exchange {}",
                participant,
                Units(balance),
                from,
                Units(amount)
            )));
        }

        if self.exchange.protection_circuit {
            return self.reclaim_under_protection(participant, from, amount);
        }

        let quote = self.quote_exchange(from, amount, to)?;
        let settlement = self.settlement;
        let fee_in_settlement = if quote.fee > 0 {
            self.rates.effective_value(to, quote.fee, &settlement, self.now)?
        } else {
            0
        };
        self.registry.get(to)?.book.check_credit(quote.received)?;

        // Balance and supply checked above; nothing below can fail.
        self.registry.get_mut(from)?.book.debit(participant, amount)?;
        self.registry.get_mut(to)?.book.credit(participant, quote.received)?;
        if fee_in_settlement > 0 {
            self.fee_pool.record_fee(fee_in_settlement);
            self.events.push(SynthEvent::FeeAccrued {
                currency: settlement,
                amount: fee_in_settlement,
            });
        }

        tracing::info!(
            participant = %participant.short_hex(),
            from = %from,
            amount = %Units(amount),
            to = %to,
            received = %Units(quote.received),
            fee = %Units(quote.fee),
            "Exchange"
        );
        self.events.push(SynthEvent::Exchange {
            participant: *participant,
            from: *from,
            from_amount: amount,
            to: *to,
            to_amount: quote.received,
            destination: *participant,
        });
        Ok(quote.received)
    }

    /// Exchange path while the protection circuit is on: the source amount is
    /// burned and nothing is credited.
    fn reclaim_under_protection(
        &mut self,
        participant: &Address,
        from: &CurrencyKey,
        amount: Amount,
    ) -> Result<Amount, SynthError> {
        self.registry.get_mut(from)?.book.debit(participant, amount)?;
        tracing::warn!(
            participant = %participant.short_hex(),
            currency = %from,
            amount = %Units(amount),
            "Exchange reclaimed under protection circuit"
        );
        self.events.push(SynthEvent::ExchangeReclaimed {
            participant: *participant,
            currency: *from,
            amount,
        });
        Ok(0)
    }

    pub fn set_exchange_enabled(&mut self, caller: &Address, enabled: bool) -> Result<(), SynthError> {
        self.roles.require_owner(caller)?;
        self.exchange.enabled = enabled;
        tracing::info!(enabled, "Exchange switch set");
        Ok(())
    }

    pub fn set_exchange_fee_rate(&mut self, caller: &Address, rate: Amount) -> Result<(), SynthError> {
        self.roles.require_owner(caller)?;
        if rate > MAX_EXCHANGE_FEE_RATE {
            return Err(SynthError::InvalidParameter(format!(
                "exchange fee rate {} exceeds the maximum {}",
                Units(rate),
                Units(MAX_EXCHANGE_FEE_RATE)
            )));
        }
        self.exchange.fee_rate = rate;
        Ok(())
    }

    /// Set the priority-fee ceiling. Zero is not a valid ceiling.
    pub fn set_priority_fee_ceiling(&mut self, caller: &Address, ceiling: Amount) -> Result<(), SynthError> {
        self.roles.require_priority_fee_oracle(caller)?;
        if ceiling == 0 {
            return Err(SynthError::InvalidParameter(
                "priority fee ceiling must be non-zero".to_string(),
            ));
        }
        self.exchange.priority_fee_ceiling = Some(ceiling);
        Ok(())
    }

    pub fn set_protection_circuit(&mut self, caller: &Address, enabled: bool) -> Result<(), SynthError> {
        self.roles.require_oracle(caller)?;
        self.exchange.protection_circuit = enabled;
        tracing::warn!(enabled, "Protection circuit set");
        self.events.push(SynthEvent::ProtectionCircuit { enabled });
        Ok(())
    }
}
