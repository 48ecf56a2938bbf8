// crates/synthex-economics/src/issuance.rs
//
// Issuance controller.
//
// Participants issue synths against their collateral up to
// `collateral value * issuance_ratio`, and burn synths to repay debt. Debt is
// tracked in the base currency by the debt ledger; every query that values
// debt or collateral requires fresh rates.

use serde::{Deserialize, Serialize};
use synthex_core::decimal::{
    divide_decimal_round, multiply_decimal, multiply_decimal_round, Amount, UNIT,
};
use synthex_core::{Address, CurrencyKey, SynthError, Units};

use crate::debt_ledger::DebtChange;
use crate::events::SynthEvent;
use crate::system::SynthSystem;

/// Upper bound on the issuance ratio: 1.0.
pub const MAX_ISSUANCE_RATIO: Amount = UNIT;

/// Issuance switch and ratio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceSettings {
    pub enabled: bool,
    /// Fraction of collateral value that may be issued (18 decimals).
    pub issuance_ratio: Amount,
}

impl SynthSystem {
    pub fn issuance_settings(&self) -> &IssuanceSettings {
        &self.issuance
    }

    /// Collateral held by `participant`: wallet, escrow, and reward escrow.
    pub fn collateral(&self, participant: &Address) -> Amount {
        self.collateral
            .balance_of(participant)
            .saturating_add(self.escrow.balance_of(participant))
            .saturating_add(self.reward_escrow.balance_of(participant))
    }

    /// Value of every outstanding synth, in `currency`.
    ///
    /// Only currencies with a non-zero supply need a fresh rate.
    pub fn total_issued_value(&self, currency: &CurrencyKey) -> Result<Amount, SynthError> {
        let mut total_base: Amount = 0;
        for (key, issued) in self.registry.outstanding() {
            let rate = self.rates.fresh_rate(&key, self.now)?;
            let value = multiply_decimal_round(issued, rate)?;
            total_base = total_base
                .checked_add(value)
                .ok_or_else(|| SynthError::Overflow("total issued value".to_string()))?;
        }
        let rate_to = self.rates.fresh_rate(currency, self.now)?;
        divide_decimal_round(total_base, rate_to)
    }

    /// Total system debt in the base currency.
    pub fn total_system_debt(&self) -> Result<Amount, SynthError> {
        self.total_issued_value(&self.base)
    }

    /// `participant`'s share of system debt, in `currency`.
    ///
    /// Participants without debt get 0 without consulting the oracle.
    pub fn debt_balance_of(&self, participant: &Address, currency: &CurrencyKey) -> Result<Amount, SynthError> {
        if self.ledger.current_ownership(participant)? == 0 {
            return Ok(0);
        }
        let total = self.total_system_debt()?;
        let share = self.ledger.current_debt_share(participant, total)?;
        self.rates.effective_value(&self.base, share, currency, self.now)
    }

    /// Most `participant` could owe, in `currency`, given their collateral.
    pub fn max_issuable(&self, participant: &Address, currency: &CurrencyKey) -> Result<Amount, SynthError> {
        let collateral_value =
            self.rates
                .effective_value(&self.collateral_key, self.collateral(participant), currency, self.now)?;
        multiply_decimal(collateral_value, self.issuance.issuance_ratio)
    }

    /// How much more `participant` may issue in `currency`.
    pub fn remaining_issuable(&self, participant: &Address, currency: &CurrencyKey) -> Result<Amount, SynthError> {
        let max = self.max_issuable(participant, currency)?;
        let debt = self.debt_balance_of(participant, currency)?;
        Ok(max.saturating_sub(debt))
    }

    /// Debt value as a fraction of collateral value (18 decimals).
    pub fn collateralisation_ratio(&self, participant: &Address) -> Result<Amount, SynthError> {
        let collateral = self.collateral(participant);
        if collateral == 0 {
            return Ok(0);
        }
        let debt = self.debt_balance_of(participant, &self.collateral_key)?;
        divide_decimal_round(debt, collateral)
    }

    /// Issue `amount` of `currency` to `participant`, adding to their debt.
    ///
    /// # Errors
    /// - `ZeroEffect` if the amount is zero or worth nothing in the base currency.
    /// - `Disabled` if issuance or the currency is disabled.
    /// - `UnknownCurrency` if the currency is not registered.
    /// - `InsufficientIssuable` if the amount exceeds the remaining capacity.
    /// - `StaleRate` if a rate the check needs is stale.
    pub fn issue(&mut self, participant: &Address, currency: &CurrencyKey, amount: Amount) -> Result<(), SynthError> {
        if amount == 0 {
            return Err(SynthError::ZeroEffect("cannot issue zero".to_string()));
        }
        if !self.issuance.enabled {
            return Err(SynthError::Disabled("issuance is disabled".to_string()));
        }
        self.registry.require_enabled(currency)?;

        let remaining = self.remaining_issuable(participant, currency)?;
        if amount > remaining {
            return Err(SynthError::InsufficientIssuable(format!(
                "{:?} may issue {} {} but asked for {}",
                participant,
                Units(remaining),
                currency,
                Units(amount)
            )));
        }
        let base_value = self.rates.effective_value(currency, amount, &self.base, self.now)?;
        if base_value == 0 {
            return Err(SynthError::ZeroEffect(format!(
                "{} {} is worth nothing in {}",
                Units(amount),
                currency,
                self.base
            )));
        }
        let total = self.total_system_debt()?;

        let book = &mut self.registry.get_mut(currency)?.book;
        book.check_credit(amount)?;
        self.ledger
            .update_participant(participant, base_value, DebtChange::Increase, total)?;
        book.credit(participant, amount)?;

        tracing::info!(
            participant = %participant.short_hex(),
            currency = %currency,
            amount = %Units(amount),
            "Issued"
        );
        self.events.push(SynthEvent::Issued {
            participant: *participant,
            currency: *currency,
            amount,
        });
        Ok(())
    }

    /// Issue everything `participant` may still issue in `currency`.
    /// Returns the amount issued.
    pub fn issue_max(&mut self, participant: &Address, currency: &CurrencyKey) -> Result<Amount, SynthError> {
        let remaining = self.remaining_issuable(participant, currency)?;
        self.issue(participant, currency, remaining)?;
        Ok(remaining)
    }

    /// Burn up to `amount` of `currency` held by `participant` against their
    /// debt. The amount is clamped to the debt; burning the whole debt clears
    /// it exactly. Returns the amount burned.
    ///
    /// Disabled currencies can still be burned.
    ///
    /// # Errors
    /// - `InsufficientDebt` if the participant owes nothing.
    /// - `InsufficientBalance` if they hold less than the clamped amount.
    /// - `ZeroEffect` if the amount (or the debt in `currency`) is zero.
    /// - `StaleRate` if a rate the burn needs is stale.
    pub fn burn(&mut self, participant: &Address, currency: &CurrencyKey, amount: Amount) -> Result<Amount, SynthError> {
        self.registry.get(currency)?;
        if amount == 0 {
            return Err(SynthError::ZeroEffect("cannot burn zero".to_string()));
        }
        if self.ledger.current_ownership(participant)? == 0 {
            return Err(SynthError::InsufficientDebt(format!(
                "{:?} has no debt to burn",
                participant
            )));
        }

        let total = self.total_system_debt()?;
        let debt_base = self.ledger.current_debt_share(participant, total)?;
        let debt_in_currency = self.rates.effective_value(&self.base, debt_base, currency, self.now)?;
        let to_burn = amount.min(debt_in_currency);
        if to_burn == 0 {
            return Err(SynthError::ZeroEffect(format!(
                "debt of {:?} is worth nothing in {}",
                participant, currency
            )));
        }
        let balance = self.registry.balance_of(currency, participant)?;
        if balance < to_burn {
            return Err(SynthError::InsufficientBalance(format!(
                "{:?} holds {} {} but must burn {}",
                participant,
                Units(balance),
                currency,
                Units(to_burn)
            )));
        }
        let delta_base = if to_burn == debt_in_currency {
            debt_base
        } else {
            self.rates.effective_value(currency, to_burn, &self.base, self.now)?
        };

        let book = &mut self.registry.get_mut(currency)?.book;
        self.ledger
            .update_participant(participant, delta_base, DebtChange::Decrease, total)?;
        book.debit(participant, to_burn)?;

        tracing::info!(
            participant = %participant.short_hex(),
            currency = %currency,
            amount = %Units(to_burn),
            "Burned"
        );
        self.events.push(SynthEvent::Burned {
            participant: *participant,
            currency: *currency,
            amount: to_burn,
        });
        Ok(to_burn)
    }

    /// Wallet collateral not locked by `participant`'s debt.
    pub fn transferable_collateral(&self, participant: &Address) -> Result<Amount, SynthError> {
        let wallet = self.collateral.balance_of(participant);
        if self.ledger.current_ownership(participant)? == 0 {
            return Ok(wallet);
        }
        if self.issuance.issuance_ratio == 0 {
            return Ok(0);
        }
        let debt = self.debt_balance_of(participant, &self.collateral_key)?;
        let locked = divide_decimal_round(debt, self.issuance.issuance_ratio)?;
        Ok(wallet.saturating_sub(locked))
    }

    /// Move unlocked wallet collateral from `from` to `to`.
    pub fn transfer_collateral(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), SynthError> {
        let transferable = self.transferable_collateral(from)?;
        if amount > transferable {
            return Err(SynthError::InsufficientBalance(format!(
                "{:?} can transfer {} collateral but tried {}",
                from,
                Units(transferable),
                Units(amount)
            )));
        }
        self.collateral.transfer(from, to, amount)?;
        self.events.push(SynthEvent::CollateralTransferred {
            from: *from,
            to: *to,
            amount,
        });
        Ok(())
    }

    pub fn set_issuance_ratio(&mut self, caller: &Address, ratio: Amount) -> Result<(), SynthError> {
        self.roles.require_owner(caller)?;
        if ratio > MAX_ISSUANCE_RATIO {
            return Err(SynthError::InvalidParameter(format!(
                "issuance ratio {} exceeds the maximum {}",
                Units(ratio),
                Units(MAX_ISSUANCE_RATIO)
            )));
        }
        self.issuance.issuance_ratio = ratio;
        tracing::info!(ratio = %Units(ratio), "Issuance ratio set");
        Ok(())
    }

    pub fn set_issuance_enabled(&mut self, caller: &Address, enabled: bool) -> Result<(), SynthError> {
        self.roles.require_owner(caller)?;
        self.issuance.enabled = enabled;
        Ok(())
    }
}
