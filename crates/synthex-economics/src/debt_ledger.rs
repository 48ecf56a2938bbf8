// crates/synthex-economics/src/debt_ledger.rs
//
// Debt-share ledger.
//
// Every participant owns a fraction of the system-wide debt. Rather than
// rewriting every fraction when the total changes, the ledger appends one
// cumulative ratio per mint or burn:
//
//   entry[n] = entry[n-1] * total_before / total_after
//
// A participant snapshots their fraction together with the index of the
// entry appended by their last update. Their fraction today is the snapshot
// scaled by entry[last] / entry[index], which is O(1) per read and per write.
//
// A baseline entry (1.0) starts a new era whenever the total before or after
// an operation is zero. Snapshots from an earlier era hold no debt.
//
// Ratios and fractions are 27-decimal (PRECISE_UNIT); debt values are
// 18-decimal amounts in the base currency.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use synthex_core::decimal::{divide_precise_round, mul_div_round, Amount, PRECISE_UNIT};
use synthex_core::{Address, SynthError, Units};

/// Direction of a participant's debt change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebtChange {
    Increase,
    Decrease,
}

/// A participant's snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IssuanceRecord {
    /// Fraction of total debt at the time of the snapshot (27 decimals).
    pub ownership: u128,
    /// Index of the ledger entry the snapshot was taken against.
    pub debt_entry_index: usize,
}

/// Append-only cumulative debt ratios and per-participant snapshots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebtLedger {
    entries: Vec<u128>,
    records: HashMap<Address, IssuanceRecord>,
    /// Index of the latest baseline entry.
    baseline_index: usize,
    /// Participants with non-zero ownership in the current era.
    issuer_count: usize,
    /// Remaining debt at or below this clears a participant's ownership.
    negligible_debt: Amount,
}

impl DebtLedger {
    pub fn new(negligible_debt: Amount) -> Self {
        Self {
            negligible_debt,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[u128] {
        &self.entries
    }

    pub fn last_entry(&self) -> Option<u128> {
        self.entries.last().copied()
    }

    pub fn baseline_index(&self) -> usize {
        self.baseline_index
    }

    pub fn issuer_count(&self) -> usize {
        self.issuer_count
    }

    pub fn record(&self, participant: &Address) -> Option<&IssuanceRecord> {
        self.records.get(participant)
    }

    pub fn negligible_debt(&self) -> Amount {
        self.negligible_debt
    }

    pub fn set_negligible_debt(&mut self, threshold: Amount) {
        self.negligible_debt = threshold;
    }

    /// Participant's current fraction of total debt (27 decimals).
    pub fn current_ownership(&self, participant: &Address) -> Result<u128, SynthError> {
        let record = match self.records.get(participant) {
            Some(r) if r.ownership > 0 && r.debt_entry_index >= self.baseline_index => r,
            _ => return Ok(0),
        };
        let (Some(&last), Some(&snapshot)) = (
            self.entries.last(),
            self.entries.get(record.debt_entry_index),
        ) else {
            return Ok(0);
        };
        let ownership = mul_div_round(record.ownership, last, snapshot)?;
        Ok(ownership.min(PRECISE_UNIT))
    }

    /// Participant's current debt, given the system's total debt.
    ///
    /// The sole active issuer owns exactly `total_debt`.
    pub fn current_debt_share(
        &self,
        participant: &Address,
        total_debt: Amount,
    ) -> Result<Amount, SynthError> {
        let ownership = self.current_ownership(participant)?;
        if ownership == 0 {
            return Ok(0);
        }
        if self.issuer_count == 1 {
            return Ok(total_debt);
        }
        let share = mul_div_round(total_debt, ownership, PRECISE_UNIT)?;
        Ok(share.min(total_debt))
    }

    /// The entry that `old_total -> new_total` would append, and whether it
    /// starts a new era.
    pub fn next_entry(&self, old_total: Amount, new_total: Amount) -> Result<(u128, bool), SynthError> {
        let last = match self.entries.last() {
            Some(&last) if old_total > 0 && new_total > 0 => last,
            _ => return Ok((PRECISE_UNIT, true)),
        };
        let entry = mul_div_round(last, old_total, new_total)?;
        if entry == 0 {
            return Err(SynthError::ZeroEffect(format!(
                "debt ratio for {} -> {} rounds to zero",
                Units(old_total),
                Units(new_total)
            )));
        }
        Ok((entry, false))
    }

    /// Append the ratio for a change of total debt. Returns the new entry's
    /// index.
    pub fn record_delta(&mut self, old_total: Amount, new_total: Amount) -> Result<usize, SynthError> {
        let (entry, baseline) = self.next_entry(old_total, new_total)?;
        Ok(self.push_entry(entry, baseline))
    }

    fn push_entry(&mut self, entry: u128, baseline: bool) -> usize {
        self.entries.push(entry);
        let index = self.entries.len() - 1;
        if baseline {
            self.baseline_index = index;
            self.issuer_count = 0;
        }
        index
    }

    /// Apply a debt change of `delta` (base currency) for `participant`.
    ///
    /// `total_debt` is the system's total debt before the change. Decreases
    /// are clamped to the participant's current debt. Returns the
    /// participant's debt after the change. Nothing is mutated on error.
    ///
    /// # Errors
    /// Returns `SynthError::ZeroEffect` if an increase leaves the participant
    /// with no ownership, or if the new ledger entry rounds to zero.
    pub fn update_participant(
        &mut self,
        participant: &Address,
        delta: Amount,
        change: DebtChange,
        total_debt: Amount,
    ) -> Result<Amount, SynthError> {
        let was_active = self.current_ownership(participant)? > 0;
        let current = self.current_debt_share(participant, total_debt)?;

        let (new_debt, new_total) = match change {
            DebtChange::Increase => {
                let new_debt = current
                    .checked_add(delta)
                    .ok_or_else(|| SynthError::Overflow("participant debt".to_string()))?;
                let new_total = total_debt
                    .checked_add(delta)
                    .ok_or_else(|| SynthError::Overflow("total debt".to_string()))?;
                (new_debt, new_total)
            }
            DebtChange::Decrease => {
                let delta = delta.min(current);
                let new_debt = current - delta;
                // The last issuer's remaining debt is the whole system's debt.
                let new_total = if was_active && self.issuer_count == 1 {
                    new_debt
                } else {
                    total_debt.saturating_sub(delta)
                };
                (new_debt, new_total)
            }
        };

        let ownership = if new_total == 0 || new_debt <= self.negligible_debt {
            0
        } else {
            divide_precise_round(new_debt, new_total)?.min(PRECISE_UNIT)
        };
        if change == DebtChange::Increase && ownership == 0 {
            return Err(SynthError::ZeroEffect(format!(
                "issuing {} leaves {:?} with no debt ownership",
                Units(delta),
                participant
            )));
        }
        let (entry, baseline) = self.next_entry(total_debt, new_total)?;

        let index = self.push_entry(entry, baseline);
        let is_active = ownership > 0;
        if baseline {
            self.issuer_count = usize::from(is_active);
        } else if is_active && !was_active {
            self.issuer_count += 1;
        } else if was_active && !is_active {
            self.issuer_count = self.issuer_count.saturating_sub(1);
        }
        self.records.insert(
            *participant,
            IssuanceRecord {
                ownership,
                debt_entry_index: index,
            },
        );

        tracing::debug!(
            participant = %participant.short_hex(),
            ?change,
            debt = %Units(new_debt),
            total = %Units(new_total),
            entry,
            index,
            baseline,
            "Debt ledger updated"
        );
        Ok(new_debt)
    }
}
