// crates/synthex-economics/src/escrow.rs
//
// In-memory escrow of collateral.
//
// Escrowed collateral is not in the participant's wallet but still counts
// towards their issuance capacity. Vesting schedules are not modelled: each
// holder has a single locked balance.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use synthex_core::{Address, Amount, CollateralSource, SynthError, Units};

/// Locked collateral balances by holder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EscrowBook {
    balances: HashMap<Address, Amount>,
    total_escrowed: Amount,
}

impl EscrowBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock `amount` for `holder`.
    pub fn append(&mut self, holder: Address, amount: Amount) {
        let balance = self.balances.entry(holder).or_insert(0);
        *balance = balance.saturating_add(amount);
        self.total_escrowed = self.total_escrowed.saturating_add(amount);
    }

    /// Release `amount` of `holder`'s locked balance.
    pub fn release(&mut self, holder: &Address, amount: Amount) -> Result<(), SynthError> {
        let balance = self.balances.get(holder).copied().unwrap_or(0);
        if amount > balance {
            return Err(SynthError::InsufficientBalance(format!(
                "{:?} has {} escrowed but {} was requested",
                holder,
                Units(balance),
                Units(amount)
            )));
        }
        self.balances.insert(*holder, balance - amount);
        self.total_escrowed -= amount;
        Ok(())
    }

    pub fn total_escrowed(&self) -> Amount {
        self.total_escrowed
    }
}

impl CollateralSource for EscrowBook {
    fn balance_of(&self, holder: &Address) -> Amount {
        self.balances.get(holder).copied().unwrap_or(0)
    }
}
