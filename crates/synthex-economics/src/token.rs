// crates/synthex-economics/src/token.rs
//
// In-memory fungible token book.
//
// One `TokenBook` holds the collateral asset; the registry holds one per
// synthetic currency. Total supply always equals the sum of balances.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use synthex_core::{Address, Amount, SynthError, Units};

/// Balances and total supply for one token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenBook {
    symbol: String,
    balances: HashMap<Address, Amount>,
    total_supply: Amount,
}

impl TokenBook {
    /// Create an empty book.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            balances: HashMap::new(),
            total_supply: 0,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Balance held by `holder` (0 if unknown).
    pub fn balance_of(&self, holder: &Address) -> Amount {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Check that minting `amount` keeps total supply in range. A balance
    /// never exceeds the total, so no holder can overflow either.
    pub fn check_credit(&self, amount: Amount) -> Result<(), SynthError> {
        match self.total_supply.checked_add(amount) {
            Some(_) => Ok(()),
            None => Err(SynthError::Overflow(format!(
                "minting {} {} overflows total supply {}",
                Units(amount),
                self.symbol,
                Units(self.total_supply)
            ))),
        }
    }

    /// Mint `amount` to `holder`.
    ///
    /// # Errors
    /// Returns `SynthError::Overflow` if total supply would leave the `u128`
    /// range. The book is unchanged on error.
    pub fn credit(&mut self, holder: &Address, amount: Amount) -> Result<(), SynthError> {
        self.check_credit(amount)?;
        *self.balances.entry(*holder).or_insert(0) += amount;
        self.total_supply += amount;
        Ok(())
    }

    /// Burn `amount` from `holder`.
    ///
    /// # Errors
    /// Returns `SynthError::InsufficientBalance` if the holder has less than
    /// `amount`. The book is unchanged on error.
    pub fn debit(&mut self, holder: &Address, amount: Amount) -> Result<(), SynthError> {
        let balance = self.balance_of(holder);
        if amount > balance {
            return Err(SynthError::InsufficientBalance(format!(
                "{:?} holds {} {} but {} is required",
                holder,
                Units(balance),
                self.symbol,
                Units(amount)
            )));
        }
        let remaining = balance - amount;
        if remaining == 0 {
            self.balances.remove(holder);
        } else {
            self.balances.insert(*holder, remaining);
        }
        self.total_supply -= amount;
        Ok(())
    }

    /// Move `amount` from `from` to `to` without changing total supply.
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), SynthError> {
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    /// Number of non-zero holders.
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synthex_core::UNIT;

    fn alice() -> Address {
        Address::from_label("alice")
    }

    fn bob() -> Address {
        Address::from_label("bob")
    }

    #[test]
    fn test_new_book_is_empty() {
        let book = TokenBook::new("sUSD");
        assert_eq!(book.symbol(), "sUSD");
        assert_eq!(book.total_supply(), 0);
        assert_eq!(book.balance_of(&alice()), 0);
    }

    #[test]
    fn test_credit_and_debit() {
        let mut book = TokenBook::new("sUSD");
        book.credit(&alice(), 100 * UNIT).unwrap();
        book.debit(&alice(), 40 * UNIT).unwrap();
        assert_eq!(book.balance_of(&alice()), 60 * UNIT);
        assert_eq!(book.total_supply(), 60 * UNIT);
    }

    #[test]
    fn test_debit_insufficient_leaves_book_unchanged() {
        let mut book = TokenBook::new("sUSD");
        book.credit(&alice(), 10 * UNIT).unwrap();
        let result = book.debit(&alice(), 11 * UNIT);
        assert!(matches!(result, Err(SynthError::InsufficientBalance(_))));
        assert_eq!(book.balance_of(&alice()), 10 * UNIT);
        assert_eq!(book.total_supply(), 10 * UNIT);
    }

    #[test]
    fn test_transfer_preserves_supply() {
        let mut book = TokenBook::new("SNX");
        book.credit(&alice(), 5 * UNIT).unwrap();
        book.transfer(&alice(), &bob(), 5 * UNIT).unwrap();
        assert_eq!(book.balance_of(&alice()), 0);
        assert_eq!(book.balance_of(&bob()), 5 * UNIT);
        assert_eq!(book.total_supply(), 5 * UNIT);
        assert_eq!(book.holder_count(), 1);
    }

    #[test]
    fn test_credit_overflow_leaves_book_unchanged() {
        let mut book = TokenBook::new("SNX");
        book.credit(&alice(), u128::MAX - 1).unwrap();
        assert!(book.check_credit(1).is_ok());
        let result = book.credit(&bob(), 2);
        assert!(matches!(result, Err(SynthError::Overflow(_))));
        assert_eq!(book.balance_of(&bob()), 0);
        assert_eq!(book.total_supply(), u128::MAX - 1);
    }
}
