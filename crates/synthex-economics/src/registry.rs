// crates/synthex-economics/src/registry.rs
//
// Registry of synthetic currencies.
//
// Each registered currency owns a token identity, an enabled flag, and the
// token book whose total supply is the currency's total issued amount.
// Iteration order is the registration order, so sums over currencies are
// deterministic.

use serde::{Deserialize, Serialize};
use synthex_core::{Address, Amount, CurrencyKey, SynthError};

use crate::token::TokenBook;

/// A registered synthetic currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthEntry {
    pub key: CurrencyKey,
    /// Token contract identity.
    pub token: Address,
    pub enabled: bool,
    pub book: TokenBook,
}

/// Ordered set of registered synthetic currencies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrencyRegistry {
    entries: Vec<SynthEntry>,
}

impl CurrencyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new currency, enabled, with an empty book.
    ///
    /// # Errors
    /// Returns `SynthError::DuplicateOrConflicting` if the key or the token
    /// identity is already registered.
    pub fn register(&mut self, key: CurrencyKey, token: Address) -> Result<(), SynthError> {
        if self.entries.iter().any(|e| e.key == key) {
            return Err(SynthError::DuplicateOrConflicting(format!(
                "currency {} is already registered",
                key
            )));
        }
        if self.entries.iter().any(|e| e.token == token) {
            return Err(SynthError::DuplicateOrConflicting(format!(
                "token {:?} is already registered",
                token
            )));
        }
        self.entries.push(SynthEntry {
            key,
            token,
            enabled: true,
            book: TokenBook::new(key.as_str()),
        });
        Ok(())
    }

    /// Remove a currency whose total issued amount is zero.
    ///
    /// Protected keys (base and settlement currencies) are checked by the
    /// caller.
    pub fn remove(&mut self, key: &CurrencyKey) -> Result<SynthEntry, SynthError> {
        let idx = self.position(key)?;
        let issued = self.entries[idx].book.total_supply();
        if issued != 0 {
            return Err(SynthError::DuplicateOrConflicting(format!(
                "currency {} still has {} issued",
                key, issued
            )));
        }
        Ok(self.entries.remove(idx))
    }

    pub fn set_enabled(&mut self, key: &CurrencyKey, enabled: bool) -> Result<(), SynthError> {
        self.get_mut(key)?.enabled = enabled;
        Ok(())
    }

    pub fn contains(&self, key: &CurrencyKey) -> bool {
        self.entries.iter().any(|e| e.key == *key)
    }

    pub fn get(&self, key: &CurrencyKey) -> Result<&SynthEntry, SynthError> {
        self.entries
            .iter()
            .find(|e| e.key == *key)
            .ok_or_else(|| SynthError::UnknownCurrency(key.to_string()))
    }

    pub fn get_mut(&mut self, key: &CurrencyKey) -> Result<&mut SynthEntry, SynthError> {
        self.entries
            .iter_mut()
            .find(|e| e.key == *key)
            .ok_or_else(|| SynthError::UnknownCurrency(key.to_string()))
    }

    /// Look up an entry and fail with `Disabled` if it is switched off.
    pub fn require_enabled(&self, key: &CurrencyKey) -> Result<&SynthEntry, SynthError> {
        let entry = self.get(key)?;
        if !entry.enabled {
            return Err(SynthError::Disabled(format!("currency {} is disabled", key)));
        }
        Ok(entry)
    }

    /// Total issued amount of `key`, in its own units.
    pub fn total_issued(&self, key: &CurrencyKey) -> Result<Amount, SynthError> {
        Ok(self.get(key)?.book.total_supply())
    }

    /// Balance of `holder` in currency `key`.
    pub fn balance_of(&self, key: &CurrencyKey, holder: &Address) -> Result<Amount, SynthError> {
        Ok(self.get(key)?.book.balance_of(holder))
    }

    /// Keys of currencies with a non-zero total issued amount.
    pub fn outstanding(&self) -> impl Iterator<Item = (CurrencyKey, Amount)> + '_ {
        self.entries
            .iter()
            .map(|e| (e.key, e.book.total_supply()))
            .filter(|(_, issued)| *issued > 0)
    }

    pub fn keys(&self) -> impl Iterator<Item = CurrencyKey> + '_ {
        self.entries.iter().map(|e| e.key)
    }

    pub fn entries(&self) -> &[SynthEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &CurrencyKey) -> Result<usize, SynthError> {
        self.entries
            .iter()
            .position(|e| e.key == *key)
            .ok_or_else(|| SynthError::UnknownCurrency(key.to_string()))
    }
}
