// crates/synthex-economics/src/fee_pool.rs
//
// In-memory fee pool.
//
// Receives exchange fee values, already converted to the settlement
// currency. Fees are a record for distribution; no synth is minted for them.
// Claiming and per-period rollover are not modelled.

use serde::{Deserialize, Serialize};
use synthex_core::{Amount, FeeSink};

/// Accumulated exchange fees.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeePool {
    fees_to_distribute: Amount,
    /// Number of fees recorded since creation.
    fee_count: u64,
}

impl FeePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fee_count(&self) -> u64 {
        self.fee_count
    }
}

impl FeeSink for FeePool {
    fn record_fee(&mut self, amount: Amount) {
        self.fees_to_distribute = self.fees_to_distribute.saturating_add(amount);
        self.fee_count += 1;
    }

    fn fees_to_distribute(&self) -> Amount {
        self.fees_to_distribute
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synthex_core::UNIT;

    #[test]
    fn test_new_pool_is_empty() {
        let pool = FeePool::new();
        assert_eq!(pool.fees_to_distribute(), 0);
        assert_eq!(pool.fee_count(), 0);
    }

    #[test]
    fn test_record_fees() {
        let mut pool = FeePool::new();
        pool.record_fee(3 * UNIT);
        pool.record_fee(UNIT / 2);
        assert_eq!(pool.fees_to_distribute(), 3 * UNIT + UNIT / 2);
        assert_eq!(pool.fee_count(), 2);
    }
}
