// crates/synthex-economics/src/rewards.rs
//
// Distribution of newly minted collateral supply.
//
// Each mint's distributable supply (after the minter reward) is split as
// follows:
//   1. Fixed-amount recipients are paid in registration order, each capped
//      at whatever is left.
//   2. The remainder goes to the reward escrow, which later vests it to
//      stakers.
// The payouts always sum to the distributed amount.

use serde::{Deserialize, Serialize};
use synthex_core::{Address, Amount, RewardsDistributor, SynthError};

/// A fixed-amount reward recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRecipient {
    pub destination: Address,
    pub amount: Amount,
}

/// Fixed recipients plus a remainder destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardsDistribution {
    recipients: Vec<RewardRecipient>,
    /// Receives everything the fixed recipients do not.
    reward_escrow: Address,
}

impl RewardsDistribution {
    pub fn new(reward_escrow: Address) -> Self {
        Self {
            recipients: Vec::new(),
            reward_escrow,
        }
    }

    pub fn reward_escrow(&self) -> Address {
        self.reward_escrow
    }

    pub fn recipients(&self) -> &[RewardRecipient] {
        &self.recipients
    }

    /// Add a fixed-amount recipient.
    ///
    /// # Errors
    /// Returns `SynthError::InvalidParameter` for a zero destination or amount.
    pub fn add_recipient(&mut self, destination: Address, amount: Amount) -> Result<(), SynthError> {
        if destination.is_zero() || amount == 0 {
            return Err(SynthError::InvalidParameter(
                "reward recipient needs a destination and a non-zero amount".to_string(),
            ));
        }
        self.recipients.push(RewardRecipient { destination, amount });
        Ok(())
    }

    /// Remove the recipient at `index`.
    pub fn remove_recipient(&mut self, index: usize) -> Result<RewardRecipient, SynthError> {
        if index >= self.recipients.len() {
            return Err(SynthError::InvalidParameter(format!(
                "no reward recipient at index {}",
                index
            )));
        }
        Ok(self.recipients.remove(index))
    }
}

impl RewardsDistributor for RewardsDistribution {
    fn distribute_rewards(&mut self, amount: Amount) -> Vec<(Address, Amount)> {
        let mut remaining = amount;
        let mut payouts = Vec::with_capacity(self.recipients.len() + 1);
        for recipient in &self.recipients {
            let paid = recipient.amount.min(remaining);
            if paid == 0 {
                break;
            }
            payouts.push((recipient.destination, paid));
            remaining -= paid;
        }
        if remaining > 0 {
            payouts.push((self.reward_escrow, remaining));
        }
        payouts
    }
}
