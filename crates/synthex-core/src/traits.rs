// crates/synthex-core/src/traits.rs

use crate::decimal::Amount;
use crate::identity::Address;

/// Read-only view of collateral held outside the participant's wallet.
///
/// Implemented by the escrow and reward-escrow books in synthex-economics.
pub trait CollateralSource: Send + Sync {
    /// Collateral-asset balance locked for `holder`.
    fn balance_of(&self, holder: &Address) -> Amount;
}

/// Receiver of exchange fees, denominated in the settlement currency.
///
/// The debt engine reports each fee once; period rollover and claiming are
/// the implementor's concern.
pub trait FeeSink: Send + Sync {
    fn record_fee(&mut self, amount: Amount);

    /// Fees recorded and not yet paid out.
    fn fees_to_distribute(&self) -> Amount;
}

/// Splits newly minted collateral supply among reward recipients.
pub trait RewardsDistributor: Send + Sync {
    /// Allocate `amount` and return the resulting (recipient, amount) payouts.
    /// The payouts must sum to `amount`.
    fn distribute_rewards(&mut self, amount: Amount) -> Vec<(Address, Amount)>;
}
