// crates/synthex-core/src/access.rs
//
// Role table for owner- and oracle-gated actions. Each setting has exactly
// one authorized identity.

use serde::{Deserialize, Serialize};

use crate::error::SynthError;
use crate::identity::Address;

/// The identities allowed to perform privileged actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roles {
    /// Configuration owner: registry, switches, ratios, inverse pricing.
    pub owner: Address,
    /// Rate feed submitter; also toggles the protection circuit.
    pub oracle: Address,
    /// Sets the priority-fee ceiling for exchanges.
    pub priority_fee_oracle: Address,
}

impl Roles {
    pub fn require_owner(&self, caller: &Address) -> Result<(), SynthError> {
        Self::require(caller, &self.owner, "owner")
    }

    pub fn require_oracle(&self, caller: &Address) -> Result<(), SynthError> {
        Self::require(caller, &self.oracle, "oracle")
    }

    pub fn require_priority_fee_oracle(&self, caller: &Address) -> Result<(), SynthError> {
        Self::require(caller, &self.priority_fee_oracle, "priority fee oracle")
    }

    fn require(caller: &Address, expected: &Address, role: &str) -> Result<(), SynthError> {
        if caller != expected {
            return Err(SynthError::Unauthorized(format!(
                "{:?} is not the {}",
                caller, role
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_checks() {
        let roles = Roles {
            owner: Address::from_label("owner"),
            oracle: Address::from_label("oracle"),
            priority_fee_oracle: Address::from_label("gas"),
        };
        assert!(roles.require_owner(&Address::from_label("owner")).is_ok());
        assert!(matches!(
            roles.require_owner(&Address::from_label("oracle")),
            Err(SynthError::Unauthorized(_))
        ));
        assert!(roles.require_oracle(&Address::from_label("oracle")).is_ok());
        assert!(roles
            .require_priority_fee_oracle(&Address::from_label("owner"))
            .is_err());
    }
}
