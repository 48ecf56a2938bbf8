// crates/synthex-cli/src/scenario.rs
//
// Scenario files: a start time, role labels, and a list of steps replayed
// against a fresh `SynthSystem`.
//
// Participants are named by label; each label maps to the address
// `Address::from_label(label)`. Amounts are decimal strings ("199.4").
// Replay stops at the first failing step.

use std::fs;

use serde::Deserialize;
use synthex_core::decimal::{as_units, Amount};
use synthex_core::{Address, CurrencyKey, Roles, SynthError};
use synthex_economics::{SynthSystem, SystemConfig};
use thiserror::Error;

/// Errors raised while loading or replaying a scenario.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("could not read scenario {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scenario: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("step {index} ({action}) failed: {source}")]
    Step {
        index: usize,
        action: &'static str,
        #[source]
        source: SynthError,
    },

    #[error(transparent)]
    Synth(#[from] SynthError),
}

/// Labels of the three privileged roles.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleLabels {
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default = "default_oracle")]
    pub oracle: String,
    #[serde(default = "default_priority_fee_oracle")]
    pub priority_fee_oracle: String,
}

fn default_owner() -> String {
    "owner".to_string()
}

fn default_oracle() -> String {
    "oracle".to_string()
}

fn default_priority_fee_oracle() -> String {
    "gas-oracle".to_string()
}

impl Default for RoleLabels {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            oracle: default_oracle(),
            priority_fee_oracle: default_priority_fee_oracle(),
        }
    }
}

impl RoleLabels {
    pub fn roles(&self) -> Roles {
        Roles {
            owner: Address::from_label(&self.owner),
            oracle: Address::from_label(&self.oracle),
            priority_fee_oracle: Address::from_label(&self.priority_fee_oracle),
        }
    }
}

/// One price in an `update_rates` step.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceQuote {
    pub currency: CurrencyKey,
    #[serde(with = "as_units")]
    pub price: Amount,
}

/// A single scenario step. Role-gated steps run as the matching role.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Advance {
        seconds: u64,
    },
    SetTime {
        timestamp: u64,
    },
    Register {
        currency: CurrencyKey,
    },
    Remove {
        currency: CurrencyKey,
    },
    SetCurrencyEnabled {
        currency: CurrencyKey,
        enabled: bool,
    },
    SetInversePricing {
        currency: CurrencyKey,
        #[serde(with = "as_units")]
        entry_point: Amount,
        #[serde(with = "as_units")]
        upper_limit: Amount,
        #[serde(with = "as_units")]
        lower_limit: Amount,
        #[serde(default)]
        freeze: bool,
        #[serde(default)]
        freeze_at_upper: bool,
    },
    /// Prices are stamped with the current clock value.
    UpdateRates {
        prices: Vec<PriceQuote>,
    },
    TransferCollateral {
        from: String,
        to: String,
        #[serde(with = "as_units")]
        amount: Amount,
    },
    Issue {
        participant: String,
        currency: CurrencyKey,
        #[serde(with = "as_units")]
        amount: Amount,
    },
    IssueMax {
        participant: String,
        currency: CurrencyKey,
    },
    Burn {
        participant: String,
        currency: CurrencyKey,
        #[serde(with = "as_units")]
        amount: Amount,
    },
    Exchange {
        participant: String,
        from: CurrencyKey,
        to: CurrencyKey,
        #[serde(with = "as_units")]
        amount: Amount,
        #[serde(default)]
        priority_fee: u64,
    },
    Mint {
        minter: String,
    },
    SetExchangeEnabled {
        enabled: bool,
    },
    SetProtectionCircuit {
        enabled: bool,
    },
    SetPriorityFeeCeiling {
        ceiling: u64,
    },
}

impl Step {
    /// Name of the step as written in scenario files.
    pub fn action(&self) -> &'static str {
        match self {
            Step::Advance { .. } => "advance",
            Step::SetTime { .. } => "set_time",
            Step::Register { .. } => "register",
            Step::Remove { .. } => "remove",
            Step::SetCurrencyEnabled { .. } => "set_currency_enabled",
            Step::SetInversePricing { .. } => "set_inverse_pricing",
            Step::UpdateRates { .. } => "update_rates",
            Step::TransferCollateral { .. } => "transfer_collateral",
            Step::Issue { .. } => "issue",
            Step::IssueMax { .. } => "issue_max",
            Step::Burn { .. } => "burn",
            Step::Exchange { .. } => "exchange",
            Step::Mint { .. } => "mint",
            Step::SetExchangeEnabled { .. } => "set_exchange_enabled",
            Step::SetProtectionCircuit { .. } => "set_protection_circuit",
            Step::SetPriorityFeeCeiling { .. } => "set_priority_fee_ceiling",
        }
    }

    /// Participant labels the step touches.
    fn participants(&self) -> Vec<&str> {
        match self {
            Step::TransferCollateral { from, to, .. } => vec![from.as_str(), to.as_str()],
            Step::Issue { participant, .. }
            | Step::IssueMax { participant, .. }
            | Step::Burn { participant, .. }
            | Step::Exchange { participant, .. } => vec![participant.as_str()],
            Step::Mint { minter } => vec![minter.as_str()],
            _ => Vec::new(),
        }
    }

    fn apply(&self, sys: &mut SynthSystem, roles: &Roles) -> Result<(), SynthError> {
        match self {
            Step::Advance { seconds } => {
                let now = sys.now().saturating_add(*seconds);
                sys.set_time(now)
            }
            Step::SetTime { timestamp } => sys.set_time(*timestamp),
            Step::Register { currency } => {
                sys.register_currency(&roles.owner, *currency, Address::from_label(currency.as_str()))
            }
            Step::Remove { currency } => sys.remove_currency(&roles.owner, currency),
            Step::SetCurrencyEnabled { currency, enabled } => {
                sys.set_currency_enabled(&roles.owner, currency, *enabled)
            }
            Step::SetInversePricing {
                currency,
                entry_point,
                upper_limit,
                lower_limit,
                freeze,
                freeze_at_upper,
            } => sys.set_inverse_pricing(
                &roles.owner,
                *currency,
                *entry_point,
                *upper_limit,
                *lower_limit,
                *freeze,
                *freeze_at_upper,
            ),
            Step::UpdateRates { prices } => {
                let keys: Vec<CurrencyKey> = prices.iter().map(|p| p.currency).collect();
                let values: Vec<Amount> = prices.iter().map(|p| p.price).collect();
                let now = sys.now();
                sys.update_rates(&roles.oracle, &keys, &values, now)
            }
            Step::TransferCollateral { from, to, amount } => sys.transfer_collateral(
                &Address::from_label(from),
                &Address::from_label(to),
                *amount,
            ),
            Step::Issue {
                participant,
                currency,
                amount,
            } => sys.issue(&Address::from_label(participant), currency, *amount),
            Step::IssueMax {
                participant,
                currency,
            } => sys
                .issue_max(&Address::from_label(participant), currency)
                .map(|_| ()),
            Step::Burn {
                participant,
                currency,
                amount,
            } => sys
                .burn(&Address::from_label(participant), currency, *amount)
                .map(|_| ()),
            Step::Exchange {
                participant,
                from,
                to,
                amount,
                priority_fee,
            } => sys
                .exchange(
                    &Address::from_label(participant),
                    from,
                    *amount,
                    to,
                    Amount::from(*priority_fee),
                )
                .map(|_| ()),
            Step::Mint { minter } => sys.mint(&Address::from_label(minter)).map(|_| ()),
            Step::SetExchangeEnabled { enabled } => sys.set_exchange_enabled(&roles.owner, *enabled),
            Step::SetProtectionCircuit { enabled } => {
                sys.set_protection_circuit(&roles.oracle, *enabled)
            }
            Step::SetPriorityFeeCeiling { ceiling } => {
                sys.set_priority_fee_ceiling(&roles.priority_fee_oracle, Amount::from(*ceiling))
            }
        }
    }
}

/// A scenario file.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    /// Clock value the system starts at.
    pub start: u64,
    #[serde(default)]
    pub roles: RoleLabels,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// The system after a replay, with the participant labels seen in order.
pub struct Replay {
    pub system: SynthSystem,
    pub participants: Vec<String>,
}

impl Scenario {
    /// Load a scenario from the TOML file at `path`.
    pub fn load(path: &str) -> Result<Self, ReplayError> {
        let contents = fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ReplayError> {
        Ok(toml::from_str(contents)?)
    }

    /// Participant labels in order of first appearance.
    pub fn participants(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        for label in self.steps.iter().flat_map(Step::participants) {
            if !labels.iter().any(|l| l == label) {
                labels.push(label.to_string());
            }
        }
        labels
    }

    /// Build a system from `config` and apply every step in order.
    pub fn replay(&self, config: SystemConfig) -> Result<Replay, ReplayError> {
        let roles = self.roles.roles();
        let mut system = SynthSystem::builder(config, roles.clone())
            .time(self.start)
            .build()?;

        for (index, step) in self.steps.iter().enumerate() {
            step.apply(&mut system, &roles)
                .map_err(|source| ReplayError::Step {
                    index,
                    action: step.action(),
                    source,
                })?;
            tracing::debug!(index, action = step.action(), "Step applied");
        }
        tracing::info!(
            scenario = %self.name,
            steps = self.steps.len(),
            events = system.events().len(),
            "Scenario replayed"
        );

        Ok(Replay {
            system,
            participants: self.participants(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synthex_core::UNIT;

    const BASIC: &str = r#"
name = "basic"
start = 1600000000

[[steps]]
action = "register"
currency = "sAUD"

[[steps]]
action = "update_rates"
prices = [
    { currency = "SNX", price = "0.1" },
    { currency = "XDR", price = "1" },
    { currency = "sAUD", price = "0.5" },
]

[[steps]]
action = "transfer_collateral"
from = "owner"
to = "alice"
amount = "100000"

[[steps]]
action = "issue"
participant = "alice"
currency = "sUSD"
amount = "1000"

[[steps]]
action = "exchange"
participant = "alice"
from = "sUSD"
to = "sAUD"
amount = "100"
"#;

    fn key(s: &str) -> CurrencyKey {
        CurrencyKey::new(s).unwrap()
    }

    #[test]
    fn test_parse_steps() {
        let scenario = Scenario::parse(BASIC).unwrap();
        assert_eq!(scenario.name, "basic");
        assert_eq!(scenario.steps.len(), 5);
        assert_eq!(scenario.steps[4].action(), "exchange");
        assert_eq!(scenario.roles.oracle, "oracle");
        assert_eq!(scenario.participants(), vec!["owner".to_string(), "alice".to_string()]);
    }

    #[test]
    fn test_replay_basic() {
        let replay = Scenario::parse(BASIC)
            .unwrap()
            .replay(SystemConfig::default())
            .unwrap();
        let alice = Address::from_label("alice");
        let sys = &replay.system;
        assert_eq!(sys.synth_balance(&key("sUSD"), &alice).unwrap(), 900 * UNIT);
        assert_eq!(sys.synth_balance(&key("sAUD"), &alice).unwrap(), 1994 * UNIT / 10);
        assert_eq!(sys.total_system_debt().unwrap(), 9997 * UNIT / 10);
    }

    #[test]
    fn test_replay_reports_failing_step() {
        let text = r#"
start = 1600000000

[[steps]]
action = "issue"
participant = "alice"
currency = "sUSD"
amount = "1"
"#;
        let err = Scenario::parse(text)
            .unwrap()
            .replay(SystemConfig::default())
            .err()
            .unwrap();
        match err {
            ReplayError::Step { index, action, .. } => {
                assert_eq!(index, 0);
                assert_eq!(action, "issue");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_bundled_scenario_replays() {
        let scenario = Scenario::parse(include_str!("../scenarios/swing_trade.toml")).unwrap();
        let replay = scenario.replay(SystemConfig::default()).unwrap();
        let sys = &replay.system;
        let bob = Address::from_label("bob");
        assert!(sys.rates().is_frozen(&key("iBTC")));
        assert_eq!(sys.debt_balance_of(&bob, &key("sUSD")).unwrap(), 0);
        assert_eq!(sys.ledger().issuer_count(), 1);
        assert_eq!(replay.participants, vec!["owner", "alice", "bob"]);
    }

    #[test]
    fn test_unknown_action_is_a_parse_error() {
        let text = "start = 1\n[[steps]]\naction = \"liquidate\"\n";
        assert!(matches!(Scenario::parse(text), Err(ReplayError::Parse(_))));
    }
}
