// crates/synthex-cli/src/commands/replay.rs
//
// `synthex replay <scenario>`: replay a scenario file and print the events
// it produced and the final balances of every participant.

use std::collections::HashMap;

use clap::Args;
use serde::Serialize;
use synthex_core::{Address, FeeSink, Units};
use synthex_economics::{SynthEvent, SynthSystem, SystemConfig};
use tabled::Tabled;

use crate::output::{format_json, print_section, OutputFormat};
use crate::scenario::Scenario;

/// Arguments of the replay command.
#[derive(Debug, Args)]
pub struct ReplayCmd {
    /// Path to the scenario TOML file.
    pub scenario: String,

    /// Skip the event log and print balances only.
    #[arg(long)]
    pub balances_only: bool,
}

/// A row in the event table.
#[derive(Debug, Serialize, Tabled)]
struct EventRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Event")]
    event: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

/// A row in the balance table.
#[derive(Debug, Serialize, Tabled)]
struct BalanceRow {
    #[tabled(rename = "Participant")]
    participant: String,
    #[tabled(rename = "Collateral")]
    collateral: String,
    #[tabled(rename = "Debt")]
    debt: String,
    #[tabled(rename = "Synths")]
    synths: String,
}

/// Everything printed in JSON mode.
#[derive(Debug, Serialize)]
struct ReplayReport<'a> {
    scenario: &'a str,
    clock: u64,
    total_debt: Option<String>,
    fees_to_distribute: String,
    balances: Vec<BalanceRow>,
    events: &'a [SynthEvent],
}

/// Run the replay command.
pub fn run(cmd: &ReplayCmd, config: SystemConfig, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = Scenario::load(&cmd.scenario)?;
    let replay = scenario.replay(config)?;
    let sys = &replay.system;

    let balances: Vec<BalanceRow> = replay
        .participants
        .iter()
        .map(|label| balance_row(sys, label))
        .collect();
    let total_debt = sys.total_system_debt().ok().map(|d| Units(d).to_string());
    let fees = Units(sys.fee_pool().fees_to_distribute()).to_string();

    match format {
        OutputFormat::Json => {
            let report = ReplayReport {
                scenario: &scenario.name,
                clock: sys.now(),
                total_debt,
                fees_to_distribute: fees,
                balances,
                events: sys.events(),
            };
            println!("{}", format_json(&report));
        }
        OutputFormat::Table => {
            let title = if scenario.name.is_empty() {
                cmd.scenario.as_str()
            } else {
                scenario.name.as_str()
            };
            println!("Scenario: {}  |  Steps: {}  |  Clock: {}", title, scenario.steps.len(), sys.now());
            println!();

            if !cmd.balances_only {
                let labels = address_labels(&scenario, &replay.participants);
                let rows: Vec<EventRow> = sys
                    .events()
                    .iter()
                    .enumerate()
                    .map(|(index, event)| event_row(index, event, &labels))
                    .collect();
                print_section("Events", &rows);
            }

            print_section(&format!("Balances ({})", sys.base_currency()), &balances);
            println!(
                "Total debt: {}  |  Fees to distribute: {} {}",
                total_debt.unwrap_or_else(|| "unavailable (stale rates)".to_string()),
                fees,
                sys.settlement_currency()
            );
        }
    }

    Ok(())
}

fn balance_row(sys: &SynthSystem, label: &str) -> BalanceRow {
    let address = Address::from_label(label);
    let debt = match sys.debt_balance_of(&address, &sys.base_currency()) {
        Ok(debt) => Units(debt).to_string(),
        Err(e) => format!("unavailable ({})", e),
    };
    let synths: Vec<String> = sys
        .registry()
        .entries()
        .iter()
        .filter_map(|entry| {
            let balance = entry.book.balance_of(&address);
            (balance > 0).then(|| format!("{} {}", Units(balance), entry.key))
        })
        .collect();
    BalanceRow {
        participant: label.to_string(),
        collateral: Units(sys.collateral(&address)).to_string(),
        debt,
        synths: if synths.is_empty() {
            "--".to_string()
        } else {
            synths.join(", ")
        },
    }
}

/// Hex address to label, for the scenario's roles and participants.
fn address_labels(scenario: &Scenario, participants: &[String]) -> HashMap<String, String> {
    let roles = &scenario.roles;
    let mut labels = HashMap::new();
    for label in participants
        .iter()
        .chain([&roles.owner, &roles.oracle, &roles.priority_fee_oracle])
    {
        labels.insert(String::from(Address::from_label(label)), label.clone());
    }
    labels
}

/// Flatten an event into its name and `field=value` pairs.
fn event_row(index: usize, event: &SynthEvent, labels: &HashMap<String, String>) -> EventRow {
    let mut value = serde_json::to_value(event).unwrap_or(serde_json::Value::Null);
    let name = value
        .get("event")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();
    let detail = match value.as_object_mut() {
        Some(fields) => {
            fields.remove("event");
            fields
                .iter()
                .map(|(field, v)| format!("{}={}", field, display_value(v, labels)))
                .collect::<Vec<_>>()
                .join(" ")
        }
        None => String::new(),
    };
    EventRow {
        index,
        event: name,
        detail,
    }
}

fn display_value(value: &serde_json::Value, labels: &HashMap<String, String>) -> String {
    match value {
        serde_json::Value::String(s) => labels.get(s).cloned().unwrap_or_else(|| s.clone()),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| display_value(item, labels))
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}
