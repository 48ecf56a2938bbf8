// crates/synthex-cli/src/commands/schedule.rs
//
// `synthex schedule`: print the weekly collateral supply schedule, minting
// once per week at the earliest allowed time.

use chrono::DateTime;
use clap::Args;
use serde::Serialize;
use synthex_core::{Amount, SynthError, Units};
use synthex_economics::supply::MINT_BUFFER;
use synthex_economics::{SupplySchedule, SystemConfig, WEEK};
use tabled::Tabled;

use crate::output::{format_json, print_section, OutputFormat};

/// Arguments of the schedule command.
#[derive(Debug, Args)]
pub struct ScheduleCmd {
    /// Number of weeks to print.
    #[arg(long, default_value_t = 52)]
    pub weeks: u64,

    /// First week to print. Earlier weeks are still minted.
    #[arg(long, default_value_t = 1)]
    pub from_week: u64,
}

/// A row in the schedule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
struct ScheduleRow {
    #[tabled(rename = "Week")]
    week: u64,
    #[tabled(rename = "Mint date")]
    date: String,
    #[tabled(rename = "Minted")]
    minted: String,
    #[tabled(rename = "Total supply")]
    total_supply: String,
}

/// Run the schedule command.
pub fn run(cmd: &ScheduleCmd, config: SystemConfig, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let rows = schedule_rows(&config, cmd.from_week, cmd.weeks)?;
    match format {
        OutputFormat::Json => println!("{}", format_json(&rows)),
        OutputFormat::Table => {
            let title = format!(
                "Supply schedule from {} (initial supply {}, minter reward {})",
                format_date(config.inflation_start),
                Units(config.initial_collateral_supply),
                Units(config.minter_reward)
            );
            print_section(&title, &rows);
        }
    }
    Ok(())
}

/// Mint every week up to `from_week + weeks - 1` and keep the rows from
/// `from_week` on.
fn schedule_rows(config: &SystemConfig, from_week: u64, weeks: u64) -> Result<Vec<ScheduleRow>, SynthError> {
    let mut schedule = SupplySchedule::new(config.inflation_start, config.minter_reward);
    let mut total_supply: Amount = config.initial_collateral_supply;
    let mut rows = Vec::new();

    let last_week = from_week.saturating_add(weeks).saturating_sub(1);
    for week in 1..=last_week {
        let now = config.inflation_start + week * WEEK + MINT_BUFFER;
        let minted = schedule.mintable_supply(now, total_supply)?;
        schedule.record_mint(now);
        total_supply = total_supply
            .checked_add(minted)
            .ok_or_else(|| SynthError::Overflow("collateral supply".to_string()))?;
        if week >= from_week {
            rows.push(ScheduleRow {
                week,
                date: format_date(now),
                minted: Units(minted).to_string(),
                total_supply: Units(total_supply).to_string(),
            });
        }
    }
    Ok(rows)
}

fn format_date(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}
