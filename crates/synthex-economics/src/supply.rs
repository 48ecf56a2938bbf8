// crates/synthex-economics/src/supply.rs
//
// Collateral supply schedule.
//
// New collateral is minted weekly:
// - Weeks 1 to 39: a flat INITIAL_WEEKLY_SUPPLY (75M / 52).
// - Weeks 40 to 234: the flat amount decayed by DECAY_RATE per week,
//   compounded from week 40.
// - From week 235: TERMINAL_SUPPLY_RATE_ANNUAL of total supply per year,
//   compounded weekly over all remaining weeks in one step.
//
// A mint is allowed once at least one week has passed since the last one.
// After a mint, the next mint time is aligned to the week boundary plus a
// one-day buffer, so late mints do not shift the schedule.

use serde::{Deserialize, Serialize};
use synthex_core::decimal::{multiply_decimal, pow_decimal, Amount, UNIT};
use synthex_core::{SynthError, Units};

/// Seconds in one mint period.
pub const WEEK: u64 = 7 * 24 * 60 * 60;

/// Delay after a week boundary before the next mint opens.
pub const MINT_BUFFER: u64 = 24 * 60 * 60;

/// Unix timestamp of week 0 (2019-03-06).
pub const INFLATION_START_DATE: u64 = 1_551_830_400;

/// 75,000,000 / 52 units.
pub const INITIAL_WEEKLY_SUPPLY: Amount = 75_000_000 * UNIT / 52;

/// First week whose supply is decayed.
pub const SUPPLY_DECAY_START: u64 = 40;

/// Last week of the decaying schedule.
pub const SUPPLY_DECAY_END: u64 = 234;

/// Weekly decay: 1.25%.
pub const DECAY_RATE: Amount = 12_500_000_000_000_000;

/// Terminal annual inflation: 2.5%.
pub const TERMINAL_SUPPLY_RATE_ANNUAL: Amount = 25_000_000_000_000_000;

/// Upper bound on the minter reward.
pub const MAX_MINTER_REWARD: Amount = 200 * UNIT;

/// Supply minted in decayed week `decay_count` (1 for week 40).
pub fn token_decay_supply_for_week(decay_count: u64) -> Result<Amount, SynthError> {
    let effective_decay = pow_decimal(UNIT - DECAY_RATE, decay_count)?;
    multiply_decimal(INITIAL_WEEKLY_SUPPLY, effective_decay)
}

/// Terminal inflation on `total_supply` compounded over `weeks`.
pub fn terminal_inflation_supply(total_supply: Amount, weeks: u64) -> Result<Amount, SynthError> {
    let weekly_rate = TERMINAL_SUPPLY_RATE_ANNUAL / 52;
    let compound = pow_decimal(UNIT + weekly_rate, weeks)?;
    multiply_decimal(total_supply, compound - UNIT)
}

/// Mint timing state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplySchedule {
    inflation_start: u64,
    /// 0 until the first mint.
    last_mint_event: u64,
    /// Weeks minted so far.
    week_counter: u64,
    minter_reward: Amount,
}

impl SupplySchedule {
    pub fn new(inflation_start: u64, minter_reward: Amount) -> Self {
        Self {
            inflation_start,
            last_mint_event: 0,
            week_counter: 0,
            minter_reward,
        }
    }

    pub fn inflation_start(&self) -> u64 {
        self.inflation_start
    }

    pub fn last_mint_event(&self) -> u64 {
        self.last_mint_event
    }

    pub fn week_counter(&self) -> u64 {
        self.week_counter
    }

    /// Timestamp at which terminal inflation begins.
    pub fn terminal_start(&self) -> u64 {
        self.inflation_start + SUPPLY_DECAY_END * WEEK
    }

    pub fn minter_reward(&self) -> Amount {
        self.minter_reward
    }

    pub fn set_minter_reward(&mut self, reward: Amount) -> Result<(), SynthError> {
        if reward > MAX_MINTER_REWARD {
            return Err(SynthError::InvalidParameter(format!(
                "minter reward {} exceeds the maximum {}",
                Units(reward),
                Units(MAX_MINTER_REWARD)
            )));
        }
        self.minter_reward = reward;
        Ok(())
    }

    /// Whole weeks elapsed since the last mint (or since the start).
    pub fn weeks_since_last_issuance(&self, now: u64) -> u64 {
        let reference = if self.last_mint_event > 0 {
            self.last_mint_event
        } else {
            self.inflation_start
        };
        now.saturating_sub(reference) / WEEK
    }

    pub fn is_mintable(&self, now: u64) -> bool {
        now.saturating_sub(self.last_mint_event) >= WEEK
    }

    /// Supply that may be minted at `now`, given the current total supply.
    pub fn mintable_supply(&self, now: u64, total_supply: Amount) -> Result<Amount, SynthError> {
        if !self.is_mintable(now) {
            return Ok(0);
        }
        let mut remaining_weeks = self.weeks_since_last_issuance(now);
        let mut current_week = self.week_counter;
        let mut total: Amount = 0;

        while remaining_weeks > 0 {
            current_week += 1;
            let minted = if current_week < SUPPLY_DECAY_START {
                remaining_weeks -= 1;
                INITIAL_WEEKLY_SUPPLY
            } else if current_week <= SUPPLY_DECAY_END {
                remaining_weeks -= 1;
                token_decay_supply_for_week(current_week - (SUPPLY_DECAY_START - 1))?
            } else {
                let running_supply = total_supply
                    .checked_add(total)
                    .ok_or_else(|| SynthError::Overflow("collateral supply".to_string()))?;
                let minted = terminal_inflation_supply(running_supply, remaining_weeks)?;
                remaining_weeks = 0;
                minted
            };
            total = total
                .checked_add(minted)
                .ok_or_else(|| SynthError::Overflow("mintable supply".to_string()))?;
        }
        Ok(total)
    }

    /// Record a mint at `now`. Returns the number of weeks minted.
    pub fn record_mint(&mut self, now: u64) -> u64 {
        let weeks = self.weeks_since_last_issuance(now);
        self.week_counter += weeks;
        self.last_mint_event = self.inflation_start + self.week_counter * WEEK + MINT_BUFFER;
        weeks
    }
}
