// crates/synthex-economics/src/system.rs
//
// The system facade.
//
// `SynthSystem` owns every piece of protocol state: rates, the currency
// registry, the debt ledger, the collateral book, the supply schedule, and
// the collaborators behind the core traits. Operations run one at a time
// through `&mut self`; each validates everything it needs before its first
// mutation, so a failed operation leaves no trace.
//
// Exchange and issuance operations live in exchange.rs and issuance.rs.

use synthex_core::{
    Address, Amount, CollateralSource, CurrencyKey, FeeSink, RewardsDistributor, Roles, SynthError,
    Units,
};

use crate::config::SystemConfig;
use crate::debt_ledger::DebtLedger;
use crate::escrow::EscrowBook;
use crate::events::SynthEvent;
use crate::exchange::ExchangeSettings;
use crate::fee_pool::FeePool;
use crate::issuance::IssuanceSettings;
use crate::oracle::{PricingKind, RateTable};
use crate::registry::CurrencyRegistry;
use crate::rewards::RewardsDistribution;
use crate::supply::SupplySchedule;
use crate::token::TokenBook;

/// Label of the default reward escrow identity.
const REWARD_ESCROW_LABEL: &str = "reward-escrow";

/// Multi-currency synthetic issuance system.
pub struct SynthSystem {
    pub(crate) roles: Roles,
    pub(crate) now: u64,
    pub(crate) base: CurrencyKey,
    pub(crate) settlement: CurrencyKey,
    pub(crate) collateral_key: CurrencyKey,
    pub(crate) rates: RateTable,
    pub(crate) registry: CurrencyRegistry,
    pub(crate) ledger: DebtLedger,
    pub(crate) collateral: TokenBook,
    pub(crate) escrow: Box<dyn CollateralSource>,
    pub(crate) reward_escrow: Box<dyn CollateralSource>,
    pub(crate) fee_pool: Box<dyn FeeSink>,
    pub(crate) rewards: Box<dyn RewardsDistributor>,
    pub(crate) supply: SupplySchedule,
    pub(crate) exchange: ExchangeSettings,
    pub(crate) issuance: IssuanceSettings,
    pub(crate) events: Vec<SynthEvent>,
}

/// Builder for `SynthSystem`.
pub struct SynthSystemBuilder {
    config: SystemConfig,
    roles: Roles,
    now: u64,
    genesis: Option<Address>,
    escrow: Box<dyn CollateralSource>,
    reward_escrow: Box<dyn CollateralSource>,
    fee_pool: Box<dyn FeeSink>,
    rewards: Box<dyn RewardsDistributor>,
}

impl SynthSystemBuilder {
    /// Clock value at construction.
    pub fn time(mut self, now: u64) -> Self {
        self.now = now;
        self
    }

    /// Account credited with the initial collateral supply. Defaults to the
    /// owner.
    pub fn genesis(mut self, account: Address) -> Self {
        self.genesis = Some(account);
        self
    }

    pub fn escrow(mut self, escrow: impl CollateralSource + 'static) -> Self {
        self.escrow = Box::new(escrow);
        self
    }

    pub fn reward_escrow(mut self, reward_escrow: impl CollateralSource + 'static) -> Self {
        self.reward_escrow = Box::new(reward_escrow);
        self
    }

    pub fn fee_pool(mut self, fee_pool: impl FeeSink + 'static) -> Self {
        self.fee_pool = Box::new(fee_pool);
        self
    }

    pub fn rewards(mut self, rewards: impl RewardsDistributor + 'static) -> Self {
        self.rewards = Box::new(rewards);
        self
    }

    /// Validate the configuration and assemble the system.
    ///
    /// The base and settlement currencies are registered up front.
    pub fn build(self) -> Result<SynthSystem, SynthError> {
        let config = self.config;
        config.validate()?;

        let mut registry = CurrencyRegistry::new();
        for key in [config.base_currency, config.settlement_currency] {
            registry.register(key, Address::from_label(key.as_str()))?;
        }

        let mut collateral = TokenBook::new(config.collateral_currency.as_str());
        let genesis = self.genesis.unwrap_or(self.roles.owner);
        collateral.credit(&genesis, config.initial_collateral_supply)?;

        tracing::info!(
            base = %config.base_currency,
            settlement = %config.settlement_currency,
            collateral = %config.collateral_currency,
            supply = %Units(config.initial_collateral_supply),
            "Synth system created"
        );

        Ok(SynthSystem {
            roles: self.roles,
            now: self.now,
            base: config.base_currency,
            settlement: config.settlement_currency,
            collateral_key: config.collateral_currency,
            rates: RateTable::new(config.base_currency, config.stale_period_secs),
            registry,
            ledger: DebtLedger::new(config.negligible_debt),
            collateral,
            escrow: self.escrow,
            reward_escrow: self.reward_escrow,
            fee_pool: self.fee_pool,
            rewards: self.rewards,
            supply: SupplySchedule::new(config.inflation_start, config.minter_reward),
            exchange: ExchangeSettings {
                enabled: config.exchange_enabled,
                fee_rate: config.exchange_fee_rate,
                priority_fee_ceiling: None,
                protection_circuit: false,
            },
            issuance: IssuanceSettings {
                enabled: config.issuance_enabled,
                issuance_ratio: config.issuance_ratio,
            },
            events: Vec::new(),
        })
    }
}

impl SynthSystem {
    /// Start building a system with in-memory collaborators.
    pub fn builder(config: SystemConfig, roles: Roles) -> SynthSystemBuilder {
        SynthSystemBuilder {
            config,
            roles,
            now: 0,
            genesis: None,
            escrow: Box::new(EscrowBook::new()),
            reward_escrow: Box::new(EscrowBook::new()),
            fee_pool: Box::new(FeePool::new()),
            rewards: Box::new(RewardsDistribution::new(Address::from_label(REWARD_ESCROW_LABEL))),
        }
    }

    // --- Clock and accessors ---

    pub fn now(&self) -> u64 {
        self.now
    }

    /// Advance the clock. Time never moves backwards.
    pub fn set_time(&mut self, now: u64) -> Result<(), SynthError> {
        if now < self.now {
            return Err(SynthError::InvalidParameter(format!(
                "clock cannot move back from {} to {}",
                self.now, now
            )));
        }
        self.now = now;
        Ok(())
    }

    pub fn roles(&self) -> &Roles {
        &self.roles
    }

    pub fn base_currency(&self) -> CurrencyKey {
        self.base
    }

    pub fn settlement_currency(&self) -> CurrencyKey {
        self.settlement
    }

    pub fn collateral_currency(&self) -> CurrencyKey {
        self.collateral_key
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn registry(&self) -> &CurrencyRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &DebtLedger {
        &self.ledger
    }

    pub fn collateral_book(&self) -> &TokenBook {
        &self.collateral
    }

    pub fn fee_pool(&self) -> &dyn FeeSink {
        self.fee_pool.as_ref()
    }

    pub fn supply_schedule(&self) -> &SupplySchedule {
        &self.supply
    }

    /// Balance of `holder` in synth `currency`.
    pub fn synth_balance(&self, currency: &CurrencyKey, holder: &Address) -> Result<Amount, SynthError> {
        self.registry.balance_of(currency, holder)
    }

    pub fn events(&self) -> &[SynthEvent] {
        &self.events
    }

    /// Take all events emitted so far.
    pub fn drain_events(&mut self) -> Vec<SynthEvent> {
        std::mem::take(&mut self.events)
    }

    // --- Roles ---

    pub fn set_owner(&mut self, caller: &Address, owner: Address) -> Result<(), SynthError> {
        self.roles.require_owner(caller)?;
        self.roles.owner = owner;
        Ok(())
    }

    pub fn set_oracle(&mut self, caller: &Address, oracle: Address) -> Result<(), SynthError> {
        self.roles.require_owner(caller)?;
        self.roles.oracle = oracle;
        Ok(())
    }

    pub fn set_priority_fee_oracle(&mut self, caller: &Address, oracle: Address) -> Result<(), SynthError> {
        self.roles.require_owner(caller)?;
        self.roles.priority_fee_oracle = oracle;
        Ok(())
    }

    // --- Oracle ---

    /// Submit prices for `keys` as of `timestamp`.
    pub fn update_rates(
        &mut self,
        caller: &Address,
        keys: &[CurrencyKey],
        prices: &[Amount],
        timestamp: u64,
    ) -> Result<(), SynthError> {
        self.roles.require_oracle(caller)?;
        let frozen = self.rates.update_rates(keys, prices, timestamp, self.now)?;
        self.events.push(SynthEvent::RatesUpdated {
            currencies: keys.to_vec(),
            timestamp,
        });
        for currency in frozen {
            self.events.push(SynthEvent::InverseFrozen {
                currency,
                rate: self.rates.rate(&currency),
            });
        }
        Ok(())
    }

    pub fn delete_rate(&mut self, caller: &Address, key: &CurrencyKey) -> Result<(), SynthError> {
        self.roles.require_oracle(caller)?;
        self.rates.delete_rate(key)?;
        Ok(())
    }

    pub fn set_stale_period(&mut self, caller: &Address, period: u64) -> Result<(), SynthError> {
        self.roles.require_owner(caller)?;
        self.rates.set_stale_period(period)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_inverse_pricing(
        &mut self,
        caller: &Address,
        key: CurrencyKey,
        entry_point: Amount,
        upper_limit: Amount,
        lower_limit: Amount,
        freeze: bool,
        freeze_at_upper: bool,
    ) -> Result<(), SynthError> {
        self.roles.require_owner(caller)?;
        self.rates
            .set_inverse_pricing(key, entry_point, upper_limit, lower_limit, freeze, freeze_at_upper)?;
        if let Some(PricingKind::Inverse(pricing)) = self.rates.pricing_kind(&key) {
            if let Some(rate) = pricing.frozen_rate {
                self.events.push(SynthEvent::InverseFrozen { currency: key, rate });
            }
        }
        Ok(())
    }

    pub fn remove_inverse_pricing(&mut self, caller: &Address, key: &CurrencyKey) -> Result<(), SynthError> {
        self.roles.require_owner(caller)?;
        self.rates.remove_inverse_pricing(key)
    }

    // --- Registry ---

    /// Register a new synth currency.
    pub fn register_currency(&mut self, caller: &Address, key: CurrencyKey, token: Address) -> Result<(), SynthError> {
        self.roles.require_owner(caller)?;
        if key == self.collateral_key {
            return Err(SynthError::DuplicateOrConflicting(format!(
                "{} is the collateral currency",
                key
            )));
        }
        self.registry.register(key, token)?;
        tracing::info!(currency = %key, "Currency registered");
        self.events.push(SynthEvent::CurrencyRegistered { currency: key, token });
        Ok(())
    }

    /// Remove a synth currency with no outstanding supply. The base and
    /// settlement currencies cannot be removed.
    pub fn remove_currency(&mut self, caller: &Address, key: &CurrencyKey) -> Result<(), SynthError> {
        self.roles.require_owner(caller)?;
        if *key == self.base || *key == self.settlement {
            return Err(SynthError::DuplicateOrConflicting(format!(
                "{} cannot be removed",
                key
            )));
        }
        self.registry.remove(key)?;
        tracing::info!(currency = %key, "Currency removed");
        self.events.push(SynthEvent::CurrencyRemoved { currency: *key });
        Ok(())
    }

    pub fn set_currency_enabled(&mut self, caller: &Address, key: &CurrencyKey, enabled: bool) -> Result<(), SynthError> {
        self.roles.require_owner(caller)?;
        self.registry.set_enabled(key, enabled)?;
        self.events.push(SynthEvent::CurrencyEnabled {
            currency: *key,
            enabled,
        });
        Ok(())
    }

    // --- Supply ---

    pub fn set_minter_reward(&mut self, caller: &Address, reward: Amount) -> Result<(), SynthError> {
        self.roles.require_owner(caller)?;
        self.supply.set_minter_reward(reward)
    }

    /// Mint the collateral supply the schedule allows at the current time.
    ///
    /// The minter reward goes to `caller`; the rest is split by the rewards
    /// distributor. Returns the total minted.
    ///
    /// # Errors
    /// Returns `SynthError::ZeroEffect` if nothing is mintable yet.
    pub fn mint(&mut self, caller: &Address) -> Result<Amount, SynthError> {
        let supply = self
            .supply
            .mintable_supply(self.now, self.collateral.total_supply())?;
        if supply == 0 {
            return Err(SynthError::ZeroEffect(format!(
                "nothing to mint at {} (last mint {})",
                self.now,
                self.supply.last_mint_event()
            )));
        }
        let minter_reward = self.supply.minter_reward().min(supply);
        let distributable = supply - minter_reward;
        let payouts = self.rewards.distribute_rewards(distributable);
        let paid = payouts
            .iter()
            .try_fold(0 as Amount, |acc, (_, amount)| acc.checked_add(*amount));
        if paid != Some(distributable) {
            return Err(SynthError::InvalidParameter(format!(
                "rewards distributor paid {} of {}",
                paid.map_or_else(|| "more than u128".to_string(), |p| Units(p).to_string()),
                Units(distributable)
            )));
        }
        self.collateral.check_credit(supply)?;

        self.supply.record_mint(self.now);
        for (recipient, amount) in &payouts {
            self.collateral.credit(recipient, *amount)?;
        }
        self.collateral.credit(caller, minter_reward)?;

        tracing::info!(
            supply = %Units(supply),
            minter = %caller.short_hex(),
            week = self.supply.week_counter(),
            "Supply minted"
        );
        self.events.push(SynthEvent::SupplyMinted {
            supply,
            minter: *caller,
            minter_reward,
            week_counter: self.supply.week_counter(),
            timestamp: self.now,
        });
        Ok(supply)
    }
}
