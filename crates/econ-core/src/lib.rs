#![deny(warnings)]

//! Core economic records for the arrangements simulation.
//!
//! This crate defines the households, workers, firms, cooperatives and unions
//! that the scenarios mutate, together with the error kinds raised when an
//! operation has to be rejected and the configuration that drives a run.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Units of output produced per hour of labor.
pub const PRODUCTIVITY: i64 = 2;
/// Length of the shift a firm assigns when it hires a worker.
pub const SHIFT_HOURS: i64 = 8;
/// Amount added on top of the members' mean wage after a successful bargain.
pub const BARGAIN_PREMIUM: i64 = 5;
/// Wage a firm or cooperative starts out paying.
pub const DEFAULT_WAGE: i64 = 20;

/// Errors produced when an economic operation is rejected.
///
/// None of these are fatal: the entity involved is left unchanged and the
/// caller may carry on with the rest of the scenario.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// A household tried to spend more than its income.
    #[error("not enough income for this consumption: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },
    /// A firm tried to sell more goods than it holds.
    #[error("not enough goods for this sale: requested {requested}, available {available}")]
    InsufficientStock {
        requested: Decimal,
        available: Decimal,
    },
    /// Collective bargaining needs at least one member to average over.
    #[error("union has no members to bargain for")]
    EmptyMembership,
    /// An even split was requested across a roster with no members.
    #[error("roster has no members to split across")]
    EmptyRoster,
    /// A union member could not be found among the workers supplied.
    #[error("unknown worker: {0}")]
    UnknownWorker(WorkerId),
    /// Transaction amounts must be non-negative.
    #[error("negative amount is invalid: {0}")]
    NegativeAmount(Decimal),
}

/// Identifier of a worker, stable for the lifetime of a scenario.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkerId(pub u32);

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "worker#{}", self.0)
    }
}

/// Income and consumption ledger of a consuming unit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Household {
    /// Spendable income. Consumption never takes it below zero, but a
    /// negative profit share credited through [`Household::credit`] can.
    pub income: Decimal,
    /// Total consumed so far; never decreases.
    pub consumption: Decimal,
}

impl Household {
    pub fn new() -> Self {
        Self::default()
    }

    /// Earn `hours × wage`.
    pub fn work(&mut self, hours: Decimal, wage: Decimal) {
        self.income += hours * wage;
    }

    /// Add `amount` directly to income, e.g. a share of cooperative profit.
    pub fn credit(&mut self, amount: Decimal) {
        self.income += amount;
    }

    /// Spend `amount` out of income.
    ///
    /// The transaction is all-or-nothing: when income is short nothing is
    /// applied and [`EconError::InsufficientFunds`] is returned.
    pub fn try_consume(&mut self, amount: Decimal) -> Result<(), EconError> {
        if amount < Decimal::ZERO {
            return Err(EconError::NegativeAmount(amount));
        }
        if self.income < amount {
            return Err(EconError::InsufficientFunds {
                requested: amount,
                available: self.income,
            });
        }
        self.consumption += amount;
        self.income -= amount;
        Ok(())
    }

    /// Like [`Household::try_consume`] but reports a rejection in the log and
    /// returns whether the consumption went through.
    pub fn consume(&mut self, amount: Decimal) -> bool {
        match self.try_consume(amount) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "consumption rejected");
                false
            }
        }
    }
}

/// Labor hours and wage rate of a single worker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    /// Hours of the current assignment.
    pub hours: Decimal,
    /// Wage rate of the current assignment.
    pub wage: Decimal,
}

impl Worker {
    pub fn new(id: WorkerId) -> Self {
        Self {
            id,
            hours: Decimal::ZERO,
            wage: Decimal::ZERO,
        }
    }

    /// Take an assignment, replacing whatever hours and wage were held before.
    pub fn work_for(&mut self, hours: Decimal, wage: Decimal) {
        self.hours = hours;
        self.wage = wage;
    }
}

/// Production and labor-cost ledger of a firm that sets wages unilaterally.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Firm {
    /// Wage paid to hired workers; raised by collective bargaining.
    pub wage: Decimal,
    /// Goods in stock.
    pub production: Decimal,
    /// Accumulated labor cost; never decreases.
    pub labor_cost: Decimal,
}

impl Default for Firm {
    fn default() -> Self {
        Self::with_wage(Decimal::from(DEFAULT_WAGE))
    }
}

impl Firm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wage(wage: Decimal) -> Self {
        Self {
            wage,
            production: Decimal::ZERO,
            labor_cost: Decimal::ZERO,
        }
    }

    /// Turn `labor` hours paid at `wage` into output.
    pub fn produce(&mut self, labor: Decimal, wage: Decimal) {
        self.production += labor * Decimal::from(PRODUCTIVITY);
        self.labor_cost += labor * wage;
        debug!(%labor, %wage, production = %self.production, "firm produced");
    }

    /// Sell `amount` goods at `price`, returning the revenue.
    ///
    /// Fails with [`EconError::InsufficientStock`] and leaves the stock
    /// untouched when `amount` exceeds production.
    pub fn try_sell_goods(
        &mut self,
        amount: Decimal,
        price: Decimal,
    ) -> Result<Decimal, EconError> {
        if amount < Decimal::ZERO {
            return Err(EconError::NegativeAmount(amount));
        }
        if self.production < amount {
            return Err(EconError::InsufficientStock {
                requested: amount,
                available: self.production,
            });
        }
        self.production -= amount;
        Ok(amount * price)
    }

    /// Like [`Firm::try_sell_goods`] but reports a rejected sale in the log and
    /// yields zero revenue for it.
    pub fn sell_goods(&mut self, amount: Decimal, price: Decimal) -> Decimal {
        self.try_sell_goods(amount, price).unwrap_or_else(|e| {
            warn!(error = %e, "sale rejected");
            Decimal::ZERO
        })
    }

    /// Put `worker` on a standard shift at the firm's wage and book the output.
    pub fn hire_worker(&mut self, worker: &mut Worker) {
        worker.work_for(Decimal::from(SHIFT_HOURS), self.wage);
        self.produce(worker.hours, self.wage);
    }

    /// Revenue left over after labor costs.
    pub fn profit(&self, revenue: Decimal) -> Decimal {
        revenue - self.labor_cost
    }
}

/// A worker together with the household their wages support.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub worker: Worker,
    pub household: Household,
}

/// Ordered collection of worker/household pairs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    members: Vec<Member>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// `n` fresh members with ids `0..n`, idle workers and empty households.
    pub fn with_workers(n: u32) -> Self {
        let members = (0..n)
            .map(|i| Member {
                worker: Worker::new(WorkerId(i)),
                household: Household::new(),
            })
            .collect();
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn members_mut(&mut self) -> &mut [Member] {
        &mut self.members
    }

    pub fn workers(&self) -> impl Iterator<Item = &Worker> {
        self.members.iter().map(|m| &m.worker)
    }

    pub fn workers_mut(&mut self) -> impl Iterator<Item = &mut Worker> {
        self.members.iter_mut().map(|m| &mut m.worker)
    }

    pub fn households(&self) -> impl Iterator<Item = &Household> {
        self.members.iter().map(|m| &m.household)
    }

    /// Each household earns its own worker's `hours × wage`.
    pub fn pay_wages(&mut self) {
        for m in &mut self.members {
            m.household.work(m.worker.hours, m.worker.wage);
        }
    }

    /// Keep every worker's hours but move them onto `wage`.
    pub fn reassign_wage(&mut self, wage: Decimal) {
        for w in self.workers_mut() {
            let hours = w.hours;
            w.work_for(hours, wage);
        }
    }

    fn even_share(&self, total: Decimal) -> Result<Decimal, EconError> {
        if self.members.is_empty() {
            return Err(EconError::EmptyRoster);
        }
        Ok(total / Decimal::from(self.members.len() as u64))
    }

    /// Every household tries to consume an equal share of `total`.
    ///
    /// Returns how many households could not afford their share.
    pub fn consume_evenly(&mut self, total: Decimal) -> Result<usize, EconError> {
        let share = self.even_share(total)?;
        let rejected = self
            .members
            .iter_mut()
            .map(|m| m.household.consume(share))
            .filter(|ok| !ok)
            .count();
        if rejected > 0 {
            info!(%share, rejected, "households could not afford their share");
        }
        Ok(rejected)
    }

    /// Credit every household with an equal share of `profit`.
    pub fn distribute_profit(&mut self, profit: Decimal) -> Result<Decimal, EconError> {
        let share = self.even_share(profit)?;
        for m in &mut self.members {
            m.household.credit(share);
        }
        Ok(share)
    }

    pub fn total_consumption(&self) -> Decimal {
        self.households().map(|h| h.consumption).sum()
    }

    pub fn total_income(&self) -> Decimal {
        self.households().map(|h| h.income).sum()
    }
}

/// Production unit run directly by the workers it owns.
///
/// Unlike [`Firm`] there is no hiring step and no external wage negotiation,
/// and sales are not checked against stock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cooperative {
    pub wage: Decimal,
    pub production: Decimal,
    pub labor_cost: Decimal,
    roster: Roster,
}

impl Cooperative {
    /// Workers take over production at the default wage.
    pub fn new(roster: Roster) -> Self {
        Self::with_wage(roster, Decimal::from(DEFAULT_WAGE))
    }

    pub fn with_wage(roster: Roster, wage: Decimal) -> Self {
        Self {
            wage,
            production: Decimal::ZERO,
            labor_cost: Decimal::ZERO,
            roster,
        }
    }

    pub fn members(&self) -> &Roster {
        &self.roster
    }

    pub fn members_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }

    pub fn into_roster(self) -> Roster {
        self.roster
    }

    /// Every member works `hours` at the cooperative wage; output and cost
    /// are booked per worker.
    pub fn operate(&mut self, hours: Decimal) {
        let wage = self.wage;
        for w in self.roster.workers_mut() {
            w.work_for(hours, wage);
            self.production += w.hours * Decimal::from(PRODUCTIVITY);
            self.labor_cost += w.hours * wage;
        }
        debug!(
            %hours,
            production = %self.production,
            labor_cost = %self.labor_cost,
            "cooperative operated"
        );
    }

    /// Value the whole output at `price`.
    ///
    /// There is no stock check and production is not drawn down.
    pub fn sell_output(&self, price: Decimal) -> Decimal {
        self.production * price
    }

    /// Revenue left over after labor costs, to be shared among members.
    pub fn shared_profit(&self, revenue: Decimal) -> Decimal {
        revenue - self.labor_cost
    }
}

/// Result of a collective bargaining round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BargainOutcome {
    pub mean_wage: Decimal,
    pub previous_wage: Decimal,
    pub new_wage: Decimal,
}

impl BargainOutcome {
    pub fn raised(&self) -> bool {
        self.new_wage != self.previous_wage
    }
}

/// Wage-bargaining aggregator over a set of workers.
///
/// Members are held by id; their current wages are looked up among the
/// workers passed to [`Union::collective_bargain`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Union {
    members: Vec<WorkerId>,
}

impl Union {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_worker(&mut self, worker: &Worker) {
        self.members.push(worker.id);
    }

    pub fn members(&self) -> &[WorkerId] {
        &self.members
    }

    /// Bargain with `firm` on behalf of the members.
    ///
    /// The firm's wage becomes `mean + 5` only when the members' mean wage
    /// is strictly below it; otherwise it is left as is. Worker records are
    /// not touched.
    pub fn collective_bargain<'a, I>(
        &self,
        firm: &mut Firm,
        workers: I,
    ) -> Result<BargainOutcome, EconError>
    where
        I: IntoIterator<Item = &'a Worker>,
    {
        if self.members.is_empty() {
            return Err(EconError::EmptyMembership);
        }
        let wages: BTreeMap<WorkerId, Decimal> =
            workers.into_iter().map(|w| (w.id, w.wage)).collect();
        let mut total = Decimal::ZERO;
        for id in &self.members {
            total += *wages.get(id).ok_or(EconError::UnknownWorker(*id))?;
        }
        let mean_wage = total / Decimal::from(self.members.len() as u64);

        let previous_wage = firm.wage;
        if mean_wage < firm.wage {
            firm.wage = mean_wage + Decimal::from(BARGAIN_PREMIUM);
        }
        let outcome = BargainOutcome {
            mean_wage,
            previous_wage,
            new_wage: firm.wage,
        };
        info!(
            mean = %outcome.mean_wage,
            from = %outcome.previous_wage,
            to = %outcome.new_wage,
            "collective bargaining concluded"
        );
        Ok(outcome)
    }
}

/// Parameters of a scenario run. Defaults reproduce the reference story.
///
/// Worker count, shift length, wages and prices are capped by
/// [`validate_config`] so that no run can
/// overflow `Decimal` arithmetic. When `coop_price` is below half of
/// `coop_wage` (two units are made per hour) the cooperative makes a loss,
/// and sharing that loss drives household income negative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Seed for the shock generator.
    pub rng_seed: u64,
    /// Number of worker/household pairs.
    pub workers: u32,
    /// Hours per shift when the cooperative operates.
    pub shift_hours: Decimal,
    /// Starting wage of the firm.
    pub firm_wage: Decimal,
    /// Wage the cooperative pays its members.
    pub coop_wage: Decimal,
    /// Price of the firm's first sale.
    pub sale_price: Decimal,
    /// Price of the firm's sale after the wage round.
    pub raised_price: Decimal,
    /// Price at which the cooperative values its output.
    pub coop_price: Decimal,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            rng_seed: 42,
            workers: 10,
            shift_hours: Decimal::from(SHIFT_HOURS),
            firm_wage: Decimal::from(DEFAULT_WAGE),
            coop_wage: Decimal::from(DEFAULT_WAGE),
            sale_price: Decimal::from(20),
            raised_price: Decimal::from(25),
            coop_price: Decimal::from(20),
        }
    }
}

/// Largest accepted worker count.
pub const MAX_WORKERS: u32 = 100_000;
/// Longest accepted shift.
pub const MAX_SHIFT_HOURS: i64 = 24;
/// Largest accepted wage or price.
pub const MAX_MONEY: i64 = 1_000_000;

/// Validation errors for run configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// At least one worker is needed to split sales and profits.
    #[error("worker count must be > 0")]
    NoWorkers,
    /// Wages and prices must be non-negative.
    #[error("negative monetary value is invalid: {0}")]
    NegativeMoney(&'static str),
    /// Shift length must be non-negative.
    #[error("shift hours must be >= 0")]
    NegativeHours,
    /// Worker count above [`MAX_WORKERS`].
    #[error("worker count {0} exceeds {}", MAX_WORKERS)]
    TooManyWorkers(u32),
    /// Shift length above [`MAX_SHIFT_HOURS`].
    #[error("shift hours {0} exceed {}", MAX_SHIFT_HOURS)]
    ShiftTooLong(Decimal),
    /// Wage or price above [`MAX_MONEY`].
    #[error("{0} exceeds {}", MAX_MONEY)]
    MoneyTooLarge(&'static str),
}

/// Validate a run configuration.
pub fn validate_config(cfg: &EconomyConfig) -> Result<(), ValidationError> {
    if cfg.workers == 0 {
        return Err(ValidationError::NoWorkers);
    }
    if cfg.workers > MAX_WORKERS {
        return Err(ValidationError::TooManyWorkers(cfg.workers));
    }
    if cfg.shift_hours < Decimal::ZERO {
        return Err(ValidationError::NegativeHours);
    }
    if cfg.shift_hours > Decimal::from(MAX_SHIFT_HOURS) {
        return Err(ValidationError::ShiftTooLong(cfg.shift_hours));
    }
    let money = [
        ("firm_wage", cfg.firm_wage),
        ("coop_wage", cfg.coop_wage),
        ("sale_price", cfg.sale_price),
        ("raised_price", cfg.raised_price),
        ("coop_price", cfg.coop_price),
    ];
    for (name, value) in money {
        if value < Decimal::ZERO {
            return Err(ValidationError::NegativeMoney(name));
        }
        if value > Decimal::from(MAX_MONEY) {
            return Err(ValidationError::MoneyTooLarge(name));
        }
    }
    Ok(())
}
