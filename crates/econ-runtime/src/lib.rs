#![deny(warnings)]

//! Scripted scenarios over the economic records.
//!
//! Each scenario builds its own entities, runs them through a fixed sequence
//! of work, sale and consumption steps, and returns a serialisable outcome.
//! [`run_all`] strings them together into a [`ScenarioReport`].

use econ_chaos::{Chaos, DrawSource};
use econ_core::{
    BargainOutcome, Cooperative, EconError, EconomyConfig, Firm, Household, Roster, Union,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

/// A single household working for and buying from a single firm.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HouseholdFirmOutcome {
    pub household: Household,
    pub firm: Firm,
    /// Revenue of the firm's sale.
    pub revenue: Decimal,
    /// Whether the household could afford to spend that revenue.
    pub consumed: bool,
}

/// Output of a freshly formed cooperative after one shift.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CooperativeOutcome {
    pub production: Decimal,
    pub labor_cost: Decimal,
}

/// Key figures of the full employer → union → cooperative → shocks story.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EconomyOutcome {
    pub firm_profit: Decimal,
    pub bargain: BargainOutcome,
    pub firm_profit_after_raise: Decimal,
    pub coop_shared_profit: Decimal,
    pub household_consumption: Decimal,
    pub disaster_pct: u32,
    pub profit_after_disaster: Decimal,
    pub strike_hours: u32,
    pub profit_after_strike: Decimal,
    /// Household purchases turned down for lack of income, over the whole run.
    pub rejected_purchases: usize,
    pub final_households: Vec<Household>,
}

/// Aggregated outcomes of every scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub household_firm: HouseholdFirmOutcome,
    pub union_bargain: BargainOutcome,
    pub cooperative: CooperativeOutcome,
    pub economy: EconomyOutcome,
}

/// A household works a shift, the firm produces and sells some of its output,
/// and the household tries to buy it.
pub fn household_and_firm() -> HouseholdFirmOutcome {
    let _span = info_span!("household_and_firm").entered();
    let mut household = Household::new();
    let mut firm = Firm::new();

    household.work(Decimal::from(8), Decimal::from(10));
    firm.produce(Decimal::from(8), Decimal::from(10));

    let revenue = firm.sell_goods(Decimal::from(5), Decimal::from(20));
    let consumed = household.consume(revenue);
    HouseholdFirmOutcome {
        household,
        firm,
        revenue,
        consumed,
    }
}

/// Workers join a union and are hired by a firm; the union then bargains.
pub fn union_bargaining(cfg: &EconomyConfig) -> Result<BargainOutcome, EconError> {
    let _span = info_span!("union_bargaining").entered();
    let mut roster = Roster::with_workers(cfg.workers);
    let mut union = Union::new();
    let mut firm = Firm::with_wage(cfg.firm_wage);
    for w in roster.workers_mut() {
        union.add_worker(w);
        firm.hire_worker(w);
    }
    let outcome = union.collective_bargain(&mut firm, roster.workers())?;
    info!(wage = %firm.wage, "firm's wage after collective bargaining");
    Ok(outcome)
}

/// Workers take over production directly and operate one shift.
pub fn cooperative_takeover(cfg: &EconomyConfig) -> CooperativeOutcome {
    let _span = info_span!("cooperative_takeover").entered();
    let mut coop = Cooperative::with_wage(Roster::with_workers(cfg.workers), cfg.coop_wage);
    coop.operate(cfg.shift_hours);
    info!(
        production = %coop.production,
        labor_cost = %coop.labor_cost,
        "cooperative after workers taking over"
    );
    CooperativeOutcome {
        production: coop.production,
        labor_cost: coop.labor_cost,
    }
}

/// The full story: employment at a firm, a union wage round, a worker
/// takeover, then a natural disaster and a strike.
pub fn full_economy<D: DrawSource>(
    cfg: &EconomyConfig,
    chaos: &mut Chaos<D>,
) -> Result<EconomyOutcome, EconError> {
    let _span = info_span!("full_economy", workers = cfg.workers).entered();
    let mut rejected = 0usize;

    let mut roster = Roster::with_workers(cfg.workers);
    let mut union = Union::new();
    let mut firm = Firm::with_wage(cfg.firm_wage);
    for w in roster.workers_mut() {
        union.add_worker(w);
        firm.hire_worker(w);
    }
    roster.pay_wages();

    let revenue = firm.sell_goods(firm.production, cfg.sale_price);
    rejected += roster.consume_evenly(revenue)?;
    let firm_profit = firm.profit(revenue);
    info!(profit = %firm_profit, "firm's profit after selling goods");

    let bargain = union.collective_bargain(&mut firm, roster.workers())?;
    roster.reassign_wage(firm.wage);

    // Same stock, higher price to protect the margin.
    let revenue = firm.sell_goods(firm.production, cfg.raised_price);
    rejected += roster.consume_evenly(revenue)?;
    let firm_profit_after_raise = firm.profit(revenue);
    info!(profit = %firm_profit_after_raise, "firm's profit after the wage round");

    let mut coop = Cooperative::with_wage(roster, cfg.coop_wage);
    coop.operate(cfg.shift_hours);
    let revenue = coop.sell_output(cfg.coop_price);
    rejected += coop.members_mut().consume_evenly(revenue)?;
    let coop_shared_profit = coop.shared_profit(revenue);
    info!(profit = %coop_shared_profit, "cooperative's shared profit");

    coop.members_mut().distribute_profit(coop_shared_profit)?;
    rejected += coop.members_mut().consume_evenly(revenue)?;
    let household_consumption = coop.members().total_consumption();
    info!(consumption = %household_consumption, "households' consumption under the cooperative");

    coop.operate(cfg.shift_hours);
    let disaster_pct = chaos.natural_disaster(&mut coop);
    let revenue = coop.sell_output(cfg.coop_price);
    rejected += coop.members_mut().consume_evenly(revenue)?;
    let profit_after_disaster = coop.shared_profit(revenue);
    info!(profit = %profit_after_disaster, "cooperative's shared profit after the disaster");

    let strike_hours = chaos.strike(coop.members_mut().workers_mut());
    coop.operate(cfg.shift_hours);
    let revenue = coop.sell_output(cfg.coop_price);
    rejected += coop.members_mut().consume_evenly(revenue)?;
    let profit_after_strike = coop.shared_profit(revenue);
    info!(profit = %profit_after_strike, "cooperative's shared profit after the strike");

    Ok(EconomyOutcome {
        firm_profit,
        bargain,
        firm_profit_after_raise,
        coop_shared_profit,
        household_consumption,
        disaster_pct,
        profit_after_disaster,
        strike_hours,
        profit_after_strike,
        rejected_purchases: rejected,
        final_households: coop.members().households().cloned().collect(),
    })
}

/// Run every scenario with shocks seeded from `cfg.rng_seed`.
pub fn run_all(cfg: &EconomyConfig) -> Result<ScenarioReport, EconError> {
    run_all_with(cfg, &mut Chaos::seeded(cfg.rng_seed))
}

/// Run every scenario with the given shock generator.
pub fn run_all_with<D: DrawSource>(
    cfg: &EconomyConfig,
    chaos: &mut Chaos<D>,
) -> Result<ScenarioReport, EconError> {
    Ok(ScenarioReport {
        household_firm: household_and_firm(),
        union_bargain: union_bargaining(cfg)?,
        cooperative: cooperative_takeover(cfg),
        economy: full_economy(cfg, chaos)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use econ_chaos::{ScriptedDraws, DISASTER_PCT, STRIKE_HOURS};
    use econ_core::{validate_config, MAX_MONEY, MAX_SHIFT_HOURS, MAX_WORKERS};
    use proptest::prelude::*;

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn household_cannot_afford_firm_revenue() {
        let out = household_and_firm();
        assert_eq!(out.revenue, d(100));
        assert!(!out.consumed);
        assert_eq!(out.household.income, d(80));
        assert_eq!(out.household.consumption, Decimal::ZERO);
        assert_eq!(out.firm.production, d(11));
        assert_eq!(out.firm.labor_cost, d(80));
    }

    #[test]
    fn union_leaves_wage_when_everyone_earns_it() {
        let out = union_bargaining(&EconomyConfig::default()).unwrap();
        assert_eq!(out.mean_wage, d(20));
        assert_eq!(out.new_wage, d(20));
        assert!(!out.raised());
    }

    #[test]
    fn cooperative_first_shift() {
        let out = cooperative_takeover(&EconomyConfig::default());
        assert_eq!(out.production, d(160));
        assert_eq!(out.labor_cost, d(1600));
    }

    #[test]
    fn full_economy_with_scripted_shocks() {
        let cfg = EconomyConfig::default();
        let mut chaos = Chaos::new(ScriptedDraws::new([25, 2]));
        let out = full_economy(&cfg, &mut chaos).unwrap();
        assert_eq!(out.firm_profit, d(1600));
        assert_eq!(out.bargain.new_wage, d(20));
        assert_eq!(out.firm_profit_after_raise, d(-1600));
        assert_eq!(out.coop_shared_profit, d(1600));
        assert_eq!(out.household_consumption, d(3200));
        assert_eq!(out.disaster_pct, 25);
        // 320 units cut to 240, valued at 20, less 3200 labor cost.
        assert_eq!(out.profit_after_disaster, d(1600));
        assert_eq!(out.strike_hours, 2);
        assert_eq!(out.profit_after_strike, d(3200));
        assert_eq!(out.rejected_purchases, 40);
        assert_eq!(chaos.draws().remaining(), 0);
        assert_eq!(chaos.draws().exhausted_draws(), 0);
        assert_eq!(out.final_households.len(), 10);
        assert!(out
            .final_households
            .iter()
            .all(|h| h.income == Decimal::ZERO && h.consumption == d(320)));
    }

    #[test]
    fn empty_workforce_surfaces_as_error() {
        let cfg = EconomyConfig {
            workers: 0,
            ..EconomyConfig::default()
        };
        assert_eq!(union_bargaining(&cfg), Err(EconError::EmptyMembership));
        let mut chaos = Chaos::new(ScriptedDraws::default());
        assert!(full_economy(&cfg, &mut chaos).is_err());
    }

    #[test]
    fn largest_valid_config_runs_without_overflow() {
        let cfg = EconomyConfig {
            workers: MAX_WORKERS,
            shift_hours: d(MAX_SHIFT_HOURS),
            firm_wage: d(MAX_MONEY),
            coop_wage: d(MAX_MONEY),
            sale_price: d(MAX_MONEY),
            raised_price: d(MAX_MONEY),
            coop_price: d(MAX_MONEY),
            ..EconomyConfig::default()
        };
        validate_config(&cfg).unwrap();
        let report = run_all(&cfg).unwrap();
        assert_eq!(report.economy.final_households.len(), MAX_WORKERS as usize);
    }

    #[test]
    fn seeded_report_is_repeatable_and_serialisable() {
        let cfg = EconomyConfig::default();
        let a = run_all(&cfg).unwrap();
        let b = run_all(&cfg).unwrap();
        assert_eq!(a, b);
        let s = serde_json::to_string_pretty(&a).unwrap();
        let back: ScenarioReport = serde_json::from_str(&s).unwrap();
        assert_eq!(back, a);
    }

    proptest! {
        #[test]
        fn shocks_stay_in_bounds(seed in any::<u64>()) {
            let cfg = EconomyConfig { rng_seed: seed, ..EconomyConfig::default() };
            let report = run_all(&cfg).unwrap();
            prop_assert!(DISASTER_PCT.contains(&report.economy.disaster_pct));
            prop_assert!(STRIKE_HOURS.contains(&report.economy.strike_hours));
            // Disaster revenue is 6400 × keep, keep in [0.5, 0.9].
            prop_assert!(report.economy.profit_after_disaster >= d(0));
            prop_assert!(report.economy.profit_after_disaster <= d(2560));
        }
    }
}
