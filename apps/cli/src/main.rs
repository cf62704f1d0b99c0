#![deny(warnings)]

//! Headless CLI that runs the economic scenarios and prints their key figures.

use anyhow::{Context, Result};
use econ_core::{validate_config, EconomyConfig};
use econ_runtime::ScenarioReport;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    seed: Option<u64>,
    json: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Args {
    let mut parsed = Args::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => parsed.config = it.next().map(PathBuf::from),
            "--seed" => parsed.seed = it.next().and_then(|s| s.parse().ok()),
            "--json" => parsed.json = true,
            _ => {}
        }
    }
    parsed
}

fn load_config(args: &Args) -> Result<EconomyConfig> {
    let mut cfg = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_yaml::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => EconomyConfig::default(),
    };
    if let Some(seed) = args.seed {
        cfg.rng_seed = seed;
    }
    validate_config(&cfg)?;
    Ok(cfg)
}

fn print_summary(report: &ScenarioReport) {
    let hf = &report.household_firm;
    println!(
        "Household/firm | revenue: {} | consumed: {} | income: {} | stock left: {}",
        hf.revenue, hf.consumed, hf.household.income, hf.firm.production
    );
    println!(
        "Firm's wage after collective bargaining: {}",
        report.union_bargain.new_wage
    );
    println!(
        "Cooperative's production after workers taking over: {}",
        report.cooperative.production
    );
    println!(
        "Cooperative's labor cost after workers taking over: {}",
        report.cooperative.labor_cost
    );

    let e = &report.economy;
    println!("The firm's profit after selling goods: {}", e.firm_profit);
    println!(
        "The firm's profit after selling goods with increased wage: {}",
        e.firm_profit_after_raise
    );
    println!(
        "The cooperative's shared profit after selling goods: {}",
        e.coop_shared_profit
    );
    println!(
        "Households' consumption after workers form a cooperative: {}",
        e.household_consumption
    );
    println!(
        "A natural disaster reduced the cooperative's production by {}%.",
        e.disaster_pct
    );
    println!(
        "The cooperative's shared profit after selling goods affected by a natural disaster: {}",
        e.profit_after_disaster
    );
    println!("A strike reduced the workers' hours by {}.", e.strike_hours);
    println!(
        "The cooperative's shared profit after selling goods affected by a strike: {}",
        e.profit_after_strike
    );
    println!("Rejected purchases: {}", e.rejected_purchases);
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args(std::env::args().skip(1));
    info!(
        git_sha = env!("GIT_SHA"),
        build_date = env!("BUILD_DATE"),
        ?args,
        "starting CLI"
    );

    let cfg = load_config(&args)?;
    let report = econ_runtime::run_all(&cfg)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Args {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_flags_and_ignores_unknown() {
        let a = args(&["--seed", "7", "--json", "--bogus", "--config", "run.yaml"]);
        assert_eq!(
            a,
            Args {
                config: Some(PathBuf::from("run.yaml")),
                seed: Some(7),
                json: true,
            }
        );
        assert_eq!(args(&["--seed", "x"]).seed, None);
    }

    #[test]
    fn seed_override_and_validation() {
        let cfg = load_config(&args(&["--seed", "9"])).unwrap();
        assert_eq!(cfg.rng_seed, 9);
        assert_eq!(cfg.workers, 10);
    }

    #[test]
    fn yaml_config_is_read_and_validated() {
        let dir = std::env::temp_dir().join(format!("econ-sim-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let good = dir.join("good.yaml");
        std::fs::write(&good, "workers: 4\ncoop_price: 30\n").unwrap();
        let cfg = load_config(&Args {
            config: Some(good),
            ..Args::default()
        })
        .unwrap();
        assert_eq!(cfg.workers, 4);
        assert_eq!(cfg.coop_price, rust_decimal::Decimal::from(30));

        let bad = dir.join("bad.yaml");
        std::fs::write(&bad, "workers: 0\n").unwrap();
        assert!(load_config(&Args {
            config: Some(bad),
            ..Args::default()
        })
        .is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
