#![deny(warnings)]

//! External shocks: natural disasters and strikes.
//!
//! [`Chaos`] holds no economic state of its own. Every shock consumes one
//! draw from an injected [`DrawSource`], so runs can be seeded for
//! repeatability or scripted outright in tests.

use econ_core::{Cooperative, Worker};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::ops::RangeInclusive;
use tracing::{info, warn};

/// Percentage of production a natural disaster can destroy.
pub const DISASTER_PCT: RangeInclusive<u32> = 10..=50;
/// Hours a strike can take off each shift.
pub const STRIKE_HOURS: RangeInclusive<u32> = 1..=3;

/// Source of uniform integer draws.
pub trait DrawSource {
    /// Draw an integer uniformly from the inclusive `range`.
    fn draw(&mut self, range: RangeInclusive<u32>) -> u32;
}

/// Draws backed by any [`rand::Rng`].
#[derive(Clone, Debug)]
pub struct RngDraws<R>(pub R);

impl<R: Rng> DrawSource for RngDraws<R> {
    fn draw(&mut self, range: RangeInclusive<u32>) -> u32 {
        self.0.gen_range(range)
    }
}

/// Draws replayed from a fixed list.
///
/// Values are clamped into the requested range. Once the list is exhausted
/// the lower bound of the range is returned, a warning is logged and the
/// miss is counted in [`ScriptedDraws::exhausted_draws`].
#[derive(Clone, Debug, Default)]
pub struct ScriptedDraws {
    values: VecDeque<u32>,
    exhausted: usize,
}

impl ScriptedDraws {
    pub fn new<I: IntoIterator<Item = u32>>(values: I) -> Self {
        Self {
            values: values.into_iter().collect(),
            exhausted: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// Draws requested after the script ran out.
    pub fn exhausted_draws(&self) -> usize {
        self.exhausted
    }
}

impl DrawSource for ScriptedDraws {
    fn draw(&mut self, range: RangeInclusive<u32>) -> u32 {
        let (lo, hi) = (*range.start(), *range.end());
        match self.values.pop_front() {
            Some(v) => v.clamp(lo, hi),
            None => {
                self.exhausted += 1;
                warn!(lo, hi, "scripted draws exhausted; using lower bound");
                lo
            }
        }
    }
}

/// Shock generator over a draw source.
#[derive(Clone, Debug)]
pub struct Chaos<D = RngDraws<ChaCha8Rng>> {
    draws: D,
}

impl Chaos {
    /// Chaos driven by a ChaCha8 stream seeded with `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::new(RngDraws(ChaCha8Rng::seed_from_u64(seed)))
    }
}

impl<D: DrawSource> Chaos<D> {
    pub fn new(draws: D) -> Self {
        Self { draws }
    }

    pub fn draws(&self) -> &D {
        &self.draws
    }

    /// Destroy between 10% and 50% of the cooperative's production.
    ///
    /// Returns the percentage drawn.
    pub fn natural_disaster(&mut self, cooperative: &mut Cooperative) -> u32 {
        let pct = self.draws.draw(DISASTER_PCT);
        let keep = Decimal::ONE - Decimal::new(i64::from(pct), 2);
        cooperative.production *= keep;
        info!(
            pct,
            production = %cooperative.production,
            "natural disaster reduced the cooperative's production"
        );
        pct
    }

    /// Cut between 1 and 3 hours from every worker who has more than that.
    ///
    /// Workers at or below the cut are left alone rather than floored, so
    /// hours never go negative. Returns the reduction drawn.
    pub fn strike<'a, I>(&mut self, workers: I) -> u32
    where
        I: IntoIterator<Item = &'a mut Worker>,
    {
        let cut = self.draws.draw(STRIKE_HOURS);
        let cut_hours = Decimal::from(cut);
        let mut affected = 0usize;
        for w in workers {
            if w.hours > cut_hours {
                w.hours -= cut_hours;
                affected += 1;
            }
        }
        info!(hours = cut, affected, "strike reduced the workers' hours");
        cut
    }
}
