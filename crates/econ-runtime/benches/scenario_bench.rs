use criterion::{criterion_group, criterion_main, Criterion};
use econ_chaos::Chaos;
use econ_core::EconomyConfig;

fn bench_full_economy(c: &mut Criterion) {
    let cfg = EconomyConfig {
        workers: 1_000,
        ..EconomyConfig::default()
    };
    let mut chaos = Chaos::seeded(cfg.rng_seed);
    c.bench_function("full_economy_1000_workers", |b| {
        b.iter(|| {
            let _ = econ_runtime::full_economy(&cfg, &mut chaos);
        })
    });
}

criterion_group!(benches, bench_full_economy);
criterion_main!(benches);
