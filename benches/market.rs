//! Full-run benchmarks per algorithm (Criterion).
//!
//! Run: `cargo bench` or `cargo bench --bench market`.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use dynamic_matching::{inverse_squared_distance, Algorithm, Driver, DriverConfig, Simulator};

fn busy_config(seed: u64) -> DriverConfig {
    DriverConfig {
        seed,
        p_node: 1.0,
        min_to_add: 1,
        max_to_add: 4,
        departure_mean: 6.0,
        departure_std: 2.0,
        ..Default::default()
    }
}

fn bench_run(c: &mut Criterion, name: &str, batch: Option<u64>) {
    const STEPS: u64 = 500;
    let mut group = c.benchmark_group("market");
    group.throughput(Throughput::Elements(STEPS));
    group.bench_function(format!("{}_{}_steps", name, STEPS), |b| {
        b.iter_batched(
            || {
                let algorithm = Algorithm::from_name(name, batch).unwrap();
                let driver = Driver::new(busy_config(42)).unwrap();
                let sim = Simulator::new(inverse_squared_distance);
                (algorithm, driver, sim)
            },
            |(mut algorithm, mut driver, mut sim)| {
                driver.run(&mut algorithm, &mut sim, STEPS).unwrap();
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_greedy(c: &mut Criterion) {
    bench_run(c, "greedy", None);
}

fn bench_deferred(c: &mut Criterion) {
    bench_run(c, "deferred", None);
}

fn bench_batched_deferred(c: &mut Criterion) {
    bench_run(c, "deferred", Some(4));
}

criterion_group!(benches, bench_greedy, bench_deferred, bench_batched_deferred);
criterion_main!(benches);
