use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hspchain::libs::chaining::{exhaustive_chains, greedy_chains, ExhaustiveLimits, ScoringPolicy};
use hspchain::libs::hsp::{Hsp, Strand};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

// Roughly collinear exons with some scattered paralog hits
fn random_group(n: usize, seed: u64) -> Vec<Hsp> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut q = 0i64;
    let mut s = 10_000i64;

    let mut hsps: Vec<Hsp> = (0..n)
        .map(|_| {
            let len = rng.gen_range(50..300);
            let (q_start, s_start) = if rng.gen_bool(0.2) {
                (q + rng.gen_range(0..100), rng.gen_range(0..1_000_000))
            } else {
                q += len + rng.gen_range(0..60);
                s += len + rng.gen_range(0..60);
                (q, s)
            };
            Hsp::new(
                "chr1",
                q_start,
                q_start + len,
                s_start,
                s_start + len,
                Strand::Forward,
                rng.gen_range(20.0..200.0),
            )
            .unwrap()
        })
        .collect();

    hsps.sort_by_key(|h| h.sort_key());
    hsps
}

fn bench_chainers(c: &mut Criterion) {
    let policy = ScoringPolicy::default();
    let limits = ExhaustiveLimits::default();

    let small = random_group(9, 11);
    let large = random_group(500, 11);

    c.bench_function("greedy_9", |b| {
        b.iter(|| greedy_chains(black_box(&small), &policy).unwrap())
    });
    c.bench_function("exhaustive_9", |b| {
        b.iter(|| exhaustive_chains(black_box(&small), &policy, &limits).unwrap())
    });
    c.bench_function("greedy_500", |b| {
        b.iter(|| greedy_chains(black_box(&large), &policy).unwrap())
    });
}

criterion_group!(benches, bench_chainers);
criterion_main!(benches);
