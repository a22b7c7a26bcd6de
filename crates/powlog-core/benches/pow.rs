use criterion::{criterion_group, criterion_main, Criterion};
use powlog_core::{pow::mine, Candidate};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn bench_pow(c: &mut Criterion) {
    c.bench_function("mine_block_difficulty_3", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        let payload: String = (0..64)
            .map(|_| rng.gen_range(b'a'..=b'z') as char)
            .collect();
        let candidate = Candidate::with_timestamp(
            payload,
            "2024-01-01T00:00:00.000000+00:00",
            "0",
            rng.gen_range(0.0..10.0),
        );

        b.iter(|| {
            let _mined = mine(candidate.clone(), 3);
        });
    });
}

criterion_group!(benches, bench_pow);
criterion_main!(benches);
