use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use std::sync::Arc;
use votedao_governance::{ManualClock, StaticBalances, VotingEngine};
use votedao_types::{Address, Weight};

const ADMIN: Address = Address::from_bytes([0xaa; 20]);
const VOTERS: u32 = 1_000;

fn voter(i: u32) -> Address {
    let mut bytes = [0u8; 20];
    bytes[..4].copy_from_slice(&i.to_be_bytes());
    bytes[19] = 1;
    Address::from_bytes(bytes)
}

/// Engine with one open 20-candidate vote and `VOTERS` funded voters.
fn setup() -> VotingEngine {
    let balances = StaticBalances::with_balances((0..VOTERS).map(|i| (voter(i), Weight::from_tokens(100))));
    let engine = VotingEngine::new(ADMIN, Arc::new(balances), Arc::new(ManualClock::new(150)));
    let candidates = (0..20).map(|i| format!("candidate-{}", i)).collect();
    engine.create_vote(&ADMIN, candidates, 100, 200).ok();
    engine
}

fn bench_weight(c: &mut Criterion) {
    let mut group = c.benchmark_group("weight");
    let w = Weight::from_raw(1_234_567_890_123_456_789_012);
    group.bench_function("format_units", |b| b.iter(|| black_box(w.format_units())));
    group.bench_function("from_decimal_str", |b| {
        b.iter(|| black_box(Weight::from_decimal_str("1234.567890123456789012").is_ok()))
    });
    group.finish();
}

fn bench_cast(c: &mut Criterion) {
    let mut group = c.benchmark_group("cast");
    group.throughput(Throughput::Elements(VOTERS as u64));

    let selection: Vec<u32> = (0..10).collect();
    group.bench_function("first_ballots_10_selections", |b| {
        b.iter_batched(
            setup,
            |engine| {
                for i in 0..VOTERS {
                    black_box(engine.vote(&voter(i), 1, &selection).is_ok());
                }
            },
            BatchSize::LargeInput,
        )
    });

    let engine = setup();
    for i in 0..VOTERS {
        engine.vote(&voter(i), 1, &[0]).ok();
    }
    group.bench_function("recast_single_selection", |b| {
        b.iter(|| {
            for i in 0..VOTERS {
                black_box(engine.vote(&voter(i), 1, &[(i % 20) as u32]).is_ok());
            }
        })
    });
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");
    let engine = setup();
    for i in 0..VOTERS {
        engine.vote(&voter(i), 1, &[(i % 20) as u32, ((i + 7) % 20) as u32]).ok();
    }

    group.bench_function("get_vote_results", |b| {
        b.iter(|| black_box(engine.get_vote_results(1).is_ok()))
    });
    group.bench_function("get_all_user_vote_results", |b| {
        b.iter(|| black_box(engine.get_all_user_vote_results(&voter(42)).len()))
    });
    group.bench_function("audit_tally", |b| {
        b.iter(|| black_box(engine.audit_tally(1).is_ok()))
    });
    group.finish();
}

criterion_group!(benches, bench_weight, bench_cast, bench_queries);
criterion_main!(benches);
