use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use swapmatch_core::*;
use tempfile::TempDir;

fn unit_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("Hall {}", i)).collect()
}

fn generate_requests(kind: RequestKind, population: usize, units: usize) -> Vec<ExchangeRequest> {
    let mut rng = StdRng::seed_from_u64(42);
    let names = unit_names(units);

    (0..population)
        .map(|i| {
            let owner = Participant::new(
                format!("p{}", i),
                format!("Participant {}", i),
                format!("p{}@example.edu", i),
            );
            let held = Resource::new(&names[rng.gen_range(0..units)]).unwrap();
            let desired = match kind {
                RequestKind::Preference => DesiredResources::Ranked(
                    names
                        .choose_multiple(&mut rng, 3)
                        .map(|n| Resource::new(n).unwrap())
                        .collect(),
                ),
                RequestKind::Cycle => DesiredResources::Single(
                    Resource::new(&names[rng.gen_range(0..units)]).unwrap(),
                ),
            };
            ExchangeRequest::new(&owner, held, None, desired)
        })
        .collect()
}

fn bench_graph_build(c: &mut Criterion) {
    let snapshot = generate_requests(RequestKind::Preference, 1000, 200);

    c.bench_function("wants graph build (1k preference requests)", |b| {
        b.iter(|| WantsGraph::build(RequestKind::Preference, &snapshot));
    });
}

fn bench_mutual_for_every_caller(c: &mut Criterion) {
    let snapshot = generate_requests(RequestKind::Preference, 1000, 200);
    let graph = WantsGraph::build(RequestKind::Preference, &snapshot);

    c.bench_function("mutual matches for every caller (1k)", |b| {
        b.iter(|| {
            (0..graph.len())
                .map(|caller| mutual_for(&graph, caller).len())
                .sum::<usize>()
        });
    });
}

fn bench_global_listing(c: &mut Criterion) {
    let snapshot = generate_requests(RequestKind::Preference, 1000, 200);
    let graph = WantsGraph::build(RequestKind::Preference, &snapshot);

    c.bench_function("global mutual listing (1k)", |b| {
        b.iter(|| all_mutual(&graph));
    });
}

fn bench_chain_search(c: &mut Criterion) {
    // Few units and single desires: dense graph, few direct swaps
    let snapshot = generate_requests(RequestKind::Cycle, 1000, 50);
    let graph = WantsGraph::build(RequestKind::Cycle, &snapshot);

    c.bench_function("chain search for every caller (1k cycle requests)", |b| {
        b.iter(|| {
            (0..graph.len())
                .map(|caller| chains_for(&graph, caller).len())
                .sum::<usize>()
        });
    });
}

fn bench_engine_query_memory(c: &mut Criterion) {
    let engine = SwapEngine::new(Arc::new(MemoryStore::new()), EngineConfig::default()).unwrap();
    let requests = generate_requests(RequestKind::Preference, 500, 100);
    for request in &requests {
        engine.store().insert_request(request).unwrap();
    }
    let caller = Participant::new("p0", "Participant 0", "p0@example.edu");

    c.bench_function("engine mutual query (memory, 500)", |b| {
        b.iter(|| engine.list_mutual_matches(&caller).unwrap());
    });
}

fn bench_engine_query_redb(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let engine = SwapEngine::open(temp_dir.path().join("bench.redb"), EngineConfig::default())
        .unwrap();
    let requests = generate_requests(RequestKind::Cycle, 500, 100);
    for request in &requests {
        engine.store().insert_request(request).unwrap();
    }
    let caller = Participant::new("p0", "Participant 0", "p0@example.edu");

    c.bench_function("engine cycle query (redb, 500)", |b| {
        b.iter(|| engine.list_cycle_matches(&caller).unwrap());
    });
}

fn bench_request_insert_redb(c: &mut Criterion) {
    c.bench_function("request insert (redb)", |b| {
        b.iter_batched(
            || {
                let temp_dir = TempDir::new().unwrap();
                let store = RedbStore::open(temp_dir.path().join("bench.redb")).unwrap();
                let request = generate_requests(RequestKind::Cycle, 1, 10).remove(0);
                (store, request, temp_dir)
            },
            |(store, request, _temp)| {
                store.insert_request(&request).unwrap();
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_graph_build,
    bench_mutual_for_every_caller,
    bench_global_listing,
    bench_chain_search,
    bench_engine_query_memory,
    bench_engine_query_redb,
    bench_request_insert_redb,
);
criterion_main!(benches);
