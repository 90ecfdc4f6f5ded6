use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::SmallRng, SeedableRng};
use serde_json::json;

use geoquiz::{
    catalog::Catalog,
    playable::PlayableSet,
    quiz::state::{GuessOutcome, QuizState},
    types::QuizMode,
    world::{geometry::ConcatUnion, regions::RegionCollection, topology::WorldTopology},
};

fn world_topology() -> WorldTopology {
    let catalog = Catalog::bundled().expect("bundled catalog");
    let geometries: Vec<serde_json::Value> = catalog
        .records()
        .iter()
        .filter_map(|r| r.numeric_code())
        .map(|id| json!({ "type": "Polygon", "id": id.to_string(), "arcs": [[0]] }))
        .collect();
    WorldTopology::from_value(json!({
        "objects": { "countries": { "geometries": geometries } }
    }))
}

fn bench_playable_build(c: &mut Criterion) {
    let catalog = Catalog::bundled().expect("bundled catalog");
    let topo = world_topology();

    c.bench_function("normalize_and_build_playable_set", |b| {
        b.iter(|| {
            let regions = RegionCollection::from_topology(&topo, &ConcatUnion);
            PlayableSet::build(&regions, &catalog)
        });
    });
}

fn bench_full_solve(c: &mut Criterion) {
    let catalog = Catalog::bundled().expect("bundled catalog");
    let topo = world_topology();
    let regions = RegionCollection::from_topology(&topo, &ConcatUnion);
    let playable = PlayableSet::build(&regions, &catalog);

    c.bench_function("solve_entire_playable_set", |b| {
        b.iter(|| {
            let mut rng = SmallRng::seed_from_u64(1);
            let mut state = QuizState::new(playable.clone(), QuizMode::FlagSelect, 3);
            state.initialize(&mut rng);
            while let Some(target) = state.target() {
                match state.submit_guess(target) {
                    GuessOutcome::Correct { schedule, .. } => {
                        let _ = state.on_timer(schedule, &mut rng);
                    }
                    other => panic!("unexpected outcome: {other:?}"),
                }
            }
            state.solved()
        });
    });
}

criterion_group!(benches, bench_playable_build, bench_full_solve);
criterion_main!(benches);
