//! Benchmarks for full battles and the damage pipeline.
//!
//! Run with:
//!   cargo bench --bench battle_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;

use skirmish_engine::character::{load_roster, Character, CharacterTemplate};
use skirmish_engine::core::{BattleConfig, Team};
use skirmish_engine::resolution::DamageResolver;
use skirmish_engine::BattleOrchestrator;

fn rosters() -> (Vec<CharacterTemplate>, Vec<CharacterTemplate>) {
    let data = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/rosters");
    let heroes = load_roster(&data.join("heroes.json")).expect("heroes roster");
    let monsters = load_roster(&data.join("monsters.json")).expect("monsters roster");
    (heroes, monsters)
}

fn bench_full_battle(c: &mut Criterion) {
    let (heroes, monsters) = rosters();
    let mut group = c.benchmark_group("full_battle");

    for seed in [1u64, 7, 42] {
        group.bench_with_input(BenchmarkId::from_parameter(seed), &seed, |b, &seed| {
            b.iter(|| {
                let config = BattleConfig {
                    seed: Some(seed),
                    ..BattleConfig::default()
                };
                let mut battle = BattleOrchestrator::new(config);
                battle
                    .start_battle(black_box(&heroes), black_box(&monsters))
                    .expect("battle starts");
                black_box(battle.run_to_completion())
            });
        });
    }
    group.finish();
}

fn bench_damage_calc(c: &mut Criterion) {
    let (heroes, monsters) = rosters();
    let attacker = Character::from_template(&heroes[0], Team::Player, 0);
    let defender = Character::from_template(&monsters[0], Team::Enemy, 0);
    let ability = attacker.abilities.first().cloned();
    let resolver = DamageResolver::default();
    let mut rng = ChaCha8Rng::seed_from_u64(9);

    c.bench_function("compute_damage", |b| {
        b.iter(|| {
            resolver.compute_damage(
                black_box(&attacker),
                black_box(&defender),
                black_box(ability.as_ref()),
                &mut rng,
            )
        })
    });
}

criterion_group!(benches, bench_full_battle, bench_damage_calc);
criterion_main!(benches);
