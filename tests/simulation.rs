use std::path::PathBuf;

use verdant::{
    commands::{PointerButton, PointerEvent, PointerTarget},
    engine::{Engine, EngineBuilder, EngineSettings},
    rules::{AirImprovementRule, DegradationRule, FactoryRule, GrowthRule, SeedGenerationRule},
    scenario::{FactoryConfig, GrowthMode, PlantingMode, Scenario, ScenarioLoader},
    world::{GameStatus, SeedId, World, WorldEvent},
};

fn base_scenario() -> Scenario {
    ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
        .load("scenarios/backyard.yaml")
        .expect("scenario parses")
}

/// Fixture trimmed down to the deterministic core: instant growth, no
/// factory. Individual tests opt back into the pieces they exercise.
fn plain_scenario() -> Scenario {
    let mut scenario = base_scenario();
    scenario.rules.factory = None;
    scenario.growth.mode = GrowthMode::Instant;
    scenario
}

fn build_engine(scenario: &Scenario, snapshot_dir: PathBuf, snapshot_interval_ms: u64) -> Engine {
    let settings = EngineSettings {
        scenario_name: scenario.name.clone(),
        seed: scenario.seed,
        planting: scenario.planting.clone(),
        growth: scenario.growth.clone(),
        snapshot_interval_ms,
        snapshot_dir,
    };
    let mut builder = EngineBuilder::new(settings)
        .with_rule(SeedGenerationRule::new(
            scenario.rules.seed_generation_ms,
            scenario.rules.one_shot,
            scenario.growth.duration_ms,
        ))
        .with_rule(AirImprovementRule::new(scenario.rules.air_improvement_ms))
        .with_rule(DegradationRule::new(scenario.rules.degradation_ms));
    if scenario.growth.mode == GrowthMode::Ramp {
        builder.push_rule(GrowthRule::new(scenario.growth.step_ms));
    }
    if let Some(factory) = &scenario.rules.factory {
        builder.push_rule(FactoryRule::new(factory.clone()));
    }
    builder.build()
}

fn left_click(x: f32, y: f32) -> PointerEvent {
    PointerEvent {
        x,
        y,
        button: PointerButton::Left,
        target: None,
    }
}

fn right_on_seed(id: SeedId) -> PointerEvent {
    PointerEvent {
        x: 0.0,
        y: 0.0,
        button: PointerButton::Right,
        target: Some(PointerTarget::Seed(id)),
    }
}

fn planted_seed_id(world: &mut World) -> SeedId {
    world
        .drain_events()
        .iter()
        .find_map(|event| match event {
            WorldEvent::SeedPlanted { id, .. } => Some(*id),
            _ => None,
        })
        .expect("a seed was planted")
}

/// Plants a seed at the given position and grows it immediately.
fn grow_tree_at(engine: &mut Engine, world: &mut World, x: f32, y: f32) {
    engine.pointer(world, &left_click(x, y));
    let id = planted_seed_id(world);
    engine.pointer(world, &right_on_seed(id));
}

#[test]
fn planting_and_promotion_follow_the_inventory() {
    let scenario = plain_scenario();
    let mut world = scenario.build_world();
    let mut engine = build_engine(&scenario, PathBuf::new(), 0);

    assert_eq!(world.seeds(), 10);
    engine.pointer(&mut world, &left_click(5.0, 5.0));
    assert_eq!(world.seeds(), 9);
    assert_eq!(world.seed_entity_count(), 1);

    let id = planted_seed_id(&mut world);
    engine.pointer(&mut world, &right_on_seed(id));
    assert_eq!(world.seed_entity_count(), 0);
    assert_eq!(world.tree_count(), 1);
    let tree = world.tree(world.tree_ids()[0]).expect("tree exists");
    assert_eq!((tree.x, tree.y), (5.0, 5.0));
    assert_eq!(tree.health, 100);
}

#[test]
fn unwatered_trees_die_on_the_fifth_tick_with_one_flat_air_penalty() {
    let scenario = plain_scenario();
    let mut world = scenario.build_world();
    let mut engine = build_engine(&scenario, PathBuf::new(), 0);

    // Two trees from t=0, a third 15 s in; the first two die together on
    // their fifth degradation tick while the third keeps the game alive.
    grow_tree_at(&mut engine, &mut world, 5.0, 5.0);
    grow_tree_at(&mut engine, &mut world, 6.0, 6.0);
    engine.run_for(&mut world, 15_000).unwrap();
    world.adjust_air_quality(50);
    grow_tree_at(&mut engine, &mut world, 7.0, 7.0);

    engine.run_for(&mut world, 34_999).unwrap();
    assert_eq!(engine.clock_ms(), 49_999);
    assert_eq!(world.tree_count(), 3);
    for id in world.tree_ids() {
        let health = world.tree(id).expect("tree alive").health;
        assert!(health == 20 || health == 40, "unexpected health {health}");
    }
    // 50 injected + 3 from generation + 2*2 + 5*3 from air improvement.
    assert_eq!(world.air_quality(), 72);

    engine.run_for(&mut world, 1).unwrap();
    assert_eq!(world.tree_count(), 1);
    let survivor = world.tree(world.tree_ids()[0]).expect("survivor");
    assert_eq!(survivor.health, 20);
    // Two trees died this tick; the penalty still applies exactly once.
    assert_eq!(world.air_quality(), 62);
    assert_eq!(world.status(), GameStatus::Running);
}

#[test]
fn game_over_freezes_clock_rules_and_input() {
    let scenario = plain_scenario();
    let mut world = scenario.build_world();
    let mut engine = build_engine(&scenario, PathBuf::new(), 0);

    // Nothing planted: the first degradation tick finds no trees.
    engine.run_for(&mut world, 10_000).unwrap();
    assert_eq!(world.status(), GameStatus::GameOver);
    assert_eq!(world.air_quality(), 0);
    assert_eq!(engine.clock_ms(), 10_000);
    assert!(world.drain_events().contains(&WorldEvent::GameOver));

    engine.pointer(&mut world, &left_click(5.0, 5.0));
    engine.run_for(&mut world, 60_000).unwrap();
    assert_eq!(world.seeds(), 10);
    assert_eq!(world.seed_entity_count(), 0);
    assert_eq!(world.air_quality(), 0);
    assert_eq!(engine.clock_ms(), 10_000);
    assert!(world.drain_events().is_empty());
}

#[test]
fn purchase_mode_needs_the_full_price() {
    let mut scenario = plain_scenario();
    scenario.planting.mode = PlantingMode::Purchase;
    scenario.initial_seeds = 9;
    let mut world = scenario.build_world();
    let mut engine = build_engine(&scenario, PathBuf::new(), 0);

    engine.pointer(&mut world, &left_click(100.0, 100.0));
    assert_eq!(world.seeds(), 9);
    assert_eq!(world.tree_count(), 0);

    world.gain_seed();
    engine.pointer(&mut world, &left_click(100.0, 100.0));
    assert_eq!(world.seeds(), 0);
    assert_eq!(world.tree_count(), 1);
    assert_eq!(world.seed_entity_count(), 0);
}

#[test]
fn smog_halves_air_quality_a_fixed_delay_after_each_appearance() {
    let mut scenario = plain_scenario();
    // Pin the sampled range so the appearance lands at exactly 12 s.
    scenario.rules.factory = Some(FactoryConfig {
        min_delay_ms: 12_000,
        max_delay_ms: 12_000,
        smog_delay_ms: 5_000,
    });
    let mut world = scenario.build_world();
    let mut engine = build_engine(&scenario, PathBuf::new(), 0);

    grow_tree_at(&mut engine, &mut world, 5.0, 5.0);
    world.adjust_air_quality(40);

    // Air at smog time (17 s): 40 + 1 generation + 2 improvements = 43.
    engine.run_for(&mut world, 17_000).unwrap();
    assert_eq!(world.air_quality(), 21);
    let events = world.drain_events();
    assert!(events.contains(&WorldEvent::FactoryAppeared));
    assert!(events.contains(&WorldEvent::SmogApplied { reduction: 22 }));

    // The next appearance lands a full sampled delay after the previous.
    engine.run_for(&mut world, 7_000).unwrap();
    let later = world.drain_events();
    assert_eq!(
        later
            .iter()
            .filter(|event| **event == WorldEvent::FactoryAppeared)
            .count(),
        1
    );
}

#[test]
fn every_tick_generation_variant_regenerates_per_tree() {
    let mut scenario = plain_scenario();
    scenario.rules.one_shot = false;
    let mut world = scenario.build_world();
    let mut engine = build_engine(&scenario, PathBuf::new(), 0);

    grow_tree_at(&mut engine, &mut world, 5.0, 5.0);
    engine.run_for(&mut world, 3_000).unwrap();
    assert_eq!(world.air_quality(), 3);
    assert_eq!(world.seed_entity_count(), 3);
}

#[test]
fn ramp_growth_climbs_to_full_health_over_the_seed_window() {
    let mut scenario = base_scenario();
    scenario.rules.factory = None;
    assert_eq!(scenario.growth.mode, GrowthMode::Ramp);
    let mut world = scenario.build_world();
    let mut engine = build_engine(&scenario, PathBuf::new(), 0);

    grow_tree_at(&mut engine, &mut world, 5.0, 5.0);
    let id = world.tree_ids()[0];
    assert_eq!(world.tree(id).expect("sapling").health, 1);

    engine.run_for(&mut world, 1_000).unwrap();
    assert_eq!(world.tree(id).expect("sapling").health, 21);

    engine.run_for(&mut world, 4_000).unwrap();
    let tree = world.tree(id).expect("grown tree");
    assert_eq!(tree.health, 100);
    assert_eq!(tree.growing_until, None);
    assert_eq!(world.air_quality(), 1);
    assert_eq!(world.seed_entity_count(), 1);
}
