use std::path::PathBuf;

use verdant::{
    commands::{PointerButton, PointerEvent, PointerTarget},
    engine::{Engine, EngineBuilder, EngineSettings},
    rules::{AirImprovementRule, DegradationRule, FactoryRule, GrowthRule, SeedGenerationRule},
    scenario::{GrowthMode, PlantingMode, Scenario, ScenarioLoader},
    world::{World, WorldEvent, WorldSnapshot},
};

fn loader() -> ScenarioLoader {
    ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
}

fn fixture() -> Scenario {
    loader()
        .load("scenarios/backyard.yaml")
        .expect("scenario parses")
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

/// Plants a seed, grows it, and returns the events so far.
fn open_with_one_tree(engine: &mut Engine, world: &mut World) -> Vec<WorldEvent> {
    engine.pointer(
        world,
        &PointerEvent {
            x: 320.0,
            y: 200.0,
            button: PointerButton::Left,
            target: None,
        },
    );
    let mut events = world.drain_events();
    let id = events
        .iter()
        .find_map(|event| match event {
            WorldEvent::SeedPlanted { id, .. } => Some(*id),
            _ => None,
        })
        .expect("seed planted");
    engine.pointer(
        world,
        &PointerEvent {
            x: 0.0,
            y: 0.0,
            button: PointerButton::Right,
            target: Some(PointerTarget::Seed(id)),
        },
    );
    events.extend(world.drain_events());
    events
}

fn run_fixture_for(duration_ms: u64) -> WorldSnapshot {
    let scenario = fixture();
    let mut world = scenario.build_world();
    let mut engine = build_engine(&scenario, PathBuf::new(), 0);
    open_with_one_tree(&mut engine, &mut world);
    engine.run_for(&mut world, duration_ms).unwrap();
    world.snapshot(&scenario.name, engine.clock_ms())
}

#[test]
fn scenario_loader_reads_fixture() {
    let scenario = fixture();
    assert_eq!(scenario.name, "backyard");
    assert_eq!(scenario.seed, 42);
    assert_eq!(scenario.initial_seeds, 10);
    assert_eq!(scenario.rules.seed_generation_ms, 1_000);
    assert_eq!(scenario.rules.air_improvement_ms, 7_000);
    assert_eq!(scenario.rules.degradation_ms, 10_000);
    let factory = scenario.rules.factory.as_ref().expect("factory enabled");
    assert_eq!(factory.min_delay_ms, 10_000);
    assert_eq!(factory.max_delay_ms, 15_000);
    assert_eq!(factory.smog_delay_ms, 5_000);
    assert_eq!(scenario.planting.mode, PlantingMode::Seedling);
    assert_eq!(scenario.growth.mode, GrowthMode::Ramp);
    assert_eq!(scenario.world.width, 1280.0);
    assert_eq!(scenario.world.height, 720.0);
}

#[test]
fn same_seed_replays_the_same_game() {
    let first = run_fixture_for(40_000);
    let second = run_fixture_for(40_000);
    assert_eq!(first, second);
}

#[test]
fn engine_emits_snapshots_at_the_configured_interval() {
    let scenario = fixture();
    let temp = tempfile::tempdir().expect("tempdir");
    let snapshot_dir = temp.path().join("snaps");

    let mut world = scenario.build_world();
    let mut engine = build_engine(&scenario, snapshot_dir.clone(), 10_000);
    open_with_one_tree(&mut engine, &mut world);
    engine.run_for(&mut world, 30_000).unwrap();

    for clock in [10_000_u64, 20_000, 30_000] {
        let expected = snapshot_dir
            .join("backyard")
            .join(format!("t_{clock:08}.json"));
        assert!(
            expected.exists(),
            "expected snapshot {} to exist",
            expected.display()
        );
    }

    let data = std::fs::read_to_string(
        snapshot_dir.join("backyard").join("t_00010000.json"),
    )
    .unwrap();
    assert!(
        data.contains("\"scenario\": \"backyard\""),
        "snapshot should carry scenario metadata"
    );
}

#[test]
fn invalid_scenarios_fail_validation() {
    let mut scenario = fixture();
    scenario.rules.factory.as_mut().expect("factory").min_delay_ms = 20_000;
    assert!(scenario.validate().is_err());

    let mut scenario = fixture();
    scenario.world.width = 0.0;
    assert!(scenario.validate().is_err());
}
