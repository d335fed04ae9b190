use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use verdant::{
    engine::{EngineBuilder, EngineSettings},
    rules::{AirImprovementRule, DegradationRule, FactoryRule, GrowthRule, SeedGenerationRule},
    scenario::{GrowthMode, ScenarioLoader},
    web,
    world::GameStatus,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Urban-harvesting ecosystem simulation")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/backyard.yaml")]
    scenario: PathBuf,

    /// Override the headless run duration in milliseconds
    #[arg(long)]
    duration_ms: Option<u64>,

    /// Override the snapshot interval in milliseconds (0 disables)
    #[arg(long)]
    snapshot_interval_ms: Option<u64>,

    /// Directory for snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Serve the playable browser front end instead of running headless
    #[arg(long)]
    serve: bool,

    /// Bind host for --serve
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Bind port for --serve
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;
    let snapshot_interval_ms = cli
        .snapshot_interval_ms
        .unwrap_or(scenario.snapshot_interval_ms);
    let snapshot_dir = cli
        .snapshot_dir
        .unwrap_or_else(|| PathBuf::from("snapshots"));

    if cli.serve {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        return runtime.block_on(web::run(web::WebServerConfig {
            scenario,
            snapshot_interval_ms,
            snapshot_dir,
            host: cli.host,
            port: cli.port,
        }));
    }

    let duration_ms = scenario.duration(cli.duration_ms);
    let mut world = scenario.build_world();
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
    let mut engine = builder.build();

    engine.run_for(&mut world, duration_ms)?;
    match world.status() {
        GameStatus::GameOver => println!(
            "Scenario '{}' ended in game over at {} ms.",
            scenario.name,
            engine.clock_ms()
        ),
        GameStatus::Running => println!(
            "Scenario '{}' still running after {} ms: {} seeds in stock, {} trees, air quality {}.",
            scenario.name,
            engine.clock_ms(),
            world.seeds(),
            world.tree_count(),
            world.air_quality()
        ),
    }
    Ok(())
}
