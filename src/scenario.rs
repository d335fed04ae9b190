use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::world::World;

fn default_initial_seeds() -> u32 {
    10
}

fn default_duration_ms() -> u64 {
    120_000
}

fn default_snapshot_interval_ms() -> u64 {
    10_000
}

fn default_world_width() -> f32 {
    1280.0
}

fn default_world_height() -> f32 {
    720.0
}

fn default_seed_generation_ms() -> u64 {
    1_000
}

fn default_one_shot() -> bool {
    true
}

fn default_air_improvement_ms() -> u64 {
    7_000
}

fn default_degradation_ms() -> u64 {
    10_000
}

fn default_min_factory_delay_ms() -> u64 {
    10_000
}

fn default_max_factory_delay_ms() -> u64 {
    15_000
}

fn default_smog_delay_ms() -> u64 {
    5_000
}

fn default_purchase_cost() -> u32 {
    10
}

fn default_growth_duration_ms() -> u64 {
    5_000
}

fn default_growth_step_ms() -> u64 {
    50
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    /// Starting inventory, the pre-game form value.
    #[serde(default = "default_initial_seeds")]
    pub initial_seeds: u32,
    /// Default headless run length.
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    #[serde(default = "default_snapshot_interval_ms")]
    pub snapshot_interval_ms: u64,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub planting: PlantingConfig,
    #[serde(default)]
    pub growth: GrowthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorldConfig {
    #[serde(default = "default_world_width")]
    pub width: f32,
    #[serde(default = "default_world_height")]
    pub height: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: default_world_width(),
            height: default_world_height(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RulesConfig {
    #[serde(default = "default_seed_generation_ms")]
    pub seed_generation_ms: u64,
    /// With `true` each tree generates a single seed ever; with `false` it
    /// regenerates on every generation tick (the simpler variant).
    #[serde(default = "default_one_shot")]
    pub one_shot: bool,
    #[serde(default = "default_air_improvement_ms")]
    pub air_improvement_ms: u64,
    #[serde(default = "default_degradation_ms")]
    pub degradation_ms: u64,
    /// Absent means no factory pollution events.
    #[serde(default)]
    pub factory: Option<FactoryConfig>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            seed_generation_ms: default_seed_generation_ms(),
            one_shot: default_one_shot(),
            air_improvement_ms: default_air_improvement_ms(),
            degradation_ms: default_degradation_ms(),
            factory: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FactoryConfig {
    /// Appearance delays are uniformly sampled from this inclusive range.
    #[serde(default = "default_min_factory_delay_ms")]
    pub min_delay_ms: u64,
    #[serde(default = "default_max_factory_delay_ms")]
    pub max_delay_ms: u64,
    /// Fixed delay between an appearance and its smog taking effect.
    #[serde(default = "default_smog_delay_ms")]
    pub smog_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlantingConfig {
    #[serde(default)]
    pub mode: PlantingMode,
    /// Seeds consumed per tree in purchase mode.
    #[serde(default = "default_purchase_cost")]
    pub purchase_cost: u32,
}

impl Default for PlantingConfig {
    fn default() -> Self {
        Self {
            mode: PlantingMode::default(),
            purchase_cost: default_purchase_cost(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantingMode {
    /// Left-click spends one seed and plants a seed entity.
    #[default]
    Seedling,
    /// Left-click spends the full purchase cost and plants a tree directly.
    Purchase,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrowthConfig {
    #[serde(default)]
    pub mode: GrowthMode,
    /// Growth window attached to each planted or generated seed.
    #[serde(default = "default_growth_duration_ms")]
    pub duration_ms: u64,
    /// Cadence of the sapling health ramp (ramp mode only).
    #[serde(default = "default_growth_step_ms")]
    pub step_ms: u64,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            mode: GrowthMode::default(),
            duration_ms: default_growth_duration_ms(),
            step_ms: default_growth_step_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthMode {
    /// Promoted seeds sprout as health-1 saplings that ramp to full health
    /// over their growth window.
    #[default]
    Ramp,
    /// Promoted seeds sprout at full health immediately.
    Instant,
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("world bounds must be positive, got {width}x{height}")]
    InvalidBounds { width: f32, height: f32 },
    #[error("rule interval '{name}' must be greater than zero")]
    ZeroInterval { name: &'static str },
    #[error("factory delay range is inverted ({min_delay_ms}..{max_delay_ms})")]
    InvertedFactoryRange { min_delay_ms: u64, max_delay_ms: u64 },
    #[error(
        "factory smog delay ({smog_delay_ms} ms) must be shorter than the \
         minimum appearance delay ({min_delay_ms} ms)"
    )]
    SmogDelayTooLong { smog_delay_ms: u64, min_delay_ms: u64 },
    #[error("purchase cost must be greater than zero")]
    ZeroPurchaseCost,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario.validate()?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.world.width <= 0.0 || self.world.height <= 0.0 {
            return Err(ScenarioError::InvalidBounds {
                width: self.world.width,
                height: self.world.height,
            });
        }
        for (name, interval) in [
            ("seed_generation_ms", self.rules.seed_generation_ms),
            ("air_improvement_ms", self.rules.air_improvement_ms),
            ("degradation_ms", self.rules.degradation_ms),
        ] {
            if interval == 0 {
                return Err(ScenarioError::ZeroInterval { name });
            }
        }
        if self.growth.mode == GrowthMode::Ramp && self.growth.step_ms == 0 {
            return Err(ScenarioError::ZeroInterval { name: "growth.step_ms" });
        }
        if let Some(factory) = &self.rules.factory {
            if factory.min_delay_ms > factory.max_delay_ms {
                return Err(ScenarioError::InvertedFactoryRange {
                    min_delay_ms: factory.min_delay_ms,
                    max_delay_ms: factory.max_delay_ms,
                });
            }
            if factory.smog_delay_ms >= factory.min_delay_ms {
                return Err(ScenarioError::SmogDelayTooLong {
                    smog_delay_ms: factory.smog_delay_ms,
                    min_delay_ms: factory.min_delay_ms,
                });
            }
        }
        if self.planting.mode == PlantingMode::Purchase && self.planting.purchase_cost == 0 {
            return Err(ScenarioError::ZeroPurchaseCost);
        }
        Ok(())
    }

    pub fn build_world(&self) -> World {
        World::new(self.world.width, self.world.height, self.initial_seeds)
    }

    pub fn duration(&self, override_ms: Option<u64>) -> u64 {
        override_ms.unwrap_or(self.duration_ms)
    }
}
