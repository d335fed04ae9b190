use std::path::PathBuf;

use anyhow::Result;
use tracing::{error, info};

use crate::{
    commands::{self, PointerEvent},
    rng::{RngManager, RuleRng},
    scenario::{GrowthConfig, PlantingConfig},
    snapshot::SnapshotWriter,
    world::{GameStatus, World},
};

pub struct EngineSettings {
    pub scenario_name: String,
    pub seed: u64,
    pub planting: PlantingConfig,
    pub growth: GrowthConfig,
    pub snapshot_interval_ms: u64,
    pub snapshot_dir: PathBuf,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    rules: Vec<Box<dyn Rule + Send>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: impl Rule + Send + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn push_rule(&mut self, rule: impl Rule + Send + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn build(self) -> Engine {
        let mut rng = RngManager::new(self.settings.seed);
        let schedule = self
            .rules
            .into_iter()
            .map(|mut rule| {
                let name = rule.name().to_string();
                let due_ms = rule.first_delay_ms(&mut rng.stream(&name));
                ScheduledRule { rule, due_ms }
            })
            .collect();
        Engine {
            rng,
            schedule,
            snapshot_writer: SnapshotWriter::new(
                &self.settings.snapshot_dir,
                self.settings.snapshot_interval_ms,
            ),
            settings: self.settings,
            clock_ms: 0,
        }
    }
}

struct ScheduledRule {
    rule: Box<dyn Rule + Send>,
    due_ms: u64,
}

/// Event-driven rules engine over a millisecond virtual clock.
///
/// Every rule keeps its own cadence, so the relative periods of the rules
/// are the difficulty curve; there is no master tick. Due entries fire in
/// timestamp order, ties broken by registration order. The first transition
/// to game over drops the whole schedule: nothing mutates a finished game.
pub struct Engine {
    rng: RngManager,
    schedule: Vec<ScheduledRule>,
    snapshot_writer: SnapshotWriter,
    settings: EngineSettings,
    clock_ms: u64,
}

impl Engine {
    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn scenario_name(&self) -> &str {
        &self.settings.scenario_name
    }

    /// Routes one pointer event into the world at the current clock.
    pub fn pointer(&mut self, world: &mut World, event: &PointerEvent) {
        commands::apply(
            world,
            event,
            self.clock_ms,
            &self.settings.planting,
            &self.settings.growth,
        );
    }

    /// Fires every due rule up to `target_ms`, in timestamp order.
    pub fn advance_to(&mut self, world: &mut World, target_ms: u64) -> Result<()> {
        while world.status() == GameStatus::Running {
            let Some(idx) = self.next_due(target_ms) else {
                break;
            };
            self.clock_ms = self.schedule[idx].due_ms.max(self.clock_ms);
            let now_ms = self.clock_ms;
            let name = self.schedule[idx].rule.name().to_string();
            let ctx = RuleContext { now_ms };
            let outcome = {
                let entry = &mut self.schedule[idx];
                let mut stream = self.rng.stream(&name);
                entry.rule.fire(&ctx, world, &mut stream)
            };
            match outcome {
                Ok(delay_ms) => self.schedule[idx].due_ms = now_ms + delay_ms,
                Err(err) => {
                    // A failing rule is retired rather than allowed to
                    // wedge the schedule; the rest of the game carries on.
                    error!(rule = %name, "rule failed, retiring it: {err:#}");
                    self.schedule.remove(idx);
                }
            }
            self.snapshot_writer
                .maybe_write(world, &self.settings.scenario_name, self.clock_ms)?;
            if world.status() != GameStatus::Running {
                self.freeze();
                return Ok(());
            }
        }
        if world.status() == GameStatus::Running && target_ms > self.clock_ms {
            self.clock_ms = target_ms;
            self.snapshot_writer
                .maybe_write(world, &self.settings.scenario_name, self.clock_ms)?;
        }
        Ok(())
    }

    /// Advances the clock by `duration_ms` from wherever it stands.
    pub fn run_for(&mut self, world: &mut World, duration_ms: u64) -> Result<()> {
        let target = self.clock_ms + duration_ms;
        self.advance_to(world, target)
    }

    fn next_due(&self, target_ms: u64) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (idx, entry) in self.schedule.iter().enumerate() {
            if entry.due_ms > target_ms {
                continue;
            }
            match best {
                Some(current) if entry.due_ms >= self.schedule[current].due_ms => {}
                _ => best = Some(idx),
            }
        }
        best
    }

    fn freeze(&mut self) {
        if !self.schedule.is_empty() {
            info!(
                scenario = %self.settings.scenario_name,
                clock_ms = self.clock_ms,
                "game over, freezing the schedule"
            );
            self.schedule.clear();
        }
    }
}

pub struct RuleContext {
    pub now_ms: u64,
}

/// One independently scheduled simulation rule.
pub trait Rule {
    fn name(&self) -> &str;

    /// Delay from engine start until the first firing.
    fn first_delay_ms(&mut self, rng: &mut RuleRng<'_>) -> u64;

    /// Fires the rule and returns the delay until its next firing.
    fn fire(
        &mut self,
        ctx: &RuleContext,
        world: &mut World,
        rng: &mut RuleRng<'_>,
    ) -> Result<u64>;
}
