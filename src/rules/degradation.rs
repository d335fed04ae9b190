use anyhow::Result;

use crate::{
    engine::{Rule, RuleContext},
    rng::RuleRng,
    world::{World, DEGRADE_AIR_PENALTY},
};

/// Periodic degradation. Order is fixed: degrade every tree, apply the flat
/// air penalty if any tree died, then evaluate the terminal condition.
pub struct DegradationRule {
    interval_ms: u64,
}

impl DegradationRule {
    pub fn new(interval_ms: u64) -> Self {
        Self { interval_ms }
    }
}

impl Rule for DegradationRule {
    fn name(&self) -> &str {
        "degradation"
    }

    fn first_delay_ms(&mut self, _rng: &mut RuleRng<'_>) -> u64 {
        self.interval_ms
    }

    fn fire(
        &mut self,
        _ctx: &RuleContext,
        world: &mut World,
        _rng: &mut RuleRng<'_>,
    ) -> Result<u64> {
        let removed = world.degrade_all();
        if !removed.is_empty() {
            // Flat penalty once per tick, not per removed tree.
            world.adjust_air_quality(-DEGRADE_AIR_PENALTY);
        }
        world.evaluate_game_over();
        Ok(self.interval_ms)
    }
}
