use anyhow::Result;

use crate::{
    engine::{Rule, RuleContext},
    rng::RuleRng,
    world::World,
};

/// Periodic air-quality improvement: air rises by the live tree count.
pub struct AirImprovementRule {
    interval_ms: u64,
}

impl AirImprovementRule {
    pub fn new(interval_ms: u64) -> Self {
        Self { interval_ms }
    }
}

impl Rule for AirImprovementRule {
    fn name(&self) -> &str {
        "air_improvement"
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
        world.adjust_air_quality(world.tree_count() as i64);
        Ok(self.interval_ms)
    }
}
