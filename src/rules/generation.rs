use anyhow::Result;
use rand::Rng;

use crate::{
    engine::{Rule, RuleContext},
    rng::RuleRng,
    world::World,
};

/// Periodic seed generation: every generating tree improves air quality by
/// one and drops a seed at a random on-screen position.
pub struct SeedGenerationRule {
    interval_ms: u64,
    one_shot: bool,
    growth_ms: u64,
}

impl SeedGenerationRule {
    pub fn new(interval_ms: u64, one_shot: bool, growth_ms: u64) -> Self {
        Self {
            interval_ms,
            one_shot,
            growth_ms,
        }
    }
}

impl Rule for SeedGenerationRule {
    fn name(&self) -> &str {
        "seed_generation"
    }

    fn first_delay_ms(&mut self, _rng: &mut RuleRng<'_>) -> u64 {
        self.interval_ms
    }

    fn fire(
        &mut self,
        _ctx: &RuleContext,
        world: &mut World,
        rng: &mut RuleRng<'_>,
    ) -> Result<u64> {
        for id in world.tree_ids() {
            let generates = match world.tree_mut(id) {
                Some(tree) if self.one_shot && tree.has_generated_seed => false,
                Some(tree) => {
                    tree.has_generated_seed = true;
                    true
                }
                None => false,
            };
            if generates {
                world.adjust_air_quality(1);
                let (width, height) = world.bounds();
                let x = rng.gen_range(0.0..width);
                let y = rng.gen_range(0.0..height);
                world.spawn_seed(x, y, self.growth_ms);
            }
        }
        Ok(self.interval_ms)
    }
}
