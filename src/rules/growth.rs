use anyhow::Result;

use crate::{
    engine::{Rule, RuleContext},
    rng::RuleRng,
    world::{World, MAX_TREE_HEALTH},
};

/// Sapling health ramp (ramp variant only): while a tree's growth window is
/// open it gains one health per step, up to the cap. The window closes on
/// its own schedule; watering and degradation apply on top as usual.
pub struct GrowthRule {
    step_ms: u64,
}

impl GrowthRule {
    pub fn new(step_ms: u64) -> Self {
        Self { step_ms }
    }
}

impl Rule for GrowthRule {
    fn name(&self) -> &str {
        "growth"
    }

    fn first_delay_ms(&mut self, _rng: &mut RuleRng<'_>) -> u64 {
        self.step_ms
    }

    fn fire(
        &mut self,
        ctx: &RuleContext,
        world: &mut World,
        _rng: &mut RuleRng<'_>,
    ) -> Result<u64> {
        for id in world.tree_ids() {
            if let Some(tree) = world.tree_mut(id) {
                match tree.growing_until {
                    Some(until) if ctx.now_ms < until => {
                        if tree.health < MAX_TREE_HEALTH {
                            tree.health += 1;
                        }
                    }
                    Some(_) => tree.growing_until = None,
                    None => {}
                }
            }
        }
        Ok(self.step_ms)
    }
}
