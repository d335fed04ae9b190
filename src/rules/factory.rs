use anyhow::Result;

use crate::{
    engine::{Rule, RuleContext},
    rng::RuleRng,
    scenario::FactoryConfig,
    world::{World, WorldEvent},
};

/// Factory pollution, a two-phase cycle: the factory appears after a
/// uniformly sampled delay, and a fixed smog delay later half the current
/// air quality (rounded) goes up in smoke. The next appearance lands a
/// full freshly sampled delay after the previous one, so scenario
/// validation requires `min_delay_ms > smog_delay_ms`.
pub struct FactoryRule {
    config: FactoryConfig,
    smog_pending: bool,
}

impl FactoryRule {
    pub fn new(config: FactoryConfig) -> Self {
        Self {
            config,
            smog_pending: false,
        }
    }

    fn sample(&self, rng: &mut RuleRng<'_>) -> u64 {
        rng.sample_delay_ms(self.config.min_delay_ms, self.config.max_delay_ms)
    }
}

impl Rule for FactoryRule {
    fn name(&self) -> &str {
        "factory"
    }

    fn first_delay_ms(&mut self, rng: &mut RuleRng<'_>) -> u64 {
        self.sample(rng)
    }

    fn fire(
        &mut self,
        _ctx: &RuleContext,
        world: &mut World,
        rng: &mut RuleRng<'_>,
    ) -> Result<u64> {
        if self.smog_pending {
            self.smog_pending = false;
            let reduction = (world.air_quality() as f64 * 0.5).round() as i64;
            if reduction > 0 {
                world.adjust_air_quality(-reduction);
            }
            world.record(WorldEvent::SmogApplied { reduction });
            Ok(self.sample(rng) - self.config.smog_delay_ms)
        } else {
            self.smog_pending = true;
            world.record(WorldEvent::FactoryAppeared);
            Ok(self.config.smog_delay_ms)
        }
    }
}
