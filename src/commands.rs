use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::scenario::{GrowthConfig, GrowthMode, PlantingConfig, PlantingMode};
use crate::world::{GameStatus, SeedId, TreeId, World, WorldEvent, MAX_TREE_HEALTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    Left,
    Right,
}

/// Entity under the pointer, resolved by the presentation layer's hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum PointerTarget {
    Seed(SeedId),
    Tree(TreeId),
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
    pub button: PointerButton,
    #[serde(default)]
    pub target: Option<PointerTarget>,
}

/// Translates one pointer event into world mutations.
///
/// Left click on empty ground plants (or purchases, in threshold mode),
/// left click on a seed picks it up, right click on a seed grows it into a
/// tree immediately, right click on a tree waters it. Everything else,
/// stale target ids included, is a no-op; so is any input after game over.
pub fn apply(
    world: &mut World,
    event: &PointerEvent,
    now_ms: u64,
    planting: &PlantingConfig,
    growth: &GrowthConfig,
) {
    if world.status() != GameStatus::Running {
        debug!("pointer event ignored: game is over");
        return;
    }
    match (event.button, event.target) {
        (PointerButton::Left, None) => plant(world, event.x, event.y, planting, growth),
        (PointerButton::Left, Some(PointerTarget::Seed(id))) => pick_up(world, id),
        (PointerButton::Right, Some(PointerTarget::Seed(id))) => {
            world.promote_seed_to_tree(id, now_ms, growth.mode == GrowthMode::Ramp);
        }
        (PointerButton::Right, Some(PointerTarget::Tree(id))) => {
            world.water_tree(id);
        }
        _ => {}
    }
}

fn plant(world: &mut World, x: f32, y: f32, planting: &PlantingConfig, growth: &GrowthConfig) {
    match planting.mode {
        PlantingMode::Seedling => {
            if world.spend_seeds(1) {
                world.plant_seed(x, y, growth.duration_ms);
            } else {
                debug!("plant refused: inventory empty");
            }
        }
        PlantingMode::Purchase => {
            if world.spend_seeds(planting.purchase_cost) {
                world.add_tree(x, y, MAX_TREE_HEALTH);
            } else {
                debug!(cost = planting.purchase_cost, "purchase refused: not enough seeds");
            }
        }
    }
}

fn pick_up(world: &mut World, id: SeedId) {
    if world.remove_seed(id).is_some() {
        world.gain_seed();
        world.record(WorldEvent::SeedPickedUp { id });
    }
}
