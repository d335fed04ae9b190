use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Health granted by one watering.
pub const WATER_HEALTH_BONUS: i32 = 20;
/// Health lost by every tree on a degradation tick.
pub const DEGRADE_HEALTH_PENALTY: i32 = 20;
/// Upper clamp for tree health.
pub const MAX_TREE_HEALTH: i32 = 100;
/// Health of a freshly sprouted sapling in the ramp variant.
pub const SAPLING_HEALTH: i32 = 1;
/// Flat air-quality penalty applied once per degradation tick that removed
/// at least one tree, regardless of how many died.
pub const DEGRADE_AIR_PENALTY: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeedId(u64);

impl SeedId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TreeId(u64);

impl TreeId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A planted (or tree-generated) seed waiting to be grown or picked up.
#[derive(Debug, Clone)]
pub struct Seed {
    pub x: f32,
    pub y: f32,
    /// Growth duration carried from config at plant time; in the ramp
    /// variant it becomes the sapling's health ramp window on promotion.
    pub growth_ms: u64,
}

#[derive(Debug, Clone)]
pub struct Tree {
    pub x: f32,
    pub y: f32,
    pub health: i32,
    /// One-shot generation flag. Never reset once set.
    pub has_generated_seed: bool,
    /// Clock instant until which the sapling health ramp applies.
    pub growing_until: Option<u64>,
}

impl Tree {
    /// Display scale the presentation derives from health.
    pub fn display_scale(&self) -> f32 {
        1.0 + self.health as f32 * 0.01
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Running,
    GameOver,
}

/// Discrete notifications for the presentation layer, drained per frame.
/// Continuous values (counters, health) travel in [`WorldSnapshot`] instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorldEvent {
    SeedPlanted { id: SeedId, x: f32, y: f32 },
    SeedSpawned { id: SeedId, x: f32, y: f32 },
    SeedPickedUp { id: SeedId },
    TreeSprouted { id: TreeId, x: f32, y: f32, health: i32 },
    TreeWatered { id: TreeId, health: i32 },
    TreeRemoved { id: TreeId },
    FactoryAppeared,
    SmogApplied { reduction: i64 },
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedSnapshot {
    pub id: u64,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub health: i32,
    pub scale: f32,
    pub has_generated_seed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub scenario: String,
    pub clock_ms: u64,
    pub width: f32,
    pub height: f32,
    pub seeds: u32,
    pub air_quality: i64,
    pub status: GameStatus,
    pub trees: Vec<TreeSnapshot>,
    pub seed_entities: Vec<SeedSnapshot>,
}

/// Entity registry plus resource counters plus game status.
///
/// Each entity is a single record addressed by a stable id; there are no
/// parallel per-entity side lists to keep index-aligned.
pub struct World {
    next_id: u64,
    width: f32,
    height: f32,
    seeds: u32,
    air_quality: i64,
    status: GameStatus,
    seed_entities: BTreeMap<SeedId, Seed>,
    trees: BTreeMap<TreeId, Tree>,
    events: Vec<WorldEvent>,
}

impl World {
    pub fn new(width: f32, height: f32, initial_seeds: u32) -> Self {
        Self {
            next_id: 0,
            width,
            height,
            seeds: initial_seeds,
            air_quality: 0,
            status: GameStatus::Running,
            seed_entities: BTreeMap::new(),
            trees: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    pub fn bounds(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn seeds(&self) -> u32 {
        self.seeds
    }

    pub fn air_quality(&self) -> i64 {
        self.air_quality
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn seed_entity_count(&self) -> usize {
        self.seed_entities.len()
    }

    pub fn tree(&self, id: TreeId) -> Option<&Tree> {
        self.trees.get(&id)
    }

    pub fn tree_mut(&mut self, id: TreeId) -> Option<&mut Tree> {
        self.trees.get_mut(&id)
    }

    pub fn tree_ids(&self) -> Vec<TreeId> {
        self.trees.keys().copied().collect()
    }

    pub fn seed_entity(&self, id: SeedId) -> Option<&Seed> {
        self.seed_entities.get(&id)
    }

    pub fn seed_ids(&self) -> Vec<SeedId> {
        self.seed_entities.keys().copied().collect()
    }

    // Resource counters

    /// Decrements the inventory, or refuses without mutating anything.
    pub fn spend_seeds(&mut self, n: u32) -> bool {
        if self.seeds < n {
            return false;
        }
        self.seeds -= n;
        true
    }

    pub fn gain_seed(&mut self) {
        self.seeds += 1;
    }

    /// Adds `delta` to air quality, clamping at zero from below.
    pub fn adjust_air_quality(&mut self, delta: i64) {
        self.air_quality = (self.air_quality + delta).max(0);
    }

    // Entity registry

    pub fn plant_seed(&mut self, x: f32, y: f32, growth_ms: u64) -> SeedId {
        let id = SeedId(self.allocate());
        self.seed_entities.insert(id, Seed { x, y, growth_ms });
        self.record(WorldEvent::SeedPlanted { id, x, y });
        id
    }

    pub fn spawn_seed(&mut self, x: f32, y: f32, growth_ms: u64) -> SeedId {
        let id = SeedId(self.allocate());
        self.seed_entities.insert(id, Seed { x, y, growth_ms });
        self.record(WorldEvent::SeedSpawned { id, x, y });
        id
    }

    pub fn remove_seed(&mut self, id: SeedId) -> Option<Seed> {
        self.seed_entities.remove(&id)
    }

    /// Destroys the seed and plants a tree in its place. With `ramp` the
    /// tree sprouts as a sapling whose health climbs until the seed's
    /// growth window closes; otherwise it sprouts at full health.
    pub fn promote_seed_to_tree(&mut self, id: SeedId, now_ms: u64, ramp: bool) -> Option<TreeId> {
        let seed = self.seed_entities.remove(&id)?;
        let (health, growing_until) = if ramp {
            (SAPLING_HEALTH, Some(now_ms + seed.growth_ms))
        } else {
            (MAX_TREE_HEALTH, None)
        };
        Some(self.insert_tree(seed.x, seed.y, health, growing_until))
    }

    /// Plants a tree directly, skipping the seed stage (purchase mode).
    pub fn add_tree(&mut self, x: f32, y: f32, health: i32) -> TreeId {
        self.insert_tree(x, y, health, None)
    }

    pub fn remove_tree(&mut self, id: TreeId) -> Option<Tree> {
        let tree = self.trees.remove(&id)?;
        self.record(WorldEvent::TreeRemoved { id });
        Some(tree)
    }

    pub fn water_tree(&mut self, id: TreeId) -> Option<i32> {
        let tree = self.trees.get_mut(&id)?;
        tree.health = (tree.health + WATER_HEALTH_BONUS).min(MAX_TREE_HEALTH);
        let health = tree.health;
        self.record(WorldEvent::TreeWatered { id, health });
        Some(health)
    }

    /// Reduces every tree's health by the degradation penalty and removes
    /// trees at or below zero. Returns the removed ids in ascending order.
    pub fn degrade_all(&mut self) -> Vec<TreeId> {
        let mut removed = Vec::new();
        for (id, tree) in self.trees.iter_mut() {
            tree.health -= DEGRADE_HEALTH_PENALTY;
            if tree.health <= 0 {
                removed.push(*id);
            }
        }
        for id in &removed {
            self.trees.remove(id);
            self.record(WorldEvent::TreeRemoved { id: *id });
        }
        removed
    }

    /// Terminal-condition check, run after every degradation tick: no trees
    /// left, or air quality exhausted. On transition the air counter is
    /// forced to zero and any surviving trees are cleared.
    pub fn evaluate_game_over(&mut self) -> bool {
        if self.status == GameStatus::GameOver {
            return true;
        }
        if !self.trees.is_empty() && self.air_quality > 0 {
            return false;
        }
        self.air_quality = 0;
        let survivors: Vec<TreeId> = self.trees.keys().copied().collect();
        for id in survivors {
            self.remove_tree(id);
        }
        self.status = GameStatus::GameOver;
        self.record(WorldEvent::GameOver);
        true
    }

    // Presentation boundary

    pub(crate) fn record(&mut self, event: WorldEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self, scenario: &str, clock_ms: u64) -> WorldSnapshot {
        let trees = self
            .trees
            .iter()
            .map(|(id, tree)| TreeSnapshot {
                id: id.raw(),
                x: tree.x,
                y: tree.y,
                health: tree.health,
                scale: tree.display_scale(),
                has_generated_seed: tree.has_generated_seed,
            })
            .collect();
        let seed_entities = self
            .seed_entities
            .iter()
            .map(|(id, seed)| SeedSnapshot {
                id: id.raw(),
                x: seed.x,
                y: seed.y,
            })
            .collect();
        WorldSnapshot {
            scenario: scenario.to_string(),
            clock_ms,
            width: self.width,
            height: self.height,
            seeds: self.seeds,
            air_quality: self.air_quality,
            status: self.status,
            trees,
            seed_entities,
        }
    }

    fn insert_tree(&mut self, x: f32, y: f32, health: i32, growing_until: Option<u64>) -> TreeId {
        let id = TreeId(self.allocate());
        self.trees.insert(
            id,
            Tree {
                x,
                y,
                health,
                has_generated_seed: false,
                growing_until,
            },
        );
        self.record(WorldEvent::TreeSprouted { id, x, y, health });
        id
    }

    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
