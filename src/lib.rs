pub mod commands;
pub mod engine;
pub mod rng;
pub mod rules;
pub mod scenario;
pub mod snapshot;
pub mod web;
pub mod world;

pub use engine::{Engine, EngineBuilder, EngineSettings};
pub use scenario::{Scenario, ScenarioLoader};
pub use world::{GameStatus, World, WorldSnapshot};
