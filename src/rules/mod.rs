mod air;
mod degradation;
mod factory;
mod generation;
mod growth;

pub use air::AirImprovementRule;
pub use degradation::DegradationRule;
pub use factory::FactoryRule;
pub use generation::SeedGenerationRule;
pub use growth::GrowthRule;
