pub mod engine;
pub mod grouping;
pub mod item;
pub mod orchestrator;
pub mod policy;

pub use engine::{Decision, PeriodKey, PolicyEngine};
pub use grouping::{GroupKey, PatternGrouping, RetentionUnit, build_units};
pub use item::Item;
pub use orchestrator::{KeptItem, Retention, RetentionResult};
pub use policy::{PolicyConfig, Tier};
