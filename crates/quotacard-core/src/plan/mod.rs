//! View model: the ordered sections a card render shows.

pub mod builder;
pub mod types;

pub use builder::build;
pub use types::{Badge, Meter, PlanBlock, Provider, ProviderSection, RenderPlan, SectionBody};
