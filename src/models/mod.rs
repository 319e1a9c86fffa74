//! Core data models for league statistics.

mod chip;
mod ids;
mod member;
mod snapshot;
mod stats;
mod upstream;

pub use chip::*;
pub use ids::*;
pub use member::*;
pub use snapshot::*;
pub use stats::*;
pub use upstream::*;
