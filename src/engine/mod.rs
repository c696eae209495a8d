//! Progression engine module
//!
//! Tier resolution, XP changes, premium gating and the claim state machine.

mod claim;
mod collaborators;
mod progression;
mod xp_rules;

#[cfg(test)]
mod property_tests;

pub use claim::*;
pub use collaborators::*;
pub use progression::*;
pub use xp_rules::*;
