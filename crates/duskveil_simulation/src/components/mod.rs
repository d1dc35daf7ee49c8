//! ECS components for simulation entities.
//!
//! Organized by domain:
//! - agent: identity, rank/archetype, templates, config, runtime facts, health
//! - combat: melee swing state
//! - movement: the nav-agent adapter and patrol routes
//! - perception: perceivable markers and stance profiles

pub mod agent;
pub mod combat;
pub mod movement;
pub mod perception;

// Re-exports for convenient imports
pub use agent::*;
pub use combat::*;
pub use movement::*;
pub use perception::*;
