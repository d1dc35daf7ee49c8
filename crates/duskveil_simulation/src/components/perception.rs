//! Components attached to entities that agents can perceive.

use bevy::prelude::*;

/// Marker: this entity can be seen and targeted by agents.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Perceivable;

/// Movement/stance profile of a perceivable entity. Modifies the
/// observer's effective detection range against it.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub enum Stance {
    Upright,
    /// Sprinting extends the observer's effective sight range.
    Sprinting,
    /// Crouched but moving: somewhat harder to spot.
    Crouched,
    /// Crouched and still: hardest to spot (range floor still applies).
    CrouchedStill,
}

impl Default for Stance {
    fn default() -> Self {
        Self::Upright
    }
}
