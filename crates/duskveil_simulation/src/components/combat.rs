//! Combat state components.

use bevy::prelude::*;

/// Melee swing windup duration (seconds).
pub const SWING_WINDUP: f32 = 0.3;
/// Melee swing recovery duration (seconds).
pub const SWING_RECOVERY: f32 = 0.4;

/// Swing phases: windup telegraphs the strike, the hit lands exactly once
/// between windup and recovery, recovery keeps the agent planted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum SwingPhase {
    Windup,
    Recovery,
}

/// One in-flight melee swing. Stands in for animation-driven attack timing:
/// the hit frame fires at the windup/recovery boundary and the swing ends
/// when recovery runs out, restoring movement.
#[derive(Debug, Clone, Reflect)]
pub struct AttackSwing {
    pub phase: SwingPhase,
    /// Time remaining in the current phase (seconds).
    pub phase_timer: f32,
    /// Guards the at-most-once damage application.
    pub hit_applied: bool,
}

impl AttackSwing {
    pub fn new() -> Self {
        Self {
            phase: SwingPhase::Windup,
            phase_timer: SWING_WINDUP,
            hit_applied: false,
        }
    }
}

impl Default for AttackSwing {
    fn default() -> Self {
        Self::new()
    }
}
