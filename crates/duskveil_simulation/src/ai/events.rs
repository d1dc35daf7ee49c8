//! AI events: sensor stimuli in, facade commands in, alert notices out.

use bevy::prelude::*;

/// Perception/noise stimuli addressed to one agent's state machine.
///
/// Written by the perception and noise passes, drained by the brain pass
/// on the same tick and forwarded to the agent's current state only.
#[derive(Event, Debug, Clone)]
pub enum SensorEvent {
    /// A perceivable target entered detection (or was re-sighted).
    TargetSpotted {
        observer: Entity,
        target: Entity,
        position: Vec3,
    },
    /// Every candidate failed the scan while a target was set and visible.
    TargetLost { observer: Entity },
    /// A noise arrived above the observer's hearing threshold.
    NoiseHeard {
        observer: Entity,
        position: Vec3,
        intensity: f32,
    },
}

/// External facade commands (combat system, scripted triggers, player
/// abilities). Applied by the brain pass before the per-tick update.
#[derive(Event, Debug, Clone)]
pub enum AgentCommand {
    /// Force an immediate transition into Stunned for `duration` seconds.
    Stun { agent: Entity, duration: f32 },
    /// Teleport along the force vector (clamped to navigable space) and
    /// force a short stun.
    ApplyPush { agent: Entity, force: Vec3 },
    /// Force Investigate at a position (scent/pheromone triggers).
    AttractTo { agent: Entity, position: Vec3 },
}

/// Fire-and-forget notice published on every rising edge of an agent's
/// alert flag. Consumed by ambient-tension systems, not by the core.
#[derive(Event, Debug, Clone)]
pub struct AgentAlerted {
    pub agent: Entity,
    pub last_known: Vec3,
}
