//! Movement agent adapter and patrol routes.
//!
//! `NavAgent` is the abstraction over path-following locomotion. Behavior
//! states talk to it through the adapter surface (destination, halt, path
//! queries, warp) and never assume a concrete navigation backend. The
//! bundled `drive_nav_agents` system integrates straight-line motion for
//! headless runs; an engine host replaces it with real navmesh traversal.

use bevy::prelude::*;

/// Destination is considered reached within this distance.
pub const ARRIVE_EPS: f32 = 0.3;

/// Path-following locomotion adapter.
#[derive(Component, Debug, Clone)]
pub struct NavAgent {
    pub speed: f32,
    destination: Option<Vec3>,
    halted: bool,
    usable: bool,
    velocity: Vec3,
    pending_warp: Option<Vec3>,
    last_position: Vec3,
}

impl NavAgent {
    pub fn new(speed: f32, position: Vec3) -> Self {
        Self {
            speed,
            destination: None,
            halted: false,
            usable: true,
            velocity: Vec3::ZERO,
            pending_warp: None,
            last_position: position,
        }
    }

    /// Request a path to `pos`. Returns false when the agent is not
    /// currently usable (mid-teleport, off-surface); callers must treat
    /// that as a transient condition, not an error.
    pub fn set_destination(&mut self, pos: Vec3) -> bool {
        if !self.usable {
            return false;
        }
        self.destination = Some(pos);
        true
    }

    pub fn halt(&mut self, halted: bool) {
        self.halted = halted;
        if halted {
            self.velocity = Vec3::ZERO;
        }
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn reset_path(&mut self) {
        self.destination = None;
        self.velocity = Vec3::ZERO;
    }

    pub fn remaining_distance(&self) -> f32 {
        match self.destination {
            Some(dest) => {
                let delta = dest - self.last_position;
                Vec3::new(delta.x, 0.0, delta.z).length()
            }
            None => 0.0,
        }
    }

    pub fn has_pending_path(&self) -> bool {
        self.destination.is_some()
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Teleport on the next locomotion tick, dropping any pending path.
    pub fn warp(&mut self, pos: Vec3) {
        self.pending_warp = Some(pos);
    }

    /// Validity/on-surface guard. Every movement call site checks this
    /// first and substitutes a short wait when it fails.
    pub fn is_usable(&self) -> bool {
        self.usable
    }

    pub fn set_usable(&mut self, usable: bool) {
        self.usable = usable;
    }
}

/// Cyclic waypoint route plus the spawn anchor used for random sampling
/// when no waypoints were authored.
#[derive(Component, Debug, Clone, Default)]
pub struct PatrolRoute {
    pub waypoints: Vec<Vec3>,
    pub index: usize,
    pub anchor: Vec3,
}

impl PatrolRoute {
    pub fn current_waypoint(&self) -> Option<Vec3> {
        self.waypoints.get(self.index).copied()
    }

    pub fn advance(&mut self) {
        if !self.waypoints.is_empty() {
            self.index = (self.index + 1) % self.waypoints.len();
        }
    }
}

/// System: straight-line locomotion for headless simulation.
///
/// Applies pending warps, then moves each usable, un-halted agent toward
/// its destination at `speed`, facing along the motion direction. Vertical
/// motion is left to the host; movement happens in the XZ plane.
pub fn drive_nav_agents(
    time: Res<Time<Fixed>>,
    mut agents: Query<(&mut NavAgent, &mut Transform)>,
) {
    let delta = time.delta_secs();

    for (mut nav, mut transform) in agents.iter_mut() {
        if let Some(pos) = nav.pending_warp.take() {
            transform.translation = pos;
            nav.destination = None;
            nav.velocity = Vec3::ZERO;
            nav.last_position = pos;
            continue;
        }

        nav.last_position = transform.translation;

        if !nav.usable || nav.halted {
            nav.velocity = Vec3::ZERO;
            continue;
        }

        let Some(dest) = nav.destination else {
            nav.velocity = Vec3::ZERO;
            continue;
        };

        let to_dest = dest - transform.translation;
        let flat = Vec3::new(to_dest.x, 0.0, to_dest.z);
        let dist = flat.length();

        if dist <= ARRIVE_EPS {
            nav.destination = None;
            nav.velocity = Vec3::ZERO;
            continue;
        }

        let dir = flat / dist;
        let step = (nav.speed * delta).min(dist);
        transform.translation += dir * step;
        transform.look_to(dir, Vec3::Y);
        nav.velocity = dir * nav.speed;
        nav.last_position = transform.translation;
    }
}
