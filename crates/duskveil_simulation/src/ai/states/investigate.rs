use bevy::prelude::*;

use crate::ai::machine::{AgentState, StateCtx, StateKind};
use crate::components::movement::ARRIVE_EPS;

pub const INVESTIGATE_TIMEOUT_SECS: f32 = 10.0;

/// Look-around turn rate once the agent has reached the point of interest.
const LOOK_AROUND_RATE: f32 = 1.2;

/// Walking to the last point of interest and looking around there. Any
/// renewed noise re-targets the point and resets the clock; the whole
/// visit is capped at ten seconds before giving up back to Patrol.
#[derive(Default)]
pub struct InvestigateState {
    elapsed: f32,
    arrived: bool,
}

impl AgentState for InvestigateState {
    fn kind(&self) -> StateKind {
        StateKind::Investigate
    }

    fn enter(&mut self, ctx: &mut StateCtx) {
        self.elapsed = 0.0;
        self.arrived = false;
        ctx.set_alerted(true);
        ctx.nav.speed = ctx.config.walk_speed;
        let Some(point) = ctx.facts.investigation_point.take() else {
            ctx.request(StateKind::Patrol);
            return;
        };
        if !ctx.move_to(point) {
            self.arrived = true;
        }
    }

    fn update(&mut self, ctx: &mut StateCtx, dt: f32) {
        self.elapsed += dt;
        if self.elapsed >= INVESTIGATE_TIMEOUT_SECS {
            ctx.request(StateKind::Patrol);
            return;
        }

        if !self.arrived {
            if !ctx.nav.has_pending_path() && ctx.nav.remaining_distance() <= ARRIVE_EPS {
                self.arrived = true;
                ctx.nav.halt(true);
            }
            return;
        }

        // Sweep the view around so the perception cone covers the area.
        ctx.transform.rotate_y(LOOK_AROUND_RATE * dt);
    }

    fn exit(&mut self, ctx: &mut StateCtx) {
        ctx.set_alerted(false);
        ctx.nav.halt(false);
    }

    fn on_noise_heard(&mut self, ctx: &mut StateCtx, position: Vec3, _intensity: f32) {
        self.elapsed = 0.0;
        self.arrived = false;
        ctx.nav.halt(false);
        if !ctx.move_to(position) {
            self.arrived = true;
        }
    }

    fn on_target_spotted(&mut self, ctx: &mut StateCtx, target: Entity, position: Vec3) {
        ctx.facts.target = Some(target);
        ctx.facts.target_position = position;
        ctx.facts.target_visible = true;
        let next = ctx.engage_kind();
        ctx.request(next);
    }
}
