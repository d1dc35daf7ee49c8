use bevy::prelude::*;
use rand::Rng;

use crate::ai::machine::{AgentState, StateCtx, StateKind};
use crate::components::movement::ARRIVE_EPS;

const PAUSE_RANGE: std::ops::Range<f32> = 1.0..3.0;
const WANDER_RADIUS: std::ops::Range<f32> = 3.0..8.0;

/// Walking a waypoint loop, or wandering near the spawn anchor when no
/// waypoints were configured. Pauses a random [1,3]s at each stop.
#[derive(Default)]
pub struct PatrolState {
    pause_remaining: f32,
    walking: bool,
}

impl PatrolState {
    fn next_destination(&self, ctx: &mut StateCtx) -> Vec3 {
        if let Some(waypoint) = ctx.route.current_waypoint() {
            return waypoint;
        }
        let angle = ctx.rng.gen_range(0.0..std::f32::consts::TAU);
        let radius = ctx.rng.gen_range(WANDER_RADIUS);
        let offset = Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);
        ctx.geometry.clamp_navigable(ctx.route.anchor + offset)
    }

    fn start_leg(&mut self, ctx: &mut StateCtx) {
        let dest = self.next_destination(ctx);
        self.walking = ctx.move_to(dest);
        if !self.walking {
            self.pause_remaining = ctx.rng.gen_range(PAUSE_RANGE);
        }
    }
}

impl AgentState for PatrolState {
    fn kind(&self) -> StateKind {
        StateKind::Patrol
    }

    fn enter(&mut self, ctx: &mut StateCtx) {
        ctx.facts.target = None;
        ctx.facts.target_visible = false;
        ctx.set_alerted(false);
        ctx.nav.speed = ctx.config.walk_speed;
        self.start_leg(ctx);
    }

    fn update(&mut self, ctx: &mut StateCtx, dt: f32) {
        if self.walking {
            let arrived = !ctx.nav.has_pending_path() && ctx.nav.remaining_distance() <= ARRIVE_EPS;
            if arrived {
                self.walking = false;
                self.pause_remaining = ctx.rng.gen_range(PAUSE_RANGE);
                ctx.route.advance();
            }
            return;
        }

        self.pause_remaining -= dt;
        if self.pause_remaining <= 0.0 {
            self.start_leg(ctx);
        }
    }

    fn exit(&mut self, _ctx: &mut StateCtx) {}

    fn on_noise_heard(&mut self, ctx: &mut StateCtx, position: Vec3, _intensity: f32) {
        ctx.facts.investigation_point = Some(position);
        ctx.request(StateKind::Investigate);
    }

    fn on_target_spotted(&mut self, ctx: &mut StateCtx, target: Entity, position: Vec3) {
        ctx.facts.target = Some(target);
        ctx.facts.target_position = position;
        ctx.facts.target_visible = true;
        let next = ctx.engage_kind();
        ctx.request(next);
    }
}
