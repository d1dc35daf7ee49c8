use bevy::prelude::*;
use rand::Rng;

use crate::ai::machine::{AgentState, StateCtx, StateKind};
use crate::components::movement::ARRIVE_EPS;

pub const CHASE_LOST_SIGHT_SECS: f32 = 5.0;

/// How far a waiting-on-cooldown strafe step reaches.
const STRAFE_STEP: f32 = 2.0;

/// Running the target down at chase speed. Closing to attack range hands
/// off to Attack when the cooldown is clear, otherwise circles the target
/// until it is. Five full seconds without sight degrades to Investigate.
#[derive(Default)]
pub struct ChaseState {
    lost_sight: f32,
    strafe_side: f32,
}

impl ChaseState {
    fn strafe_around(&self, ctx: &mut StateCtx) {
        let to_target = ctx.facts.target_position - ctx.position();
        let flat = Vec3::new(to_target.x, 0.0, to_target.z);
        if flat.length_squared() < 1e-6 {
            return;
        }
        let tangent = flat.normalize().cross(Vec3::Y) * self.strafe_side;
        let dest = ctx
            .geometry
            .clamp_navigable(ctx.position() + tangent * STRAFE_STEP);
        ctx.move_to(dest);
    }
}

impl AgentState for ChaseState {
    fn kind(&self) -> StateKind {
        StateKind::Chase
    }

    fn enter(&mut self, ctx: &mut StateCtx) {
        self.lost_sight = 0.0;
        self.strafe_side = if ctx.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        ctx.facts.aggressive = true;
        ctx.set_alerted(true);
        ctx.nav.speed = ctx.config.chase_speed;
    }

    fn update(&mut self, ctx: &mut StateCtx, dt: f32) {
        let Some(_target) = ctx.facts.target else {
            // Target reference gone; walk out the last known position and
            // pick up the trail from there.
            let arrived = !ctx.nav.has_pending_path() && ctx.nav.remaining_distance() <= ARRIVE_EPS;
            if arrived {
                ctx.facts.investigation_point = Some(ctx.facts.target_position);
                ctx.request(StateKind::Investigate);
            } else {
                ctx.move_to(ctx.facts.target_position);
            }
            return;
        };

        if ctx.facts.target_visible {
            self.lost_sight = 0.0;
            let distance = ctx.distance_to(ctx.facts.target_position);
            if distance <= ctx.config.attack_range {
                if ctx.now >= ctx.facts.next_attack_at {
                    ctx.request(StateKind::Attack);
                } else {
                    self.strafe_around(ctx);
                }
                return;
            }
            ctx.move_to(ctx.facts.target_position);
            return;
        }

        self.lost_sight += dt;
        if self.lost_sight >= CHASE_LOST_SIGHT_SECS {
            ctx.facts.investigation_point = Some(ctx.facts.target_position);
            ctx.request(StateKind::Investigate);
            return;
        }
        ctx.move_to(ctx.facts.target_position);
    }

    fn exit(&mut self, ctx: &mut StateCtx) {
        ctx.facts.aggressive = false;
        ctx.nav.speed = ctx.config.walk_speed;
    }

    fn on_target_spotted(&mut self, ctx: &mut StateCtx, target: Entity, position: Vec3) {
        self.lost_sight = 0.0;
        ctx.facts.target = Some(target);
        ctx.facts.target_position = position;
        ctx.facts.target_visible = true;
    }

    fn on_target_lost(&mut self, ctx: &mut StateCtx) {
        ctx.facts.target_visible = false;
    }
}
