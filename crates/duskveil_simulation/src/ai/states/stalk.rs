use bevy::prelude::*;
use rand::Rng;

use crate::ai::machine::{AgentState, StateCtx, StateKind};

pub const STALK_LOST_SIGHT_SECS: f32 = 6.0;
pub const STALK_BAND_NEAR: f32 = 5.0;
pub const STALK_BAND_FAR: f32 = 9.0;

const STRAFE_FLIP_RANGE: std::ops::Range<f32> = 0.75..1.5;
const FIRST_STRIKE_DELAY_RANGE: std::ops::Range<f32> = 0.5..2.0;
const ORBIT_STEP: f32 = 2.5;

/// Stalker-only shadowing. Holds a [5,9] unit band around the target,
/// orbiting with a randomly flipping strafe side, and only commits to a
/// lunge once both a per-entry first-strike delay and the attack cooldown
/// have cleared.
#[derive(Default)]
pub struct StalkState {
    lost_sight: f32,
    elapsed: f32,
    strafe_side: f32,
    strafe_flip_at: f32,
    first_strike_delay: f32,
    lunging: bool,
}

impl StalkState {
    fn orbit(&self, ctx: &mut StateCtx) {
        let to_target = ctx.facts.target_position - ctx.position();
        let flat = Vec3::new(to_target.x, 0.0, to_target.z);
        if flat.length_squared() < 1e-6 {
            return;
        }
        let tangent = flat.normalize().cross(Vec3::Y) * self.strafe_side;
        let dest = ctx
            .geometry
            .clamp_navigable(ctx.position() + tangent * ORBIT_STEP);
        ctx.move_to(dest);
    }

    fn retreat(&self, ctx: &mut StateCtx) {
        let away = ctx.position() - ctx.facts.target_position;
        let flat = Vec3::new(away.x, 0.0, away.z);
        if flat.length_squared() < 1e-6 {
            return;
        }
        let dest = ctx
            .geometry
            .clamp_navigable(ctx.position() + flat.normalize() * ORBIT_STEP);
        ctx.move_to(dest);
    }
}

impl AgentState for StalkState {
    fn kind(&self) -> StateKind {
        StateKind::Stalk
    }

    fn enter(&mut self, ctx: &mut StateCtx) {
        self.lost_sight = 0.0;
        self.elapsed = 0.0;
        self.lunging = false;
        self.strafe_side = if ctx.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        self.strafe_flip_at = ctx.rng.gen_range(STRAFE_FLIP_RANGE);
        self.first_strike_delay = ctx.rng.gen_range(FIRST_STRIKE_DELAY_RANGE);
        ctx.set_alerted(true);
        ctx.facts.aggressive = false;
        ctx.nav.speed = ctx.config.walk_speed;
    }

    fn update(&mut self, ctx: &mut StateCtx, dt: f32) {
        self.elapsed += dt;

        if ctx.facts.target.is_none() {
            ctx.facts.investigation_point = Some(ctx.facts.target_position);
            ctx.request(StateKind::Investigate);
            return;
        }

        if !ctx.facts.target_visible {
            self.lost_sight += dt;
            if self.lost_sight >= STALK_LOST_SIGHT_SECS {
                ctx.facts.investigation_point = Some(ctx.facts.target_position);
                ctx.request(StateKind::Investigate);
                return;
            }
        } else {
            self.lost_sight = 0.0;
        }

        let distance = ctx.distance_to(ctx.facts.target_position);
        ctx.face_towards(ctx.facts.target_position);

        if self.elapsed >= self.first_strike_delay && ctx.now >= ctx.facts.next_attack_at {
            // Patience ran out; break the band and close for one strike.
            self.lunging = true;
        }

        if self.lunging {
            if distance <= ctx.config.attack_range {
                ctx.request(StateKind::Attack);
                return;
            }
            ctx.nav.speed = ctx.config.chase_speed;
            ctx.move_to(ctx.facts.target_position);
            return;
        }

        if distance > STALK_BAND_FAR {
            ctx.move_to(ctx.facts.target_position);
            return;
        }
        if distance < STALK_BAND_NEAR {
            self.retreat(ctx);
            return;
        }

        self.strafe_flip_at -= dt;
        if self.strafe_flip_at <= 0.0 {
            self.strafe_side = -self.strafe_side;
            self.strafe_flip_at = ctx.rng.gen_range(STRAFE_FLIP_RANGE);
        }
        self.orbit(ctx);
    }

    fn exit(&mut self, ctx: &mut StateCtx) {
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
