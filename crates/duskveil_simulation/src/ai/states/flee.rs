use bevy::prelude::*;
use rand::Rng;

use crate::ai::machine::{AgentState, StateCtx, StateKind};

pub const FLEE_MIN_SECS: f32 = 5.0;
pub const FLEE_SIGHT_GRACE_SECS: f32 = 2.5;
pub const FLEE_HARD_CAP_SECS: f32 = 12.0;

const FLEE_STEP: f32 = 8.0;
const REPATH_INTERVAL: f32 = 1.5;
const STUCK_SECS: f32 = 0.9;
const CANDIDATE_DIRECTIONS: usize = 8;
const LATERAL_JITTER: std::ops::Range<f32> = -0.6..0.6;

/// Running away from the threat. Repaths away from the target's last
/// position every ~1.5s with lateral jitter, sweeping up to eight
/// candidate headings when the straight escape line hits level geometry.
/// A watchdog forces a repath when the agent sits still on an active
/// path for 0.9s.
#[derive(Default)]
pub struct FleeState {
    elapsed: f32,
    out_of_sight: f32,
    repath_in: f32,
    stuck: f32,
}

impl FleeState {
    fn repath(&mut self, ctx: &mut StateCtx) {
        self.repath_in = REPATH_INTERVAL;
        self.stuck = 0.0;

        let away = ctx.position() - ctx.facts.target_position;
        let flat = Vec3::new(away.x, 0.0, away.z);
        let base = if flat.length_squared() > 1e-6 {
            flat.normalize()
        } else {
            let angle = ctx.rng.gen_range(0.0..std::f32::consts::TAU);
            Vec3::new(angle.cos(), 0.0, angle.sin())
        };

        let jitter = ctx.rng.gen_range(LATERAL_JITTER);
        for attempt in 0..CANDIDATE_DIRECTIONS {
            // Fan out from the escape line: straight first, then wider
            // and wider to either side.
            let spread = attempt as f32 * std::f32::consts::FRAC_PI_4 / 2.0;
            let side = if attempt % 2 == 0 { 1.0 } else { -1.0 };
            let angle = jitter + spread * side;
            let dir = Quat::from_rotation_y(angle) * base;
            let dest = ctx.geometry.clamp_navigable(ctx.position() + dir * FLEE_STEP);
            if !ctx.geometry.segment_blocked(ctx.position(), dest) {
                ctx.move_to(dest);
                return;
            }
        }

        // Every heading blocked; take the straight one and let the stuck
        // watchdog retry shortly.
        let dest = ctx.geometry.clamp_navigable(ctx.position() + base * FLEE_STEP);
        ctx.move_to(dest);
    }
}

impl AgentState for FleeState {
    fn kind(&self) -> StateKind {
        StateKind::Flee
    }

    fn enter(&mut self, ctx: &mut StateCtx) {
        self.elapsed = 0.0;
        self.out_of_sight = 0.0;
        self.stuck = 0.0;
        ctx.set_alerted(true);
        ctx.nav.speed = ctx.config.chase_speed;
        self.repath(ctx);
    }

    fn update(&mut self, ctx: &mut StateCtx, dt: f32) {
        self.elapsed += dt;
        if ctx.facts.target_visible {
            self.out_of_sight = 0.0;
        } else {
            self.out_of_sight += dt;
        }

        let escaped = self.elapsed >= FLEE_MIN_SECS && self.out_of_sight >= FLEE_SIGHT_GRACE_SECS;
        if escaped || self.elapsed >= FLEE_HARD_CAP_SECS {
            ctx.request(StateKind::Patrol);
            return;
        }

        if ctx.nav.has_pending_path() && ctx.nav.velocity().length_squared() < 1e-4 {
            self.stuck += dt;
            if self.stuck >= STUCK_SECS {
                self.repath(ctx);
                return;
            }
        } else {
            self.stuck = 0.0;
        }

        self.repath_in -= dt;
        if self.repath_in <= 0.0 {
            self.repath(ctx);
        }
    }

    fn exit(&mut self, ctx: &mut StateCtx) {
        ctx.nav.speed = ctx.config.walk_speed;
    }

    fn on_target_spotted(&mut self, ctx: &mut StateCtx, target: Entity, position: Vec3) {
        self.out_of_sight = 0.0;
        ctx.facts.target = Some(target);
        ctx.facts.target_position = position;
        ctx.facts.target_visible = true;
    }

    fn on_target_lost(&mut self, ctx: &mut StateCtx) {
        ctx.facts.target_visible = false;
    }
}
