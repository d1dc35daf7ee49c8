use bevy::prelude::*;
use rand::Rng;

use crate::ai::machine::{AgentState, StateCtx, StateKind};

const DWELL_RANGE: std::ops::Range<f32> = 2.0..5.0;

/// Standing around. Rolls a random dwell on entry and drifts into Patrol
/// once it runs out. Any heard noise or sighting breaks the dwell early.
#[derive(Default)]
pub struct IdleState {
    dwell_remaining: f32,
}

impl AgentState for IdleState {
    fn kind(&self) -> StateKind {
        StateKind::Idle
    }

    fn enter(&mut self, ctx: &mut StateCtx) {
        ctx.nav.halt(true);
        ctx.facts.target = None;
        ctx.facts.target_visible = false;
        ctx.set_alerted(false);
        self.dwell_remaining = ctx.rng.gen_range(DWELL_RANGE);
    }

    fn update(&mut self, ctx: &mut StateCtx, dt: f32) {
        self.dwell_remaining -= dt;
        if self.dwell_remaining <= 0.0 {
            ctx.request(StateKind::Patrol);
        }
    }

    fn exit(&mut self, ctx: &mut StateCtx) {
        ctx.nav.halt(false);
    }

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
