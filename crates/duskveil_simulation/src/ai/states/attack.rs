use bevy::prelude::*;

use crate::ai::machine::{AgentState, StateCtx, StateKind};
use crate::combat::ATTACK_RANGE_SLACK;
use crate::components::Archetype;

pub const STALKER_COOLDOWN_SCALE: f32 = 1.25;

/// In melee range, committed to landing exactly one strike per visit.
/// Once the strike is committed the state immediately disengages back to
/// the archetype's pursuit state; the target drifting past 1.2x attack
/// range disengages without striking.
#[derive(Default)]
pub struct AttackState {
    committed: bool,
}

impl AgentState for AttackState {
    fn kind(&self) -> StateKind {
        StateKind::Attack
    }

    fn enter(&mut self, ctx: &mut StateCtx) {
        self.committed = false;
        ctx.nav.halt(true);
        ctx.nav.reset_path();
    }

    fn update(&mut self, ctx: &mut StateCtx, _dt: f32) {
        if ctx.facts.target.is_none() {
            // Nothing to hit; fall back to a sane state instead of
            // spinning here with no target.
            ctx.facts.investigation_point = Some(ctx.facts.target_position);
            ctx.request(StateKind::Investigate);
            return;
        }

        ctx.face_towards(ctx.facts.target_position);

        // Squared comparison keeps the boundary exact: a target sitting at
        // precisely attack_range * 1.2 stays engaged.
        let reach = ctx.config.attack_range * ATTACK_RANGE_SLACK;
        let dist_sq = ctx.position().distance_squared(ctx.facts.target_position);
        if dist_sq > reach * reach {
            let next = ctx.pursue_kind();
            ctx.request(next);
            return;
        }

        if ctx.facts.attack_in_progress {
            return;
        }

        if self.committed {
            let next = ctx.pursue_kind();
            ctx.request(next);
            return;
        }

        let cooldown_scale = match ctx.agent.archetype {
            Archetype::Stalker => STALKER_COOLDOWN_SCALE,
            _ => 1.0,
        };

        if ctx.agent.archetype == Archetype::Stalker && ctx.now < ctx.facts.next_attack_at {
            ctx.request(StateKind::Stalk);
            return;
        }

        if ctx.try_start_attack(cooldown_scale) {
            self.committed = true;
        }
    }

    fn exit(&mut self, ctx: &mut StateCtx) {
        ctx.nav.halt(false);
    }

    fn on_target_spotted(&mut self, ctx: &mut StateCtx, target: Entity, position: Vec3) {
        ctx.facts.target = Some(target);
        ctx.facts.target_position = position;
        ctx.facts.target_visible = true;
    }

    fn on_target_lost(&mut self, ctx: &mut StateCtx) {
        ctx.facts.target_visible = false;
    }
}
