use crate::ai::machine::{AgentState, StateCtx, StateKind};
use crate::components::Archetype;

/// Fallback when a stun lands without an explicit duration.
const DEFAULT_STUN_SECS: f32 = 0.5;

/// Knocked out of whatever the agent was doing. The duration is supplied
/// by whoever forced the transition (via the pending stun slot); recovery
/// routes per archetype and whether the target is still in sight.
#[derive(Default)]
pub struct StunnedState {
    remaining: f32,
}

impl AgentState for StunnedState {
    fn kind(&self) -> StateKind {
        StateKind::Stunned
    }

    fn enter(&mut self, ctx: &mut StateCtx) {
        self.remaining = ctx.facts.pending_stun.take().unwrap_or(DEFAULT_STUN_SECS);
        ctx.facts.stunned = true;
        ctx.nav.halt(true);
        ctx.nav.reset_path();
        crate::logger::log(&format!(
            "{} staggered for {:.1}s",
            ctx.agent.name, self.remaining
        ));
    }

    fn update(&mut self, ctx: &mut StateCtx, dt: f32) {
        self.remaining -= dt;
        if self.remaining > 0.0 {
            return;
        }

        if ctx.agent.archetype == Archetype::Flee {
            ctx.request(StateKind::Flee);
            return;
        }
        if ctx.facts.target.is_some() && ctx.facts.target_visible {
            let next = ctx.pursue_kind();
            ctx.request(next);
            return;
        }
        ctx.request(StateKind::Patrol);
    }

    fn exit(&mut self, ctx: &mut StateCtx) {
        ctx.facts.stunned = false;
        ctx.nav.halt(false);
    }
}
