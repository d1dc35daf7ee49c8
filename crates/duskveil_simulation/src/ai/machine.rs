//! Behavior state machine: one active state per agent, Enter/Update/Exit
//! lifecycle, stimulus dispatch to the current state only.
//!
//! States are registered once at agent initialization into a dispatch
//! table indexed by `StateKind` and are reused for the agent's whole
//! lifetime; per-activation data is reset in `enter`. Transitions are
//! requested by kind through `StateCtx::request` and applied by the
//! machine after the current call returns, always running the outgoing
//! state's `exit` strictly before the incoming state's `enter`.

use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::ai::events::AgentAlerted;
use crate::components::{Agent, AgentConfig, AgentFacts, Archetype, NavAgent, PatrolRoute};
use crate::world::LevelGeometry;

/// Closed set of behavior states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum StateKind {
    Idle,
    Patrol,
    Investigate,
    Stalk,
    Chase,
    Attack,
    Flee,
    Stunned,
}

pub const STATE_COUNT: usize = 8;

/// Upper bound on chained transitions per machine call. A well-formed
/// state graph settles in one or two hops; hitting the cap means a
/// transition cycle and is logged, not fatal.
const MAX_TRANSITION_HOPS: usize = 8;

impl StateKind {
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn label(&self) -> &'static str {
        match self {
            StateKind::Idle => "Idle",
            StateKind::Patrol => "Patrol",
            StateKind::Investigate => "Investigate",
            StateKind::Stalk => "Stalk",
            StateKind::Chase => "Chase",
            StateKind::Attack => "Attack",
            StateKind::Flee => "Flee",
            StateKind::Stunned => "Stunned",
        }
    }
}

/// Stimulus forwarded to the current state's optional handlers.
#[derive(Debug, Clone, Copy)]
pub enum Stimulus {
    NoiseHeard { position: Vec3, intensity: f32 },
    TargetSpotted { target: Entity, position: Vec3 },
    TargetLost,
}

/// The per-agent view a state operates through. States never touch other
/// states or other agents; everything they may read or mutate is here.
pub struct StateCtx<'a> {
    pub entity: Entity,
    pub agent: &'a Agent,
    pub config: &'a AgentConfig,
    pub facts: &'a mut AgentFacts,
    pub nav: &'a mut NavAgent,
    pub transform: &'a mut Transform,
    pub route: &'a mut PatrolRoute,
    pub geometry: &'a LevelGeometry,
    pub rng: &'a mut ChaCha8Rng,
    /// Sim-time now (seconds since simulation start).
    pub now: f32,
    /// Outbound alert notices, drained by the brain pass after the call.
    pub alerts: &'a mut Vec<AgentAlerted>,
    /// Transition requested by the state; applied by the machine.
    pub requested: Option<StateKind>,
}

impl StateCtx<'_> {
    /// Request a transition; the machine applies it after the current
    /// enter/update/handler returns.
    pub fn request(&mut self, kind: StateKind) {
        self.requested = Some(kind);
    }

    pub fn position(&self) -> Vec3 {
        self.transform.translation
    }

    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.transform.translation.distance(point)
    }

    /// Distance to the current target's last confirmed position.
    pub fn target_distance(&self) -> Option<f32> {
        self.facts
            .target
            .map(|_| self.distance_to(self.facts.target_position))
    }

    pub fn face_towards(&mut self, point: Vec3) {
        let to_point = point - self.transform.translation;
        let flat = Vec3::new(to_point.x, 0.0, to_point.z);
        if flat.length_squared() > 1e-6 {
            self.transform.look_to(flat, Vec3::Y);
        }
    }

    /// Flip the alert flag; a rising edge publishes an `AgentAlerted`
    /// notice carrying the last known target position.
    pub fn set_alerted(&mut self, alerted: bool) {
        if alerted && !self.facts.alerted {
            self.alerts.push(AgentAlerted {
                agent: self.entity,
                last_known: self.facts.target_position,
            });
        }
        self.facts.alerted = alerted;
    }

    /// Guarded movement: false when the nav agent is not usable. Callers
    /// substitute a short wait instead of erroring.
    pub fn move_to(&mut self, dest: Vec3) -> bool {
        if !self.nav.is_usable() {
            return false;
        }
        self.nav.set_destination(dest)
    }

    /// Which state a fresh detection leads to for this archetype.
    pub fn engage_kind(&self) -> StateKind {
        match self.agent.archetype {
            Archetype::Flee => StateKind::Flee,
            Archetype::Stalker => StateKind::Stalk,
            Archetype::Aggressive => StateKind::Chase,
        }
    }

    /// Which state continues an existing engagement for this archetype.
    pub fn pursue_kind(&self) -> StateKind {
        match self.agent.archetype {
            Archetype::Stalker => StateKind::Stalk,
            _ => StateKind::Chase,
        }
    }

    /// Combat gate (see `combat::try_start_attack`).
    pub fn try_start_attack(&mut self, cooldown_scale: f32) -> bool {
        crate::combat::try_start_attack(
            self.config,
            self.facts,
            self.nav,
            self.now,
            self.rng,
            cooldown_scale,
        )
    }
}

/// One behavior state. Stimulus handlers default to no-ops; states opt in
/// to the stimuli they care about.
pub trait AgentState: Send + Sync {
    fn kind(&self) -> StateKind;

    fn enter(&mut self, ctx: &mut StateCtx);
    fn update(&mut self, ctx: &mut StateCtx, dt: f32);
    fn exit(&mut self, ctx: &mut StateCtx);

    fn on_noise_heard(&mut self, _ctx: &mut StateCtx, _position: Vec3, _intensity: f32) {}
    fn on_target_spotted(&mut self, _ctx: &mut StateCtx, _target: Entity, _position: Vec3) {}
    fn on_target_lost(&mut self, _ctx: &mut StateCtx) {}
}

/// Per-agent state machine: a dispatch table of registered states plus the
/// single current-state tag. No history stack; transitions replace.
#[derive(Component)]
pub struct StateMachine {
    states: [Option<Box<dyn AgentState>>; STATE_COUNT],
    current: Option<StateKind>,
    initial: StateKind,
}

impl StateMachine {
    /// Empty machine; callers register states before the first tick.
    pub fn new(initial: StateKind) -> Self {
        Self {
            states: Default::default(),
            current: None,
            initial,
        }
    }

    /// Machine with the full standard state set registered.
    pub fn standard(initial: StateKind) -> Self {
        use crate::ai::states::*;

        let mut machine = Self::new(initial);
        machine.register(Box::new(IdleState::default()));
        machine.register(Box::new(PatrolState::default()));
        machine.register(Box::new(InvestigateState::default()));
        machine.register(Box::new(StalkState::default()));
        machine.register(Box::new(ChaseState::default()));
        machine.register(Box::new(AttackState::default()));
        machine.register(Box::new(FleeState::default()));
        machine.register(Box::new(StunnedState::default()));
        machine
    }

    /// One-time registration. Duplicate kinds are logged and ignored.
    pub fn register(&mut self, state: Box<dyn AgentState>) {
        let kind = state.kind();
        if self.states[kind.index()].is_some() {
            crate::logger::log_warning(&format!(
                "fsm: duplicate registration for {}, ignored",
                kind.label()
            ));
            return;
        }
        self.states[kind.index()] = Some(state);
    }

    pub fn current(&self) -> Option<StateKind> {
        self.current
    }

    pub fn initial(&self) -> StateKind {
        self.initial
    }

    pub fn is_registered(&self, kind: StateKind) -> bool {
        self.states[kind.index()].is_some()
    }

    /// Lookup for out-of-band inspection or mutation of a registered state.
    pub fn state(&self, kind: StateKind) -> Option<&dyn AgentState> {
        self.states[kind.index()].as_deref()
    }

    pub fn state_mut(&mut self, kind: StateKind) -> Option<&mut (dyn AgentState + 'static)> {
        match self.states[kind.index()].as_mut() {
            Some(state) => Some(state.as_mut()),
            None => None,
        }
    }

    /// Transition into `kind`: current `exit` strictly before next
    /// `enter`. Unregistered kinds log a warning and leave the machine in
    /// its last valid state. Re-entering the current kind re-runs both
    /// lifecycle calls. Transitions requested from within `enter` are
    /// chained (bounded).
    pub fn set_state(&mut self, kind: StateKind, ctx: &mut StateCtx) {
        self.transition_to(kind, ctx);
        self.settle(ctx);
    }

    /// Per-tick update, forwarded to the current state only.
    pub fn update(&mut self, ctx: &mut StateCtx, dt: f32) {
        let Some(current) = self.current else {
            return;
        };
        let Some(mut state) = self.states[current.index()].take() else {
            return;
        };
        state.update(ctx, dt);
        self.states[current.index()] = Some(state);
        self.settle(ctx);
    }

    /// Forward a stimulus to the current state's handler only.
    pub fn dispatch(&mut self, stimulus: Stimulus, ctx: &mut StateCtx) {
        let Some(current) = self.current else {
            return;
        };
        let Some(mut state) = self.states[current.index()].take() else {
            return;
        };
        match stimulus {
            Stimulus::NoiseHeard {
                position,
                intensity,
            } => state.on_noise_heard(ctx, position, intensity),
            Stimulus::TargetSpotted { target, position } => {
                state.on_target_spotted(ctx, target, position)
            }
            Stimulus::TargetLost => state.on_target_lost(ctx),
        }
        self.states[current.index()] = Some(state);
        self.settle(ctx);
    }

    fn transition_to(&mut self, kind: StateKind, ctx: &mut StateCtx) {
        if self.states[kind.index()].is_none() {
            crate::logger::log_warning(&format!(
                "fsm: {:?} requested unregistered state {}, staying in {}",
                ctx.entity,
                kind.label(),
                self.current.map(|k| k.label()).unwrap_or("<none>")
            ));
            return;
        }

        if let Some(current) = self.current {
            if let Some(mut state) = self.states[current.index()].take() {
                state.exit(ctx);
                self.states[current.index()] = Some(state);
            }
        }

        crate::logger::log(&format!(
            "fsm: {:?} {} -> {}",
            ctx.entity,
            self.current.map(|k| k.label()).unwrap_or("<spawn>"),
            kind.label()
        ));

        self.current = Some(kind);
        if let Some(mut state) = self.states[kind.index()].take() {
            state.enter(ctx);
            self.states[kind.index()] = Some(state);
        }
    }

    /// Apply requested transitions until the machine settles.
    fn settle(&mut self, ctx: &mut StateCtx) {
        let mut hops = 0;
        while let Some(next) = ctx.requested.take() {
            hops += 1;
            if hops > MAX_TRANSITION_HOPS {
                crate::logger::log_warning(&format!(
                    "fsm: {:?} transition chain exceeded {} hops, stopping at {}",
                    ctx.entity,
                    MAX_TRANSITION_HOPS,
                    self.current.map(|k| k.label()).unwrap_or("<none>")
                ));
                break;
            }
            self.transition_to(next, ctx);
        }
    }
}
