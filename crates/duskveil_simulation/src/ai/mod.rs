//! Agent decision-making: the behavior state machine, its eight states
//! and the per-tick brain pass that feeds stimuli into it.

use bevy::prelude::*;

pub mod events;
pub mod machine;
pub mod states;
pub mod systems;


pub use events::{AgentAlerted, AgentCommand, SensorEvent};
pub use machine::{AgentState, StateCtx, StateKind, StateMachine, Stimulus};
pub use systems::{run_agent_brains, PUSH_STUN_SECS};

/// Registers the behavior events and the brain pass.
///
/// The brain runs in `SimSet::Decide`, after the perception and noise
/// systems of `SimSet::Senses` have published this tick's sensor events
/// and before `SimSet::Act` moves anything.
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SensorEvent>()
            .add_event::<AgentCommand>()
            .add_event::<AgentAlerted>()
            .add_systems(
                FixedUpdate,
                run_agent_brains.in_set(crate::SimSet::Decide),
            );
    }
}
