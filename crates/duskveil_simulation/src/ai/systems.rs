//! The per-tick brain pass: external commands, sensor stimuli and the
//! state update are applied per agent in one sweep so a stimulus and the
//! decision it provokes land in the same simulation tick.

use bevy::prelude::*;

use crate::ai::events::{AgentAlerted, AgentCommand, SensorEvent};
use crate::ai::machine::{StateCtx, StateKind, StateMachine, Stimulus};
use crate::components::{Agent, AgentConfig, AgentFacts, NavAgent, PatrolRoute};
use crate::world::LevelGeometry;
use crate::DeterministicRng;

/// Stagger applied when a physical push lands.
pub const PUSH_STUN_SECS: f32 = 0.6;

#[allow(clippy::type_complexity)]
pub fn run_agent_brains(
    mut commands_rx: EventReader<AgentCommand>,
    mut sensors_rx: EventReader<SensorEvent>,
    mut alerts_tx: EventWriter<AgentAlerted>,
    geometry: Res<LevelGeometry>,
    mut det_rng: ResMut<DeterministicRng>,
    time: Res<Time>,
    mut agents: Query<(
        Entity,
        &Agent,
        &AgentConfig,
        &mut AgentFacts,
        &mut NavAgent,
        &mut Transform,
        &mut PatrolRoute,
        &mut StateMachine,
    )>,
) {
    let commands: Vec<AgentCommand> = commands_rx.read().cloned().collect();
    let sensors: Vec<SensorEvent> = sensors_rx.read().cloned().collect();
    let dt = time.delta_secs();
    let now = time.elapsed_secs();

    for (entity, agent, config, mut facts, mut nav, mut transform, mut route, mut machine) in
        agents.iter_mut()
    {
        let mut alerts = Vec::new();
        let mut ctx = StateCtx {
            entity,
            agent,
            config,
            facts: &mut facts,
            nav: &mut nav,
            transform: &mut transform,
            route: &mut route,
            geometry: &geometry,
            rng: &mut det_rng.rng,
            now,
            alerts: &mut alerts,
            requested: None,
        };

        if machine.current().is_none() {
            let initial = machine.initial();
            machine.set_state(initial, &mut ctx);
        }

        for command in commands.iter() {
            apply_command(command, entity, &mut machine, &mut ctx);
        }

        for sensor in sensors.iter() {
            let stimulus = match *sensor {
                SensorEvent::NoiseHeard {
                    observer,
                    position,
                    intensity,
                } if observer == entity => Stimulus::NoiseHeard {
                    position,
                    intensity,
                },
                SensorEvent::TargetSpotted {
                    observer,
                    target,
                    position,
                } if observer == entity => Stimulus::TargetSpotted { target, position },
                SensorEvent::TargetLost { observer } if observer == entity => Stimulus::TargetLost,
                _ => continue,
            };
            machine.dispatch(stimulus, &mut ctx);
        }

        machine.update(&mut ctx, dt);

        drop(ctx);
        for alert in alerts {
            alerts_tx.write(alert);
        }
    }
}

fn apply_command(
    command: &AgentCommand,
    entity: Entity,
    machine: &mut StateMachine,
    ctx: &mut StateCtx,
) {
    match *command {
        AgentCommand::Stun { agent, duration } if agent == entity => {
            ctx.facts.pending_stun = Some(duration);
            machine.set_state(StateKind::Stunned, ctx);
        }
        AgentCommand::ApplyPush { agent, force } if agent == entity => {
            let shoved = ctx.geometry.clamp_navigable(ctx.position() + force);
            ctx.nav.warp(shoved);
            ctx.facts.pending_stun = Some(PUSH_STUN_SECS);
            machine.set_state(StateKind::Stunned, ctx);
        }
        AgentCommand::AttractTo { agent, position } if agent == entity => {
            // A lure does not break an active stun.
            if machine.current() == Some(StateKind::Stunned) {
                return;
            }
            ctx.facts.investigation_point = Some(position);
            machine.set_state(StateKind::Investigate, ctx);
        }
        _ => {}
    }
}
