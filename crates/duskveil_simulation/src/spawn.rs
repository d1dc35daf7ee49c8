//! Spawn facade: turns a content template into a fully wired agent
//! entity, and provides the matching bundle for things agents can hunt.

use bevy::prelude::*;

use crate::ai::machine::{StateKind, StateMachine};
use crate::components::{
    AgentFacts, AgentTemplate, Health, NavAgent, PatrolRoute, Perceivable, Rank, Stance,
};

/// Spawn-time description of one agent.
#[derive(Debug, Clone, Default)]
pub struct SpawnAgent {
    pub template: AgentTemplate,
    pub rank_override: Option<Rank>,
    pub position: Vec3,
    pub waypoints: Vec<Vec3>,
}

/// Instantiates the template and wires up every component the simulation
/// systems expect. Agents with a configured waypoint route start in
/// Patrol, anyone else starts in Idle.
pub fn spawn_agent(commands: &mut Commands, spawn: SpawnAgent) -> Entity {
    let (agent, config, health) = spawn.template.instantiate(spawn.rank_override);

    let initial = if spawn.waypoints.is_empty() {
        StateKind::Idle
    } else {
        StateKind::Patrol
    };

    let facts = AgentFacts {
        home: spawn.position,
        target_position: spawn.position,
        ..default()
    };

    crate::logger::log(&format!(
        "spawn: {} [{} {:?}] at {:?}",
        agent.name,
        agent.rank.label(),
        agent.archetype,
        spawn.position
    ));

    commands
        .spawn((
            agent,
            NavAgent::new(config.walk_speed, spawn.position),
            config,
            health,
            facts,
            PatrolRoute {
                waypoints: spawn.waypoints,
                index: 0,
                anchor: spawn.position,
            },
            StateMachine::standard(initial),
            Transform::from_translation(spawn.position),
        ))
        .id()
}

/// Bundle for an entity agents can detect and attack: the player, a
/// decoy, anything with a position and a stance.
#[derive(Bundle)]
pub struct QuarryBundle {
    pub perceivable: Perceivable,
    pub stance: Stance,
    pub health: Health,
    pub transform: Transform,
}

impl QuarryBundle {
    pub fn new(position: Vec3, health: u32) -> Self {
        Self {
            perceivable: Perceivable,
            stance: Stance::default(),
            health: Health::new(health),
            transform: Transform::from_translation(position),
        }
    }
}
