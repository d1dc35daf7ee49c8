//! DUSKVEIL Simulation Core
//!
//! Headless Bevy ECS simulation of NPC perception and behavior: a
//! spatial sensor (vision cone, proximity, hearing), a propagating noise
//! field, and an eight-state behavior machine per agent.
//!
//! Everything decision-relevant runs on a 60Hz fixed timestep in three
//! chained phases: Senses publishes sensor events, Decide runs the agent
//! brains, Act moves bodies and resolves melee swings. With a fixed seed
//! the whole simulation is deterministic.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub mod ai;
pub mod combat;
pub mod components;
pub mod logger;
pub mod noise;
pub mod perception;
pub mod spawn;
pub mod world;

pub use ai::{AIPlugin, AgentAlerted, AgentCommand, SensorEvent, StateKind, StateMachine};
pub use combat::{CombatPlugin, DamageDealt, EntityDied};
pub use components::*;
pub use logger::{init_logger, set_log_level, set_logger, LogLevel, LogPrinter};
pub use noise::{NoiseEvent, NoiseField};
pub use spawn::{spawn_agent, QuarryBundle, SpawnAgent};
pub use world::{LevelGeometry, Occluder};

/// Fixed-tick phases, chained in declaration order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    /// Noise decay/propagation and the perception scan.
    Senses,
    /// Agent brains: commands, stimuli, state update.
    Decide,
    /// Movement integration and melee swing resolution.
    Act,
}

/// Top-level plugin wiring every subsystem onto the fixed timestep.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(60.0))
            .init_resource::<NoiseField>()
            .init_resource::<LevelGeometry>();

        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.configure_sets(
            FixedUpdate,
            (SimSet::Senses, SimSet::Decide, SimSet::Act).chain(),
        );

        app.add_systems(
            FixedUpdate,
            (
                noise::decay_noise_level,
                perception::tick_perception,
                noise::propagate_noise,
            )
                .chain()
                .in_set(SimSet::Senses),
        );
        app.add_systems(
            FixedUpdate,
            components::movement::drive_nav_agents.in_set(SimSet::Act),
        );

        app.add_plugins((AIPlugin, CombatPlugin));
    }
}

/// Deterministic RNG resource; every random roll in the simulation draws
/// from this single seeded stream.
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Minimal Bevy app for headless runs and integration tests.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .add_plugins(SimulationPlugin);

    app
}

/// Debug-format snapshot of one component type, ordered by entity index,
/// for comparing two runs tick by tick.
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
