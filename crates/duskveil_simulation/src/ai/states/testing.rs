//! Shared bench for exercising states and the machine without an ECS
//! world: owns every component a `StateCtx` borrows.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::ai::events::AgentAlerted;
use crate::ai::machine::StateCtx;
use crate::components::{
    Agent, AgentConfig, AgentFacts, Archetype, NavAgent, PatrolRoute, Rank,
};
use crate::world::LevelGeometry;

pub(crate) struct CtxBed {
    pub agent: Agent,
    pub config: AgentConfig,
    pub facts: AgentFacts,
    pub nav: NavAgent,
    pub transform: Transform,
    pub route: PatrolRoute,
    pub geometry: LevelGeometry,
    pub rng: ChaCha8Rng,
    pub alerts: Vec<AgentAlerted>,
    pub now: f32,
}

impl CtxBed {
    pub fn new(archetype: Archetype) -> Self {
        let config = AgentConfig::default();
        Self {
            agent: Agent {
                name: "bench".into(),
                rank: Rank::F,
                archetype,
            },
            nav: NavAgent::new(config.walk_speed, Vec3::ZERO),
            config,
            facts: AgentFacts::default(),
            transform: Transform::IDENTITY,
            route: PatrolRoute {
                waypoints: Vec::new(),
                index: 0,
                anchor: Vec3::ZERO,
            },
            geometry: LevelGeometry::default(),
            rng: ChaCha8Rng::seed_from_u64(7),
            alerts: Vec::new(),
            now: 0.0,
        }
    }

    pub fn ctx(&mut self) -> StateCtx<'_> {
        StateCtx {
            entity: Entity::from_raw(1),
            agent: &self.agent,
            config: &self.config,
            facts: &mut self.facts,
            nav: &mut self.nav,
            transform: &mut self.transform,
            route: &mut self.route,
            geometry: &self.geometry,
            rng: &mut self.rng,
            now: self.now,
            alerts: &mut self.alerts,
            requested: None,
        }
    }
}
