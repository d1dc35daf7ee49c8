//! Core agent components: identity, configuration, runtime facts, health.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::combat::AttackSwing;

/// Ordered difficulty tier. Scales health and damage at spawn and gates
/// whether player actions (e.g. a shove) can hurt the agent at all.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect, Serialize, Deserialize,
)]
pub enum Rank {
    F,
    E,
    D,
    C,
    B,
    A,
    S,
}

impl Default for Rank {
    fn default() -> Self {
        Self::F
    }
}

impl Rank {
    /// Zero-based tier index (F = 0 .. S = 6).
    pub fn tier(&self) -> u32 {
        *self as u32
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rank::F => "F",
            Rank::E => "E",
            Rank::D => "D",
            Rank::C => "C",
            Rank::B => "B",
            Rank::A => "A",
            Rank::S => "S",
        }
    }
}

/// Behavioral category deciding which states a detection event leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum Archetype {
    /// Runs from a spotted target instead of engaging.
    Flee,
    /// Chases and attacks head-on.
    Aggressive,
    /// Circles at a distance band and commits single strikes.
    Stalker,
}

/// Agent identity (one per enemy instance).
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Agent {
    pub name: String,
    pub rank: Rank,
    pub archetype: Archetype,
}

/// Content-defined spawn template. Numbers here are base values; rank
/// scaling is applied at `instantiate` time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTemplate {
    pub name: String,
    pub archetype: Archetype,
    pub rank: Rank,
    pub base_health: u32,
    pub walk_speed: f32,
    pub chase_speed: f32,
    pub sight_range: f32,
    /// Full cone angle in degrees; targets are admitted up to half of it.
    pub sight_angle: f32,
    /// Near-field awareness radius (bypasses the cone angle check).
    pub proximity_range: f32,
    pub hearing_range: f32,
    pub hearing_threshold: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub attack_damage: u32,
}

impl Default for AgentTemplate {
    fn default() -> Self {
        Self {
            name: "husk".to_string(),
            archetype: Archetype::Aggressive,
            rank: Rank::F,
            base_health: 100,
            walk_speed: 2.0,
            chase_speed: 4.5,
            sight_range: 12.0,
            sight_angle: 110.0,
            proximity_range: 2.5,
            hearing_range: 15.0,
            hearing_threshold: 0.2,
            attack_range: 2.0,
            attack_cooldown: 1.6,
            attack_damage: 15,
        }
    }
}

impl AgentTemplate {
    /// Build spawn-time components, scaled by rank.
    ///
    /// Health grows 30% and damage 15% per tier above F.
    pub fn instantiate(&self, rank_override: Option<Rank>) -> (Agent, AgentConfig, Health) {
        let rank = rank_override.unwrap_or(self.rank);
        let tier = rank.tier() as f32;
        let health = (self.base_health as f32 * (1.0 + 0.3 * tier)).round() as u32;
        let damage = (self.attack_damage as f32 * (1.0 + 0.15 * tier)).round() as u32;

        let agent = Agent {
            name: self.name.clone(),
            rank,
            archetype: self.archetype,
        };
        let config = AgentConfig {
            walk_speed: self.walk_speed,
            chase_speed: self.chase_speed,
            sight_range: self.sight_range,
            sight_angle: self.sight_angle,
            proximity_range: self.proximity_range,
            hearing_range: self.hearing_range,
            hearing_threshold: self.hearing_threshold,
            attack_range: self.attack_range,
            attack_cooldown: self.attack_cooldown,
            attack_damage: damage,
            scan_interval: DEFAULT_SCAN_INTERVAL,
        };
        (agent, config, Health::new(health))
    }
}

/// Perception pass throttle (seconds of sim time between scans).
pub const DEFAULT_SCAN_INTERVAL: f32 = 0.2;

/// Immutable per-agent tuning, fixed after spawn-time initialization.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct AgentConfig {
    pub walk_speed: f32,
    pub chase_speed: f32,
    pub sight_range: f32,
    /// Full cone angle in degrees.
    pub sight_angle: f32,
    pub proximity_range: f32,
    pub hearing_range: f32,
    pub hearing_threshold: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub attack_damage: u32,
    pub scan_interval: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        let (_, config, _) = AgentTemplate::default().instantiate(None);
        config
    }
}

/// Mutable runtime facts shared between the behavior states and the
/// perception/combat systems. States reach these only through `StateCtx`.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct AgentFacts {
    /// Current perceived target. Non-null only while a target-aware state
    /// (Investigate/Stalk/Chase/Attack/Flee) owns the engagement.
    pub target: Option<Entity>,
    /// Last confirmed position of the target.
    pub target_position: Vec3,
    /// Was the target seen on the most recent perception pass?
    pub target_visible: bool,
    /// Where Investigate should go next (noise position, lost-target spot).
    pub investigation_point: Option<Vec3>,
    pub alerted: bool,
    pub aggressive: bool,
    pub stunned: bool,
    pub attack_in_progress: bool,
    /// Sim-time timestamp before which `try_start_attack` fails.
    pub next_attack_at: f32,
    /// Stun duration injected by the facade before forcing Stunned.
    pub pending_stun: Option<f32>,
    /// In-flight melee swing, if any (ticked by the combat system).
    pub swing: Option<AttackSwing>,
    /// Accumulator for the throttled perception pass.
    pub scan_clock: f32,
    /// Spawn anchor; patrol sampling and idle both stay near it.
    pub home: Vec3,
}

/// Agent health. Invariant: 0 <= current <= max.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.current = (self.current + amount).min(self.max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_ordering() {
        assert!(Rank::F < Rank::E);
        assert!(Rank::A < Rank::S);
        assert_eq!(Rank::S.tier(), 6);
    }

    #[test]
    fn test_template_rank_scaling() {
        let template = AgentTemplate::default();

        let (_, config_f, health_f) = template.instantiate(Some(Rank::F));
        assert_eq!(health_f.max, 100);
        assert_eq!(config_f.attack_damage, 15);

        let (agent_s, config_s, health_s) = template.instantiate(Some(Rank::S));
        assert_eq!(agent_s.rank, Rank::S);
        assert_eq!(health_s.max, 280); // 100 * (1 + 0.3 * 6)
        assert_eq!(config_s.attack_damage, 29); // round(15 * 1.9)
    }

    #[test]
    fn test_rank_override_falls_back_to_template() {
        let template = AgentTemplate {
            rank: Rank::C,
            ..AgentTemplate::default()
        };
        let (agent, _, _) = template.instantiate(None);
        assert_eq!(agent.rank, Rank::C);
    }

    #[test]
    fn test_health_damage() {
        let mut health = Health::new(100);
        health.take_damage(30);
        assert_eq!(health.current, 70);
        assert!(health.is_alive());

        health.take_damage(100); // saturating
        assert_eq!(health.current, 0);
        assert!(!health.is_alive());
    }

    #[test]
    fn test_health_heal_clamps_to_max() {
        let mut health = Health::new(100);
        health.take_damage(50);
        health.heal(30);
        assert_eq!(health.current, 80);
        health.heal(100);
        assert_eq!(health.current, 100);
    }
}
