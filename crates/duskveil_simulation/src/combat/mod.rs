//! Combat gating and melee swing resolution.
//!
//! The behavior states decide *when* to strike; this module owns the
//! mechanics: the cooldown-timestamp gate, the windup → hit → recovery
//! swing that stands in for animation timing, single-application damage,
//! and death handling.

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::components::{
    Agent, AgentConfig, AgentFacts, AttackSwing, Health, NavAgent, SwingPhase, SWING_RECOVERY,
};

/// A swing still connects up to this factor beyond attack range (the
/// target backing off mid-windup does not automatically whiff).
pub const ATTACK_RANGE_SLACK: f32 = 1.2;

/// Cooldown randomization band applied on every committed attack.
const COOLDOWN_JITTER: std::ops::Range<f32> = 0.9..1.15;

/// Event: a swing's hit frame connected.
#[derive(Event, Debug, Clone)]
pub struct DamageDealt {
    pub attacker: Entity,
    pub target: Entity,
    pub amount: u32,
}

/// Event: an entity ran out of health and is being removed.
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
}

/// Combat gate: start an attack if every precondition holds.
///
/// Succeeds only when a target exists, the agent is neither stunned nor
/// mid-swing, and the cooldown timestamp has passed. On success movement
/// halts, the swing starts, and the next-allowed-attack timestamp is
/// rolled as `now + cooldown * rand[0.9, 1.15] * cooldown_scale`.
pub fn try_start_attack(
    config: &AgentConfig,
    facts: &mut AgentFacts,
    nav: &mut NavAgent,
    now: f32,
    rng: &mut ChaCha8Rng,
    cooldown_scale: f32,
) -> bool {
    if facts.target.is_none() || facts.stunned || facts.attack_in_progress {
        return false;
    }
    if now < facts.next_attack_at {
        return false;
    }

    nav.halt(true);
    nav.reset_path();
    facts.attack_in_progress = true;
    facts.swing = Some(AttackSwing::new());
    facts.next_attack_at =
        now + config.attack_cooldown * rng.gen_range(COOLDOWN_JITTER) * cooldown_scale;
    true
}

/// System: advance in-flight swings.
///
/// The hit frame fires once at the windup/recovery boundary and applies
/// damage only if the target is still within `attack_range * 1.2`. Swing
/// completion clears the attack-in-progress flag and restores movement.
pub fn tick_attack_swings(
    time: Res<Time<Fixed>>,
    mut attackers: Query<(Entity, &AgentConfig, &mut AgentFacts, &mut NavAgent, &Transform)>,
    targets: Query<&Transform>,
    mut damage: EventWriter<DamageDealt>,
) {
    let delta = time.delta_secs();

    for (entity, config, mut facts, mut nav, transform) in attackers.iter_mut() {
        let Some(mut swing) = facts.swing.take() else {
            continue;
        };

        swing.phase_timer -= delta;
        if swing.phase_timer > 0.0 {
            facts.swing = Some(swing);
            continue;
        }

        match swing.phase {
            SwingPhase::Windup => {
                swing.phase = SwingPhase::Recovery;
                swing.phase_timer = SWING_RECOVERY;
                if !swing.hit_applied {
                    swing.hit_applied = true;
                    let target = facts.target;
                    let in_reach = target
                        .and_then(|t| targets.get(t).ok())
                        .map(|t| {
                            transform.translation.distance(t.translation)
                                <= config.attack_range * ATTACK_RANGE_SLACK
                        })
                        .unwrap_or(false);
                    if let (Some(target), true) = (target, in_reach) {
                        damage.write(DamageDealt {
                            attacker: entity,
                            target,
                            amount: config.attack_damage,
                        });
                    } else {
                        crate::logger::log(&format!("combat: {:?} swing whiffed", entity));
                    }
                }
                facts.swing = Some(swing);
            }
            SwingPhase::Recovery => {
                // Swing complete: restore movement, drop the swing
                facts.attack_in_progress = false;
                nav.halt(false);
            }
        }
    }
}

/// System: apply dealt damage to victim health.
pub fn apply_damage(mut events: EventReader<DamageDealt>, mut victims: Query<&mut Health>) {
    for event in events.read() {
        let Ok(mut health) = victims.get_mut(event.target) else {
            continue;
        };
        health.take_damage(event.amount);
        crate::logger::log(&format!(
            "combat: {:?} hit {:?} for {} ({}/{} left)",
            event.attacker, event.target, event.amount, health.current, health.max
        ));
    }
}

/// System: remove agents whose health reached zero.
///
/// Despawning deregisters the agent from perception, noise listening, and
/// the brain pass in one step — no stale registrations survive.
pub fn handle_agent_death(
    mut commands: Commands,
    agents: Query<(Entity, &Agent, &Health), Changed<Health>>,
    mut died: EventWriter<EntityDied>,
) {
    for (entity, agent, health) in agents.iter() {
        if !health.is_alive() {
            crate::logger::log_info(&format!(
                "death: {} [{}] {:?} destroyed",
                agent.name,
                agent.rank.label(),
                entity
            ));
            died.write(EntityDied { entity });
            commands.entity(entity).despawn();
        }
    }
}

/// Combat plugin: swing resolution, damage application, death cleanup.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DamageDealt>().add_event::<EntityDied>();
        app.add_systems(
            FixedUpdate,
            (tick_attack_swings, apply_damage, handle_agent_death)
                .chain()
                .in_set(crate::SimSet::Act)
                .after(crate::components::movement::drive_nav_agents),
        );
    }
}
