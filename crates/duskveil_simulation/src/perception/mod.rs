//! Spatial sensor: cone-of-vision, near-field awareness, occlusion.
//!
//! A throttled perception pass (one scan per `scan_interval` of sim time,
//! accumulated per agent) evaluates perceivable targets against the
//! observer's vision cone. Stance of the target scales the effective sight
//! range; targets inside the near-field radius bypass the angle check.
//! Both paths are occlusion-checked against `LevelGeometry`.
//!
//! Detection changes are dispatched as `SensorEvent`s; the state machine
//! reacts on the same tick. While the current target stays detected, its
//! confirmed position is refreshed directly in the agent facts.

use bevy::prelude::*;

use crate::ai::events::SensorEvent;
use crate::ai::machine::StateMachine;
use crate::components::{AgentConfig, AgentFacts, Health, Perceivable, Stance};
use crate::world::LevelGeometry;

/// Effective sight range never drops below this, however sneaky the target.
const MIN_EFFECTIVE_SIGHT: f32 = 2.0;

/// Sight range multiplier for the target's stance.
pub fn stance_sight_multiplier(stance: Stance) -> f32 {
    match stance {
        Stance::Upright => 1.0,
        Stance::Sprinting => 1.5,
        Stance::Crouched => 0.7,
        Stance::CrouchedStill => 0.35,
    }
}

/// Base sight range scaled by the target's stance, floored.
pub fn effective_sight_range(config: &AgentConfig, stance: Stance) -> f32 {
    (config.sight_range * stance_sight_multiplier(stance)).max(MIN_EFFECTIVE_SIGHT)
}

/// Full visibility check: range, cone angle (bypassed in the near field),
/// and occlusion.
///
/// The cone admits targets up to and including the half-angle boundary.
pub fn can_see(
    config: &AgentConfig,
    observer_pos: Vec3,
    forward: Vec3,
    target_pos: Vec3,
    stance: Stance,
    geometry: &LevelGeometry,
) -> bool {
    let to_target = target_pos - observer_pos;
    let distance = to_target.length();

    let in_view = if distance <= config.proximity_range {
        // Near-field awareness: no angle check, occlusion still applies
        true
    } else if distance <= effective_sight_range(config, stance) {
        let dir = to_target / distance;
        let fwd = forward.normalize_or_zero();
        let half_angle_cos = (config.sight_angle.to_radians() * 0.5).cos();
        fwd.dot(dir) >= half_angle_cos
    } else {
        false
    };

    in_view && !geometry.segment_blocked(observer_pos, target_pos)
}

/// System: throttled perception pass.
///
/// Scans perceivable targets in query order and takes the first match —
/// no distance sorting. Dispatches `TargetSpotted` on detection change and
/// `TargetLost` when a previously visible target drops out.
pub fn tick_perception(
    time: Res<Time<Fixed>>,
    geometry: Res<LevelGeometry>,
    mut observers: Query<
        (Entity, &AgentConfig, &mut AgentFacts, &Transform),
        With<StateMachine>,
    >,
    targets: Query<(Entity, &Transform, &Stance, Option<&Health>), With<Perceivable>>,
    mut sensor: EventWriter<SensorEvent>,
) {
    let delta = time.delta_secs();

    for (observer, config, mut facts, transform) in observers.iter_mut() {
        facts.scan_clock += delta;
        if facts.scan_clock < config.scan_interval {
            continue;
        }
        facts.scan_clock = 0.0;

        let forward = *transform.forward();
        let mut detected: Option<(Entity, Vec3)> = None;

        for (candidate, candidate_transform, stance, health) in targets.iter() {
            if candidate == observer {
                continue;
            }
            if health.map(|h| !h.is_alive()).unwrap_or(false) {
                continue;
            }
            if can_see(
                config,
                transform.translation,
                forward,
                candidate_transform.translation,
                *stance,
                &geometry,
            ) {
                // First match wins; remaining candidates are not scanned
                detected = Some((candidate, candidate_transform.translation));
                break;
            }
        }

        let was_visible = facts.target_visible;
        match detected {
            Some((candidate, position)) => {
                if facts.target == Some(candidate) {
                    facts.target_visible = true;
                    facts.target_position = position;
                    if !was_visible {
                        // Sight regained on the existing target
                        sensor.write(SensorEvent::TargetSpotted {
                            observer,
                            target: candidate,
                            position,
                        });
                    }
                } else {
                    sensor.write(SensorEvent::TargetSpotted {
                        observer,
                        target: candidate,
                        position,
                    });
                }
            }
            None => {
                facts.target_visible = false;
                if facts.target.is_some() && was_visible {
                    sensor.write(SensorEvent::TargetLost { observer });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AgentConfig {
        AgentConfig {
            sight_range: 10.0,
            sight_angle: 90.0,
            proximity_range: 2.0,
            ..AgentConfig::default()
        }
    }

    #[test]
    fn test_cone_admits_exactly_the_half_angle() {
        let mut cfg = config();
        cfg.sight_angle = 180.0;
        let geo = LevelGeometry::default();
        let observer = Vec3::ZERO;
        let forward = Vec3::X;

        // Exactly perpendicular: precisely the half-angle of a 180-degree cone
        let at_boundary = Vec3::new(0.0, 0.0, 5.0);
        assert!(can_see(&cfg, observer, forward, at_boundary, Stance::Upright, &geo));

        // A hair behind the boundary plane
        let beyond = Vec3::new(-0.2, 0.0, 5.0);
        assert!(!can_see(&cfg, observer, forward, beyond, Stance::Upright, &geo));

        // Well inside the cone
        let inside = Vec3::new(5.0, 0.0, 1.0);
        assert!(can_see(&cfg, observer, forward, inside, Stance::Upright, &geo));
    }

    #[test]
    fn test_proximity_bypasses_angle_check() {
        let cfg = config();
        let geo = LevelGeometry::default();
        // Directly behind the observer, inside the near field
        let behind = Vec3::new(-1.5, 0.0, 0.0);
        assert!(can_see(&cfg, Vec3::ZERO, Vec3::X, behind, Stance::Upright, &geo));
        // Behind and outside the near field
        let far_behind = Vec3::new(-3.0, 0.0, 0.0);
        assert!(!can_see(&cfg, Vec3::ZERO, Vec3::X, far_behind, Stance::Upright, &geo));
    }

    #[test]
    fn test_occlusion_blocks_both_paths() {
        let cfg = config();
        let mut geo = LevelGeometry::default();
        geo.add_occluder(Vec3::new(0.5, -1.0, -2.0), Vec3::new(1.0, 2.0, 2.0));

        // In-cone target behind the wall
        assert!(!can_see(
            &cfg,
            Vec3::ZERO,
            Vec3::X,
            Vec3::new(5.0, 0.0, 0.0),
            Stance::Upright,
            &geo
        ));
        // Near-field target behind the wall
        assert!(!can_see(
            &cfg,
            Vec3::ZERO,
            Vec3::X,
            Vec3::new(1.8, 0.0, 0.0),
            Stance::Upright,
            &geo
        ));
    }

    #[test]
    fn test_stance_scales_effective_range() {
        let cfg = config();
        assert_eq!(effective_sight_range(&cfg, Stance::Upright), 10.0);
        assert_eq!(effective_sight_range(&cfg, Stance::Sprinting), 15.0);
        assert_eq!(effective_sight_range(&cfg, Stance::CrouchedStill), 3.5);

        let geo = LevelGeometry::default();
        // Sprinting target visible beyond base range
        let far = Vec3::new(13.0, 0.0, 0.0);
        assert!(can_see(&cfg, Vec3::ZERO, Vec3::X, far, Stance::Sprinting, &geo));
        assert!(!can_see(&cfg, Vec3::ZERO, Vec3::X, far, Stance::Upright, &geo));
        // Crouched-still target hidden at mid range
        let mid = Vec3::new(5.0, 0.0, 0.0);
        assert!(!can_see(&cfg, Vec3::ZERO, Vec3::X, mid, Stance::CrouchedStill, &geo));
    }

    #[test]
    fn test_effective_range_floor() {
        let mut cfg = config();
        cfg.sight_range = 3.0;
        // 3.0 * 0.35 would be ~1.05; the floor keeps it at 2.0
        assert_eq!(effective_sight_range(&cfg, Stance::CrouchedStill), 2.0);
    }
}
