//! Noise propagation.
//!
//! A session-scoped `NoiseField` resource collects published noise events
//! (footsteps, thrown objects, gunfire) and a propagation system fans them
//! out to listening agents once per tick with distance falloff and
//! occlusion muffling. The field also tracks a decaying global noise level
//! for ambient-tension consumers.
//!
//! Falloff is range-normalized linear: `intensity * (1 - distance / hearing_range)`,
//! zero at the listener's full hearing range. A noise is heard only when
//! the attenuated intensity is strictly above the listener's threshold.

use bevy::prelude::*;

use crate::ai::events::SensorEvent;
use crate::ai::machine::StateMachine;
use crate::components::{AgentConfig, AgentFacts};
use crate::world::LevelGeometry;

/// Global noise level decay per second.
const LEVEL_DECAY_PER_SEC: f32 = 0.35;

/// Noises heard through an occluder arrive muffled by this factor.
const OCCLUSION_MUFFLE: f32 = 0.5;

/// One transient noise. Consumed by the propagation pass, never persisted.
#[derive(Debug, Clone)]
pub struct NoiseEvent {
    pub position: Vec3,
    /// Unitless; compared against listener hearing thresholds.
    pub intensity: f32,
    pub source: Option<Entity>,
}

/// Session-scoped noise registry. One per simulation, owned by the app.
#[derive(Resource, Debug, Default)]
pub struct NoiseField {
    pending: Vec<NoiseEvent>,
    level: f32,
}

impl NoiseField {
    /// Publish a noise for the next propagation pass and raise the global
    /// noise level.
    pub fn publish(&mut self, position: Vec3, intensity: f32, source: Option<Entity>) {
        self.level = self.level.max(intensity);
        self.pending.push(NoiseEvent {
            position,
            intensity,
            source,
        });
    }

    /// Decaying global noise level (ambient tension readout).
    pub fn level(&self) -> f32 {
        self.level
    }

    fn drain(&mut self) -> Vec<NoiseEvent> {
        std::mem::take(&mut self.pending)
    }
}

/// Attenuated intensity at `distance` from the source for a listener with
/// the given hearing range. Linear to zero at the range, clamped below.
pub fn attenuated_intensity(intensity: f32, distance: f32, hearing_range: f32) -> f32 {
    if hearing_range <= 0.0 {
        return 0.0;
    }
    (intensity * (1.0 - distance / hearing_range)).max(0.0)
}

/// System: decay the global noise level toward zero.
pub fn decay_noise_level(time: Res<Time<Fixed>>, mut field: ResMut<NoiseField>) {
    if field.level > 0.0 {
        field.level = (field.level - LEVEL_DECAY_PER_SEC * time.delta_secs()).max(0.0);
    }
}

/// System: fan published noises out to listening agents.
///
/// Per listener: linear distance falloff, halved through occluders,
/// dispatched as `NoiseHeard` only when strictly above the listener's
/// hearing threshold. The noise source never hears itself.
pub fn propagate_noise(
    mut field: ResMut<NoiseField>,
    geometry: Res<LevelGeometry>,
    listeners: Query<(Entity, &AgentConfig, &Transform), (With<AgentFacts>, With<StateMachine>)>,
    mut sensor: EventWriter<SensorEvent>,
) {
    for noise in field.drain() {
        for (listener, config, transform) in listeners.iter() {
            if noise.source == Some(listener) {
                continue;
            }

            let distance = transform.translation.distance(noise.position);
            let mut heard = attenuated_intensity(noise.intensity, distance, config.hearing_range);

            if heard > 0.0 && geometry.segment_blocked(transform.translation, noise.position) {
                heard *= OCCLUSION_MUFFLE;
            }

            // Strict greater-than: a noise exactly at the threshold is missed
            if heard > config.hearing_threshold {
                crate::logger::log(&format!(
                    "noise: {:?} heard {:.2} at {:.1}m from {:?}",
                    listener, heard, distance, noise.position
                ));
                sensor.write(SensorEvent::NoiseHeard {
                    observer: listener,
                    position: noise.position,
                    intensity: heard,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falloff_endpoints() {
        // Full intensity at the source
        assert_eq!(attenuated_intensity(1.0, 0.0, 15.0), 1.0);
        // Exactly zero at the hearing range
        assert_eq!(attenuated_intensity(1.0, 15.0, 15.0), 0.0);
        // Clamped beyond it
        assert_eq!(attenuated_intensity(1.0, 30.0, 15.0), 0.0);
    }

    #[test]
    fn test_falloff_is_linear() {
        let half = attenuated_intensity(1.0, 7.5, 15.0);
        assert!((half - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_threshold_is_strict() {
        // The hearing check is `heard > threshold`; equality must not pass.
        let threshold = 0.5_f32;
        let at_threshold = attenuated_intensity(1.0, 7.5, 15.0);
        assert!((at_threshold - threshold).abs() < 1e-6);
        assert!(!(at_threshold > threshold));
        let above = attenuated_intensity(1.01, 7.5, 15.0);
        assert!(above > threshold);
    }

    #[test]
    fn test_publish_raises_and_decay_lowers_level() {
        let mut field = NoiseField::default();
        field.publish(Vec3::ZERO, 0.8, None);
        assert_eq!(field.level(), 0.8);
        // A quieter noise does not lower the level
        field.publish(Vec3::ZERO, 0.3, None);
        assert_eq!(field.level(), 0.8);
        assert_eq!(field.drain().len(), 2);

        field.level = (field.level - LEVEL_DECAY_PER_SEC * 1.0).max(0.0);
        assert!((field.level() - 0.45).abs() < 1e-6);
    }
}
