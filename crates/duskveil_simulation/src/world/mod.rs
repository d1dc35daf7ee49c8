//! Level geometry — the spatial-query capability consumed by the core.
//!
//! The simulation owns one `LevelGeometry` per session (inserted as a
//! resource by `SimulationPlugin`). Perception uses it for occlusion
//! raycasts, flee pathing probes candidate escape directions against it,
//! and push-teleports clamp into its navigable bounds. Hosts with a real
//! physics scene populate it from their collision data at level load.

use bevy::prelude::*;

/// Axis-aligned box occluder (walls, crates, terrain blocks).
#[derive(Debug, Clone, Copy)]
pub struct Occluder {
    pub min: Vec3,
    pub max: Vec3,
}

impl Occluder {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Slab test: does the ray hit this box within `max_dist`?
    ///
    /// `dir` must be normalized.
    fn hit_by(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> bool {
        let mut t_min = 0.0_f32;
        let mut t_max = max_dist;

        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            let lo = self.min[axis];
            let hi = self.max[axis];

            if d.abs() < 1e-6 {
                // Ray parallel to slab: miss unless origin is inside it
                if o < lo || o > hi {
                    return false;
                }
            } else {
                let inv = 1.0 / d;
                let mut t0 = (lo - o) * inv;
                let mut t1 = (hi - o) * inv;
                if t0 > t1 {
                    std::mem::swap(&mut t0, &mut t1);
                }
                t_min = t_min.max(t0);
                t_max = t_max.min(t1);
                if t_min > t_max {
                    return false;
                }
            }
        }

        true
    }
}

/// Static level geometry for occlusion and navigable-space clamping.
#[derive(Resource, Debug, Clone, Default)]
pub struct LevelGeometry {
    pub occluders: Vec<Occluder>,
    /// Navigable area as a (min, max) box; `None` means unbounded.
    pub bounds: Option<(Vec3, Vec3)>,
}

impl LevelGeometry {
    pub fn with_bounds(min: Vec3, max: Vec3) -> Self {
        Self {
            occluders: Vec::new(),
            bounds: Some((min.min(max), min.max(max))),
        }
    }

    pub fn add_occluder(&mut self, min: Vec3, max: Vec3) {
        self.occluders.push(Occluder::new(min, max));
    }

    /// Occlusion test: does anything block the ray within `max_dist`?
    pub fn raycast(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> bool {
        let dir = dir.normalize_or_zero();
        if dir == Vec3::ZERO || max_dist <= 0.0 {
            return false;
        }
        self.occluders.iter().any(|o| o.hit_by(origin, dir, max_dist))
    }

    /// Is the straight segment `a → b` blocked by an occluder?
    ///
    /// The segment is shortened slightly at both ends so that points lying
    /// on an occluder surface (an agent hugging a wall) do not self-occlude.
    pub fn segment_blocked(&self, a: Vec3, b: Vec3) -> bool {
        let delta = b - a;
        let dist = delta.length();
        if dist < 1e-4 {
            return false;
        }
        let dir = delta / dist;
        let trim = (dist * 0.02).min(0.1);
        self.raycast(a + dir * trim, dir, dist - 2.0 * trim)
    }

    /// Clamp a point into the navigable bounds (no-op when unbounded).
    pub fn clamp_navigable(&self, p: Vec3) -> Vec3 {
        match self.bounds {
            Some((min, max)) => p.clamp(min, max),
            None => p,
        }
    }
}
