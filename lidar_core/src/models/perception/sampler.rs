// lidar_core/src/models/perception/sampler.rs

use nalgebra::{Point3, Vector3};

use super::{HitRecord, RayCandidate, RaycastProvider};
use crate::layers::LayerMask;

/// Picks the closest of the candidates, or the miss sentinel when there are
/// none. Non-finite or negative distances are ignored.
pub fn nearest_hit(candidates: &[RayCandidate]) -> HitRecord {
    candidates
        .iter()
        .filter(|c| c.distance.is_finite() && c.distance >= 0.0)
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
        .map(|c| HitRecord::from(*c))
        .unwrap_or_else(HitRecord::miss)
}

/// Casts one beam and reduces the physics engine's answer to a single record.
pub fn sample_beam(
    raycaster: &dyn RaycastProvider,
    origin: &Point3<f64>,
    pointing: &Vector3<f64>,
    max_distance: f64,
    mask: LayerMask,
) -> HitRecord {
    let candidates = raycaster.raycast(origin, pointing, max_distance, mask);
    nearest_hit(&candidates)
}
