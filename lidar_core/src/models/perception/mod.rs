// lidar_core/src/models/perception/mod.rs

pub mod beams;
pub mod sampler;

use nalgebra::{Point3, Vector3};

use crate::layers::LayerMask;

/// Distance reported by a [`HitRecord`] whose ray found nothing.
pub const NO_HIT_DISTANCE: f64 = -1.0;

/// One candidate intersection reported by the physics engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayCandidate {
    /// Distance from the ray origin to the impact point.
    pub distance: f64,
    /// World-space impact point.
    pub point: Point3<f64>,
}

/// The physics engine's intersection query.
///
/// Implementations return every collider the ray crosses within
/// `max_distance` on the layers in `mask`, in any order. An empty vector means
/// nothing was hit.
pub trait RaycastProvider {
    fn raycast(
        &self,
        origin: &Point3<f64>,
        direction: &Vector3<f64>,
        max_distance: f64,
        mask: LayerMask,
    ) -> Vec<RayCandidate>;
}

/// The result of one beam's raycast on one sampling tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    /// Distance to the impact point, or [`NO_HIT_DISTANCE`].
    pub distance: f64,
    /// World-space impact point. Only meaningful when [`HitRecord::is_hit`].
    pub point: Point3<f64>,
}

impl HitRecord {
    pub fn hit(distance: f64, point: Point3<f64>) -> Self {
        Self { distance, point }
    }

    /// The "nothing was hit" sentinel.
    pub fn miss() -> Self {
        Self {
            distance: NO_HIT_DISTANCE,
            point: Point3::origin(),
        }
    }

    pub fn is_hit(&self) -> bool {
        self.distance >= 0.0
    }

    /// The impact point, if there is one.
    pub fn impact(&self) -> Option<Point3<f64>> {
        self.is_hit().then_some(self.point)
    }
}

impl Default for HitRecord {
    fn default() -> Self {
        Self::miss()
    }
}

impl From<RayCandidate> for HitRecord {
    fn from(c: RayCandidate) -> Self {
        HitRecord::hit(c.distance, c.point)
    }
}

/// One of the sensor's fixed beam channels, as last sampled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beam {
    pub index: usize,
    /// World-space unit pointing vector, or zero when the carrier pointing is
    /// degenerate.
    pub pointing: Vector3<f64>,
    pub hit: HitRecord,
}

impl Beam {
    pub fn idle(index: usize) -> Self {
        Self {
            index,
            pointing: Vector3::zeros(),
            hit: HitRecord::miss(),
        }
    }

    /// How far to draw this beam: to the impact point, or out to `max_range`
    /// when the ray missed.
    pub fn visual_length(&self, max_range: f64) -> f64 {
        if self.hit.is_hit() {
            self.hit.distance
        } else {
            max_range
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_is_the_negative_sentinel() {
        let miss = HitRecord::miss();
        assert_eq!(miss.distance, -1.0);
        assert!(!miss.is_hit());
        assert_eq!(miss.impact(), None);
    }

    #[test]
    fn zero_distance_is_still_a_hit() {
        let hit = HitRecord::hit(0.0, Point3::new(1.0, 2.0, 3.0));
        assert!(hit.is_hit());
        assert_eq!(hit.impact(), Some(Point3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn missed_beams_are_drawn_to_max_range() {
        let mut beam = Beam::idle(2);
        assert_eq!(beam.visual_length(500.0), 500.0);
        beam.hit = HitRecord::hit(12.5, Point3::origin());
        assert_eq!(beam.visual_length(500.0), 12.5);
    }
}
