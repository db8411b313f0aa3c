// lidar_core/src/sensor/point_cloud.rs

use nalgebra::{Point3, UnitQuaternion, Vector3};

use crate::models::perception::Beam;

/// Number of scalars the buffer may hold before it starts over (about 413
/// points).
pub const POINT_CLOUD_CAPACITY: usize = 1240;

/// What one accumulation tick did to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccumulateOutcome {
    /// Points written this tick, including a leading origin point.
    pub points_appended: usize,
    /// The buffer overflowed and was emptied.
    pub reset: bool,
}

/// A flat `[x, y, z, x, y, z, ...]` point cloud in body-frame coordinates.
///
/// Each accumulation cycle starts with the sensor's own position. When the
/// buffer grows past [`POINT_CLOUD_CAPACITY`] it is cleared as a whole and the
/// next tick starts a new cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloudBuffer {
    data: Vec<f64>,
}

impl PointCloudBuffer {
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(POINT_CLOUD_CAPACITY + 3 * 9),
        }
    }

    fn push(&mut self, v: &Vector3<f64>) {
        self.data.extend_from_slice(&[v.x, v.y, v.z]);
    }

    /// Appends one tick worth of samples.
    ///
    /// `origin` and every hit point are world-space; they are stored as
    /// `body_rotation * (point - body_position)`. Beams that missed are
    /// skipped.
    pub fn on_tick(
        &mut self,
        origin: &Point3<f64>,
        body_rotation: &UnitQuaternion<f64>,
        body_position: &Point3<f64>,
        beams: &[Beam],
    ) -> AccumulateOutcome {
        let mut outcome = AccumulateOutcome::default();

        if self.data.is_empty() {
            self.push(&(body_rotation * (origin - body_position)));
            outcome.points_appended += 1;
        }

        for hit in beams.iter().filter_map(|b| b.hit.impact()) {
            self.push(&(body_rotation * (hit - body_position)));
            outcome.points_appended += 1;
        }

        if self.data.len() > POINT_CLOUD_CAPACITY {
            log::debug!(
                "Point cloud overflowed at {} scalars, starting a new cycle",
                self.data.len()
            );
            self.data.clear();
            outcome.reset = true;
        }

        outcome
    }

    /// Empties the buffer; the next tick re-emits the origin.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// The raw scalars, three per point.
    pub fn read(&self) -> &[f64] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.data.len() / 3
    }

    pub fn points(&self) -> impl Iterator<Item = Vector3<f64>> + '_ {
        self.data
            .chunks_exact(3)
            .map(|c| Vector3::new(c[0], c[1], c[2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::perception::HitRecord;
    use crate::types::BEAM_COUNT;

    fn beams_with_hits(hits: usize) -> Vec<Beam> {
        (0..BEAM_COUNT)
            .map(|i| {
                let mut beam = Beam::idle(i);
                if i < hits {
                    beam.hit = HitRecord::hit(1.0, Point3::new(i as f64, 1.0, 2.0));
                }
                beam
            })
            .collect()
    }

    fn tick(buffer: &mut PointCloudBuffer, beams: &[Beam]) -> AccumulateOutcome {
        buffer.on_tick(
            &Point3::new(0.5, 0.5, 0.5),
            &UnitQuaternion::identity(),
            &Point3::origin(),
            beams,
        )
    }

    #[test]
    fn first_tick_emits_origin_then_hits() {
        let mut buffer = PointCloudBuffer::new();
        let outcome = tick(&mut buffer, &beams_with_hits(1));

        assert_eq!(buffer.len(), 6);
        assert_eq!(outcome.points_appended, 2);
        assert_eq!(&buffer.read()[..3], &[0.5, 0.5, 0.5]);
        assert_eq!(&buffer.read()[3..], &[0.0, 1.0, 2.0]);
    }

    #[test]
    fn origin_is_only_emitted_on_an_empty_buffer() {
        let mut buffer = PointCloudBuffer::new();
        tick(&mut buffer, &beams_with_hits(2));
        tick(&mut buffer, &beams_with_hits(2));
        assert_eq!(buffer.point_count(), 5);
    }

    #[test]
    fn misses_are_skipped() {
        let mut buffer = PointCloudBuffer::new();
        let outcome = tick(&mut buffer, &beams_with_hits(0));
        assert_eq!(buffer.len(), 3);
        assert_eq!(outcome.points_appended, 1);
    }

    #[test]
    fn overflow_clears_then_next_tick_restarts_with_origin() {
        let mut buffer = PointCloudBuffer::new();
        let full = beams_with_hits(BEAM_COUNT);

        let mut ticks = 0;
        loop {
            let outcome = tick(&mut buffer, &full);
            ticks += 1;
            assert_eq!(buffer.len() % 3, 0);
            if outcome.reset {
                break;
            }
            assert!(buffer.len() <= POINT_CLOUD_CAPACITY);
        }
        // 3 + 24 * n > 1240 first holds for n = 52.
        assert_eq!(ticks, 52);
        assert_eq!(buffer.len(), 0);

        tick(&mut buffer, &beams_with_hits(0));
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn points_are_stored_in_body_frame() {
        let mut buffer = PointCloudBuffer::new();
        let rotation =
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2);
        let mut beam = Beam::idle(0);
        beam.hit = HitRecord::hit(1.0, Point3::new(11.0, 0.0, 0.0));

        let origin = Point3::new(10.0, 0.0, 0.0);
        buffer.on_tick(&origin, &rotation, &origin, &[beam]);

        let points: Vec<_> = buffer.points().collect();
        assert!(points[0].norm() < 1e-12);
        assert!((points[1] - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn clear_empties_the_buffer() {
        let mut buffer = PointCloudBuffer::new();
        tick(&mut buffer, &beams_with_hits(3));
        assert_eq!(buffer.read().len(), 12);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.point_count(), 0);
    }
}
