// lidar_core/src/models/perception/beams.rs

use nalgebra::{Unit, UnitQuaternion, Vector3};

use crate::config::LidarConfig;
use crate::types::{CarrierPose, BEAM_COUNT};

/// Azimuth of beam `index` out of `count`, in degrees.
///
/// The beams are spread evenly from `-bend_x` to `+bend_x` inclusive. A single
/// beam sits on azimuth 0.
pub fn beam_azimuth(index: usize, count: usize, bend_x: f64) -> f64 {
    if count < 2 {
        return 0.0;
    }
    -bend_x + index as f64 * (2.0 * bend_x / (count - 1) as f64)
}

fn axis_rotation(axis: &Vector3<f64>, angle_deg: f64) -> UnitQuaternion<f64> {
    match Unit::try_new(*axis, f64::EPSILON) {
        Some(axis) => UnitQuaternion::from_axis_angle(&axis, angle_deg.to_radians()),
        None => UnitQuaternion::identity(),
    }
}

/// Rotates `base` by the beam's azimuth about `forward_axis`, then by `bend_y`
/// degrees about `right_axis`.
pub fn compute_beam_pointing(
    base: &Vector3<f64>,
    index: usize,
    count: usize,
    bend_x: f64,
    bend_y: f64,
    forward_axis: &Vector3<f64>,
    right_axis: &Vector3<f64>,
) -> Vector3<f64> {
    let azimuth = axis_rotation(forward_axis, beam_azimuth(index, count, bend_x));
    let pitch = axis_rotation(right_axis, bend_y);
    pitch * (azimuth * base)
}

/// The bend settings of a sensor, taken from one configuration snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BeamFan {
    pub max_bend_x: f64,
    pub max_bend_y: f64,
    pub bend_x: f64,
    pub bend_y: f64,
}

impl BeamFan {
    pub fn from_config(config: &LidarConfig) -> Self {
        Self {
            max_bend_x: config.max_bend_x,
            max_bend_y: config.max_bend_y,
            bend_x: config.bend_x,
            bend_y: config.bend_y,
        }
    }

    /// The fan is disabled when both bend limits are zero.
    pub fn is_enabled(&self) -> bool {
        self.max_bend_x != 0.0 || self.max_bend_y != 0.0
    }

    /// Pointing of one beam. With both limits at zero the base vector is
    /// returned untouched.
    pub fn pointing(
        &self,
        base: &Vector3<f64>,
        index: usize,
        count: usize,
        forward_axis: &Vector3<f64>,
        right_axis: &Vector3<f64>,
    ) -> Vector3<f64> {
        if !self.is_enabled() {
            return *base;
        }
        compute_beam_pointing(
            base,
            index,
            count,
            self.bend_x,
            self.bend_y,
            forward_axis,
            right_axis,
        )
    }

    /// Pointing vectors of every beam for the given carrier pose, in index
    /// order.
    ///
    /// A carrier pointing of (near) zero length has no direction to bend, so
    /// every beam comes back as the zero vector. Hosts are expected to treat a
    /// zero direction as a ray that hits nothing.
    pub fn pointings(&self, carrier: &CarrierPose) -> [Vector3<f64>; BEAM_COUNT] {
        let base = carrier
            .pointing
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros);
        std::array::from_fn(|i| {
            self.pointing(&base, i, BEAM_COUNT, &carrier.forward, &carrier.right)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Point3;

    const EPS: f64 = 1e-9;

    fn assert_vec_eq(a: &Vector3<f64>, b: &Vector3<f64>) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = EPS);
        assert_abs_diff_eq!(a.y, b.y, epsilon = EPS);
        assert_abs_diff_eq!(a.z, b.z, epsilon = EPS);
    }

    fn fan(bend_x: f64, bend_y: f64) -> BeamFan {
        BeamFan {
            max_bend_x: 45.0,
            max_bend_y: 45.0,
            bend_x,
            bend_y,
        }
    }

    #[test]
    fn azimuths_form_a_symmetric_arithmetic_sequence() {
        for count in 2..=12 {
            for &bend in &[0.0, 5.0, 22.5, 45.0, -10.0] {
                let angles: Vec<f64> = (0..count).map(|i| beam_azimuth(i, count, bend)).collect();
                assert_abs_diff_eq!(angles[0], -bend, epsilon = EPS);
                assert_abs_diff_eq!(angles[count - 1], bend, epsilon = EPS);

                let step = angles[1] - angles[0];
                for pair in angles.windows(2) {
                    assert_abs_diff_eq!(pair[1] - pair[0], step, epsilon = EPS);
                }
                for i in 0..count {
                    assert_abs_diff_eq!(angles[i], -angles[count - 1 - i], epsilon = EPS);
                }
            }
        }
    }

    #[test]
    fn single_beam_points_straight() {
        assert_eq!(beam_azimuth(0, 1, 30.0), 0.0);
    }

    #[test]
    fn zero_limits_leave_every_beam_on_the_base_vector() {
        let disabled = BeamFan {
            max_bend_x: 0.0,
            max_bend_y: 0.0,
            bend_x: 30.0,
            bend_y: 15.0,
        };
        let base = Vector3::new(0.3, -0.4, 0.866);
        for i in 0..BEAM_COUNT {
            let p = disabled.pointing(&base, i, BEAM_COUNT, &Vector3::z(), &Vector3::y());
            assert_eq!(p, base);
        }
    }

    #[test]
    fn fan_spreads_about_the_forward_axis() {
        let f = fan(30.0, 0.0);
        let first = f.pointing(&Vector3::x(), 0, BEAM_COUNT, &Vector3::z(), &Vector3::y());
        let last = f.pointing(&Vector3::x(), 7, BEAM_COUNT, &Vector3::z(), &Vector3::y());

        let (s, c) = 30f64.to_radians().sin_cos();
        assert_vec_eq(&first, &Vector3::new(c, -s, 0.0));
        assert_vec_eq(&last, &Vector3::new(c, s, 0.0));
    }

    #[test]
    fn bend_y_pitches_the_whole_fan() {
        let f = fan(0.0, 10.0);
        let (s, c) = 10f64.to_radians().sin_cos();
        for i in 0..BEAM_COUNT {
            let p = f.pointing(&Vector3::x(), i, BEAM_COUNT, &Vector3::z(), &Vector3::y());
            assert_vec_eq(&p, &Vector3::new(c, 0.0, -s));
        }
    }

    #[test]
    fn azimuth_is_applied_before_pitch() {
        let p =
            compute_beam_pointing(&Vector3::x(), 0, 2, 90.0, 90.0, &Vector3::z(), &Vector3::y());
        // -90 about z takes x to -y, which is unaffected by the pitch about y.
        assert_vec_eq(&p, &-Vector3::y());
    }

    #[test]
    fn carrier_pointings_are_unit_vectors_in_index_order() {
        let carrier = CarrierPose {
            position: Point3::origin(),
            pointing: Vector3::new(2.0, 0.0, 0.0),
            forward: Vector3::z(),
            right: Vector3::y(),
        };
        let beams = fan(21.0, 5.0).pointings(&carrier);
        for (i, p) in beams.iter().enumerate() {
            assert_abs_diff_eq!(p.norm(), 1.0, epsilon = EPS);
            if i > 0 {
                assert!(p.y > beams[i - 1].y);
            }
        }
    }

    #[test]
    fn zero_bend_limits_disable_the_fan() {
        let config = LidarConfig {
            max_bend_x: 0.0,
            max_bend_y: 0.0,
            ..Default::default()
        };
        assert!(!BeamFan::from_config(&config).is_enabled());
        assert!(BeamFan::from_config(&LidarConfig::default()).is_enabled());
    }

    #[test]
    fn zero_length_carrier_pointing_yields_zero_beams() {
        let carrier = CarrierPose {
            position: Point3::origin(),
            pointing: Vector3::zeros(),
            forward: Vector3::z(),
            right: Vector3::y(),
        };
        for p in fan(21.0, 5.0).pointings(&carrier) {
            assert_eq!(p, Vector3::zeros());
        }
    }
}
