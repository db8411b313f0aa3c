// lidar_core/src/sensor/mod.rs

//! The LiDAR sensor itself: lifecycle, pacing, power and accumulation wired
//! together behind two host callbacks.
//!
//! The host calls [`Sensor::on_physics_step`] after every completed physics
//! step and [`Sensor::on_frame`] once per rendered frame. Pacing and power are
//! evaluated per physics step; the step latches a readiness flag and, when the
//! pacer fires, a sampling request. The next frame consumes both, so the
//! sampling rate follows the fixed-step clock and not the frame rate.

pub mod pacer;
pub mod point_cloud;
pub mod power;

use crate::config::LidarConfig;
use crate::error::{LidarError, LidarResult};
use crate::frames::BodyFrame;
use crate::layers::CollisionLayout;
use crate::models::perception::{beams::BeamFan, sampler::sample_beam, Beam, RaycastProvider};
use crate::types::{BodyPose, CarrierPose, SceneContext, BEAM_COUNT};

use pacer::TickPacer;
use point_cloud::PointCloudBuffer;
use power::{PowerGate, PowerRequest, ResourcePool};

/// Lifecycle state of a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorState {
    Inactive,
    Active,
    /// The part is gone. Terminal.
    Destroyed,
}

/// Host notifications and UI actions, already translated by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorEvent {
    Activate,
    Deactivate,
    ToggleVisible,
    ClearPointCloud,
    /// The vessel was modified or the part detached.
    VesselModified,
    /// The part carrying the sensor was destroyed.
    PartDestroyed,
}

/// What a call to [`Sensor::on_frame`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The sensor is not active.
    Idle,
    /// No physics step completed since the last frame.
    AwaitingPhysics,
    /// A physics step completed but sampling is not due on it.
    Paced,
    /// Sampling was due but the last power draw fell short.
    Unpowered,
    /// The beams fired.
    Sampled {
        hits: usize,
        /// Points were written to the cloud (a body frame was available).
        accumulated: bool,
        /// The cloud overflowed and was emptied on this tick.
        cloud_reset: bool,
    },
}

#[derive(Debug, Clone)]
pub struct Sensor {
    config: LidarConfig,
    state: SensorState,
    pacer: TickPacer,
    power: PowerGate,
    cloud: PointCloudBuffer,
    beams: [Beam; BEAM_COUNT],
    physics_settled: bool,
    sample_due: bool,
    /// Set while the carrier reports a pointing with no direction.
    pointing_degenerate: bool,
}

impl Sensor {
    /// Builds a sensor from its configuration. It starts active when
    /// `config.enabled` is set.
    pub fn new(config: LidarConfig) -> LidarResult<Self> {
        config.validate()?;
        let config = config.clamped();
        let state = if config.enabled {
            SensorState::Active
        } else {
            SensorState::Inactive
        };
        Ok(Self {
            config,
            state,
            pacer: TickPacer::new(),
            power: PowerGate::new(),
            cloud: PointCloudBuffer::new(),
            beams: std::array::from_fn(Beam::idle),
            physics_settled: false,
            sample_due: false,
            pointing_degenerate: false,
        })
    }

    // --- Accessors ---

    pub fn state(&self) -> SensorState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SensorState::Active
    }

    pub fn has_power(&self) -> bool {
        self.power.is_powered()
    }

    pub fn config(&self) -> &LidarConfig {
        &self.config
    }

    pub fn beams(&self) -> &[Beam; BEAM_COUNT] {
        &self.beams
    }

    pub fn point_cloud(&self) -> &PointCloudBuffer {
        &self.cloud
    }

    /// Replaces the configuration, e.g. after a slider moved.
    ///
    /// `enabled` is owned by the lifecycle and is kept as-is.
    pub fn update_config(&mut self, config: LidarConfig) -> LidarResult<()> {
        if self.state == SensorState::Destroyed {
            return Err(LidarError::SensorDestroyed);
        }
        config.validate()?;
        let mut config = config.clamped();
        config.enabled = self.config.enabled;
        if !config.requires_power {
            self.power.restore();
        }
        self.config = config;
        Ok(())
    }

    // --- Lifecycle ---

    pub fn activate(&mut self) -> LidarResult<()> {
        match self.state {
            SensorState::Destroyed => Err(LidarError::SensorDestroyed),
            SensorState::Active => Ok(()),
            SensorState::Inactive => {
                self.state = SensorState::Active;
                self.config.enabled = true;
                self.pacer.reset();
                self.sample_due = false;
                log::info!("LiDAR activated");
                Ok(())
            }
        }
    }

    /// Stops sampling, hides the beams' last hits and clears the cloud.
    pub fn deactivate(&mut self) -> LidarResult<()> {
        match self.state {
            SensorState::Destroyed => Err(LidarError::SensorDestroyed),
            SensorState::Inactive => Ok(()),
            SensorState::Active => {
                self.state = SensorState::Inactive;
                self.config.enabled = false;
                self.beams = std::array::from_fn(Beam::idle);
                self.cloud.clear();
                log::info!("LiDAR deactivated");
                Ok(())
            }
        }
    }

    pub fn clear_point_cloud(&mut self) {
        self.cloud.clear();
    }

    /// Applies one host event or UI action.
    pub fn handle(&mut self, event: SensorEvent) -> LidarResult<()> {
        if self.state == SensorState::Destroyed {
            return match event {
                // Late notifications about an already-gone part are harmless.
                SensorEvent::PartDestroyed | SensorEvent::VesselModified => Ok(()),
                _ => Err(LidarError::SensorDestroyed),
            };
        }

        match event {
            SensorEvent::Activate => self.activate(),
            SensorEvent::Deactivate => self.deactivate(),
            SensorEvent::ToggleVisible => {
                self.config.visible = !self.config.visible;
                Ok(())
            }
            SensorEvent::ClearPointCloud => {
                self.clear_point_cloud();
                Ok(())
            }
            SensorEvent::VesselModified => {
                self.config.visible = false;
                self.deactivate()
            }
            SensorEvent::PartDestroyed => {
                self.config.visible = false;
                self.deactivate()?;
                self.state = SensorState::Destroyed;
                self.physics_settled = false;
                self.sample_due = false;
                log::info!("LiDAR part destroyed");
                Ok(())
            }
        }
    }

    // --- Host callbacks ---

    /// Runs after every completed physics step: draws this step's power,
    /// counts the step on the pacer and marks the settled world state as ready
    /// for sampling. Returns the power state.
    ///
    /// A sampling request raised here stays latched until the next
    /// [`Sensor::on_frame`], so several steps between two frames still each
    /// count towards `tick_skip`.
    pub fn on_physics_step(
        &mut self,
        dt: f64,
        scene: &SceneContext,
        pool: &mut dyn ResourcePool,
    ) -> bool {
        if self.state == SensorState::Destroyed {
            return false;
        }
        let request = PowerRequest {
            in_editor: scene.in_editor,
            activated: self.is_active(),
            requires_electric: self.config.requires_power,
            drain_per_second: self.config.power_drain,
            elapsed_seconds: dt,
        };
        let powered = self.power.evaluate(&request, pool);
        self.physics_settled = true;
        if self.is_active() && self.pacer.advance(self.config.tick_skip) {
            self.sample_due = true;
        }
        powered
    }

    /// Runs once per frame. Fires the beams when a physics step has settled
    /// since the last frame, one of those steps was a sampling step, and there
    /// is power.
    ///
    /// Beams are sampled in index order and then, when `body` is known, fed
    /// into the point cloud in that same order.
    ///
    /// # Errors
    /// A body whose axes cannot form a frame aborts the accumulation of this
    /// tick only; the beams keep their fresh samples.
    pub fn on_frame(
        &mut self,
        carrier: &CarrierPose,
        body: Option<&BodyPose>,
        layout: &CollisionLayout,
        raycaster: &dyn RaycastProvider,
    ) -> LidarResult<TickOutcome> {
        let settled = std::mem::take(&mut self.physics_settled);
        let due = std::mem::take(&mut self.sample_due);
        if !self.is_active() {
            return Ok(TickOutcome::Idle);
        }
        if !settled {
            return Ok(TickOutcome::AwaitingPhysics);
        }
        if !due {
            return Ok(TickOutcome::Paced);
        }
        if !self.power.is_powered() {
            return Ok(TickOutcome::Unpowered);
        }

        let degenerate = carrier.pointing.try_normalize(f64::EPSILON).is_none();
        if degenerate && !self.pointing_degenerate {
            log::warn!(
                "LiDAR carrier pointing {:?} has no direction; beams are cast as zero vectors",
                carrier.pointing
            );
        }
        self.pointing_degenerate = degenerate;

        let fan = BeamFan::from_config(&self.config);
        let mask = layout.sensor_mask();
        for (index, pointing) in fan.pointings(carrier).into_iter().enumerate() {
            let hit = sample_beam(
                raycaster,
                &carrier.position,
                &pointing,
                self.config.max_range,
                mask,
            );
            self.beams[index] = Beam {
                index,
                pointing,
                hit,
            };
        }
        let hits = self.beams.iter().filter(|b| b.hit.is_hit()).count();

        let Some(body) = body else {
            return Ok(TickOutcome::Sampled {
                hits,
                accumulated: false,
                cloud_reset: false,
            });
        };

        let frame = BodyFrame::from_pose(body)?;
        let outcome = self
            .cloud
            .on_tick(&carrier.position, &frame.rotation, &frame.position, &self.beams);

        Ok(TickOutcome::Sampled {
            hits,
            accumulated: true,
            cloud_reset: outcome.reset,
        })
    }

    /// The beams to draw this frame, if any.
    pub fn visible_beams(&self, scene: &SceneContext) -> Option<&[Beam; BEAM_COUNT]> {
        (self.config.visible && self.is_active() && !scene.map_view).then_some(&self.beams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::LayerMask;
    use crate::models::perception::{HitRecord, RayCandidate};
    use nalgebra::{Point3, Vector3};

    /// Every ray hits something 10 m away.
    struct Wall;

    impl RaycastProvider for Wall {
        fn raycast(
            &self,
            origin: &Point3<f64>,
            direction: &Vector3<f64>,
            _max_distance: f64,
            _mask: LayerMask,
        ) -> Vec<RayCandidate> {
            vec![RayCandidate {
                distance: 10.0,
                point: origin + direction * 10.0,
            }]
        }
    }

    struct Battery(f64);

    impl ResourcePool for Battery {
        fn request_resource(&mut self, _name: &str, amount: f64) -> f64 {
            let granted = amount.min(self.0);
            self.0 -= granted;
            granted
        }
    }

    fn carrier() -> CarrierPose {
        CarrierPose {
            position: Point3::new(0.0, 2.0, 0.0),
            pointing: Vector3::x(),
            forward: Vector3::y(),
            right: Vector3::z(),
        }
    }

    fn body() -> BodyPose {
        BodyPose {
            position: Point3::origin(),
            up: Vector3::y(),
            forward: Vector3::z(),
        }
    }

    fn active(tick_skip: f64) -> Sensor {
        Sensor::new(LidarConfig {
            enabled: true,
            tick_skip,
            ..Default::default()
        })
        .unwrap()
    }

    fn step(sensor: &mut Sensor, battery: &mut Battery) -> TickOutcome {
        sensor.on_physics_step(0.02, &SceneContext::default(), battery);
        sensor
            .on_frame(&carrier(), Some(&body()), &CollisionLayout::default(), &Wall)
            .unwrap()
    }

    #[test]
    fn enabled_flag_picks_the_initial_state() {
        assert_eq!(active(1.0).state(), SensorState::Active);
        assert_eq!(
            Sensor::new(LidarConfig::default()).unwrap().state(),
            SensorState::Inactive
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = Sensor::new(LidarConfig {
            max_range: -5.0,
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn frame_without_physics_step_does_nothing() {
        let mut sensor = active(1.0);
        let outcome = sensor
            .on_frame(&carrier(), Some(&body()), &CollisionLayout::default(), &Wall)
            .unwrap();
        assert_eq!(outcome, TickOutcome::AwaitingPhysics);
    }

    #[test]
    fn each_physics_step_is_consumed_once() {
        let mut sensor = active(1.0);
        let mut battery = Battery(100.0);
        assert!(matches!(step(&mut sensor, &mut battery), TickOutcome::Sampled { .. }));

        let again = sensor
            .on_frame(&carrier(), Some(&body()), &CollisionLayout::default(), &Wall)
            .unwrap();
        assert_eq!(again, TickOutcome::AwaitingPhysics);
    }

    #[test]
    fn sampling_follows_the_pacer() {
        let mut sensor = active(3.0);
        let mut battery = Battery(100.0);
        assert_eq!(step(&mut sensor, &mut battery), TickOutcome::Paced);
        assert_eq!(step(&mut sensor, &mut battery), TickOutcome::Paced);
        assert_eq!(
            step(&mut sensor, &mut battery),
            TickOutcome::Sampled {
                hits: BEAM_COUNT,
                accumulated: true,
                cloud_reset: false
            }
        );
        assert_eq!(sensor.point_cloud().point_count(), 1 + BEAM_COUNT);
    }

    #[test]
    fn pacing_counts_physics_steps_not_frames() {
        let mut sensor = active(2.0);
        let mut battery = Battery(100.0);
        let scene = SceneContext::default();

        let mut sampled = 0;
        for _ in 0..10 {
            // Rendering runs at half the physics rate.
            sensor.on_physics_step(0.02, &scene, &mut battery);
            sensor.on_physics_step(0.02, &scene, &mut battery);
            let outcome = sensor
                .on_frame(&carrier(), Some(&body()), &CollisionLayout::default(), &Wall)
                .unwrap();
            if matches!(outcome, TickOutcome::Sampled { .. }) {
                sampled += 1;
            }
        }
        assert_eq!(sampled, 10);
    }

    #[test]
    fn sampling_request_waits_for_the_next_frame() {
        let mut sensor = active(3.0);
        let mut battery = Battery(100.0);
        let scene = SceneContext::default();

        // The third step is the sampling step; the frame after it fires.
        for _ in 0..3 {
            sensor.on_physics_step(0.02, &scene, &mut battery);
        }
        assert!(matches!(
            sensor
                .on_frame(&carrier(), Some(&body()), &CollisionLayout::default(), &Wall)
                .unwrap(),
            TickOutcome::Sampled { .. }
        ));

        sensor.on_physics_step(0.02, &scene, &mut battery);
        assert_eq!(
            sensor
                .on_frame(&carrier(), Some(&body()), &CollisionLayout::default(), &Wall)
                .unwrap(),
            TickOutcome::Paced
        );
    }

    #[test]
    fn zero_carrier_pointing_casts_zero_beams_until_it_recovers() {
        let mut sensor = active(1.0);
        let mut battery = Battery(1.0);
        let scene = SceneContext::default();
        let layout = CollisionLayout::default();
        let broken = CarrierPose {
            pointing: Vector3::zeros(),
            ..carrier()
        };

        for _ in 0..2 {
            sensor.on_physics_step(0.02, &scene, &mut battery);
            let outcome = sensor.on_frame(&broken, Some(&body()), &layout, &Wall);
            assert!(matches!(outcome, Ok(TickOutcome::Sampled { .. })));
            assert!(sensor.pointing_degenerate);
            assert!(sensor.beams().iter().all(|b| b.pointing == Vector3::zeros()));
        }

        step(&mut sensor, &mut battery);
        assert!(!sensor.pointing_degenerate);
        assert!(sensor
            .beams()
            .iter()
            .all(|b| (b.pointing.norm() - 1.0).abs() < 1e-9));
    }

    #[test]
    fn flat_battery_gates_sampling() {
        let mut sensor = active(1.0);
        let mut battery = Battery(0.0);
        assert_eq!(step(&mut sensor, &mut battery), TickOutcome::Unpowered);
        assert!(!sensor.has_power());
        assert!(sensor.point_cloud().is_empty());
    }

    #[test]
    fn dropping_the_power_requirement_restores_power() {
        let mut sensor = active(1.0);
        step(&mut sensor, &mut Battery(0.0));
        assert!(!sensor.has_power());

        let config = LidarConfig {
            requires_power: false,
            ..sensor.config().clone()
        };
        sensor.update_config(config).unwrap();
        assert!(matches!(
            step(&mut sensor, &mut Battery(0.0)),
            TickOutcome::Sampled { .. }
        ));
    }

    #[test]
    fn inactive_sensor_is_idle_and_draws_nothing() {
        let mut sensor = Sensor::new(LidarConfig::default()).unwrap();
        let mut battery = Battery(1.0);
        assert_eq!(step(&mut sensor, &mut battery), TickOutcome::Idle);
        assert_eq!(battery.0, 1.0);
    }

    #[test]
    fn missing_body_samples_without_accumulating() {
        let mut sensor = active(1.0);
        sensor.on_physics_step(0.02, &SceneContext::default(), &mut Battery(1.0));
        let outcome = sensor
            .on_frame(&carrier(), None, &CollisionLayout::default(), &Wall)
            .unwrap();
        assert_eq!(
            outcome,
            TickOutcome::Sampled {
                hits: BEAM_COUNT,
                accumulated: false,
                cloud_reset: false
            }
        );
        assert!(sensor.point_cloud().is_empty());
    }

    #[test]
    fn malformed_body_aborts_accumulation_but_keeps_beams() {
        let mut sensor = active(1.0);
        sensor.on_physics_step(0.02, &SceneContext::default(), &mut Battery(1.0));
        let skewed = BodyPose {
            up: Vector3::x(),
            forward: Vector3::new(0.99, 0.14, 0.0),
            ..body()
        };
        let result = sensor.on_frame(&carrier(), Some(&skewed), &CollisionLayout::default(), &Wall);

        assert!(matches!(
            result,
            Err(LidarError::BodyAxesNotPerpendicular { .. })
        ));
        assert!(sensor.point_cloud().is_empty());
        assert!(sensor.beams().iter().all(|b| b.hit.is_hit()));
    }

    #[test]
    fn deactivation_clears_cloud_and_beams() {
        let mut sensor = active(1.0);
        step(&mut sensor, &mut Battery(1.0));
        assert!(!sensor.point_cloud().is_empty());

        sensor.handle(SensorEvent::Deactivate).unwrap();
        assert_eq!(sensor.state(), SensorState::Inactive);
        assert!(sensor.point_cloud().is_empty());
        assert!(sensor.beams().iter().all(|b| b.hit == HitRecord::miss()));
        assert!(!sensor.config().enabled);
    }

    #[test]
    fn vessel_modification_hides_and_deactivates() {
        let mut sensor = active(1.0);
        sensor.handle(SensorEvent::VesselModified).unwrap();
        assert_eq!(sensor.state(), SensorState::Inactive);
        assert!(!sensor.config().visible);

        sensor.handle(SensorEvent::Activate).unwrap();
        assert!(sensor.is_active());
    }

    #[test]
    fn destroyed_sensor_refuses_to_come_back() {
        let mut sensor = active(1.0);
        sensor.handle(SensorEvent::PartDestroyed).unwrap();
        assert_eq!(sensor.state(), SensorState::Destroyed);
        assert_eq!(sensor.activate(), Err(LidarError::SensorDestroyed));
        assert_eq!(
            sensor.handle(SensorEvent::ToggleVisible),
            Err(LidarError::SensorDestroyed)
        );
        assert!(sensor.handle(SensorEvent::PartDestroyed).is_ok());
        assert!(!sensor.on_physics_step(0.02, &SceneContext::default(), &mut Battery(1.0)));
    }

    #[test]
    fn beams_are_hidden_on_map_view_or_when_invisible() {
        let mut sensor = active(1.0);
        let flight = SceneContext::default();
        let map = SceneContext {
            map_view: true,
            ..flight
        };
        assert!(sensor.visible_beams(&flight).is_some());
        assert!(sensor.visible_beams(&map).is_none());

        sensor.handle(SensorEvent::ToggleVisible).unwrap();
        assert!(sensor.visible_beams(&flight).is_none());
    }

    #[test]
    fn config_update_keeps_lifecycle_flag_and_clamps() {
        let mut sensor = active(1.0);
        let config = LidarConfig {
            enabled: false,
            tick_skip: 99.0,
            ..Default::default()
        };
        sensor.update_config(config).unwrap();
        assert!(sensor.config().enabled);
        assert_eq!(sensor.config().tick_skip, 40.0);
    }
}
