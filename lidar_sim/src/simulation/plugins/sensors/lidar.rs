// lidar_sim/src/simulation/plugins/sensors/lidar.rs

use avian3d::prelude::SpatialQuery;

use crate::prelude::*;
use crate::simulation::core::components::{Carrier, CelestialBody};
use crate::simulation::core::events::LidarLifecycleEvent;
use crate::simulation::core::resources::{ElectricPool, SceneFlags, SessionLayout};
use crate::simulation::core::simulation_setup::electric_pool_recharge_system;
use crate::simulation::core::transforms::{body_pose_from_transform, carrier_pose_from_transform};
use crate::simulation::plugins::sensors::raycasting::AvianRaycaster;

// =========================================================================
// == Components & Plugin ==
// =========================================================================

/// A LiDAR sensor mounted on a carrier part.
///
/// Wraps the engine-independent [`Sensor`]; the systems below only translate
/// Bevy state into its callbacks.
#[derive(Component)]
pub struct LidarSensor {
    pub sensor: Sensor,
    /// The part this sensor hangs from. Its collider is excluded from the
    /// beams and events addressed to it reach this sensor too.
    pub mounted_on: Entity,
    pub last_outcome: TickOutcome,
    /// Number of times the point cloud overflowed and started over.
    pub cloud_cycles: u32,
}

impl LidarSensor {
    pub fn new(sensor: Sensor, mounted_on: Entity) -> Self {
        Self {
            sensor,
            mounted_on,
            last_outcome: TickOutcome::Idle,
            cloud_cycles: 0,
        }
    }

    /// Whether an event aimed at `target` concerns this sensor.
    pub fn is_addressed_by(&self, own_entity: Entity, target: Option<Entity>) -> bool {
        match target {
            None => true,
            Some(t) => t == own_entity || t == self.mounted_on,
        }
    }
}

/// Repeating timer for the point-cloud status log.
#[derive(Resource)]
pub struct LidarTelemetryTimer(pub Timer);

pub struct LidarSensorPlugin;

impl Plugin for LidarSensorPlugin {
    fn build(&self, app: &mut App) {
        let period = app
            .world()
            .get_resource::<ScenarioConfig>()
            .map(|c| c.simulation.telemetry_period_seconds)
            .filter(|p| *p > 0.0)
            .unwrap_or(2.0);

        app.insert_resource(LidarTelemetryTimer(Timer::from_seconds(
            period,
            TimerMode::Repeating,
        )))
        .add_systems(
            OnEnter(AppState::SceneBuilding),
            spawn_lidar_sensors.in_set(SceneBuildSet::ProcessSensors),
        )
        .add_systems(
            FixedPostUpdate,
            lidar_physics_step_system
                .in_set(SimulationSet::StateSync)
                .after(electric_pool_recharge_system),
        )
        .add_systems(
            Update,
            (
                (forward_lifecycle_events, despawn_destroyed_sensors)
                    .chain()
                    .in_set(SimulationSet::Lifecycle),
                lidar_sampling_system.in_set(SimulationSet::Sensors),
                lidar_telemetry_system.in_set(SimulationSet::Validation),
            ),
        );
    }
}

// =========================================================================
// == Spawning System ==
// =========================================================================

fn spawn_lidar_sensors(
    mut commands: Commands,
    config: Res<ScenarioConfig>,
    carriers: Query<(Entity, &Name), With<Carrier>>,
) {
    let Some((carrier_entity, carrier_name)) = carriers.iter().next() else {
        error!(
            "[SPAWN] No carrier in the scene; skipping {} LiDAR sensor(s).",
            config.sensors.len()
        );
        return;
    };

    for mount in &config.sensors {
        let sensor = match Sensor::new(mount.lidar.clone()) {
            Ok(sensor) => sensor,
            Err(e) => {
                error!("[SPAWN] LiDAR '{}' rejected: {}. Skipping.", mount.name, e);
                continue;
            }
        };

        info!(
            "  -> Spawning LiDAR '{}' on '{}' (tick_skip {}, range {:.0} m, {})",
            mount.name,
            carrier_name.as_str(),
            sensor.config().tick_skip,
            sensor.config().max_range,
            if sensor.is_active() { "active" } else { "inactive" },
        );

        let sensor_entity = commands
            .spawn((
                Name::new(mount.name.clone()),
                LidarSensor::new(sensor, carrier_entity),
                mount.mount.to_bevy_transform(),
            ))
            .id();
        commands.entity(carrier_entity).add_child(sensor_entity);
    }
}

// =========================================================================
// == Runtime Systems ==
// =========================================================================

/// Runs after every physics step: draws power and marks the step as settled.
fn lidar_physics_step_system(
    time: Res<Time>,
    scene: Res<SceneFlags>,
    mut pool: ResMut<ElectricPool>,
    mut sensors: Query<(&Name, &mut LidarSensor)>,
) {
    let dt = time.delta_secs_f64();
    for (name, mut lidar) in &mut sensors {
        let was_powered = lidar.sensor.has_power();
        let powered = lidar.sensor.on_physics_step(dt, &scene.0, &mut *pool);
        if was_powered != powered {
            if powered {
                info!("[LIDAR] '{}' power restored ({:.2} EC left)", name, pool.charge);
            } else {
                warn!("[LIDAR] '{}' lost power ({:.2} EC left)", name, pool.charge);
            }
        }
    }
}

/// Runs every frame and fires the beams of every sensor that is due.
fn lidar_sampling_system(
    spatial_query: SpatialQuery,
    layout: Res<SessionLayout>,
    bodies: Query<&GlobalTransform, With<CelestialBody>>,
    mut sensors: Query<(&Name, &mut LidarSensor, &GlobalTransform)>,
) {
    let body = bodies.iter().next().map(body_pose_from_transform);

    for (name, mut lidar, transform) in &mut sensors {
        let carrier = carrier_pose_from_transform(transform);
        let raycaster = AvianRaycaster::new(&spatial_query).excluding([lidar.mounted_on]);

        match lidar
            .sensor
            .on_frame(&carrier, body.as_ref(), &layout.0, &raycaster)
        {
            Ok(outcome) => {
                if let TickOutcome::Sampled {
                    cloud_reset: true, ..
                } = outcome
                {
                    lidar.cloud_cycles += 1;
                    debug!("[LIDAR] '{}' point cloud cycle {} complete", name, lidar.cloud_cycles);
                }
                lidar.last_outcome = outcome;
            }
            Err(e) => warn!("[LIDAR] '{}' could not record this tick: {}", name, e),
        }
    }
}

/// Hands lifecycle events to the sensors they address.
fn forward_lifecycle_events(
    mut events: EventReader<LidarLifecycleEvent>,
    mut sensors: Query<(Entity, &Name, &mut LidarSensor)>,
) {
    for event in events.read() {
        for (entity, name, mut lidar) in &mut sensors {
            if !lidar.is_addressed_by(entity, event.target) {
                continue;
            }
            match lidar.sensor.handle(event.event) {
                Ok(()) => debug!("[LIDAR] '{}' handled {:?}", name, event.event),
                Err(e) => warn!("[LIDAR] '{}' ignored {:?}: {}", name, event.event, e),
            }
        }
    }
}

/// The host removes parts whose sensors reached the terminal state.
fn despawn_destroyed_sensors(
    mut commands: Commands,
    sensors: Query<(Entity, &Name, &LidarSensor)>,
) {
    for (entity, name, lidar) in &sensors {
        if lidar.sensor.state() == SensorState::Destroyed {
            info!("[LIDAR] '{}' destroyed, removing it from the scene", name);
            commands.entity(entity).despawn();
        }
    }
}

/// Periodically logs what every sensor has recorded.
fn lidar_telemetry_system(
    time: Res<Time>,
    mut timer: ResMut<LidarTelemetryTimer>,
    pool: Res<ElectricPool>,
    sensors: Query<(&Name, &LidarSensor)>,
) {
    if !timer.0.tick(time.delta()).just_finished() {
        return;
    }
    for (name, lidar) in &sensors {
        let sensor = &lidar.sensor;
        info!(
            "[LIDAR] '{}' {:?} power={} points={} cycles={} last={:?}",
            name,
            sensor.state(),
            sensor.has_power(),
            sensor.point_cloud().point_count(),
            lidar.cloud_cycles,
            lidar.last_outcome,
        );
    }
    info!(
        "[POWER] {:.2}/{:.2} EC ({:.0}%)",
        pool.charge,
        pool.capacity,
        pool.fraction() * 100.0
    );
}
