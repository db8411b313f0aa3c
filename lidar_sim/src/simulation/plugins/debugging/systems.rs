use bevy::prelude::*;

use super::components::ShowPointCloud;
use crate::prelude::*;
use crate::simulation::core::components::{Carrier, CelestialBody};
use crate::simulation::core::events::LidarLifecycleEvent;
use crate::simulation::core::resources::SceneFlags;
use crate::simulation::core::transforms::{
    body_pose_from_transform, point_to_bevy_vec, vector_to_bevy_vec,
};
use crate::simulation::plugins::sensors::lidar::LidarSensor;

const HIT_COLOR: Color = Color::srgb(0.1, 0.9, 0.3);
const MISS_COLOR: Color = Color::srgba(0.9, 0.2, 0.1, 0.6);
const CLOUD_COLOR: Color = Color::srgb(0.2, 0.6, 1.0);
const ORIGIN_COLOR: Color = Color::srgb(1.0, 0.9, 0.2);

// =========================================================================
// == Toggle Systems (Hotkeys) ==
// =========================================================================

/// Toggles `ShowPointCloud` on all LiDAR sensors with the F1 key.
pub fn toggle_point_cloud_overlay(
    mut commands: Commands,
    keyboard: Res<ButtonInput<KeyCode>>,
    query: Query<(Entity, Option<&ShowPointCloud>), With<LidarSensor>>,
) {
    if !keyboard.just_pressed(KeyCode::F1) {
        return;
    }
    let are_any_on = query.iter().any(|(_, shown)| shown.is_some());
    for (entity, shown) in &query {
        if are_any_on {
            if shown.is_some() {
                commands.entity(entity).remove::<ShowPointCloud>();
            }
        } else if shown.is_none() {
            commands.entity(entity).insert(ShowPointCloud);
        }
    }
    info!(
        "[Debug] Toggled point cloud overlay {}",
        if are_any_on { "OFF" } else { "ON" }
    );
}

/// F2-F4 and F6: the sensor's UI actions, sent as lifecycle events.
pub fn sensor_action_hotkeys(
    keyboard: Res<ButtonInput<KeyCode>>,
    sensors: Query<(Entity, &LidarSensor)>,
    carriers: Query<Entity, With<Carrier>>,
    mut events: EventWriter<LidarLifecycleEvent>,
) {
    if keyboard.just_pressed(KeyCode::F2) {
        // Same toggle as the part's context menu: each sensor flips on its own.
        for (entity, lidar) in &sensors {
            let event = if lidar.sensor.is_active() {
                SensorEvent::Deactivate
            } else {
                SensorEvent::Activate
            };
            events.write(LidarLifecycleEvent::to(entity, event));
        }
        info!("[Debug] Toggled LiDAR activation");
    }
    if keyboard.just_pressed(KeyCode::F3) {
        events.write(LidarLifecycleEvent::all(SensorEvent::ToggleVisible));
        info!("[Debug] Toggled LiDAR beam visibility");
    }
    if keyboard.just_pressed(KeyCode::F4) {
        events.write(LidarLifecycleEvent::all(SensorEvent::ClearPointCloud));
        info!("[Debug] Cleared LiDAR point clouds");
    }
    if keyboard.just_pressed(KeyCode::F6) {
        for carrier in &carriers {
            events.write(LidarLifecycleEvent::to(carrier, SensorEvent::PartDestroyed));
        }
        warn!("[Debug] Destroying the carrier's sensors");
    }
}

/// F5 flips the map view flag; beams are hidden while it is on.
pub fn toggle_map_view(keyboard: Res<ButtonInput<KeyCode>>, mut scene: ResMut<SceneFlags>) {
    if keyboard.just_pressed(KeyCode::F5) {
        scene.0.map_view = !scene.0.map_view;
        info!(
            "[Debug] Map view {}",
            if scene.0.map_view { "ON" } else { "OFF" }
        );
    }
}

// =========================================================================
// == Drawing Systems ==
// =========================================================================

/// Draws each visible beam: to the impact when it hit, to max range when not.
pub fn draw_lidar_beams(
    mut gizmos: Gizmos,
    scene: Res<SceneFlags>,
    sensors: Query<(&LidarSensor, &GlobalTransform)>,
) {
    for (lidar, transform) in &sensors {
        let Some(beams) = lidar.sensor.visible_beams(&scene.0) else {
            continue;
        };
        let origin = transform.translation();
        let max_range = lidar.sensor.config().max_range;
        for beam in beams {
            let length = beam.visual_length(max_range) as f32;
            let end = origin + vector_to_bevy_vec(&beam.pointing) * length;
            let color = if beam.hit.is_hit() { HIT_COLOR } else { MISS_COLOR };
            gizmos.line(origin, end, color);
        }
    }
}

/// Draws the recorded body-frame points back in world space.
pub fn draw_point_clouds(
    mut gizmos: Gizmos,
    bodies: Query<&GlobalTransform, With<CelestialBody>>,
    sensors: Query<&LidarSensor, With<ShowPointCloud>>,
) {
    let Some(body) = bodies.iter().next().map(body_pose_from_transform) else {
        return;
    };
    let Ok(frame) = BodyFrame::from_pose(&body) else {
        return;
    };

    for lidar in &sensors {
        for (i, point) in lidar.sensor.point_cloud().points().enumerate() {
            let world = point_to_bevy_vec(&frame.to_world(&point));
            // Every cycle opens with the sensor's own position.
            let (size, color) = if i == 0 {
                (0.4, ORIGIN_COLOR)
            } else {
                (0.15, CLOUD_COLOR)
            };
            draw_marker(&mut gizmos, world, size, color);
        }
    }
}

fn draw_marker(gizmos: &mut Gizmos, at: Vec3, size: f32, color: Color) {
    gizmos.line(at - Vec3::X * size, at + Vec3::X * size, color);
    gizmos.line(at - Vec3::Y * size, at + Vec3::Y * size, color);
    gizmos.line(at - Vec3::Z * size, at + Vec3::Z * size, color);
}
