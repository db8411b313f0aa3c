// lidar_sim/src/simulation/core/events.rs

use bevy::prelude::{Entity, Event};
use lidar_core::sensor::SensorEvent;

/// A lifecycle change for LiDAR sensors.
///
/// `target` names either a sensor entity or the part the sensors are mounted
/// on; `None` addresses every sensor in the scene.
#[derive(Event, Debug, Clone, Copy)]
pub struct LidarLifecycleEvent {
    pub target: Option<Entity>,
    pub event: SensorEvent,
}

impl LidarLifecycleEvent {
    pub fn all(event: SensorEvent) -> Self {
        Self {
            target: None,
            event,
        }
    }

    pub fn to(target: Entity, event: SensorEvent) -> Self {
        Self {
            target: Some(target),
            event,
        }
    }
}
