// lidar_sim/src/simulation/core/resources.rs

use bevy::prelude::Resource;
use lidar_core::config::ELECTRIC_CHARGE;
use lidar_core::layers::CollisionLayout;
use lidar_core::sensor::power::ResourcePool;
use lidar_core::types::SceneContext;

use crate::simulation::config::structs::PowerConfig;

/// The vessel's electric charge, shared by every powered sensor.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ElectricPool {
    pub capacity: f64,
    pub charge: f64,
    /// Charge restored per second.
    pub recharge_rate: f64,
}

impl ElectricPool {
    pub fn from_config(config: &PowerConfig) -> Self {
        let capacity = config.capacity.max(0.0);
        Self {
            capacity,
            charge: config.initial_charge.unwrap_or(capacity).clamp(0.0, capacity),
            recharge_rate: config.recharge_rate.max(0.0),
        }
    }

    pub fn recharge(&mut self, dt: f64) {
        self.charge = (self.charge + self.recharge_rate * dt).min(self.capacity);
    }

    pub fn fraction(&self) -> f64 {
        if self.capacity > 0.0 {
            self.charge / self.capacity
        } else {
            0.0
        }
    }
}

impl ResourcePool for ElectricPool {
    fn request_resource(&mut self, name: &str, amount: f64) -> f64 {
        if name != ELECTRIC_CHARGE || amount <= 0.0 {
            return 0.0;
        }
        let granted = amount.min(self.charge);
        self.charge -= granted;
        granted
    }
}

/// Layer assignment for this session. Inserted once from the scenario.
#[derive(Resource, Debug, Clone, Default)]
pub struct SessionLayout(pub CollisionLayout);

/// Editor and map-view flags the sensors consult.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SceneFlags(pub SceneContext);
