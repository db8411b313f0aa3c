// lidar_core/src/sensor/power.rs

use crate::config::ELECTRIC_CHARGE;

/// The host's resource pool (batteries, fuel tanks, ...).
pub trait ResourcePool {
    /// Asks for `amount` units of `name` and returns how much was actually
    /// handed out, which may be anything from zero to `amount`.
    fn request_resource(&mut self, name: &str, amount: f64) -> f64;
}

/// Everything the power gate needs to know about one physics step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerRequest {
    pub in_editor: bool,
    pub activated: bool,
    pub requires_electric: bool,
    pub drain_per_second: f64,
    pub elapsed_seconds: f64,
}

/// Tracks whether the sensor had enough charge on its last draw.
///
/// A draw counts as powered as long as at least half of the requested charge
/// was granted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerGate {
    powered: bool,
}

impl Default for PowerGate {
    fn default() -> Self {
        Self { powered: true }
    }
}

impl PowerGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Forces the gate back to powered, e.g. when the sensor stops needing
    /// electricity.
    pub fn restore(&mut self) {
        self.powered = true;
    }

    /// Draws this step's charge and returns the resulting power state.
    ///
    /// In the editor the gate always reports power and draws nothing. A sensor
    /// that is inactive or does not need electricity draws nothing and keeps
    /// its previous state.
    pub fn evaluate(&mut self, request: &PowerRequest, pool: &mut dyn ResourcePool) -> bool {
        if request.in_editor {
            self.powered = true;
            return true;
        }
        if !request.activated || !request.requires_electric {
            return self.powered;
        }

        let requested = request.drain_per_second * request.elapsed_seconds;
        let granted = pool.request_resource(ELECTRIC_CHARGE, requested);
        let powered = granted >= requested * 0.5;

        if powered != self.powered {
            log::debug!(
                "LiDAR power {} (granted {granted:.4} of {requested:.4} {ELECTRIC_CHARGE})",
                if powered { "restored" } else { "lost" }
            );
        }
        self.powered = powered;
        powered
    }
}
