// lidar_core/src/config.rs

use serde::Deserialize;

use crate::error::{LidarError, LidarResult};

/// Upper bound of the tick-skip slider.
pub const MAX_TICK_SKIP: f64 = 40.0;

/// Upper bound for either maximum bend angle, in degrees.
pub const MAX_BEND_LIMIT_DEG: f64 = 90.0;

/// Name of the resource the sensor draws from the host's resource pool.
pub const ELECTRIC_CHARGE: &str = "ElectricCharge";

// =========================================================================
// == Sensor Configuration ==
// =========================================================================

/// The externally editable parameters of one LiDAR sensor.
///
/// Every sensor owns its own copy; the core reads it as a snapshot each tick.
/// Values coming from the host should go through [`LidarConfig::clamped`]
/// before use (the `Sensor` does this for you).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LidarConfig {
    /// Number of physics steps between two sampling ticks. Only the integer
    /// part is used. Clamped to `0..=40`.
    #[serde(default = "default_tick_skip")]
    pub tick_skip: f64,

    /// Maximum raycast distance in meters.
    #[serde(default = "default_max_range")]
    pub max_range: f64,

    /// Limit for `bend_x`, in degrees. Zero on both axes disables the fan.
    #[serde(default = "default_max_bend")]
    pub max_bend_x: f64,
    /// Limit for `bend_y`, in degrees.
    #[serde(default = "default_max_bend")]
    pub max_bend_y: f64,

    /// Half-width of the beam fan, in degrees.
    #[serde(default)]
    pub bend_x: f64,
    /// Common pitch offset of the whole fan, in degrees.
    #[serde(default)]
    pub bend_y: f64,

    /// Whether the sensor starts activated.
    #[serde(default)]
    pub enabled: bool,
    /// Whether the beams are drawn.
    #[serde(default = "default_true")]
    pub visible: bool,

    /// Whether sampling consumes electric charge.
    #[serde(default = "default_true")]
    pub requires_power: bool,
    /// Electric charge drawn per second while active.
    #[serde(default = "default_power_drain")]
    pub power_drain: f64,
}

fn default_tick_skip() -> f64 {
    5.0
}

fn default_max_range() -> f64 {
    2000.0
}

fn default_max_bend() -> f64 {
    45.0
}

fn default_power_drain() -> f64 {
    0.5
}

fn default_true() -> bool {
    true
}

impl Default for LidarConfig {
    fn default() -> Self {
        Self {
            tick_skip: default_tick_skip(),
            max_range: default_max_range(),
            max_bend_x: default_max_bend(),
            max_bend_y: default_max_bend(),
            bend_x: 0.0,
            bend_y: 0.0,
            enabled: false,
            visible: true,
            requires_power: true,
            power_drain: default_power_drain(),
        }
    }
}

impl LidarConfig {
    /// Rejects values that cannot be clamped into something meaningful.
    pub fn validate(&self) -> LidarResult<()> {
        if !self.max_range.is_finite() || self.max_range <= 0.0 {
            return Err(LidarError::InvalidConfig(format!(
                "max_range must be a positive number of meters, got {}",
                self.max_range
            )));
        }
        for (name, value) in [
            ("max_bend_x", self.max_bend_x),
            ("max_bend_y", self.max_bend_y),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(LidarError::InvalidConfig(format!(
                    "{name} must be a non-negative angle, got {value}"
                )));
            }
        }
        for (name, value) in [
            ("tick_skip", self.tick_skip),
            ("bend_x", self.bend_x),
            ("bend_y", self.bend_y),
        ] {
            if !value.is_finite() {
                return Err(LidarError::InvalidConfig(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        if !self.power_drain.is_finite() || self.power_drain < 0.0 {
            return Err(LidarError::InvalidConfig(format!(
                "power_drain must be non-negative, got {}",
                self.power_drain
            )));
        }
        Ok(())
    }

    /// Returns a copy with every bounded field pulled into its range.
    ///
    /// The bend limits are clamped first so the current bends are bounded by
    /// the final limits.
    pub fn clamped(&self) -> Self {
        let mut out = self.clone();
        out.tick_skip = self.tick_skip.clamp(0.0, MAX_TICK_SKIP);
        out.max_bend_x = self.max_bend_x.clamp(0.0, MAX_BEND_LIMIT_DEG);
        out.max_bend_y = self.max_bend_y.clamp(0.0, MAX_BEND_LIMIT_DEG);
        out.bend_x = self.bend_x.clamp(-out.max_bend_x, out.max_bend_x);
        out.bend_y = self.bend_y.clamp(-out.max_bend_y, out.max_bend_y);

        if out != *self {
            log::warn!(
                "LiDAR config clamped: tick_skip {} -> {}, bend ({}, {}) -> ({}, {})",
                self.tick_skip,
                out.tick_skip,
                self.bend_x,
                self.bend_y,
                out.bend_x,
                out.bend_y
            );
        }
        out
    }
}
