// lidar_core/src/error.rs

use thiserror::Error;

/// Everything that can go wrong inside the sensor core.
///
/// Resource shortfalls and rays that hit nothing are *not* errors; they are
/// ordinary state (see `PowerGate` and `HitRecord::miss`).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LidarError {
    /// The celestial body's `up` and `forward` directions are too far from
    /// perpendicular to build a body frame from them.
    #[error("body up/forward axes are not perpendicular enough (|dot| = {dot:.4}, limit {limit})")]
    BodyAxesNotPerpendicular { dot: f64, limit: f64 },

    /// A zero-length or non-finite direction was handed to the frame math.
    #[error("cannot normalize degenerate {0} vector")]
    DegenerateAxis(&'static str),

    /// A configuration value is outside of what the sensor can work with.
    #[error("invalid sensor configuration: {0}")]
    InvalidConfig(String),

    /// A transition was requested on a sensor whose part no longer exists.
    #[error("sensor has been destroyed")]
    SensorDestroyed,
}

pub type LidarResult<T> = Result<T, LidarError>;
