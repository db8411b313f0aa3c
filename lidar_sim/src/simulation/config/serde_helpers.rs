// lidar_sim/src/simulation/config/serde_helpers.rs

//! `#[serde(with = ...)]` adapters for the compact array forms used in
//! scenario files.

pub mod vec3_f64_from_f32_array {
    use nalgebra::Vector3;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vector3<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let arr: [f32; 3] = Deserialize::deserialize(deserializer)?;
        Ok(Vector3::new(arr[0] as f64, arr[1] as f64, arr[2] as f64))
    }
}

pub mod quat_f64_from_euler_deg_f32 {
    use nalgebra::UnitQuaternion;
    use serde::{Deserialize, Deserializer};

    /// Reads `[roll, pitch, yaw]` in degrees about the X, Y and Z axes.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<UnitQuaternion<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let arr: [f32; 3] = Deserialize::deserialize(deserializer)?;
        Ok(UnitQuaternion::from_euler_angles(
            (arr[0] as f64).to_radians(),
            (arr[1] as f64).to_radians(),
            (arr[2] as f64).to_radians(),
        ))
    }
}
