use bevy::prelude::Component;

/// A marker component that draws the recorded point cloud of the LiDAR
/// sensor it's attached to.
///
/// Toggled on all sensors with F1.
#[derive(Component)]
pub struct ShowPointCloud;
