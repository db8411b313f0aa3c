// lidar_sim/src/simulation/plugins/sensors/raycasting.rs

use avian3d::prelude::{LayerMask as PhysicsLayerMask, SpatialQuery, SpatialQueryFilter};
use bevy::prelude::*;
use nalgebra::{Point3, Vector3};

use lidar_core::layers::LayerMask;
use lidar_core::models::perception::{RayCandidate, RaycastProvider};

use crate::simulation::core::transforms::{bevy_vec_to_point, point_to_bevy_vec, vector_to_bevy_vec};

/// Upper bound on the hits collected along one beam. The sensor only keeps
/// the nearest, but Avian does not return hits sorted.
pub const MAX_HITS_PER_BEAM: u32 = 16;

/// Answers the core's raycast queries with Avian's spatial query pipeline.
///
/// Built fresh each frame around the system's `SpatialQuery`; `excluded`
/// holds the sensor's own vessel so beams never hit the part they leave from.
pub struct AvianRaycaster<'a, 'w, 's> {
    spatial_query: &'a SpatialQuery<'w, 's>,
    excluded: Vec<Entity>,
}

impl<'a, 'w, 's> AvianRaycaster<'a, 'w, 's> {
    pub fn new(spatial_query: &'a SpatialQuery<'w, 's>) -> Self {
        Self {
            spatial_query,
            excluded: Vec::new(),
        }
    }

    pub fn excluding(mut self, entities: impl IntoIterator<Item = Entity>) -> Self {
        self.excluded.extend(entities);
        self
    }
}

impl RaycastProvider for AvianRaycaster<'_, '_, '_> {
    fn raycast(
        &self,
        origin: &Point3<f64>,
        direction: &Vector3<f64>,
        max_distance: f64,
        mask: LayerMask,
    ) -> Vec<RayCandidate> {
        let Ok(dir) = Dir3::new(vector_to_bevy_vec(direction)) else {
            return Vec::new();
        };
        if mask.is_empty() || max_distance <= 0.0 {
            return Vec::new();
        }

        let origin = point_to_bevy_vec(origin);
        let filter = SpatialQueryFilter::from_mask(PhysicsLayerMask(mask.0))
            .with_excluded_entities(self.excluded.iter().copied());

        self.spatial_query
            .ray_hits(
                origin,
                dir,
                max_distance as f32,
                MAX_HITS_PER_BEAM,
                true,
                &filter,
            )
            .into_iter()
            .map(|hit| RayCandidate {
                distance: hit.distance as f64,
                point: bevy_vec_to_point(&(origin + *dir * hit.distance)),
            })
            .collect()
    }
}
