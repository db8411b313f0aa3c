// lidar_core/src/layers.rs

use serde::Deserialize;

/// A bitmask of collision layers, one bit per layer index (0..32).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    /// Builds a mask from layer indices. Indices of 32 and above are ignored.
    pub fn from_layers(layers: &[u8]) -> Self {
        let bits = layers
            .iter()
            .filter(|&&l| l < 32)
            .fold(0u32, |acc, &l| acc | (1 << l));
        LayerMask(bits)
    }

    pub fn contains(&self, layer: u8) -> bool {
        layer < 32 && self.0 & (1 << layer) != 0
    }

    pub fn union(self, other: LayerMask) -> LayerMask {
        LayerMask(self.0 | other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// The collision-layer layout of the session.
///
/// Loaded once at start-up and handed by reference to every sensor tick, so
/// that two sessions (or two tests) never share mutable layer state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollisionLayout {
    /// Layer of the planetary terrain colliders.
    #[serde(default = "default_terrain_layer")]
    pub terrain: u8,
    /// Layer of static scenery (buildings, rocks, launch pads).
    #[serde(default = "default_scenery_layer")]
    pub scenery: u8,
    /// Layer of vessel parts.
    #[serde(default)]
    pub parts: u8,
    /// Whether beams should also report hits on other vessels' parts.
    #[serde(default)]
    pub sense_parts: bool,
}

fn default_terrain_layer() -> u8 {
    15
}

fn default_scenery_layer() -> u8 {
    28
}

impl Default for CollisionLayout {
    fn default() -> Self {
        Self {
            terrain: default_terrain_layer(),
            scenery: default_scenery_layer(),
            parts: 0,
            sense_parts: false,
        }
    }
}

impl CollisionLayout {
    /// The mask every beam's raycast is restricted to.
    pub fn sensor_mask(&self) -> LayerMask {
        let mut mask = LayerMask::from_layers(&[self.terrain, self.scenery]);
        if self.sense_parts {
            mask = mask.union(LayerMask::from_layers(&[self.parts]));
        }
        mask
    }
}
