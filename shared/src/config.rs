use serde::{Deserialize, Serialize};

use crate::coords::{DEFAULT_HALF_EXTENT, DEFAULT_MAP_SIZE, MapProjection, Orientation};

pub const DEFAULT_MIN_ZOOM: i32 = -2;
pub const DEFAULT_MAX_ZOOM: i32 = 2;
pub const DEFAULT_IMAGE_URL: &str = "assets/map.jpg";

/// Map description served to the viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub map_size: f64,
    pub half_extent: f64,
    pub orientation: Orientation,
    pub min_zoom: i32,
    pub max_zoom: i32,
    pub image_url: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            map_size: DEFAULT_MAP_SIZE,
            half_extent: DEFAULT_HALF_EXTENT,
            orientation: Orientation::Standard,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            image_url: DEFAULT_IMAGE_URL.to_string(),
        }
    }
}

impl MapConfig {
    pub fn projection(&self) -> MapProjection {
        MapProjection::new(self.map_size, self.half_extent).with_orientation(self.orientation)
    }

    pub fn clamp_zoom(&self, zoom: i32) -> i32 {
        zoom.clamp(self.min_zoom, self.max_zoom.max(self.min_zoom))
    }
}
