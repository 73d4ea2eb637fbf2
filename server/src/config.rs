use std::path::PathBuf;
use std::time::Duration;

use sampmap_shared::{MapConfig, Orientation};

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_STATIC_DIR: &str = "client/dist";
pub const DEFAULT_BUSINESSES_PATH: &str = "data/businesses.json";
pub const DEFAULT_CATALOG_REFRESH_SECS: u64 = 300; // 5 minutes

pub fn server_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

pub fn static_dir() -> PathBuf {
    non_empty_var("STATIC_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR))
}

pub fn businesses_path() -> PathBuf {
    non_empty_var("BUSINESSES_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BUSINESSES_PATH))
}

pub fn catalog_refresh_interval() -> Duration {
    std::env::var("CATALOG_REFRESH_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_CATALOG_REFRESH_SECS))
}

/// Map geometry, overridable per deployment so other source images can be served.
pub fn map_config() -> MapConfig {
    let defaults = MapConfig::default();
    let orientation = if map_invert_y() {
        Orientation::InvertedY
    } else {
        Orientation::Standard
    };
    MapConfig {
        map_size: positive_f64_var("MAP_SIZE").unwrap_or(defaults.map_size),
        half_extent: positive_f64_var("MAP_HALF_EXTENT").unwrap_or(defaults.half_extent),
        orientation,
        image_url: non_empty_var("MAP_IMAGE_URL").unwrap_or(defaults.image_url),
        ..defaults
    }
}

fn map_invert_y() -> bool {
    std::env::var("MAP_INVERT_Y")
        .map(|value| {
            let normalized = value.trim().to_ascii_lowercase();
            matches!(normalized.as_str(), "1" | "true" | "yes" | "on")
        })
        .unwrap_or(false)
}

fn positive_f64_var(name: &str) -> Option<f64> {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value > 0.0)
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
