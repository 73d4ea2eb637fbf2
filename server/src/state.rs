use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use sampmap_shared::{Catalog, MapConfig};
use tokio::sync::RwLock;

/// Business catalog pre-serialized once per load and shared by every request via Arc.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub count: usize,
    pub skipped: usize,
    pub loaded_at: Option<DateTime<Utc>>,
    pub json: Arc<Bytes>,
    pub etag: String,
}

impl Default for CatalogSnapshot {
    fn default() -> Self {
        let json = Bytes::from_static(b"[]");
        let etag = catalog_etag(&json);
        Self {
            count: 0,
            skipped: 0,
            loaded_at: None,
            json: Arc::new(json),
            etag,
        }
    }
}

impl CatalogSnapshot {
    pub fn from_catalog(catalog: &Catalog) -> Result<Self, serde_json::Error> {
        let json = Bytes::from(serde_json::to_vec(&catalog.businesses)?);
        let etag = catalog_etag(&json);
        Ok(Self {
            count: catalog.businesses.len(),
            skipped: catalog.skipped.len(),
            loaded_at: Some(Utc::now()),
            json: Arc::new(json),
            etag,
        })
    }
}

fn catalog_etag(json: &[u8]) -> String {
    format!("\"businesses-{:08x}\"", crc32fast::hash(json))
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<RwLock<CatalogSnapshot>>,
    pub map_config: Arc<MapConfig>,
    pub map_config_json: Arc<Bytes>,
    pub businesses_path: Arc<PathBuf>,
    pub static_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(map_config: MapConfig, businesses_path: PathBuf, static_dir: PathBuf) -> Self {
        let map_config_json = serde_json::to_vec(&map_config)
            .map(Bytes::from)
            .unwrap_or_else(|_| Bytes::from_static(b"{}"));
        Self {
            catalog: Arc::new(RwLock::new(CatalogSnapshot::default())),
            map_config: Arc::new(map_config),
            map_config_json: Arc::new(map_config_json),
            businesses_path: Arc::new(businesses_path),
            static_dir: Arc::new(static_dir),
        }
    }
}
