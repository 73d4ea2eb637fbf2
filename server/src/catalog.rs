use std::fmt;
use std::path::{Path, PathBuf};

use sampmap_shared::{Catalog, parse_catalog};
use tracing::{info, warn};

use crate::state::{AppState, CatalogSnapshot};

#[derive(Debug)]
pub enum CatalogError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Encode(serde_json::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse {}: {source}", path.display())
            }
            Self::Encode(source) => write!(f, "failed to encode catalog: {source}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } | Self::Encode(source) => Some(source),
        }
    }
}

pub async fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    parse_catalog(&raw).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Re-read the catalog file and swap it in. The previous catalog stays live on error.
pub async fn reload(state: &AppState) -> Result<usize, CatalogError> {
    let catalog = load_catalog(&state.businesses_path).await?;
    for skipped in &catalog.skipped {
        warn!(
            name = %skipped.name,
            kind = %skipped.kind,
            "skipping business with unknown type"
        );
    }
    let snapshot = CatalogSnapshot::from_catalog(&catalog).map_err(CatalogError::Encode)?;
    let count = snapshot.count;
    *state.catalog.write().await = snapshot;
    info!(
        count,
        skipped = catalog.skipped.len(),
        path = %state.businesses_path.display(),
        "loaded business catalog"
    );
    Ok(count)
}
