use serde::{Deserialize, Serialize};

use crate::coords::{DisplayPoint, GameCoordinate, MapProjection};

/// On-screen icon edge length in CSS pixels.
pub const ICON_SIZE: f64 = 28.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessKind {
    Gas,
    Cafe,
    Petshop,
    Ranch,
    Gold,
    Icecream,
    Hotdog,
    Canteen,
}

impl BusinessKind {
    pub const ALL: [Self; 8] = [
        Self::Gas,
        Self::Cafe,
        Self::Petshop,
        Self::Ranch,
        Self::Gold,
        Self::Icecream,
        Self::Hotdog,
        Self::Canteen,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Self::Gas => "gas",
            Self::Cafe => "cafe",
            Self::Petshop => "petshop",
            Self::Ranch => "ranch",
            Self::Gold => "gold",
            Self::Icecream => "icecream",
            Self::Hotdog => "hotdog",
            Self::Canteen => "canteen",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    pub fn icon_path(self) -> String {
        format!("assets/icons/{}.png", self.key())
    }
}

/// A business as served to the viewer: icon kind and game position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    #[serde(rename = "type")]
    pub kind: BusinessKind,
    pub x: f64,
    pub y: f64,
}

impl Business {
    pub fn coord(&self) -> GameCoordinate {
        GameCoordinate::new(self.x, self.y)
    }

    pub fn display_point(&self, projection: &MapProjection) -> DisplayPoint {
        projection.to_display(self.x, self.y)
    }
}

/// Catalog entry whose `type` has no known icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub name: String,
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub businesses: Vec<Business>,
    pub skipped: Vec<SkippedEntry>,
}

/// Catalog file entry. Fields other than these (such as `owner`) are ignored.
#[derive(Debug, Deserialize)]
struct RawBusiness {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    x: f64,
    y: f64,
}

/// Parse a business list. Entries with an unknown `type` are kept out of the
/// catalog and listed in `skipped` for the caller to report.
pub fn parse_catalog(json: &str) -> Result<Catalog, serde_json::Error> {
    let raw: Vec<RawBusiness> = serde_json::from_str(json)?;
    let mut catalog = Catalog::default();
    for entry in raw {
        match BusinessKind::from_key(&entry.kind) {
            Some(kind) => catalog.businesses.push(Business {
                kind,
                x: entry.x,
                y: entry.y,
            }),
            None => catalog.skipped.push(SkippedEntry {
                name: entry.name,
                kind: entry.kind,
            }),
        }
    }
    Ok(catalog)
}
