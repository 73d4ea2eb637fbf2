pub mod business;
pub mod config;
pub mod coords;
pub mod link;
pub mod marker;
pub mod ruler;
pub mod session;

pub use business::{Business, BusinessKind, Catalog, parse_catalog};
pub use config::MapConfig;
pub use coords::{DisplayPoint, GameCoordinate, MapProjection, Orientation};
pub use link::ShareLink;
pub use marker::{CopyState, MarkerPopup, PointMarker};
pub use ruler::{Endpoint, LineStyle, RulerOverlay, RulerState, RulerTool};
pub use session::{ClickOutcome, ClickTarget, DragKind, MapSession};
