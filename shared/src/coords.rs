use serde::{Deserialize, Serialize};

pub const DEFAULT_MAP_SIZE: f64 = 6144.0;
pub const DEFAULT_HALF_EXTENT: f64 = 3000.0;

/// Reverse conversions keep 4 decimal places.
const COORD_SCALE: f64 = 10_000.0;

/// Native game-world position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameCoordinate {
    pub x: f64,
    pub y: f64,
}

impl GameCoordinate {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Position in the square display space, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayPoint {
    pub row: f64,
    pub col: f64,
}

impl DisplayPoint {
    pub const fn new(row: f64, col: f64) -> Self {
        Self { row, col }
    }

    pub fn midpoint(self, other: Self) -> Self {
        Self {
            row: (self.row + other.row) / 2.0,
            col: (self.col + other.col) / 2.0,
        }
    }

    /// Raw display-space distance. Only meaningful for hit testing; measurements
    /// go through [`MapProjection::distance`].
    pub fn display_distance(self, other: Self) -> f64 {
        let dr = self.row - other.row;
        let dc = self.col - other.col;
        (dr * dr + dc * dc).sqrt()
    }

    pub fn offset(self, d_row: f64, d_col: f64) -> Self {
        Self {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }
}

/// Which way game-space Y runs relative to display rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Rows grow with game Y.
    #[default]
    Standard,
    /// Rows grow as game Y shrinks (north-up maps).
    InvertedY,
}

/// Linear mapping between game space `[-h, h]²` and display space `[0, S]²`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapProjection {
    map_size: f64,
    half_extent: f64,
    orientation: Orientation,
}

impl Default for MapProjection {
    fn default() -> Self {
        Self::new(DEFAULT_MAP_SIZE, DEFAULT_HALF_EXTENT)
    }
}

impl MapProjection {
    pub const fn new(map_size: f64, half_extent: f64) -> Self {
        Self {
            map_size,
            half_extent,
            orientation: Orientation::Standard,
        }
    }

    pub const fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub const fn map_size(&self) -> f64 {
        self.map_size
    }

    pub const fn half_extent(&self) -> f64 {
        self.half_extent
    }

    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Game coordinate → display point. Out-of-range input is not clamped.
    pub fn to_display(&self, gx: f64, gy: f64) -> DisplayPoint {
        let extent = self.half_extent * 2.0;
        let gy = match self.orientation {
            Orientation::Standard => gy,
            Orientation::InvertedY => -gy,
        };
        DisplayPoint {
            row: (gy + self.half_extent) / extent * self.map_size,
            col: (gx + self.half_extent) / extent * self.map_size,
        }
    }

    /// Display point → game coordinate, rounded to 4 decimals.
    pub fn to_game(&self, row: f64, col: f64) -> GameCoordinate {
        let extent = self.half_extent * 2.0;
        let gx = col / self.map_size * extent - self.half_extent;
        let gy = row / self.map_size * extent - self.half_extent;
        let gy = match self.orientation {
            Orientation::Standard => gy,
            Orientation::InvertedY => -gy,
        };
        GameCoordinate {
            x: round_coord(gx),
            y: round_coord(gy),
        }
    }

    pub fn game_at(&self, point: DisplayPoint) -> GameCoordinate {
        self.to_game(point.row, point.col)
    }

    pub fn display_of(&self, coord: GameCoordinate) -> DisplayPoint {
        self.to_display(coord.x, coord.y)
    }

    /// Euclidean distance in game units between two display points.
    pub fn distance(&self, a: DisplayPoint, b: DisplayPoint) -> f64 {
        let p1 = self.game_at(a);
        let p2 = self.game_at(b);
        let dx = p2.x - p1.x;
        let dy = p2.y - p1.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn center(&self) -> DisplayPoint {
        DisplayPoint::new(self.map_size / 2.0, self.map_size / 2.0)
    }
}

/// Round to 4 decimals, folding `-0.0` into `0.0`.
pub fn round_coord(value: f64) -> f64 {
    (value * COORD_SCALE).round() / COORD_SCALE + 0.0
}
