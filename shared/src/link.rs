use std::fmt::Write as _;

use crate::coords::{DisplayPoint, GameCoordinate, MapProjection, round_coord};

pub const PARAM_X: &str = "x";
pub const PARAM_Y: &str = "y";
pub const PARAM_ZOOM: &str = "z";

/// A shareable position: game coordinates plus the zoom level it was viewed at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShareLink {
    pub coord: GameCoordinate,
    pub zoom: i32,
}

impl ShareLink {
    pub fn new(coord: GameCoordinate, zoom: i32) -> Self {
        Self {
            coord: GameCoordinate::new(round_coord(coord.x), round_coord(coord.y)),
            zoom,
        }
    }

    pub fn at(projection: &MapProjection, point: DisplayPoint, zoom: i32) -> Self {
        Self::new(projection.game_at(point), zoom)
    }

    /// Read `x`, `y` and `z` from decoded query pairs. The first occurrence of
    /// each key wins. Returns `None` unless both `x` and `y` are finite numbers;
    /// a missing or malformed `z` falls back to `0`.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Option<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut x: Option<Option<f64>> = None;
        let mut y: Option<Option<f64>> = None;
        let mut z: Option<Option<i32>> = None;
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                PARAM_X if x.is_none() => x = Some(parse_coord(value)),
                PARAM_Y if y.is_none() => y = Some(parse_coord(value)),
                PARAM_ZOOM if z.is_none() => z = Some(parse_zoom(value)),
                _ => {}
            }
        }
        let (Some(Some(x)), Some(Some(y))) = (x, y) else {
            return None;
        };
        Some(Self::new(
            GameCoordinate::new(x, y),
            z.flatten().unwrap_or(0),
        ))
    }

    /// Parse a raw, possibly percent-encoded query string such as `?x=12.5&y=-40&z=1`.
    pub fn from_query(query: &str) -> Option<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_query_pairs(form_urlencoded::parse(query.as_bytes()))
    }

    pub fn query_pairs(&self) -> [(&'static str, String); 3] {
        [
            (PARAM_X, format_coord(self.coord.x)),
            (PARAM_Y, format_coord(self.coord.y)),
            (PARAM_ZOOM, self.zoom.to_string()),
        ]
    }

    pub fn to_query(&self) -> String {
        let mut out = String::with_capacity(32);
        for (i, (key, value)) in self.query_pairs().iter().enumerate() {
            if i > 0 {
                out.push('&');
            }
            let _ = write!(out, "{key}={value}");
        }
        out
    }

    pub fn display_point(&self, projection: &MapProjection) -> DisplayPoint {
        projection.display_of(self.coord)
    }
}

/// Format a coordinate with at most 4 decimals and no trailing zeros
/// (`12.5`, `-3000`, `0.0001`).
pub fn format_coord(value: f64) -> String {
    let mut out = format!("{:.4}", round_coord(value));
    if out.contains('.') {
        let trimmed = out.trim_end_matches('0').trim_end_matches('.').len();
        out.truncate(trimmed);
    }
    if out == "-0" {
        out = "0".to_string();
    }
    out
}

fn parse_coord(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_zoom(raw: &str) -> Option<i32> {
    let value = raw.trim();
    if let Ok(zoom) = value.parse::<i32>() {
        return Some(zoom);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_coord_trims_like_a_plain_number() {
        assert_eq!(format_coord(12.5), "12.5");
        assert_eq!(format_coord(-3000.0), "-3000");
        assert_eq!(format_coord(0.0), "0");
        assert_eq!(format_coord(-0.00001), "0");
        assert_eq!(format_coord(1234.56789), "1234.5679");
        assert_eq!(format_coord(-2999.0234375), "-2999.0234");
    }

    #[test]
    fn query_string_contains_all_params() {
        let link = ShareLink::new(GameCoordinate::new(-1520.25, 88.0), 1);
        assert_eq!(link.to_query(), "x=-1520.25&y=88&z=1");
    }

    #[test]
    fn parses_query_with_and_without_prefix() {
        let expected = Some(ShareLink::new(GameCoordinate::new(12.5, -40.0), 2));
        assert_eq!(ShareLink::from_query("?x=12.5&y=-40&z=2"), expected);
        assert_eq!(ShareLink::from_query("z=2&y=-40&x=12.5"), expected);
    }

    #[test]
    fn zoom_defaults_to_zero_when_missing_or_malformed() {
        let missing = ShareLink::from_query("x=1&y=2").expect("link");
        assert_eq!(missing.zoom, 0);
        let malformed = ShareLink::from_query("x=1&y=2&z=far").expect("link");
        assert_eq!(malformed.zoom, 0);
        let fractional = ShareLink::from_query("x=1&y=2&z=1.6").expect("link");
        assert_eq!(fractional.zoom, 2);
    }

    #[test]
    fn malformed_coordinates_are_treated_as_absent() {
        assert_eq!(ShareLink::from_query(""), None);
        assert_eq!(ShareLink::from_query("x=1"), None);
        assert_eq!(ShareLink::from_query("x=abc&y=2"), None);
        assert_eq!(ShareLink::from_query("x=1&y="), None);
        assert_eq!(ShareLink::from_query("x=NaN&y=2"), None);
        assert_eq!(ShareLink::from_query("x=inf&y=2"), None);
    }

    #[test]
    fn first_occurrence_of_a_key_wins() {
        let link = ShareLink::from_query("x=1&x=5&y=2").expect("link");
        assert_eq!(link.coord, GameCoordinate::new(1.0, 2.0));
    }

    #[test]
    fn percent_encoded_values_are_decoded() {
        let link = ShareLink::from_query("?x=1%2E5&y=%2D40&z=%31").expect("link");
        assert_eq!(link, ShareLink::new(GameCoordinate::new(1.5, -40.0), 1));
        let spaced = ShareLink::from_query("x=+12.5&%79=2").expect("link");
        assert_eq!(spaced.coord, GameCoordinate::new(12.5, 2.0));
    }

    #[test]
    fn unrelated_params_are_ignored() {
        let link = ShareLink::from_query("lang=ru&x=10&debug&y=20").expect("link");
        assert_eq!(link.coord, GameCoordinate::new(10.0, 20.0));
    }

    #[test]
    fn restored_link_lands_on_the_encoded_display_point() {
        let proj = MapProjection::default();
        let point = DisplayPoint::new(1000.0, 2000.0);
        let link = ShareLink::at(&proj, point, 0);
        let restored = ShareLink::from_query(&link.to_query()).expect("link");
        let back = restored.display_point(&proj);
        assert!((back.row - point.row).abs() < 1e-3);
        assert!((back.col - point.col).abs() < 1e-3);
    }
}
