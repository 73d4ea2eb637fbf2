use sampmap_shared::config::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};
use sampmap_shared::coords::DEFAULT_MAP_SIZE;
use sampmap_shared::{DisplayPoint, MapConfig};

/// Viewport manages the pan/zoom transformation from display coordinates to screen pixels.
/// Screen x follows the display column, screen y the display row.
///
/// Panning is confined to the map plus `PAN_PADDING` map sizes on every side;
/// the limit applies once the canvas size is known.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
    min_zoom: i32,
    max_zoom: i32,
    map_size: f64,
    canvas_w: f64,
    canvas_h: f64,
}

const ZOOM_SENSITIVITY: f64 = 0.002;

/// Empty space allowed around the map while panning, in map sizes.
pub const PAN_PADDING: f64 = 1.5;

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            map_size: DEFAULT_MAP_SIZE,
            canvas_w: 0.0,
            canvas_h: 0.0,
        }
    }
}

impl Viewport {
    pub fn for_config(config: &MapConfig) -> Self {
        Self {
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom.max(config.min_zoom),
            map_size: config.map_size,
            ..Self::default()
        }
    }

    /// Record the canvas size and pull the view back inside the pan bounds.
    /// Returns whether anything changed.
    pub fn set_canvas_size(&mut self, canvas_w: f64, canvas_h: f64) -> bool {
        let before = (self.offset_x, self.offset_y, self.canvas_w, self.canvas_h);
        self.canvas_w = canvas_w;
        self.canvas_h = canvas_h;
        self.clamp_to_bounds();
        before != (self.offset_x, self.offset_y, self.canvas_w, self.canvas_h)
    }

    /// Display-space extent the view may show: `[-p·S, (1+p)·S]` on both axes.
    pub fn pan_bounds(&self) -> (f64, f64) {
        let pad = self.map_size * PAN_PADDING;
        (-pad, self.map_size + pad)
    }

    fn clamp_to_bounds(&mut self) {
        if self.canvas_w <= 0.0 || self.canvas_h <= 0.0 || self.map_size <= 0.0 {
            return;
        }
        let (lo, hi) = self.pan_bounds();
        self.offset_x = clamp_axis(self.offset_x, self.scale, self.canvas_w, lo, hi);
        self.offset_y = clamp_axis(self.offset_y, self.scale, self.canvas_h, lo, hi);
    }

    fn min_scale(&self) -> f64 {
        2f64.powi(self.min_zoom)
    }

    fn max_scale(&self) -> f64 {
        2f64.powi(self.max_zoom)
    }

    pub fn display_to_screen(&self, p: DisplayPoint) -> (f64, f64) {
        (
            p.col * self.scale + self.offset_x,
            p.row * self.scale + self.offset_y,
        )
    }

    pub fn screen_to_display(&self, sx: f64, sy: f64) -> DisplayPoint {
        DisplayPoint::new(
            (sy - self.offset_y) / self.scale,
            (sx - self.offset_x) / self.scale,
        )
    }

    /// Integer zoom level carried by share links: `log2(scale)`, rounded.
    pub fn zoom_level(&self) -> i32 {
        (self.scale.log2().round() as i32).clamp(self.min_zoom, self.max_zoom)
    }

    /// Zoom toward a focus point (screen coordinates).
    pub fn zoom_at(&mut self, delta: f64, screen_x: f64, screen_y: f64) {
        let factor = (-delta * ZOOM_SENSITIVITY).exp();
        self.rescale_at(self.scale * factor, screen_x, screen_y);
    }

    /// Step one whole zoom level in or out around a focus point.
    pub fn step_zoom(&mut self, steps: i32, screen_x: f64, screen_y: f64) {
        let level = (self.zoom_level() + steps).clamp(self.min_zoom, self.max_zoom);
        self.rescale_at(2f64.powi(level), screen_x, screen_y);
    }

    fn rescale_at(&mut self, scale: f64, screen_x: f64, screen_y: f64) {
        let new_scale = scale.clamp(self.min_scale(), self.max_scale());
        let ratio = new_scale / self.scale;

        // Keep the point under the cursor fixed
        self.offset_x = screen_x - (screen_x - self.offset_x) * ratio;
        self.offset_y = screen_y - (screen_y - self.offset_y) * ratio;
        self.scale = new_scale;
        self.clamp_to_bounds();
    }

    /// Pan by screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
        self.clamp_to_bounds();
    }

    /// Put `p` in the middle of the canvas at the given zoom level.
    pub fn center_on(&mut self, p: DisplayPoint, zoom: i32, canvas_w: f64, canvas_h: f64) {
        self.scale = 2f64.powi(zoom.clamp(self.min_zoom, self.max_zoom));
        self.recenter(p, canvas_w, canvas_h);
    }

    /// Keep the current scale and move `p` to the middle of the canvas.
    pub fn recenter(&mut self, p: DisplayPoint, canvas_w: f64, canvas_h: f64) {
        self.canvas_w = canvas_w;
        self.canvas_h = canvas_h;
        self.offset_x = canvas_w / 2.0 - p.col * self.scale;
        self.offset_y = canvas_h / 2.0 - p.row * self.scale;
        self.clamp_to_bounds();
    }

    /// Fit the whole square map image into the canvas.
    pub fn fit_map(&mut self, map_size: f64, canvas_w: f64, canvas_h: f64) {
        if map_size <= 0.0 || canvas_w <= 0.0 || canvas_h <= 0.0 {
            return;
        }

        let scale = (canvas_w / map_size).min(canvas_h / map_size);
        self.scale = scale.clamp(self.min_scale(), self.max_scale());

        let half = map_size / 2.0;
        self.map_size = map_size;
        self.recenter(DisplayPoint::new(half, half), canvas_w, canvas_h);
    }
}

/// Offset along one axis that keeps the visible span inside `[lo, hi]`, or
/// centres the range when the span is wider than it.
fn clamp_axis(offset: f64, scale: f64, canvas: f64, lo: f64, hi: f64) -> f64 {
    let span = canvas / scale;
    if span >= hi - lo {
        return canvas / 2.0 - (lo + hi) / 2.0 * scale;
    }
    let start = (-offset / scale).clamp(lo, hi - span);
    -start * scale
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn screen_and_display_round_trip() {
        let vp = Viewport {
            offset_x: 120.0,
            offset_y: -40.0,
            scale: 0.5,
            ..Viewport::default()
        };
        let p = DisplayPoint::new(1500.0, 2200.0);
        let (sx, sy) = vp.display_to_screen(p);
        assert_close(sx, 2200.0 * 0.5 + 120.0);
        assert_close(sy, 1500.0 * 0.5 - 40.0);
        let back = vp.screen_to_display(sx, sy);
        assert_close(back.row, p.row);
        assert_close(back.col, p.col);
    }

    #[test]
    fn zoom_at_keeps_focus_point_fixed() {
        let mut vp = Viewport::default();
        let before = vp.screen_to_display(300.0, 200.0);
        vp.zoom_at(-200.0, 300.0, 200.0);
        assert!(vp.scale > 1.0);
        let after = vp.screen_to_display(300.0, 200.0);
        assert_close(after.row, before.row);
        assert_close(after.col, before.col);
    }

    #[test]
    fn scale_is_clamped_to_configured_zoom_range() {
        let mut vp = Viewport::default();
        vp.zoom_at(1e6, 0.0, 0.0);
        assert_close(vp.scale, 0.25);
        assert_eq!(vp.zoom_level(), -2);
        vp.zoom_at(-1e6, 0.0, 0.0);
        assert_close(vp.scale, 4.0);
        assert_eq!(vp.zoom_level(), 2);
    }

    #[test]
    fn zoom_level_rounds_log_scale() {
        let mut vp = Viewport::default();
        vp.scale = 0.7;
        assert_eq!(vp.zoom_level(), -1);
        vp.scale = 1.3;
        assert_eq!(vp.zoom_level(), 0);
    }

    #[test]
    fn step_zoom_moves_whole_levels() {
        let mut vp = Viewport::default();
        vp.step_zoom(1, 400.0, 300.0);
        assert_close(vp.scale, 2.0);
        vp.step_zoom(5, 400.0, 300.0);
        assert_close(vp.scale, 4.0);
        vp.step_zoom(-3, 400.0, 300.0);
        assert_close(vp.scale, 0.5);
    }

    #[test]
    fn center_on_places_point_mid_canvas() {
        let mut vp = Viewport::default();
        let p = DisplayPoint::new(1000.0, 2000.0);
        vp.center_on(p, 1, 800.0, 600.0);
        assert_close(vp.scale, 2.0);
        let (sx, sy) = vp.display_to_screen(p);
        assert_close(sx, 400.0);
        assert_close(sy, 300.0);
    }

    #[test]
    fn fit_map_shows_whole_image() {
        let mut vp = Viewport::default();
        vp.fit_map(6144.0, 3072.0, 2048.0);
        assert_close(vp.scale, 2048.0 / 6144.0);
        let (sx, sy) = vp.display_to_screen(DisplayPoint::new(3072.0, 3072.0));
        assert_close(sx, 1536.0);
        assert_close(sy, 1024.0);
    }

    #[test]
    fn panning_stops_at_padded_world_bounds() {
        let mut vp = Viewport::default();
        assert!(vp.set_canvas_size(800.0, 600.0));
        assert_eq!(vp.pan_bounds(), (-9216.0, 15360.0));

        vp.pan(1e6, 1e6);
        let top_left = vp.screen_to_display(0.0, 0.0);
        assert_close(top_left.col, -9216.0);
        assert_close(top_left.row, -9216.0);

        vp.pan(-1e9, -1e9);
        let bottom_right = vp.screen_to_display(800.0, 600.0);
        assert_close(bottom_right.col, 15360.0);
        assert_close(bottom_right.row, 15360.0);

        // Zooming out around a far corner stays inside the bounds as well.
        vp.zoom_at(1e6, 800.0, 600.0);
        let far = vp.screen_to_display(800.0, 600.0);
        assert!(far.col <= 15360.0 + 1e-9 && far.row <= 15360.0 + 1e-9);
    }

    #[test]
    fn bounds_narrower_than_canvas_are_centred() {
        let config = MapConfig {
            map_size: 100.0,
            ..MapConfig::default()
        };
        let mut vp = Viewport::for_config(&config);
        vp.set_canvas_size(800.0, 600.0);
        vp.pan(250.0, -90.0);
        // Bounds span [-150, 250]: centre 50 sits mid-canvas.
        let (sx, sy) = vp.display_to_screen(DisplayPoint::new(50.0, 50.0));
        assert_close(sx, 400.0);
        assert_close(sy, 300.0);
    }

    #[test]
    fn without_canvas_size_pan_is_unbounded() {
        let mut vp = Viewport::default();
        vp.pan(1e6, -1e6);
        assert_close(vp.offset_x, 1e6);
        assert_close(vp.offset_y, -1e6);
    }

    #[test]
    fn custom_zoom_range_from_config() {
        let config = MapConfig {
            min_zoom: -1,
            max_zoom: 3,
            ..MapConfig::default()
        };
        let mut vp = Viewport::for_config(&config);
        vp.zoom_at(-1e6, 0.0, 0.0);
        assert_close(vp.scale, 8.0);
    }
}
