use crate::coords::{DisplayPoint, MapProjection};

pub const DISTANCE_UNIT: &str = "m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    A,
    B,
}

/// What the pointer is holding while a finished segment is being corrected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Grab {
    Endpoint(Endpoint),
    /// Whole segment, translated by pointer deltas from `last`.
    Segment { last: DisplayPoint },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RulerState {
    Idle,
    Armed,
    /// `A` placed; `cursor` is the live end of the preview segment.
    OnePoint {
        a: DisplayPoint,
        cursor: DisplayPoint,
    },
    Finished {
        a: DisplayPoint,
        b: DisplayPoint,
    },
    Adjusting {
        a: DisplayPoint,
        b: DisplayPoint,
        grab: Grab,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// Dashed preview while the second point is still pending.
    Tentative,
    Solid,
}

/// Draw instructions for the current measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct RulerOverlay {
    pub a: DisplayPoint,
    pub b: DisplayPoint,
    /// False while `b` is only the preview cursor.
    pub b_placed: bool,
    pub style: LineStyle,
    pub distance: f64,
    pub label: String,
    pub label_at: DisplayPoint,
}

/// Two-point distance measurement tool.
#[derive(Debug, Clone, PartialEq)]
pub struct RulerTool {
    projection: MapProjection,
    state: RulerState,
    click_lock: bool,
}

impl RulerTool {
    pub fn new(projection: MapProjection) -> Self {
        Self {
            projection,
            state: RulerState::Idle,
            click_lock: false,
        }
    }

    pub fn state(&self) -> RulerState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, RulerState::Idle)
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.state,
            RulerState::Finished { .. } | RulerState::Adjusting { .. }
        )
    }

    /// Map panning must stay disabled while a finished segment is being dragged.
    pub fn pan_locked(&self) -> bool {
        matches!(self.state, RulerState::Adjusting { .. })
    }

    /// Placed points: `(A, B)`, where `B` is `None` until the second click.
    pub fn segment(&self) -> Option<(DisplayPoint, Option<DisplayPoint>)> {
        match self.state {
            RulerState::Idle | RulerState::Armed => None,
            RulerState::OnePoint { a, .. } => Some((a, None)),
            RulerState::Finished { a, b } | RulerState::Adjusting { a, b, .. } => Some((a, Some(b))),
        }
    }

    pub fn activate(&mut self) {
        self.state = RulerState::Armed;
        self.click_lock = false;
    }

    pub fn deactivate(&mut self) {
        self.state = RulerState::Idle;
        self.click_lock = false;
    }

    pub fn click_locked(&self) -> bool {
        self.click_lock
    }

    /// Returns `false` if the lock is already held this tick.
    pub fn acquire_click_lock(&mut self) -> bool {
        if self.click_lock {
            return false;
        }
        self.click_lock = true;
        true
    }

    /// Called once the event-loop turn that acquired the lock has finished.
    pub fn release_click_lock(&mut self) {
        self.click_lock = false;
    }

    /// Place the next point. Returns whether the click was consumed.
    pub fn pointer_click(&mut self, p: DisplayPoint) -> bool {
        if !matches!(
            self.state,
            RulerState::Armed | RulerState::OnePoint { .. }
        ) {
            return false;
        }
        if !self.acquire_click_lock() {
            return false;
        }
        self.state = match self.state {
            RulerState::Armed => RulerState::OnePoint { a: p, cursor: p },
            RulerState::OnePoint { a, .. } => RulerState::Finished { a, b: p },
            other => other,
        };
        true
    }

    /// Returns whether the overlay changed.
    pub fn pointer_move(&mut self, p: DisplayPoint) -> bool {
        match self.state {
            RulerState::OnePoint { a, .. } => {
                self.state = RulerState::OnePoint { a, cursor: p };
                true
            }
            RulerState::Adjusting { a, b, grab } => {
                self.state = match grab {
                    Grab::Endpoint(Endpoint::A) => RulerState::Adjusting { a: p, b, grab },
                    Grab::Endpoint(Endpoint::B) => RulerState::Adjusting { a, b: p, grab },
                    Grab::Segment { last } => {
                        let d_row = p.row - last.row;
                        let d_col = p.col - last.col;
                        RulerState::Adjusting {
                            a: a.offset(d_row, d_col),
                            b: b.offset(d_row, d_col),
                            grab: Grab::Segment { last: p },
                        }
                    }
                };
                true
            }
            _ => false,
        }
    }

    pub fn begin_adjust(&mut self, which: Endpoint) -> bool {
        self.begin_grab(Grab::Endpoint(which))
    }

    /// Start dragging the whole finished segment from `from`.
    pub fn begin_translate(&mut self, from: DisplayPoint) -> bool {
        self.begin_grab(Grab::Segment { last: from })
    }

    fn begin_grab(&mut self, grab: Grab) -> bool {
        let RulerState::Finished { a, b } = self.state else {
            return false;
        };
        self.state = RulerState::Adjusting { a, b, grab };
        true
    }

    pub fn end_adjust(&mut self) -> bool {
        let RulerState::Adjusting { a, b, .. } = self.state else {
            return false;
        };
        self.state = RulerState::Finished { a, b };
        true
    }

    /// Finished endpoint under `p`, nearest first.
    pub fn handle_at(&self, p: DisplayPoint, radius: f64) -> Option<Endpoint> {
        let RulerState::Finished { a, b } = self.state else {
            return None;
        };
        let da = a.display_distance(p);
        let db = b.display_distance(p);
        if da > radius && db > radius {
            return None;
        }
        Some(if da <= db { Endpoint::A } else { Endpoint::B })
    }

    pub fn segment_hit(&self, p: DisplayPoint, tolerance: f64) -> bool {
        let RulerState::Finished { a, b } = self.state else {
            return false;
        };
        distance_to_segment(p, a, b) <= tolerance
    }

    /// Current draw instructions; the distance is recomputed on every call.
    pub fn overlay(&self) -> Option<RulerOverlay> {
        let (a, b, b_placed, style) = match self.state {
            RulerState::Idle | RulerState::Armed => return None,
            RulerState::OnePoint { a, cursor } => (a, cursor, false, LineStyle::Tentative),
            RulerState::Finished { a, b } | RulerState::Adjusting { a, b, .. } => {
                (a, b, true, LineStyle::Solid)
            }
        };
        let distance = self.projection.distance(a, b);
        Some(RulerOverlay {
            a,
            b,
            b_placed,
            style,
            distance,
            label: format_distance(distance),
            label_at: a.midpoint(b),
        })
    }
}

pub fn format_distance(distance: f64) -> String {
    format!("{distance:.2} {DISTANCE_UNIT}")
}

fn distance_to_segment(p: DisplayPoint, a: DisplayPoint, b: DisplayPoint) -> f64 {
    let (dr, dc) = (b.row - a.row, b.col - a.col);
    let len_sq = dr * dr + dc * dc;
    if len_sq <= f64::EPSILON {
        return p.display_distance(a);
    }
    let t = (((p.row - a.row) * dr + (p.col - a.col) * dc) / len_sq).clamp(0.0, 1.0);
    p.display_distance(DisplayPoint::new(a.row + t * dr, a.col + t * dc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ruler() -> RulerTool {
        RulerTool::new(MapProjection::default())
    }

    fn finished(a: DisplayPoint, b: DisplayPoint) -> RulerTool {
        let mut r = ruler();
        r.activate();
        assert!(r.pointer_click(a));
        r.release_click_lock();
        assert!(r.pointer_click(b));
        r.release_click_lock();
        r
    }

    #[test]
    fn idle_ruler_ignores_clicks_and_draws_nothing() {
        let mut r = ruler();
        assert!(!r.pointer_click(DisplayPoint::new(1.0, 1.0)));
        assert!(!r.click_locked());
        assert_eq!(r.overlay(), None);
    }

    #[test]
    fn first_click_draws_zero_length_preview() {
        let mut r = ruler();
        r.activate();
        let a = DisplayPoint::new(100.0, 100.0);
        assert!(r.pointer_click(a));
        let overlay = r.overlay().expect("overlay");
        assert_eq!(overlay.a, a);
        assert_eq!(overlay.b, a);
        assert!(!overlay.b_placed);
        assert_eq!(overlay.style, LineStyle::Tentative);
        assert_eq!(overlay.label, "0.00 m");
    }

    #[test]
    fn preview_follows_pointer_until_second_click() {
        let mut r = ruler();
        r.activate();
        let proj = MapProjection::default();
        let a = proj.to_display(0.0, 0.0);
        r.pointer_click(a);
        r.release_click_lock();
        let cursor = proj.to_display(30.0, 40.0);
        assert!(r.pointer_move(cursor));
        let overlay = r.overlay().expect("overlay");
        assert_eq!(overlay.b, cursor);
        assert_eq!(overlay.label, "50.00 m");
        assert_eq!(overlay.style, LineStyle::Tentative);
    }

    #[test]
    fn two_clicks_finish_with_final_label() {
        let proj = MapProjection::default();
        let a = DisplayPoint::new(1000.0, 1000.0);
        let b = DisplayPoint::new(2500.0, 4100.0);
        let r = finished(a, b);
        assert!(matches!(r.state(), RulerState::Finished { .. }));
        assert_eq!(r.segment(), Some((a, Some(b))));
        let overlay = r.overlay().expect("overlay");
        assert_eq!(overlay.style, LineStyle::Solid);
        assert!(overlay.b_placed);
        assert_eq!(overlay.label, format!("{:.2} m", proj.distance(a, b)));
        assert_eq!(overlay.label_at, DisplayPoint::new(1750.0, 2550.0));
    }

    #[test]
    fn third_click_is_a_no_op() {
        let a = DisplayPoint::new(10.0, 10.0);
        let b = DisplayPoint::new(20.0, 20.0);
        let mut r = finished(a, b);
        assert!(!r.pointer_click(DisplayPoint::new(30.0, 30.0)));
        assert_eq!(r.segment(), Some((a, Some(b))));
        assert!(!r.click_locked());
    }

    #[test]
    fn click_lock_blocks_second_click_in_same_tick() {
        let mut r = ruler();
        r.activate();
        assert!(r.pointer_click(DisplayPoint::new(10.0, 10.0)));
        assert!(!r.pointer_click(DisplayPoint::new(20.0, 20.0)));
        assert_eq!(r.segment(), Some((DisplayPoint::new(10.0, 10.0), None)));
        r.release_click_lock();
        assert!(r.pointer_click(DisplayPoint::new(20.0, 20.0)));
    }

    #[test]
    fn adjusting_a_moves_only_a() {
        let proj = MapProjection::default();
        let a = DisplayPoint::new(100.0, 100.0);
        let b = DisplayPoint::new(500.0, 500.0);
        let mut r = finished(a, b);
        assert!(r.begin_adjust(Endpoint::A));
        assert!(r.pan_locked());
        let p = DisplayPoint::new(900.0, 50.0);
        assert!(r.pointer_move(p));
        assert_eq!(r.segment(), Some((p, Some(b))));
        let overlay = r.overlay().expect("overlay");
        assert_eq!(overlay.label, format_distance(proj.distance(p, b)));
        assert!(r.end_adjust());
        assert!(!r.pan_locked());
        assert!(matches!(r.state(), RulerState::Finished { .. }));
    }

    #[test]
    fn adjusting_b_moves_only_b() {
        let a = DisplayPoint::new(100.0, 100.0);
        let b = DisplayPoint::new(500.0, 500.0);
        let mut r = finished(a, b);
        r.begin_adjust(Endpoint::B);
        let p = DisplayPoint::new(700.0, 800.0);
        r.pointer_move(p);
        assert_eq!(r.segment(), Some((a, Some(p))));
    }

    #[test]
    fn adjusting_before_finished_is_a_no_op() {
        let mut r = ruler();
        assert!(!r.begin_adjust(Endpoint::A));
        r.activate();
        assert!(!r.begin_adjust(Endpoint::A));
        r.pointer_click(DisplayPoint::new(1.0, 1.0));
        assert!(!r.begin_adjust(Endpoint::B));
        assert!(!r.end_adjust());
        assert!(!r.pan_locked());
    }

    #[test]
    fn translate_moves_both_endpoints() {
        let a = DisplayPoint::new(100.0, 100.0);
        let b = DisplayPoint::new(200.0, 300.0);
        let mut r = finished(a, b);
        assert!(r.segment_hit(DisplayPoint::new(150.0, 200.0), 2.0));
        assert!(r.begin_translate(DisplayPoint::new(150.0, 200.0)));
        r.pointer_move(DisplayPoint::new(160.0, 190.0));
        r.pointer_move(DisplayPoint::new(170.0, 180.0));
        assert_eq!(
            r.segment(),
            Some((
                DisplayPoint::new(120.0, 80.0),
                Some(DisplayPoint::new(220.0, 280.0))
            ))
        );
    }

    #[test]
    fn handle_at_picks_nearest_endpoint() {
        let a = DisplayPoint::new(100.0, 100.0);
        let b = DisplayPoint::new(104.0, 100.0);
        let r = finished(a, b);
        assert_eq!(r.handle_at(DisplayPoint::new(101.0, 100.0), 6.0), Some(Endpoint::A));
        assert_eq!(r.handle_at(DisplayPoint::new(103.5, 100.0), 6.0), Some(Endpoint::B));
        assert_eq!(r.handle_at(DisplayPoint::new(300.0, 300.0), 6.0), None);
    }

    #[test]
    fn deactivate_clears_everything_and_reactivation_is_fresh() {
        let mut r = finished(DisplayPoint::new(1.0, 1.0), DisplayPoint::new(2.0, 2.0));
        r.begin_adjust(Endpoint::A);
        r.deactivate();
        assert_eq!(r.state(), RulerState::Idle);
        assert_eq!(r.overlay(), None);
        assert!(!r.pan_locked());

        r.activate();
        let mut fresh = ruler();
        fresh.activate();
        assert_eq!(r, fresh);
    }

    #[test]
    fn rearming_in_the_same_tick_accepts_the_next_click() {
        let mut r = ruler();
        r.activate();
        assert!(r.pointer_click(DisplayPoint::new(10.0, 10.0)));
        r.deactivate();
        r.activate();

        let mut fresh = ruler();
        fresh.activate();
        assert_eq!(r, fresh);
        assert!(r.pointer_click(DisplayPoint::new(20.0, 20.0)));
        assert_eq!(r.segment(), Some((DisplayPoint::new(20.0, 20.0), None)));
    }

    #[test]
    fn activate_discards_previous_segment() {
        let mut r = finished(DisplayPoint::new(1.0, 1.0), DisplayPoint::new(2.0, 2.0));
        r.activate();
        assert_eq!(r.state(), RulerState::Armed);
        assert_eq!(r.segment(), None);
    }
}
