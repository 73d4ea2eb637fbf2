use crate::coords::{DisplayPoint, MapProjection};
use crate::link::ShareLink;
use crate::marker::PointMarker;
use crate::ruler::{Endpoint, RulerTool};

/// What the pointer landed on when a click reached the map canvas. Map
/// controls are separate elements and never produce a canvas click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Surface,
    Icon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Ignored,
    RulerPoint,
    MarkerPlaced,
}

impl ClickOutcome {
    /// Handled clicks hold the click lock until the current event-loop turn ends.
    pub fn holds_click_lock(self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Marker,
    RulerEndpoint(Endpoint),
    RulerSegment,
}

/// Interaction state of one map view: the share marker and the ruler, kept
/// mutually exclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSession {
    projection: MapProjection,
    marker: PointMarker,
    ruler: RulerTool,
    drag: Option<DragKind>,
}

impl Default for MapSession {
    fn default() -> Self {
        Self::new(MapProjection::default())
    }
}

impl MapSession {
    pub fn new(projection: MapProjection) -> Self {
        Self {
            projection,
            marker: PointMarker::new(projection),
            ruler: RulerTool::new(projection),
            drag: None,
        }
    }

    pub fn projection(&self) -> &MapProjection {
        &self.projection
    }

    pub fn marker(&self) -> &PointMarker {
        &self.marker
    }

    pub fn ruler(&self) -> &RulerTool {
        &self.ruler
    }

    pub fn drag(&self) -> Option<DragKind> {
        self.drag
    }

    /// Place the fixed marker for a link the page was opened with.
    pub fn restore(&mut self, link: ShareLink) -> DisplayPoint {
        let at = link.display_point(&self.projection);
        self.marker.place_fixed(at, link.zoom);
        at
    }

    pub fn handle_click(&mut self, p: DisplayPoint, target: ClickTarget, zoom: i32) -> ClickOutcome {
        if self.ruler.click_locked() {
            return ClickOutcome::Ignored;
        }
        if self.ruler.is_active() {
            return if self.ruler.pointer_click(p) {
                ClickOutcome::RulerPoint
            } else {
                ClickOutcome::Ignored
            };
        }
        if target != ClickTarget::Surface || self.drag.is_some() {
            return ClickOutcome::Ignored;
        }
        if !self.ruler.acquire_click_lock() {
            return ClickOutcome::Ignored;
        }
        self.marker.place(p, zoom);
        ClickOutcome::MarkerPlaced
    }

    pub fn release_click_lock(&mut self) {
        self.ruler.release_click_lock();
    }

    /// Returns whether the ruler is active afterwards.
    pub fn toggle_ruler(&mut self) -> bool {
        if self.ruler.is_active() {
            self.deactivate_ruler();
        } else {
            self.activate_ruler();
        }
        self.ruler.is_active()
    }

    pub fn activate_ruler(&mut self) {
        self.ruler.activate();
        self.marker.remove();
        self.drag = None;
    }

    pub fn deactivate_ruler(&mut self) {
        self.ruler.deactivate();
        if matches!(
            self.drag,
            Some(DragKind::RulerEndpoint(_) | DragKind::RulerSegment)
        ) {
            self.drag = None;
        }
    }

    /// Cancel key: drop the marker and switch the ruler off.
    pub fn cancel(&mut self) {
        self.marker.remove();
        self.ruler.deactivate();
        self.drag = None;
    }

    /// Start a drag if `p` is on a ruler handle, the ruler line or the marker.
    /// Returns whether the map should stop panning for this gesture.
    pub fn pointer_down(&mut self, p: DisplayPoint, radius: f64) -> bool {
        if self.drag.is_some() {
            return true;
        }
        if let Some(endpoint) = self.ruler.handle_at(p, radius)
            && self.ruler.begin_adjust(endpoint)
        {
            self.drag = Some(DragKind::RulerEndpoint(endpoint));
        } else if self.ruler.segment_hit(p, radius) && self.ruler.begin_translate(p) {
            self.drag = Some(DragKind::RulerSegment);
        } else if self.marker.hit(p, radius) && self.marker.on_drag_start() {
            self.drag = Some(DragKind::Marker);
        }
        self.drag.is_some()
    }

    /// Returns whether anything visible changed.
    pub fn pointer_move(&mut self, p: DisplayPoint) -> bool {
        match self.drag {
            Some(DragKind::Marker) => self.marker.drag_to(p),
            Some(DragKind::RulerEndpoint(_) | DragKind::RulerSegment) | None => {
                self.ruler.pointer_move(p)
            }
        }
    }

    /// Finish the current drag. Returns whether one was in progress.
    pub fn pointer_up(&mut self, zoom: i32) -> bool {
        match self.drag.take() {
            Some(DragKind::Marker) => {
                let Some(position) = self.marker.current().map(|m| m.position) else {
                    return false;
                };
                self.marker.on_drag_end(position, zoom)
            }
            Some(DragKind::RulerEndpoint(_) | DragKind::RulerSegment) => self.ruler.end_adjust(),
            None => false,
        }
    }

    pub fn pan_locked(&self) -> bool {
        self.drag.is_some() || self.ruler.pan_locked()
    }

    pub fn popup_rendered(&self, generation: u64) -> Option<ShareLink> {
        self.marker.popup_rendered(generation)
    }

    pub fn mark_copied(&mut self, generation: u64) -> bool {
        self.marker.mark_copied(generation)
    }

    pub fn close_popup(&mut self) -> bool {
        self.marker.close_popup()
    }
}
