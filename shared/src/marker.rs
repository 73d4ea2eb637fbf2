use crate::coords::{DisplayPoint, GameCoordinate, MapProjection};
use crate::link::ShareLink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyState {
    Ready,
    Copied,
}

/// Everything the popup collaborator needs to render the detail view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerPopup {
    /// Bumped every time a popup opens, so late post-render hooks can tell
    /// they belong to a popup that has since closed.
    pub generation: u64,
    pub coord: GameCoordinate,
    pub link: ShareLink,
    pub copy_button: bool,
    pub copy_state: CopyState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PopupState {
    generation: u64,
    copy_state: CopyState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedMarker {
    pub position: DisplayPoint,
    pub dragging: bool,
    pub draggable: bool,
    pub link: ShareLink,
    popup: Option<PopupState>,
}

impl PlacedMarker {
    pub fn coord(&self) -> GameCoordinate {
        self.link.coord
    }

    pub fn popup_open(&self) -> bool {
        self.popup.is_some()
    }
}

/// The single shareable-link marker on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct PointMarker {
    projection: MapProjection,
    current: Option<PlacedMarker>,
    next_generation: u64,
}

impl PointMarker {
    pub fn new(projection: MapProjection) -> Self {
        Self {
            projection,
            current: None,
            next_generation: 1,
        }
    }

    pub fn current(&self) -> Option<&PlacedMarker> {
        self.current.as_ref()
    }

    pub fn exists(&self) -> bool {
        self.current.is_some()
    }

    /// Replace any existing marker with a draggable one at `at` and open its popup.
    pub fn place(&mut self, at: DisplayPoint, zoom: i32) {
        self.place_with(at, zoom, true);
    }

    /// Marker restored from a shared link: fixed in place, popup without a copy button.
    pub fn place_fixed(&mut self, at: DisplayPoint, zoom: i32) {
        self.place_with(at, zoom, false);
    }

    fn place_with(&mut self, at: DisplayPoint, zoom: i32, draggable: bool) {
        let popup = Some(self.open_popup());
        self.current = Some(PlacedMarker {
            position: at,
            dragging: false,
            draggable,
            link: ShareLink::at(&self.projection, at, zoom),
            popup,
        });
    }

    fn open_popup(&mut self) -> PopupState {
        let generation = self.next_generation;
        self.next_generation += 1;
        PopupState {
            generation,
            copy_state: CopyState::Ready,
        }
    }

    pub fn on_drag_start(&mut self) -> bool {
        let Some(marker) = self.current.as_mut() else {
            return false;
        };
        if !marker.draggable || marker.dragging {
            return false;
        }
        marker.dragging = true;
        marker.popup = None;
        true
    }

    pub fn drag_to(&mut self, position: DisplayPoint) -> bool {
        match self.current.as_mut() {
            Some(marker) if marker.dragging => {
                marker.position = position;
                true
            }
            _ => false,
        }
    }

    pub fn on_drag_end(&mut self, new_position: DisplayPoint, zoom: i32) -> bool {
        if !self.current.is_some_and(|m| m.dragging) {
            return false;
        }
        let popup = self.open_popup();
        let link = ShareLink::at(&self.projection, new_position, zoom);
        if let Some(marker) = self.current.as_mut() {
            marker.position = new_position;
            marker.dragging = false;
            marker.link = link;
            marker.popup = Some(popup);
        }
        true
    }

    pub fn remove(&mut self) -> bool {
        self.current.take().is_some()
    }

    pub fn close_popup(&mut self) -> bool {
        self.current
            .as_mut()
            .and_then(|marker| marker.popup.take())
            .is_some()
    }

    pub fn popup(&self) -> Option<MarkerPopup> {
        let marker = self.current.as_ref()?;
        let state = marker.popup?;
        Some(MarkerPopup {
            generation: state.generation,
            coord: marker.link.coord,
            link: marker.link,
            copy_button: marker.draggable,
            copy_state: state.copy_state,
        })
    }

    /// Post-render hook: the popup for `generation` has been inserted. Returns the
    /// link to bind to its copy button, or `None` when that popup is gone or has
    /// no button.
    pub fn popup_rendered(&self, generation: u64) -> Option<ShareLink> {
        self.popup()
            .filter(|popup| popup.generation == generation && popup.copy_button)
            .map(|popup| popup.link)
    }

    pub fn mark_copied(&mut self, generation: u64) -> bool {
        let Some(state) = self.current.as_mut().and_then(|m| m.popup.as_mut()) else {
            return false;
        };
        if state.generation != generation {
            return false;
        }
        state.copy_state = CopyState::Copied;
        true
    }

    pub fn hit(&self, point: DisplayPoint, radius: f64) -> bool {
        self.current
            .as_ref()
            .is_some_and(|m| m.position.display_distance(point) <= radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker() -> PointMarker {
        PointMarker::new(MapProjection::default())
    }

    #[test]
    fn place_opens_popup_with_link() {
        let mut m = marker();
        m.place(DisplayPoint::new(3072.0, 3072.0), 1);
        let popup = m.popup().expect("popup open");
        assert_eq!(popup.coord, GameCoordinate::new(0.0, 0.0));
        assert_eq!(popup.link.to_query(), "x=0&y=0&z=1");
        assert!(popup.copy_button);
        assert_eq!(popup.copy_state, CopyState::Ready);
    }

    #[test]
    fn placing_again_replaces_the_previous_marker() {
        let mut m = marker();
        m.place(DisplayPoint::new(0.0, 0.0), 0);
        m.place(DisplayPoint::new(6144.0, 6144.0), 0);
        let current = m.current().expect("marker");
        assert_eq!(current.coord(), GameCoordinate::new(3000.0, 3000.0));
    }

    #[test]
    fn drag_closes_popup_then_reopens_with_new_link() {
        let mut m = marker();
        m.place(DisplayPoint::new(3072.0, 3072.0), 0);
        let first = m.popup().expect("popup").generation;

        assert!(m.on_drag_start());
        assert!(m.current().expect("marker").dragging);
        assert_eq!(m.popup(), None);

        assert!(m.drag_to(DisplayPoint::new(0.0, 3072.0)));
        assert!(m.on_drag_end(DisplayPoint::new(0.0, 3072.0), 2));

        let current = m.current().expect("marker");
        assert!(!current.dragging);
        assert_eq!(current.coord(), GameCoordinate::new(0.0, -3000.0));
        let popup = m.popup().expect("popup reopened");
        assert!(popup.generation > first);
        assert_eq!(popup.link.zoom, 2);
    }

    #[test]
    fn drag_end_without_drag_start_is_ignored() {
        let mut m = marker();
        m.place(DisplayPoint::new(10.0, 10.0), 0);
        assert!(!m.on_drag_end(DisplayPoint::new(20.0, 20.0), 0));
        assert_eq!(m.current().expect("marker").position, DisplayPoint::new(10.0, 10.0));
    }

    #[test]
    fn fixed_marker_cannot_be_dragged_and_has_no_copy_button() {
        let mut m = marker();
        m.place_fixed(DisplayPoint::new(100.0, 100.0), 0);
        assert!(!m.on_drag_start());
        assert!(!m.popup().expect("popup").copy_button);
        let generation = m.popup().expect("popup").generation;
        assert_eq!(m.popup_rendered(generation), None);
    }

    #[test]
    fn stale_post_render_hook_is_a_no_op() {
        let mut m = marker();
        m.place(DisplayPoint::new(100.0, 100.0), 0);
        let generation = m.popup().expect("popup").generation;
        assert!(m.popup_rendered(generation).is_some());

        assert!(m.close_popup());
        assert_eq!(m.popup_rendered(generation), None);
        assert!(!m.mark_copied(generation));
    }

    #[test]
    fn mark_copied_updates_current_popup_only() {
        let mut m = marker();
        m.place(DisplayPoint::new(100.0, 100.0), 0);
        let old = m.popup().expect("popup").generation;
        m.place(DisplayPoint::new(200.0, 200.0), 0);
        assert!(!m.mark_copied(old));
        let current = m.popup().expect("popup").generation;
        assert!(m.mark_copied(current));
        assert_eq!(m.popup().expect("popup").copy_state, CopyState::Copied);
    }

    #[test]
    fn remove_is_a_no_op_without_marker() {
        let mut m = marker();
        assert!(!m.remove());
        m.place(DisplayPoint::new(1.0, 1.0), 0);
        assert!(m.remove());
        assert!(!m.exists());
    }

    #[test]
    fn hit_uses_display_radius() {
        let mut m = marker();
        m.place(DisplayPoint::new(100.0, 100.0), 0);
        assert!(m.hit(DisplayPoint::new(103.0, 104.0), 5.0));
        assert!(!m.hit(DisplayPoint::new(110.0, 100.0), 5.0));
    }
}
