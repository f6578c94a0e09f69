//! Placed media items, their corner handles and drag state.

use crate::document::ItemRecord;
use crate::error::MediaLoadError;
use crate::geometry::{Corner, Corners, MIN_EXTENT, clamp_position, resize_from_corner};
use crate::media::{MediaSource, Playback, PlaybackToken};
use kurbo::{Point, Rect, Size, Vec2};
use uuid::Uuid;

/// Unique identifier for an item.
pub type ItemId = Uuid;

/// Radius of a corner handle in canvas pixels.
pub const HANDLE_RADIUS: f64 = 5.0;

/// A draggable corner control point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub corner: Corner,
    /// Position in the owning item's local space.
    pub position: Point,
    /// The item this handle belongs to.
    pub item: ItemId,
}

impl Handle {
    pub fn new(corner: Corner, position: Point, item: ItemId) -> Self {
        Self {
            corner,
            position,
            item,
        }
    }

    /// Check if a point (in the item's local space) hits this handle.
    pub fn hit_test(&self, local: Point, tolerance: f64) -> bool {
        let dx = local.x - self.position.x;
        let dy = local.y - self.position.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }
}

/// The four corner handles of a loaded item.
#[derive(Debug, Clone, PartialEq)]
pub struct Handles {
    pub top_left: Handle,
    pub top_right: Handle,
    pub bottom_right: Handle,
    pub bottom_left: Handle,
}

impl Handles {
    /// Handles sitting exactly on the corners of `content`.
    fn around(item: ItemId, content: Rect) -> Self {
        Self {
            top_left: Handle::new(Corner::TopLeft, Point::new(content.x0, content.y0), item),
            top_right: Handle::new(Corner::TopRight, Point::new(content.x1, content.y0), item),
            bottom_right: Handle::new(
                Corner::BottomRight,
                Point::new(content.x1, content.y1),
                item,
            ),
            bottom_left: Handle::new(Corner::BottomLeft, Point::new(content.x0, content.y1), item),
        }
    }

    pub fn get(&self, corner: Corner) -> &Handle {
        match corner {
            Corner::TopLeft => &self.top_left,
            Corner::TopRight => &self.top_right,
            Corner::BottomRight => &self.bottom_right,
            Corner::BottomLeft => &self.bottom_left,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Handle> {
        [&self.top_left, &self.top_right, &self.bottom_right, &self.bottom_left].into_iter()
    }

    pub fn corners(&self) -> Corners {
        Corners {
            top_left: self.top_left.position,
            top_right: self.top_right.position,
            bottom_right: self.bottom_right.position,
            bottom_left: self.bottom_left.position,
        }
    }

    fn set_corners(&mut self, corners: Corners) {
        self.top_left.position = corners.top_left;
        self.top_right.position = corners.top_right;
        self.bottom_right.position = corners.bottom_right;
        self.bottom_left.position = corners.bottom_left;
    }
}

/// Which part of an item, if any, is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    DraggingBody,
    DraggingHandle(Corner),
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        *self != DragState::Idle
    }
}

/// Result of a handle drag step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOutcome {
    /// Both axes took the new extent.
    Applied,
    /// The handle crossed (or touched) its opposite edge on at least one axis;
    /// that axis kept its last valid extent.
    Degenerate {
        width_rejected: bool,
        height_rejected: bool,
    },
    /// No drag of that handle is in progress.
    Ignored,
}

/// Explicit geometry requested when adding an item.
///
/// Missing values fall back to natural media size and the canvas origin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Placement {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl Placement {
    fn origin(&self) -> Point {
        Point::new(self.x.unwrap_or(0.0), self.y.unwrap_or(0.0))
    }

    /// Requested extent if it is usable, else the natural one.
    fn extent(requested: Option<f64>, natural: f64) -> f64 {
        requested.filter(|v| *v > 0.0).unwrap_or(natural)
    }
}

/// One image or video placed on the canvas.
#[derive(Debug)]
pub struct Item {
    id: ItemId,
    source: MediaSource,
    placement: Placement,
    /// Group position on the canvas.
    origin: Point,
    /// Content box in local space. `(0, 0, w, h)` at rest.
    content: Rect,
    /// Present once the content has loaded.
    handles: Option<Handles>,
    drag: DragState,
    playback: Option<Playback>,
}

impl Item {
    /// Create a pending item awaiting its media.
    pub fn new(source: MediaSource, placement: Placement) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            placement,
            origin: placement.origin(),
            content: Rect::ZERO,
            handles: None,
            drag: DragState::Idle,
            playback: None,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn source(&self) -> &MediaSource {
        &self.source
    }

    /// Whether the media has loaded and the item is interactive.
    pub fn is_ready(&self) -> bool {
        self.handles.is_some()
    }

    pub fn handles(&self) -> Option<&Handles> {
        self.handles.as_ref()
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Group position on the canvas. Handle positions are relative to this.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Top-left of the content box in canvas coordinates.
    pub fn position(&self) -> Point {
        self.origin + self.content.origin().to_vec2()
    }

    /// Current content size. Zero until loaded.
    pub fn size(&self) -> Size {
        self.content.size()
    }

    /// Content box in canvas coordinates.
    pub fn bounds(&self) -> Rect {
        self.content + self.origin.to_vec2()
    }

    /// Convert a canvas point into this item's local space.
    pub fn to_local(&self, point: Point) -> Point {
        point - self.origin.to_vec2()
    }

    /// Hit test the content box (canvas coordinates).
    pub fn hit_test(&self, point: Point) -> bool {
        self.is_ready() && self.bounds().contains(point)
    }

    /// Find the handle under a canvas point, if any.
    pub fn hit_test_handle(&self, point: Point, tolerance: f64) -> Option<Corner> {
        let local = self.to_local(point);
        self.handles
            .as_ref()?
            .iter()
            .find(|h| h.hit_test(local, tolerance))
            .map(|h| h.corner)
    }

    /// Establish size, position and handles once the media has decoded.
    pub(crate) fn finish_load(&mut self, natural: Size) -> Result<(), MediaLoadError> {
        let width = Placement::extent(self.placement.width, natural.width);
        let height = Placement::extent(self.placement.height, natural.height);
        if !(width > MIN_EXTENT && height > MIN_EXTENT) {
            return Err(MediaLoadError::new(
                self.source.link.clone(),
                format!("media has no usable size ({width}x{height})"),
            ));
        }

        self.origin = self.placement.origin();
        self.content = Rect::from_origin_size(Point::ZERO, Size::new(width, height));
        self.handles = Some(Handles::around(self.id, self.content));
        Ok(())
    }

    /// Start the refresh loop lifetime for a video item.
    pub(crate) fn start_playback(&mut self) -> PlaybackToken {
        let playback = self.playback.insert(Playback::start());
        playback.token()
    }

    /// Token for a running video refresh loop.
    pub fn playback(&self) -> Option<PlaybackToken> {
        self.playback.as_ref().map(Playback::token)
    }

    /// Pointer went down on the item body.
    pub fn begin_body_drag(&mut self) -> bool {
        if !self.is_ready() || self.drag.is_dragging() {
            return false;
        }
        self.drag = DragState::DraggingBody;
        true
    }

    /// Pointer went down on a handle. Body dragging is disabled until it ends.
    pub fn begin_handle_drag(&mut self, corner: Corner) -> bool {
        if !self.is_ready() || self.drag.is_dragging() {
            return false;
        }
        self.drag = DragState::DraggingHandle(corner);
        true
    }

    /// Move the whole item, clamped to the canvas. Returns the committed position.
    pub fn on_body_drag_move(&mut self, to: Point, canvas: Size) -> Option<Point> {
        if self.drag != DragState::DraggingBody {
            return None;
        }
        let clamped = clamp_position(to, self.size(), canvas);
        self.origin = clamped - self.content.origin().to_vec2();
        Some(clamped)
    }

    /// Move one handle to `local` and resize from the opposite corner.
    ///
    /// Handles are not clamped to the canvas.
    pub fn on_handle_drag_move(&mut self, corner: Corner, local: Point) -> ResizeOutcome {
        if self.drag != DragState::DraggingHandle(corner) {
            return ResizeOutcome::Ignored;
        }
        let Some(handles) = self.handles.as_mut() else {
            return ResizeOutcome::Ignored;
        };

        let corners = resize_from_corner(handles.corners(), corner, local);
        handles.set_corners(corners);

        let width_rejected = corners.width() <= MIN_EXTENT;
        let height_rejected = corners.height() <= MIN_EXTENT;
        if !width_rejected {
            self.content.x0 = corners.top_left.x;
            self.content.x1 = corners.top_right.x;
        }
        if !height_rejected {
            self.content.y0 = corners.top_left.y;
            self.content.y1 = corners.bottom_left.y;
        }

        if width_rejected || height_rejected {
            log::trace!("Degenerate resize ignored on item {}", self.id);
            ResizeOutcome::Degenerate {
                width_rejected,
                height_rejected,
            }
        } else {
            ResizeOutcome::Applied
        }
    }

    /// Pointer released or cancelled.
    ///
    /// Folds the content offset into the origin and puts the handles back on
    /// the content corners, so at rest the local box is `(0, 0, w, h)`.
    pub fn end_drag(&mut self) -> bool {
        if !self.drag.is_dragging() {
            return false;
        }
        self.drag = DragState::Idle;

        let offset: Vec2 = self.content.origin().to_vec2();
        self.origin += offset;
        self.content = Rect::from_origin_size(Point::ZERO, self.content.size());
        if let Some(handles) = self.handles.as_mut() {
            handles.set_corners(Corners::from_size(self.content.size()));
        }
        true
    }

    /// Snapshot record for export.
    ///
    /// Pending items report their requested geometry; unknown extents are omitted.
    pub fn record(&self) -> ItemRecord {
        if self.is_ready() {
            let position = self.position();
            let size = self.size();
            ItemRecord {
                x: Some(position.x),
                y: Some(position.y),
                width: Some(size.width),
                height: Some(size.height),
                image: Some(self.source.link.clone()),
            }
        } else {
            ItemRecord {
                x: Some(self.origin.x),
                y: Some(self.origin.y),
                width: self.placement.width,
                height: self.placement.height,
                image: Some(self.source.link.clone()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: Size = Size::new(1280.0, 720.0);

    fn loaded(link: &str, natural: Size, placement: Placement) -> Item {
        let mut item = Item::new(MediaSource::parse(link).unwrap(), placement);
        item.finish_load(natural).unwrap();
        item
    }

    fn photo() -> Item {
        loaded("photo.jpg", Size::new(400.0, 300.0), Placement::default())
    }

    fn assert_at_rest(item: &Item) {
        let handles = item.handles().unwrap();
        let size = item.size();
        assert_eq!(handles.top_left.position, Point::ZERO);
        assert_eq!(handles.top_right.position, Point::new(size.width, 0.0));
        assert_eq!(handles.bottom_right.position, Point::new(size.width, size.height));
        assert_eq!(handles.bottom_left.position, Point::new(0.0, size.height));
        assert!(size.width > MIN_EXTENT && size.height > MIN_EXTENT);
    }

    #[test]
    fn test_pending_item_has_no_handles() {
        let item = Item::new(MediaSource::parse("photo.jpg").unwrap(), Placement::default());
        assert!(!item.is_ready());
        assert!(item.handles().is_none());
        assert_eq!(item.size(), Size::ZERO);
    }

    #[test]
    fn test_load_uses_natural_size_and_origin() {
        let item = photo();
        assert!(item.is_ready());
        assert_eq!(item.size(), Size::new(400.0, 300.0));
        assert_eq!(item.position(), Point::ZERO);
        assert_at_rest(&item);
    }

    #[test]
    fn test_load_prefers_explicit_geometry() {
        let item = loaded(
            "photo.jpg",
            Size::new(400.0, 300.0),
            Placement {
                x: Some(10.0),
                y: Some(20.0),
                width: Some(200.0),
                height: None,
            },
        );
        assert_eq!(item.position(), Point::new(10.0, 20.0));
        assert_eq!(item.size(), Size::new(200.0, 300.0));
    }

    #[test]
    fn test_load_zero_size_fails() {
        let mut item = Item::new(MediaSource::parse("clip.mp4").unwrap(), Placement::default());
        let err = item.finish_load(Size::ZERO).unwrap_err();
        assert_eq!(err.link, "clip.mp4");
        assert!(!item.is_ready());
    }

    #[test]
    fn test_handles_point_back_to_item() {
        let item = photo();
        for handle in item.handles().unwrap().iter() {
            assert_eq!(handle.item, item.id());
        }
    }

    #[test]
    fn test_body_drag_clamps_to_canvas() {
        let mut item = photo();
        assert!(item.begin_body_drag());
        assert_eq!(
            item.on_body_drag_move(Point::new(1100.0, -40.0), CANVAS),
            Some(Point::new(880.0, 0.0))
        );
        assert_eq!(item.position(), Point::new(880.0, 0.0));
        assert_eq!(item.size(), Size::new(400.0, 300.0));
        assert!(item.end_drag());
        assert_at_rest(&item);
    }

    #[test]
    fn test_body_drag_requires_drag_state() {
        let mut item = photo();
        assert_eq!(item.on_body_drag_move(Point::new(100.0, 100.0), CANVAS), None);
        assert_eq!(item.position(), Point::ZERO);
    }

    #[test]
    fn test_handle_drag_blocks_body_drag() {
        let mut item = photo();
        assert!(item.begin_handle_drag(Corner::TopLeft));
        assert!(!item.begin_body_drag());
        assert_eq!(item.on_body_drag_move(Point::new(100.0, 100.0), CANVAS), None);
        assert!(item.end_drag());
        assert!(item.begin_body_drag());
    }

    #[test]
    fn test_pending_item_cannot_drag() {
        let mut item = Item::new(MediaSource::parse("photo.jpg").unwrap(), Placement::default());
        assert!(!item.begin_body_drag());
        assert!(!item.begin_handle_drag(Corner::BottomRight));
    }

    #[test]
    fn test_top_left_resize_scenario() {
        let mut item = photo();
        assert!(item.begin_handle_drag(Corner::TopLeft));

        let outcome = item.on_handle_drag_move(Corner::TopLeft, Point::new(50.0, 50.0));
        assert_eq!(outcome, ResizeOutcome::Applied);
        assert_eq!(item.size(), Size::new(350.0, 250.0));
        assert_eq!(item.position(), Point::new(50.0, 50.0));

        // Past the opposite corner on both axes.
        let outcome = item.on_handle_drag_move(Corner::TopLeft, Point::new(450.0, 450.0));
        assert_eq!(
            outcome,
            ResizeOutcome::Degenerate {
                width_rejected: true,
                height_rejected: true
            }
        );
        assert_eq!(item.size(), Size::new(350.0, 250.0));
        assert_eq!(item.position(), Point::new(50.0, 50.0));

        assert!(item.end_drag());
        assert_eq!(item.size(), Size::new(350.0, 250.0));
        assert_eq!(item.position(), Point::new(50.0, 50.0));
        assert_at_rest(&item);
    }

    #[test]
    fn test_degenerate_across_drags() {
        let mut item = photo();
        item.begin_handle_drag(Corner::TopLeft);
        item.on_handle_drag_move(Corner::TopLeft, Point::new(50.0, 50.0));
        item.end_drag();

        item.begin_handle_drag(Corner::TopLeft);
        let outcome = item.on_handle_drag_move(Corner::TopLeft, Point::new(400.0, 400.0));
        assert!(matches!(outcome, ResizeOutcome::Degenerate { .. }));
        item.end_drag();

        assert_eq!(item.size(), Size::new(350.0, 250.0));
        assert_eq!(item.position(), Point::new(50.0, 50.0));
    }

    #[test]
    fn test_single_axis_degenerate() {
        let mut item = photo();
        item.begin_handle_drag(Corner::BottomRight);
        let outcome = item.on_handle_drag_move(Corner::BottomRight, Point::new(-10.0, 200.0));
        assert_eq!(
            outcome,
            ResizeOutcome::Degenerate {
                width_rejected: true,
                height_rejected: false
            }
        );
        assert_eq!(item.size(), Size::new(400.0, 200.0));
    }

    #[test]
    fn test_zero_extent_is_rejected() {
        let mut item = photo();
        item.begin_handle_drag(Corner::TopRight);
        let outcome = item.on_handle_drag_move(Corner::TopRight, Point::new(0.0, 300.0));
        assert_eq!(
            outcome,
            ResizeOutcome::Degenerate {
                width_rejected: true,
                height_rejected: true
            }
        );
        assert_eq!(item.size(), Size::new(400.0, 300.0));
    }

    #[test]
    fn test_corner_drag_keeps_opposite_handle() {
        for corner in Corner::ALL {
            let mut item = photo();
            let before = item.handles().unwrap().clone();
            item.begin_handle_drag(corner);
            item.on_handle_drag_move(corner, Point::new(180.0, 120.0));
            let after = item.handles().unwrap();

            let opposite = corner.opposite();
            assert_eq!(after.get(opposite), before.get(opposite), "{corner:?}");
            assert_eq!(after.get(corner).position, Point::new(180.0, 120.0));
        }
    }

    #[test]
    fn test_resize_then_inverse_restores_geometry() {
        let cases = [
            (Corner::TopLeft, Point::new(-30.0, 25.0), Point::ZERO),
            (Corner::TopRight, Point::new(520.0, -60.0), Point::new(400.0, 0.0)),
            (Corner::BottomRight, Point::new(120.0, 90.0), Point::new(400.0, 300.0)),
            (Corner::BottomLeft, Point::new(60.0, 640.0), Point::new(0.0, 300.0)),
        ];
        for (corner, to, back) in cases {
            let mut item = loaded(
                "photo.jpg",
                Size::new(400.0, 300.0),
                Placement {
                    x: Some(100.0),
                    y: Some(100.0),
                    ..Placement::default()
                },
            );
            item.begin_handle_drag(corner);
            item.on_handle_drag_move(corner, to);
            assert_eq!(item.on_handle_drag_move(corner, back), ResizeOutcome::Applied);
            item.end_drag();

            assert_eq!(item.size(), Size::new(400.0, 300.0), "{corner:?}");
            assert_eq!(item.position(), Point::new(100.0, 100.0), "{corner:?}");
        }
    }

    #[test]
    fn test_handle_drag_is_not_clamped() {
        let mut item = photo();
        item.begin_handle_drag(Corner::BottomRight);
        item.on_handle_drag_move(Corner::BottomRight, Point::new(2000.0, 1500.0));
        item.end_drag();
        assert_eq!(item.size(), Size::new(2000.0, 1500.0));
    }

    #[test]
    fn test_wrong_handle_is_ignored() {
        let mut item = photo();
        item.begin_handle_drag(Corner::TopLeft);
        let outcome = item.on_handle_drag_move(Corner::BottomRight, Point::new(10.0, 10.0));
        assert_eq!(outcome, ResizeOutcome::Ignored);
        assert_eq!(item.size(), Size::new(400.0, 300.0));
    }

    #[test]
    fn test_hit_test_handle() {
        let item = loaded(
            "photo.jpg",
            Size::new(400.0, 300.0),
            Placement {
                x: Some(100.0),
                y: Some(50.0),
                ..Placement::default()
            },
        );
        assert_eq!(
            item.hit_test_handle(Point::new(502.0, 348.0), HANDLE_RADIUS),
            Some(Corner::BottomRight)
        );
        assert_eq!(
            item.hit_test_handle(Point::new(100.0, 50.0), HANDLE_RADIUS),
            Some(Corner::TopLeft)
        );
        assert_eq!(item.hit_test_handle(Point::new(300.0, 200.0), HANDLE_RADIUS), None);
        assert!(item.hit_test(Point::new(300.0, 200.0)));
        assert!(!item.hit_test(Point::new(50.0, 20.0)));
    }

    #[test]
    fn test_record_for_pending_and_ready() {
        let pending = Item::new(
            MediaSource::parse("clip.mp4").unwrap(),
            Placement {
                x: Some(5.0),
                width: Some(320.0),
                ..Placement::default()
            },
        );
        let record = pending.record();
        assert_eq!(record.x, Some(5.0));
        assert_eq!(record.y, Some(0.0));
        assert_eq!(record.width, Some(320.0));
        assert_eq!(record.height, None);

        let ready = photo().record();
        assert_eq!(ready.width, Some(400.0));
        assert_eq!(ready.height, Some(300.0));
        assert_eq!(ready.image.as_deref(), Some("photo.jpg"));
    }
}
