//! Pointer routing from canvas events to item drags.

use crate::geometry::Corner;
use crate::item::{HANDLE_RADIUS, ItemId, ResizeOutcome};
use crate::scene::Scene;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Pointer event in canvas coordinates, unified for mouse and touch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
    Cancel,
}

/// What the active drag is holding on to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragTarget {
    /// The body, grabbed at an offset from the item's top-left.
    Body { grab: Vec2 },
    /// A corner handle, grabbed at an offset from its center.
    Handle { corner: Corner, grab: Vec2 },
}

/// The single drag in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveDrag {
    pub item: ItemId,
    pub target: DragTarget,
}

/// Turns pointer events into scene drag calls.
///
/// Handles take priority over bodies, and front items over back ones.
#[derive(Debug, Clone)]
pub struct PointerRouter {
    active: Option<ActiveDrag>,
    /// Hit radius around each handle.
    pub handle_tolerance: f64,
}

impl Default for PointerRouter {
    fn default() -> Self {
        Self {
            active: None,
            handle_tolerance: HANDLE_RADIUS,
        }
    }
}

impl PointerRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<ActiveDrag> {
        self.active
    }

    /// Process a pointer event. Returns true if the scene changed.
    pub fn handle_pointer_event(&mut self, scene: &mut Scene, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down { position } => self.pointer_down(scene, position),
            PointerEvent::Move { position } => self.pointer_move(scene, position),
            PointerEvent::Up { .. } | PointerEvent::Cancel => self.pointer_up(scene),
        }
    }

    fn pointer_down(&mut self, scene: &mut Scene, position: Point) -> bool {
        if self.active.is_some() {
            return false;
        }
        let Some(drag) = self.pick(scene, position) else {
            return false;
        };

        let started = match drag.target {
            DragTarget::Handle { corner, .. } => scene.begin_handle_drag(drag.item, corner),
            DragTarget::Body { .. } => scene.begin_body_drag(drag.item),
        };
        if started {
            self.active = Some(drag);
        }
        started
    }

    fn pick(&self, scene: &Scene, position: Point) -> Option<ActiveDrag> {
        let front_to_back = || scene.items().collect::<Vec<_>>().into_iter().rev();

        let handle = front_to_back().find_map(|item| {
            let corner = item.hit_test_handle(position, self.handle_tolerance)?;
            let center = item.origin() + item.handles()?.get(corner).position.to_vec2();
            Some(ActiveDrag {
                item: item.id(),
                target: DragTarget::Handle {
                    corner,
                    grab: position - center,
                },
            })
        });
        handle.or_else(|| {
            front_to_back().find(|item| item.hit_test(position)).map(|item| ActiveDrag {
                item: item.id(),
                target: DragTarget::Body {
                    grab: position - item.position(),
                },
            })
        })
    }

    fn pointer_move(&mut self, scene: &mut Scene, position: Point) -> bool {
        let Some(drag) = self.active else {
            return false;
        };
        match drag.target {
            DragTarget::Body { grab } => scene.drag_body(drag.item, position - grab).is_some(),
            DragTarget::Handle { corner, grab } => {
                let Some(item) = scene.item(drag.item) else {
                    return false;
                };
                let local = item.to_local(position - grab);
                scene.drag_handle(drag.item, corner, local) != ResizeOutcome::Ignored
            }
        }
    }

    fn pointer_up(&mut self, scene: &mut Scene) -> bool {
        match self.active.take() {
            Some(drag) => scene.end_drag(drag.item),
            None => false,
        }
    }
}
