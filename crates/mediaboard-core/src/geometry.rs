//! Bounds clamping and corner-resize arithmetic.

use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Smallest extent a content box may have on either axis.
pub const MIN_EXTENT: f64 = 1e-6;

/// Corner positions of an item's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    /// All corners, in the order handles are laid out.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    /// The corner diagonally across the box.
    pub fn opposite(self) -> Self {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomRight => Corner::TopLeft,
            Corner::BottomLeft => Corner::TopRight,
        }
    }
}

/// Local positions of the four corners of a box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Corners {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl Corners {
    /// Corners of a box of `size` anchored at the local origin.
    pub fn from_size(size: Size) -> Self {
        Self {
            top_left: Point::ZERO,
            top_right: Point::new(size.width, 0.0),
            bottom_right: Point::new(size.width, size.height),
            bottom_left: Point::new(0.0, size.height),
        }
    }

    pub fn get(&self, corner: Corner) -> Point {
        match corner {
            Corner::TopLeft => self.top_left,
            Corner::TopRight => self.top_right,
            Corner::BottomRight => self.bottom_right,
            Corner::BottomLeft => self.bottom_left,
        }
    }

    /// Width spanned by the top edge.
    pub fn width(&self) -> f64 {
        self.top_right.x - self.top_left.x
    }

    /// Height spanned by the left edge.
    pub fn height(&self) -> f64 {
        self.bottom_left.y - self.top_left.y
    }
}

/// Clamp a proposed top-left position so a box of `item` size stays inside `canvas`.
///
/// Each axis is clamped independently to `[0, bound - extent]`. An item wider
/// (or taller) than the canvas is pinned to `0` on that axis.
pub fn clamp_position(proposed: Point, item: Size, canvas: Size) -> Point {
    Point::new(
        clamp_axis(proposed.x, item.width, canvas.width),
        clamp_axis(proposed.y, item.height, canvas.height),
    )
}

fn clamp_axis(value: f64, extent: f64, bound: f64) -> f64 {
    let max = (bound - extent).max(0.0);
    if value < 0.0 {
        0.0
    } else if value > max {
        max
    } else {
        value
    }
}

/// Move one corner to `to` and drag the two adjacent corners along with it.
///
/// Each adjacent corner takes the moved corner's coordinate on the axis they
/// share. The opposite corner is never touched.
pub fn resize_from_corner(corners: Corners, corner: Corner, to: Point) -> Corners {
    let mut next = corners;
    match corner {
        Corner::TopLeft => {
            next.top_left = to;
            next.top_right.y = to.y;
            next.bottom_left.x = to.x;
        }
        Corner::TopRight => {
            next.top_right = to;
            next.top_left.y = to.y;
            next.bottom_right.x = to.x;
        }
        Corner::BottomRight => {
            next.bottom_right = to;
            next.bottom_left.y = to.y;
            next.top_right.x = to.x;
        }
        Corner::BottomLeft => {
            next.bottom_left = to;
            next.bottom_right.y = to.y;
            next.top_left.x = to.x;
        }
    }
    next
}
