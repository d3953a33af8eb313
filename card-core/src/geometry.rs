//! Geometry primitives and hit-testing over element bounds.
//!
//! Everything here is a pure function of its inputs.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::element::Element;

/// Side length of the square resize handle drawn on each image corner.
pub const HANDLE_SIZE: f32 = 8.0;

/// Both dimensions of a resized element must stay strictly above this.
pub const MIN_ELEMENT_SIZE: f32 = 10.0;

/// Hit extent used for an element whose width has not been measured yet.
pub const UNMEASURED_WIDTH: f32 = 100.0;

/// Hit extent used for an element whose height has not been measured yet.
pub const UNMEASURED_HEIGHT: f32 = 30.0;

/// A point in surface coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate (pixels from left).
    pub x: f32,
    /// Y coordinate (pixels from top).
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Width and height of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub w: f32,
    /// Height in pixels.
    pub h: f32,
}

impl Size {
    /// Create a new size.
    #[must_use]
    pub const fn new(w: f32, h: f32) -> Self {
        Self { w, h }
    }

    /// Width divided by height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.w / self.h
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Top-left corner.
    pub origin: Point,
    /// Extent.
    pub size: Size,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.origin.x + self.size.w
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.h
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.origin.x
            && point.x <= self.right()
            && point.y >= self.origin.y
            && point.y <= self.bottom()
    }

    /// Location of the given corner.
    #[must_use]
    pub fn corner(&self, handle: Handle) -> Point {
        match handle {
            Handle::NorthWest => self.origin,
            Handle::NorthEast => Point::new(self.right(), self.origin.y),
            Handle::SouthWest => Point::new(self.origin.x, self.bottom()),
            Handle::SouthEast => Point::new(self.right(), self.bottom()),
        }
    }
}

/// A corner resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handle {
    /// Top-left corner.
    #[serde(rename = "nw")]
    NorthWest,
    /// Top-right corner.
    #[serde(rename = "ne")]
    NorthEast,
    /// Bottom-left corner.
    #[serde(rename = "sw")]
    SouthWest,
    /// Bottom-right corner.
    #[serde(rename = "se")]
    SouthEast,
}

impl Handle {
    /// Handles in hit-test priority order.
    pub const ALL: [Handle; 4] = [
        Handle::NorthWest,
        Handle::NorthEast,
        Handle::SouthWest,
        Handle::SouthEast,
    ];

    /// Short compass name (`nw`, `ne`, `sw`, `se`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Handle::NorthWest => "nw",
            Handle::NorthEast => "ne",
            Handle::SouthWest => "sw",
            Handle::SouthEast => "se",
        }
    }

    /// CSS-style cursor name shown while hovering the handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Handle::NorthWest => "nw-resize",
            Handle::NorthEast => "ne-resize",
            Handle::SouthWest => "sw-resize",
            Handle::SouthEast => "se-resize",
        }
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Find the topmost element whose bounds contain `point`.
///
/// Elements are scanned from the last (topmost) to the first, so when
/// several overlap the highest one in z-order wins.
#[must_use]
pub fn hit_test<R>(point: Point, elements: &[Element<R>]) -> Option<usize> {
    elements
        .iter()
        .rposition(|element| element.hit_bounds().contains(point))
}

/// Find the resize handle of an image element under `point`.
///
/// Handles are `HANDLE_SIZE` squares centred on each corner. Text elements
/// have no handles.
#[must_use]
pub fn hit_test_handle<R>(point: Point, element: &Element<R>) -> Option<Handle> {
    if !element.is_image() {
        return None;
    }

    let bounds = element.bounds();
    let half = HANDLE_SIZE / 2.0;
    Handle::ALL.into_iter().find(|&handle| {
        let corner = bounds.corner(handle);
        let square = Rect::new(
            Point::new(corner.x - half, corner.y - half),
            Size::new(HANDLE_SIZE, HANDLE_SIZE),
        );
        square.contains(point)
    })
}
