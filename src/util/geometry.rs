// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the transformations between normalized bounding
//! boxes and display-pixel rectangles, and the rectangle arithmetic used
//! while a box is dragged or resized on screen.

use crate::models::annotation::BBox;
use std::fmt;

/// Smallest width or height, in display pixels, a resize may produce.
pub const MIN_BOX_SIZE: f64 = 10.0;

/// A point in display pixels, relative to the top-left corner of the
/// rendered image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size of the rendered image in display pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl DisplaySize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Displayed size of an image with the given intrinsic size at `scale`.
    pub fn from_scale(intrinsic_width: u32, intrinsic_height: u32, scale: f64) -> Self {
        Self {
            width: intrinsic_width as f64 * scale,
            height: intrinsic_height as f64 * scale,
        }
    }
}

/// Ratio of rendered width to intrinsic width.
pub fn display_scale(rendered_width: f64, intrinsic_width: u32) -> f64 {
    rendered_width / intrinsic_width as f64
}

/// An axis-aligned rectangle in display pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.right()
            && point.y >= self.top
            && point.y <= self.bottom()
    }

    /// Position of a corner handle.
    pub fn corner(&self, handle: Handle) -> Point {
        match handle {
            Handle::Nw => Point::new(self.left, self.top),
            Handle::Ne => Point::new(self.right(), self.top),
            Handle::Sw => Point::new(self.left, self.bottom()),
            Handle::Se => Point::new(self.right(), self.bottom()),
        }
    }

    /// Check whether the rectangle lies fully inside `bounds`.
    pub fn is_within(&self, bounds: DisplaySize) -> bool {
        self.left >= 0.0
            && self.top >= 0.0
            && self.right() <= bounds.width
            && self.bottom() <= bounds.height
    }
}

/// Convert a normalized bounding box to a display rectangle.
pub fn to_display(bbox: &BBox, size: DisplaySize) -> DisplayRect {
    DisplayRect {
        left: bbox.x0() * size.width,
        top: bbox.y0() * size.height,
        width: bbox.width() * size.width,
        height: bbox.height() * size.height,
    }
}

/// Convert a display rectangle back to a normalized bounding box.
pub fn to_normalized(rect: &DisplayRect, size: DisplaySize) -> BBox {
    BBox::new(
        rect.left / size.width,
        rect.top / size.height,
        rect.right() / size.width,
        rect.bottom() / size.height,
    )
}

/// A resize handle at one corner of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    Nw,
    Ne,
    Sw,
    Se,
}

impl Handle {
    pub const ALL: [Handle; 4] = [Handle::Nw, Handle::Ne, Handle::Sw, Handle::Se];

    fn as_str(self) -> &'static str {
        match self {
            Handle::Nw => "nw",
            Handle::Ne => "ne",
            Handle::Sw => "sw",
            Handle::Se => "se",
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Translate `rect` by `(dx, dy)` and keep it fully inside `bounds`.
///
/// Each axis is clamped independently; the size never changes.
pub fn move_rect(rect: &DisplayRect, dx: f64, dy: f64, bounds: DisplaySize) -> DisplayRect {
    // min-then-max rather than f64::clamp: a box wider than the image pins to 0
    let left = (rect.left + dx).min(bounds.width - rect.width).max(0.0);
    let top = (rect.top + dy).min(bounds.height - rect.height).max(0.0);

    DisplayRect {
        left,
        top,
        ..*rect
    }
}

/// Drag corner `handle` of `rect` by `(dx, dy)`.
///
/// The adjusted rectangle is first grown to `min_size` on each axis (which
/// can make the box jump rather than resist), then any overflow past the
/// top/left edge is absorbed into the size with the origin pinned to 0, and
/// finally the size is clamped so the far edges land on `bounds`.
pub fn resize_rect(
    rect: &DisplayRect,
    handle: Handle,
    dx: f64,
    dy: f64,
    bounds: DisplaySize,
    min_size: f64,
) -> DisplayRect {
    let DisplayRect {
        mut left,
        mut top,
        mut width,
        mut height,
    } = *rect;

    match handle {
        Handle::Nw => {
            left += dx;
            top += dy;
            width -= dx;
            height -= dy;
        }
        Handle::Ne => {
            top += dy;
            width += dx;
            height -= dy;
        }
        Handle::Sw => {
            left += dx;
            width -= dx;
            height += dy;
        }
        Handle::Se => {
            width += dx;
            height += dy;
        }
    }

    let (left, width) = fit_axis(left, width, bounds.width, min_size);
    let (top, height) = fit_axis(top, height, bounds.height, min_size);

    DisplayRect {
        left,
        top,
        width,
        height,
    }
}

/// Apply the minimum-size, leading-edge and trailing-edge rules to one axis.
fn fit_axis(mut start: f64, mut len: f64, extent: f64, min_size: f64) -> (f64, f64) {
    let floor = min_size.min(extent);

    if len < min_size {
        len = min_size;
    }

    if start < 0.0 {
        len += start;
        start = 0.0;
    }

    if start + len > extent {
        len = extent - start;
    }

    // A start pushed past the far edge would leave a degenerate box; slide it
    // back so it keeps the minimum size and stays on the boundary.
    if len < floor {
        len = floor;
        start = (extent - len).min(start).max(0.0);
    }

    (start, len)
}
