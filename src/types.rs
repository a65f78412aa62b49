//! Geometry primitives for the layout engine.
//!
//! Everything here works in workspace coordinates: `f64` pixels with the
//! origin at the workspace top-left corner and Y growing downward. Grid
//! cells are integer coordinates (`glam::IVec2`) obtained by dividing a
//! workspace point by a cell size.

use glam::{DVec2, IVec2, dvec2};

/// One of the two screen axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Dominant axis of a displacement: vertical iff |dy| is strictly
    /// greater than |dx|. Ties resolve to horizontal.
    pub fn dominant(delta: DVec2) -> Axis {
        if delta.y.abs() > delta.x.abs() {
            Axis::Vertical
        } else {
            Axis::Horizontal
        }
    }

    /// Component of `v` along this axis.
    #[inline]
    pub fn of(self, v: DVec2) -> f64 {
        match self {
            Axis::Horizontal => v.x,
            Axis::Vertical => v.y,
        }
    }

    /// Replace the component of `v` along this axis with `value`.
    #[inline]
    pub fn with(self, v: DVec2, value: f64) -> DVec2 {
        match self {
            Axis::Horizontal => dvec2(value, v.y),
            Axis::Vertical => dvec2(v.x, value),
        }
    }

    /// Unit step vector along this axis with the given sign.
    #[inline]
    pub fn step(self, sign: f64) -> DVec2 {
        match self {
            Axis::Horizontal => dvec2(sign, 0.0),
            Axis::Vertical => dvec2(0.0, sign),
        }
    }
}

/// Side of a node rectangle. Used for attachment point placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    North,
    East,
    South,
    West,
}

impl Side {
    /// Outward unit normal of this side (Y-down coordinates).
    pub fn normal(self) -> DVec2 {
        match self {
            Side::North => dvec2(0.0, -1.0),
            Side::East => dvec2(1.0, 0.0),
            Side::South => dvec2(0.0, 1.0),
            Side::West => dvec2(-1.0, 0.0),
        }
    }
}

/// Axis-aligned rectangle in workspace coordinates.
///
/// `min` is the top-left corner, `max` the bottom-right. An empty rectangle
/// (`min == max`) contains nothing and intersects nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: DVec2,
    pub max: DVec2,
}

impl Rect {
    /// Build a rectangle from a top-left origin and a size.
    pub fn from_origin_size(origin: DVec2, size: DVec2) -> Rect {
        Rect {
            min: origin,
            max: origin + size,
        }
    }

    /// Build a rectangle from two arbitrary corner points.
    pub fn from_corners(a: DVec2, b: DVec2) -> Rect {
        Rect {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    /// Midpoint of one side of the rectangle.
    pub fn side_midpoint(&self, side: Side) -> DVec2 {
        let c = self.center();
        match side {
            Side::North => dvec2(c.x, self.min.y),
            Side::East => dvec2(self.max.x, c.y),
            Side::South => dvec2(c.x, self.max.y),
            Side::West => dvec2(self.min.x, c.y),
        }
    }

    /// True if the two rectangles overlap with positive area.
    ///
    /// Rectangles that merely share an edge or a corner do not intersect;
    /// nodes in adjacent grid cells may touch.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// True if `p` lies strictly inside the rectangle (not on the border).
    pub fn contains_point_strict(&self, p: DVec2) -> bool {
        p.x > self.min.x && p.x < self.max.x && p.y > self.min.y && p.y < self.max.y
    }

    /// True if `p` lies inside the rectangle or on its border.
    pub fn contains_point(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// True if `other` lies strictly inside this rectangle: all four of its
    /// corners are strictly inside, none on the border.
    pub fn contains_rect_strict(&self, other: &Rect) -> bool {
        other.min.x > self.min.x
            && other.min.y > self.min.y
            && other.max.x < self.max.x
            && other.max.y < self.max.y
    }

    /// True if `other` lies fully inside this rectangle, borders allowed.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.min.x >= self.min.x
            && other.min.y >= self.min.y
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
    }

    /// Clamp a point into the rectangle (borders allowed).
    pub fn clamp_point(&self, p: DVec2) -> DVec2 {
        p.clamp(self.min, self.max)
    }

    /// Shrink the rectangle by `inset` on every side.
    pub fn inset(&self, inset: f64) -> Rect {
        Rect {
            min: self.min + DVec2::splat(inset),
            max: self.max - DVec2::splat(inset),
        }
    }

    /// Bounding rectangle of a point sequence. Returns `None` for an empty
    /// sequence.
    pub fn bounding(points: &[DVec2]) -> Option<Rect> {
        let (&first, rest) = points.split_first()?;
        let mut r = Rect {
            min: first,
            max: first,
        };
        for &p in rest {
            r.min = r.min.min(p);
            r.max = r.max.max(p);
        }
        Some(r)
    }
}

/// Snap a coordinate down to the nearest multiple of `unit` (grid floor).
#[inline]
pub fn snap_down(value: f64, unit: f64) -> f64 {
    (value / unit).floor() * unit
}

/// Snap a coordinate to the nearest multiple of `unit`.
#[inline]
pub fn snap_nearest(value: f64, unit: f64) -> f64 {
    (value / unit).round() * unit
}

/// Convert a workspace point to a grid cell: subtract `origin`, divide by
/// the cell size, truncate toward negative infinity.
pub fn cell_of(point: DVec2, origin: DVec2, cell_size: DVec2) -> IVec2 {
    IVec2::new(
        ((point.x - origin.x) / cell_size.x).floor() as i32,
        ((point.y - origin.y) / cell_size.y).floor() as i32,
    )
}
