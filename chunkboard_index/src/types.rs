// Copyright 2025 the Chunkboard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types: surface boxes and inclusive cell ranges.

/// Axis-aligned bounding box in surface coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2D {
    /// Minimum x (left)
    pub min_x: f64,
    /// Minimum y (top)
    pub min_y: f64,
    /// Maximum x (right)
    pub max_x: f64,
    /// Maximum y (bottom)
    pub max_y: f64,
}

impl Aabb2D {
    /// Create a new AABB from min/max corners.
    #[inline(always)]
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Create an AABB from origin and size.
    #[inline]
    pub fn from_xywh(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new(x, y, x + w, y + h)
    }

    /// A degenerate AABB covering a single point.
    #[inline]
    pub const fn from_point(x: f64, y: f64) -> Self {
        Self::new(x, y, x, y)
    }

    /// Whether this AABB contains the point. Edges are inclusive.
    #[inline]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.min_x <= x && self.min_y <= y && x <= self.max_x && y <= self.max_y
    }

    /// The intersection of two AABBs. May be inverted when they do not overlap.
    #[inline]
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        }
    }

    /// Determines whether this AABB overlaps with another in any way.
    ///
    /// The edge of the AABB is considered to be part of itself, meaning
    /// that two AABBs that share an edge are considered to overlap.
    ///
    /// # Examples
    ///
    /// ```
    /// use chunkboard_index::Aabb2D;
    ///
    /// let a = Aabb2D::new(0.0, 0.0, 10.0, 10.0);
    /// assert!(a.overlaps(&Aabb2D::new(10.0, 0.0, 20.0, 10.0)));
    /// assert!(!a.overlaps(&Aabb2D::new(11.0, 0.0, 20.0, 10.0)));
    /// ```
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// The smallest AABB enclosing two AABBs.
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Return true if min exceeds max on either axis.
    ///
    /// Zero-width and zero-height boxes are *not* inverted: a horizontal
    /// hairline still covers the cells it passes through.
    #[inline]
    pub fn is_inverted(&self) -> bool {
        self.max_x < self.min_x || self.max_y < self.min_y
    }

    /// Return true if the AABB has no area. Assumes no NaN.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max_x <= self.min_x || self.max_y <= self.min_y
    }
}

/// Inclusive range of chunk cells, `x0..=x1` by `y0..=y1`.
///
/// A range with `x1 < x0` or `y1 < y0` is empty.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// First column.
    pub x0: i32,
    /// First row.
    pub y0: i32,
    /// Last column (inclusive).
    pub x1: i32,
    /// Last row (inclusive).
    pub y1: i32,
}

impl CellRange {
    /// A range covering no cells.
    pub const EMPTY: Self = Self {
        x0: 0,
        y0: 0,
        x1: -1,
        y1: -1,
    };

    /// Create a range from inclusive corners.
    #[inline]
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Whether the range covers no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x1 < self.x0 || self.y1 < self.y0
    }

    /// Number of cells in the range.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        let w = usize::try_from(i64::from(self.x1) - i64::from(self.x0) + 1).unwrap_or(0);
        let h = usize::try_from(i64::from(self.y1) - i64::from(self.y0) + 1).unwrap_or(0);
        w.saturating_mul(h)
    }

    /// Whether the cell lies inside the range.
    #[inline]
    pub fn contains(&self, cx: i32, cy: i32) -> bool {
        self.x0 <= cx && cx <= self.x1 && self.y0 <= cy && cy <= self.y1
    }

    /// Iterate cells row by row (`y` outer, `x` inner).
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> + use<> {
        let Self { x0, y0, x1, y1 } = *self;
        (y0..=y1).flat_map(move |cy| (x0..=x1).map(move |cx| (cx, cy)))
    }
}

/// Map a surface coordinate to a cell coordinate along one axis, rounding
/// towards negative infinity and saturating at the `i32` range.
#[allow(
    clippy::cast_possible_truncation,
    reason = "Cell indices are intentionally i32; out-of-range values are saturated."
)]
#[inline]
pub fn cell_coord(value: f64, cell_size: f64) -> i32 {
    debug_assert!(cell_size > 0.0, "cell_size must be strictly positive");
    let t = value / cell_size;
    let coord = t as i32;

    // The cast truncates towards zero; step down for negative fractions.
    if t < 0.0 && f64::from(coord) > t {
        coord.saturating_sub(1)
    } else {
        coord
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn aabb_inverted_and_empty() {
        let mut aabb = Aabb2D::new(5., 7., 10., 9.);
        assert!(!aabb.is_empty());
        assert!(!aabb.is_inverted());

        // Zero-width boxes have no area but still cover cells.
        aabb.max_x = aabb.min_x;
        assert!(aabb.is_empty());
        assert!(!aabb.is_inverted());

        aabb.max_x = -aabb.max_x;
        assert!(aabb.is_empty());
        assert!(aabb.is_inverted());
    }

    #[test]
    fn disjoint_intersection_is_inverted() {
        let a = Aabb2D::new(0., 0., 10., 10.);
        let b = Aabb2D::new(20., 20., 30., 30.);
        assert!(a.intersect(&b).is_inverted());
        assert_eq!(a.union(&b), Aabb2D::new(0., 0., 30., 30.));
    }

    #[test]
    fn cell_range_iterates_row_major() {
        let r = CellRange::new(1, 2, 2, 3);
        let cells: Vec<_> = r.iter().collect();
        assert_eq!(cells, [(1, 2), (2, 2), (1, 3), (2, 3)]);
        assert_eq!(r.len(), 4);
        assert!(r.contains(2, 3));
        assert!(!r.contains(0, 3));
    }

    #[test]
    fn empty_cell_range_yields_nothing() {
        assert!(CellRange::EMPTY.is_empty());
        assert_eq!(CellRange::EMPTY.len(), 0);
        assert_eq!(CellRange::EMPTY.iter().count(), 0);
    }

    #[test]
    fn cell_coord_floors_negative_values() {
        assert_eq!(cell_coord(15.9, 16.0), 0);
        assert_eq!(cell_coord(16.0, 16.0), 1);
        assert_eq!(cell_coord(-0.5, 16.0), -1);
        assert_eq!(cell_coord(-16.0, 16.0), -1);
        assert_eq!(cell_coord(-16.5, 16.0), -2);
    }

    #[test]
    fn cell_coord_saturates() {
        assert_eq!(cell_coord(1e20, 1.0), i32::MAX);
        assert_eq!(cell_coord(-1e20, 1.0), i32::MIN);
    }

    #[test]
    fn cell_coord_is_monotonic() {
        for value in [i32::MIN as f64, -1., 0., 1., i32::MAX as f64] {
            assert!(cell_coord(value.next_down(), 1.0) <= cell_coord(value, 1.0));
            assert!(cell_coord(value, 1.0) <= cell_coord(value.next_up(), 1.0));
        }
    }
}
