// Copyright 2025 the Chunkboard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chunkboard Collide: pairwise collision tests between item outlines.
//!
//! Each item reduces to a [`Collider`], a closed set of geometric kinds.
//! [`collide`] picks the cheapest test that is still exact for the pair:
//!
//! - two boxes compare their rectangles,
//! - two disks compare centre distance against the radius sum,
//! - a point is tested for containment in the other side,
//! - anything else falls back to filled-polygon intersection (see
//!   [`polygon`]).
//!
//! The result never depends on argument order.
//!
//! # Example
//!
//! ```rust
//! use chunkboard_collide::{Collider, collide};
//! use kurbo::{Circle, Rect};
//!
//! let a = Collider::Disk(Circle::new((0.0, 0.0), 10.0));
//! let b = Collider::Disk(Circle::new((15.0, 0.0), 10.0));
//! assert!(collide(&a, &b));
//!
//! let r = Collider::Box(Rect::new(30.0, -5.0, 40.0, 5.0));
//! assert!(!collide(&a, &r));
//! assert_eq!(collide(&a, &r), collide(&r, &a));
//! ```

#![no_std]

extern crate alloc;

use alloc::borrow::Cow;
use alloc::vec::Vec;

use kurbo::{Circle, PathEl, Point, Rect, Shape};

pub mod polygon;

/// Tolerance used when flattening curved outlines into polygons.
///
/// Curves are first approximated by cubics and then by line segments, each
/// step within this tolerance. Plain flattening therefore leaves chords up to
/// twice the tolerance inside the curve; [`flatten_covering`] compensates.
pub const FLATTEN_TOLERANCE: f64 = 0.1;

/// Collision geometry of one item.
#[derive(Clone, Debug, PartialEq)]
pub enum Collider {
    /// A single point.
    Point(Point),
    /// An axis-aligned box, edges included.
    Box(Rect),
    /// A filled circle.
    Disk(Circle),
    /// A filled polygon (non-zero winding), closed implicitly.
    Area(Vec<Point>),
}

impl Collider {
    /// Whether `pt` lies inside this collider, boundary included.
    pub fn contains_point(&self, pt: Point) -> bool {
        match self {
            Self::Point(p) => *p == pt,
            Self::Box(r) => r.x0 <= pt.x && pt.x <= r.x1 && r.y0 <= pt.y && pt.y <= r.y1,
            Self::Disk(c) => (pt - c.center).hypot2() <= c.radius * c.radius,
            Self::Area(pts) => polygon::point_in_polygon(pts, pt),
        }
    }

    /// Axis-aligned bounds, or `None` for an empty area.
    pub fn bounding_box(&self) -> Option<Rect> {
        match self {
            Self::Point(p) => Some(Rect::from_points(*p, *p)),
            Self::Box(r) => Some(*r),
            Self::Disk(c) => Some(c.bounding_box()),
            Self::Area(pts) => polygon::bounds(pts),
        }
    }

    /// The collider as a closed polygon.
    ///
    /// Disks are flattened with [`flatten_covering`], so shapes touching the
    /// circle still meet the outline.
    pub fn outline(&self) -> Cow<'_, [Point]> {
        match self {
            Self::Point(p) => Cow::Owned(alloc::vec![*p]),
            Self::Box(r) => Cow::Owned(alloc::vec![
                Point::new(r.x0, r.y0),
                Point::new(r.x1, r.y0),
                Point::new(r.x1, r.y1),
                Point::new(r.x0, r.y1),
            ]),
            Self::Disk(c) => Cow::Owned(flatten_covering(c, FLATTEN_TOLERANCE)),
            Self::Area(pts) => Cow::Borrowed(pts),
        }
    }
}

/// Flatten the first subpath of `shape` into a vertex list.
pub fn flatten_shape(shape: &impl Shape, tolerance: f64) -> Vec<Point> {
    let mut out = Vec::new();
    let mut closed = false;
    kurbo::flatten(shape.path_elements(tolerance), tolerance, |el| {
        if closed {
            return;
        }
        match el {
            PathEl::MoveTo(p) if out.is_empty() => out.push(p),
            PathEl::MoveTo(_) | PathEl::ClosePath => closed = true,
            PathEl::LineTo(p) => out.push(p),
            // `flatten` only emits lines.
            PathEl::QuadTo(..) | PathEl::CurveTo(..) => {}
        }
    });
    // Drop a duplicated closing vertex.
    if out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

/// Flatten a convex shape into a polygon that contains it.
///
/// The flattened outline is pushed out by twice `tolerance`, covering the
/// chords that cut inside the curve. The excess is at most a few tolerances.
pub fn flatten_covering(shape: &impl Shape, tolerance: f64) -> Vec<Point> {
    polygon::outset_convex(&flatten_shape(shape, tolerance), 2.0 * tolerance)
}

/// Whether two colliders overlap. Symmetric in its arguments.
pub fn collide(a: &Collider, b: &Collider) -> bool {
    match (a, b) {
        (Collider::Box(r1), Collider::Box(r2)) => {
            r1.x0 <= r2.x1 && r2.x0 <= r1.x1 && r1.y0 <= r2.y1 && r2.y0 <= r1.y1
        }
        (Collider::Disk(c1), Collider::Disk(c2)) => {
            let reach = c1.radius + c2.radius;
            (c1.center - c2.center).hypot2() <= reach * reach
        }
        (Collider::Point(p), other) | (other, Collider::Point(p)) => other.contains_point(*p),
        _ => polygon::polygons_intersect(&a.outline(), &b.outline()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    #[cfg(not(feature = "std"))]
    use kurbo::common::FloatFuncs as _;

    fn samples() -> Vec<Collider> {
        vec![
            Collider::Point(Point::new(5.0, 5.0)),
            Collider::Point(Point::new(100.0, 100.0)),
            Collider::Box(Rect::new(0.0, 0.0, 10.0, 10.0)),
            Collider::Box(Rect::new(12.0, 0.0, 20.0, 4.0)),
            Collider::Disk(Circle::new((10.0, 10.0), 4.0)),
            Collider::Disk(Circle::new((40.0, 40.0), 3.0)),
            Collider::Area(vec![
                Point::new(8.0, 2.0),
                Point::new(16.0, 2.0),
                Point::new(12.0, 9.0),
            ]),
            Collider::Area(vec![]),
        ]
    }

    #[test]
    fn collide_is_symmetric_for_every_pair() {
        let all = samples();
        for a in &all {
            for b in &all {
                assert_eq!(collide(a, b), collide(b, a), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn equal_circles_overlap_then_separate() {
        let a = Collider::Disk(Circle::new((0.0, 0.0), 10.0));
        assert!(collide(&a, &Collider::Disk(Circle::new((15.0, 0.0), 10.0))));
        assert!(!collide(&a, &Collider::Disk(Circle::new((25.0, 0.0), 10.0))));
    }

    #[test]
    fn touching_boxes_collide() {
        let a = Collider::Box(Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = Collider::Box(Rect::new(10.0, 10.0, 20.0, 20.0));
        assert!(collide(&a, &b));
    }

    #[test]
    fn disk_against_box_uses_outline() {
        let d = Collider::Disk(Circle::new((0.0, 0.0), 10.0));
        // The box corner sits within the disk's bounding square but outside the disk.
        let corner = Collider::Box(Rect::new(8.0, 8.0, 12.0, 12.0));
        assert!(!collide(&d, &corner));
        let edge = Collider::Box(Rect::new(9.0, -1.0, 12.0, 1.0));
        assert!(collide(&d, &edge));
    }

    #[test]
    fn point_containment() {
        let tri = Collider::Area(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ]);
        assert!(collide(&tri, &Collider::Point(Point::new(2.0, 2.0))));
        assert!(!collide(&Collider::Point(Point::new(8.0, 8.0)), &tri));
    }

    #[test]
    fn empty_area_collides_with_nothing() {
        let empty = Collider::Area(vec![]);
        for other in samples() {
            assert!(!collide(&empty, &other));
        }
        assert_eq!(empty.bounding_box(), None);
    }

    #[test]
    fn flattened_disk_is_closed_ring() {
        let pts = flatten_shape(&Circle::new((0.0, 0.0), 10.0), FLATTEN_TOLERANCE);
        assert!(pts.len() > 8);
        for p in &pts {
            let d2 = p.to_vec2().hypot2();
            assert!((90.0..=110.0).contains(&d2), "{p:?} is off the circle");
        }
    }

    #[test]
    fn box_touching_disk_off_axis_collides() {
        let d = Collider::Disk(Circle::new((0.0, 0.0), 10.0));
        // Corner on the circle at 30 degrees, where no outline vertex sits.
        let touching = Collider::Box(Rect::new(8.660254037844387, 5.0, 20.0, 20.0));
        assert!(collide(&d, &touching));
        assert!(collide(&touching, &d));
        // One unit further out along the same ray.
        let apart = Collider::Box(Rect::new(9.526279441628825, 5.5, 20.0, 20.0));
        assert!(!collide(&d, &apart));
    }

    #[test]
    fn covering_outline_contains_the_circle() {
        let c = Circle::new((0.0, 0.0), 10.0);
        let pts = flatten_covering(&c, FLATTEN_TOLERANCE);
        for i in 0..36 {
            let a = f64::from(i) * core::f64::consts::PI / 18.0;
            let on_circle = Point::new(10.0 * a.cos(), 10.0 * a.sin());
            assert!(
                polygon::point_in_polygon(&pts, on_circle),
                "{on_circle:?} escapes the outline"
            );
        }
        for p in &pts {
            assert!(p.to_vec2().hypot2() <= 11.0 * 11.0, "{p:?} strays too far");
        }
    }
}
