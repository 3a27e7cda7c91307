// Copyright 2025 the Chunkboard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Filled-polygon predicates under the non-zero winding rule.
//!
//! Polygons are given as closed vertex lists: the last vertex connects back
//! to the first. Boundaries count as part of the filled region, so shapes
//! that merely touch are reported as intersecting.

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect, Vec2};

/// Twice the signed area of triangle `(o, a, b)`; positive when `b` lies to
/// the left of `o → a`.
#[inline]
fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// `p` is collinear with `a → b`; check it falls within the segment's box.
#[inline]
fn within(a: Point, b: Point, p: Point) -> bool {
    a.x.min(b.x) <= p.x && p.x <= a.x.max(b.x) && a.y.min(b.y) <= p.y && p.y <= a.y.max(b.y)
}

fn edges(poly: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    let n = poly.len();
    (0..n).map(move |i| (poly[i], poly[(i + 1) % n]))
}

/// Whether `p` lies on the closed segment `a → b`.
pub fn point_on_segment(p: Point, a: Point, b: Point) -> bool {
    cross(a, b, p) == 0.0 && within(a, b, p)
}

/// Whether the closed segments `a1 → a2` and `b1 → b2` share at least one point.
pub fn segments_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let d1 = cross(b1, b2, a1);
    let d2 = cross(b1, b2, a2);
    let d3 = cross(a1, a2, b1);
    let d4 = cross(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && within(b1, b2, a1))
        || (d2 == 0.0 && within(b1, b2, a2))
        || (d3 == 0.0 && within(a1, a2, b1))
        || (d4 == 0.0 && within(a1, a2, b2))
}

/// Winding number of `poly` around `p`. Zero means outside under the
/// non-zero rule. Points exactly on the boundary may report either value.
pub fn winding_number(poly: &[Point], p: Point) -> i32 {
    let mut wn = 0;
    for (a, b) in edges(poly) {
        if a.y <= p.y {
            if b.y > p.y && cross(a, b, p) > 0.0 {
                wn += 1;
            }
        } else if b.y <= p.y && cross(a, b, p) < 0.0 {
            wn -= 1;
        }
    }
    wn
}

/// Whether `p` lies in the filled region of `poly`, boundary included.
pub fn point_in_polygon(poly: &[Point], p: Point) -> bool {
    if poly.is_empty() {
        return false;
    }
    edges(poly).any(|(a, b)| point_on_segment(p, a, b)) || winding_number(poly, p) != 0
}

/// Bounding box of a vertex list, or `None` when it is empty.
pub fn bounds(poly: &[Point]) -> Option<Rect> {
    let (first, rest) = poly.split_first()?;
    Some(
        rest.iter()
            .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p)),
    )
}

/// Whether the filled regions of two polygons intersect.
///
/// Either polygon may be degenerate (a single point or a segment). Empty
/// polygons intersect nothing.
pub fn polygons_intersect(a: &[Point], b: &[Point]) -> bool {
    let (Some(ba), Some(bb)) = (bounds(a), bounds(b)) else {
        return false;
    };
    if ba.x1 < bb.x0 || bb.x1 < ba.x0 || ba.y1 < bb.y0 || bb.y1 < ba.y0 {
        return false;
    }

    for (a1, a2) in edges(a) {
        for (b1, b2) in edges(b) {
            if segments_intersect(a1, a2, b1, b2) {
                return true;
            }
        }
    }

    // No boundary crossing: either one contains the other, or they are apart.
    point_in_polygon(b, a[0]) || point_in_polygon(a, b[0])
}

/// Push every edge of a convex polygon outward by `distance`.
///
/// Vertices move along the miter between their two edges, so each new edge
/// is parallel to the old one at exactly `distance`. Works for either
/// winding; polygons with fewer than three vertices are returned as is.
pub fn outset_convex(poly: &[Point], distance: f64) -> Vec<Point> {
    let n = poly.len();
    if n < 3 {
        return poly.to_vec();
    }
    let area2: f64 = edges(poly).map(|(a, b)| a.x * b.y - b.x * a.y).sum();
    let sign = if area2 < 0.0 { -1.0 } else { 1.0 };
    let normal = |a: Point, b: Point| {
        let d = b - a;
        let len = d.hypot();
        if len == 0.0 {
            Vec2::ZERO
        } else {
            Vec2::new(d.y, -d.x) * (sign / len)
        }
    };
    (0..n)
        .map(|i| {
            let (prev, cur, next) = (poly[(i + n - 1) % n], poly[i], poly[(i + 1) % n]);
            let n1 = normal(prev, cur);
            let n2 = normal(cur, next);
            let k = 1.0 + n1.dot(n2);
            if k <= f64::EPSILON {
                cur + n1 * distance
            } else {
                cur + (n1 + n2) * (distance / k)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn square(x: f64, y: f64, s: f64) -> Vec<Point> {
        [(x, y), (x + s, y), (x + s, y + s), (x, y + s)]
            .into_iter()
            .map(Point::from)
            .collect()
    }

    #[test]
    fn crossing_and_parallel_segments() {
        let o = Point::ORIGIN;
        assert!(segments_intersect(
            o,
            Point::new(10., 10.),
            Point::new(0., 10.),
            Point::new(10., 0.)
        ));
        assert!(!segments_intersect(
            o,
            Point::new(10., 0.),
            Point::new(0., 1.),
            Point::new(10., 1.)
        ));
    }

    #[test]
    fn collinear_segments_touch_at_endpoint() {
        let a1 = Point::new(0., 0.);
        let a2 = Point::new(5., 0.);
        assert!(segments_intersect(a1, a2, Point::new(5., 0.), Point::new(9., 0.)));
        assert!(!segments_intersect(a1, a2, Point::new(6., 0.), Point::new(9., 0.)));
    }

    #[test]
    fn winding_counts_orientation() {
        let sq = square(0., 0., 10.);
        assert_eq!(winding_number(&sq, Point::new(5., 5.)).abs(), 1);
        assert_eq!(winding_number(&sq, Point::new(15., 5.)), 0);
    }

    #[test]
    fn nonzero_rule_fills_overlapping_loops() {
        // Two loops of the same orientation around a shared centre.
        let mut twice = square(0., 0., 10.);
        twice.extend(square(0., 0., 10.));
        assert!(point_in_polygon(&twice, Point::new(5., 5.)));
    }

    #[test]
    fn boundary_points_are_inside() {
        let sq = square(0., 0., 10.);
        assert!(point_in_polygon(&sq, Point::new(10., 5.)));
        assert!(point_in_polygon(&sq, Point::new(0., 0.)));
        assert!(!point_in_polygon(&sq, Point::new(10.01, 5.)));
        assert!(!point_in_polygon(&[], Point::ORIGIN));
    }

    #[test]
    fn containment_without_edge_crossing() {
        let outer = square(0., 0., 100.);
        let inner = square(40., 40., 10.);
        assert!(polygons_intersect(&outer, &inner));
        assert!(polygons_intersect(&inner, &outer));
    }

    #[test]
    fn disjoint_and_touching_polygons() {
        let a = square(0., 0., 10.);
        assert!(!polygons_intersect(&a, &square(20., 0., 10.)));
        assert!(polygons_intersect(&a, &square(10., 0., 10.)));
        assert!(!polygons_intersect(&a, &[]));
    }

    #[test]
    fn bounding_box_rejects_near_miss_triangle() {
        let tri = [Point::new(0., 0.), Point::new(10., 0.), Point::new(0., 10.)];
        // Inside the triangle's bbox but beyond its hypotenuse.
        let corner = square(8., 8., 1.);
        assert!(!polygons_intersect(&tri, &corner));
    }

    #[test]
    fn outset_moves_edges_out_for_either_winding() {
        let grown = [
            Point::new(-1., -1.),
            Point::new(11., -1.),
            Point::new(11., 11.),
            Point::new(-1., 11.),
        ];
        let sq = square(0., 0., 10.);
        assert_eq!(outset_convex(&sq, 1.), grown);

        let mut reversed = sq.clone();
        reversed.reverse();
        let mut expected = grown.to_vec();
        expected.reverse();
        assert_eq!(outset_convex(&reversed, 1.), expected);

        let seg = [Point::new(0., 0.), Point::new(5., 0.)];
        assert_eq!(outset_convex(&seg, 1.), seg);
    }
}
