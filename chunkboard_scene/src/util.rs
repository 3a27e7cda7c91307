// Copyright 2025 the Chunkboard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use chunkboard_index::Aabb2D;
use kurbo::{Affine, Rect};

/// Transform an axis-aligned `Rect` by an `Affine` and return a conservative
/// axis-aligned bounding box in view space.
pub(crate) fn transform_rect_bbox(affine: Affine, rect: Rect) -> Rect {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    let min_x = (a * rect.x0).min(a * rect.x1) + (c * rect.y0).min(c * rect.y1);
    let max_x = (a * rect.x0).max(a * rect.x1) + (c * rect.y0).max(c * rect.y1);
    let min_y = (b * rect.x0).min(b * rect.x1) + (d * rect.y0).min(d * rect.y1);
    let max_y = (b * rect.x0).max(b * rect.x1) + (d * rect.y0).max(d * rect.y1);
    Rect::new(min_x + e, min_y + f, max_x + e, max_y + f)
}

pub(crate) fn rect_to_aabb(r: Rect) -> Aabb2D {
    Aabb2D::new(r.x0, r.y0, r.x1, r.y1)
}

pub(crate) fn aabb_to_rect(a: Aabb2D) -> Rect {
    Rect::new(a.min_x, a.min_y, a.max_x, a.max_y)
}

pub(crate) fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Least common multiple, saturating. `lcm(0, n) == 0`.
pub(crate) fn lcm(a: u32, b: u32) -> u32 {
    if a == 0 || b == 0 {
        return 0;
    }
    (a / gcd(a, b)).saturating_mul(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lcm_of_tile_sizes() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(lcm(12, 18), 36);
        assert_eq!(lcm(16, 16), 16);
        assert_eq!(lcm(0, 16), 0);
    }

    #[test]
    fn scaled_rect_bbox() {
        let r = transform_rect_bbox(
            Affine::scale(2.0).then_translate((10.0, 0.0).into()),
            Rect::new(0.0, 0.0, 5.0, 5.0),
        );
        assert_eq!(r, Rect::new(10.0, 0.0, 20.0, 10.0));
    }
}
