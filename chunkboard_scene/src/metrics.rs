// Copyright 2025 the Chunkboard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text measurement.

use kurbo::{Point, Rect};

use crate::types::{Font, TextFlags};

/// Source of text bounding boxes.
///
/// The scene asks for a text item's box only when its text, font or flags
/// change; moves translate the cached box.
pub trait TextMetrics {
    /// Bounding box of `text` laid out with `font`, aligned to `anchor`
    /// according to `flags`.
    fn bounding_rect(&self, font: &Font, flags: TextFlags, text: &str, anchor: Point) -> Rect;
}

/// Fixed-ratio metrics: every character advances `advance * size` and every
/// line is `line_height * size` tall. Lines are separated by `'\n'`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ApproxMetrics {
    /// Horizontal advance per character, as a fraction of the font size.
    pub advance: f64,
    /// Line height, as a fraction of the font size.
    pub line_height: f64,
}

impl Default for ApproxMetrics {
    fn default() -> Self {
        Self {
            advance: 0.6,
            line_height: 1.2,
        }
    }
}

impl TextMetrics for ApproxMetrics {
    fn bounding_rect(&self, font: &Font, flags: TextFlags, text: &str, anchor: Point) -> Rect {
        let mut lines = 0_u32;
        let mut widest = 0_u32;
        for line in text.split('\n') {
            lines += 1;
            widest = widest.max(u32::try_from(line.chars().count()).unwrap_or(u32::MAX));
        }
        let w = f64::from(widest) * self.advance * font.size;
        let h = f64::from(lines) * self.line_height * font.size;
        align(anchor, w, h, flags)
    }
}

/// Place a `w × h` box relative to `anchor` per the alignment flags.
pub fn align(anchor: Point, w: f64, h: f64, flags: TextFlags) -> Rect {
    let x = if flags.contains(TextFlags::ALIGN_RIGHT) {
        anchor.x - w
    } else if flags.contains(TextFlags::ALIGN_HCENTER) {
        anchor.x - w / 2.0
    } else {
        anchor.x
    };
    let y = if flags.contains(TextFlags::ALIGN_BOTTOM) {
        anchor.y - h
    } else if flags.contains(TextFlags::ALIGN_VCENTER) {
        anchor.y - h / 2.0
    } else {
        anchor.y
    };
    Rect::new(x, y, x + w, y + h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_metrics_measure_widest_line() {
        let m = ApproxMetrics::default();
        let font = Font::new("mono", 10.0);
        let r = m.bounding_rect(&font, TextFlags::empty(), "ab\nabcd", Point::new(5.0, 5.0));
        assert_eq!(r, Rect::new(5.0, 5.0, 29.0, 29.0));
    }

    #[test]
    fn alignment_moves_box_around_anchor() {
        let a = Point::new(100.0, 50.0);
        assert_eq!(
            align(a, 20.0, 10.0, TextFlags::ALIGN_RIGHT | TextFlags::ALIGN_BOTTOM),
            Rect::new(80.0, 40.0, 100.0, 50.0)
        );
        assert_eq!(
            align(a, 20.0, 10.0, TextFlags::ALIGN_HCENTER | TextFlags::ALIGN_VCENTER),
            Rect::new(90.0, 45.0, 110.0, 55.0)
        );
    }
}
