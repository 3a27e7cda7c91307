// Copyright 2025 the Chunkboard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Items and their geometry.

use alloc::string::String;
use alloc::vec::Vec;

use chunkboard_collide::{Collider, FLATTEN_TOLERANCE, flatten_covering, flatten_shape, polygon};
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Circle, Ellipse, Point, Rect, Size, Vec2};
use peniko::Color;

use crate::metrics::TextMetrics;
use crate::types::{Fill, Font, ItemFlags, ItemKind, Pen, TextFlags};

/// Text content with its cached bounding box.
#[derive(Clone, Debug, PartialEq)]
pub struct TextShape {
    text: String,
    font: Font,
    flags: TextFlags,
    color: Color,
    bounds: Rect,
}

impl TextShape {
    /// The string.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The font.
    pub fn font(&self) -> &Font {
        &self.font
    }

    /// Alignment flags.
    pub fn flags(&self) -> TextFlags {
        self.flags
    }

    /// Text colour.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Cached bounding box in surface coordinates.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }
}

/// Variant-specific geometry of an [`Item`].
///
/// Line endpoints and polygon vertices are relative to the item position.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Segment from `from` to `to`.
    Line {
        /// Start point, relative to the item position.
        from: Point,
        /// End point, relative to the item position.
        to: Point,
    },
    /// Rectangle with its top-left corner at the item position.
    Rect {
        /// Width and height.
        size: Size,
    },
    /// Ellipse inscribed in a rectangle at the item position.
    Ellipse {
        /// Width and height of the enclosing rectangle.
        size: Size,
        /// Start angle in degrees.
        start_angle: f64,
        /// Sweep in degrees; a magnitude of 360 or more is a full ellipse.
        sweep_angle: f64,
    },
    /// Closed polygon.
    Polygon(Vec<Point>),
    /// Text anchored at the item position.
    Text(TextShape),
}

/// One drawable entity.
///
/// Items are built detached and handed to [`Scene::insert`](crate::Scene::insert).
/// While attached, all mutation goes through the scene so that chunk
/// membership follows the geometry.
///
/// New items are hidden; use [`Item::with_visible`] or
/// [`Scene::show`](crate::Scene::show).
#[derive(Clone, Debug)]
pub struct Item {
    pos: Point,
    z: f64,
    flags: ItemFlags,
    pen: Pen,
    fill: Fill,
    shape: Shape,
}

impl Item {
    fn new(pos: Point, shape: Shape) -> Self {
        Self {
            pos,
            z: 0.0,
            flags: ItemFlags::default(),
            pen: Pen::DEFAULT,
            fill: Fill::None,
            shape,
        }
    }

    /// A rectangle covering `rect`.
    pub fn rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(rect.origin(), Shape::Rect { size: rect.size() })
    }

    /// A full ellipse inscribed in `rect`.
    pub fn ellipse(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(
            rect.origin(),
            Shape::Ellipse {
                size: rect.size(),
                start_angle: 0.0,
                sweep_angle: 360.0,
            },
        )
    }

    /// A segment between two surface points.
    pub fn line(from: Point, to: Point) -> Self {
        Self::new(Point::ORIGIN, Shape::Line { from, to })
    }

    /// A polygon through the given surface points.
    pub fn polygon(points: impl Into<Vec<Point>>) -> Self {
        Self::new(Point::ORIGIN, Shape::Polygon(points.into()))
    }

    /// Text anchored at `anchor`, measured once with `metrics`.
    pub fn text(
        text: impl Into<String>,
        font: Font,
        anchor: Point,
        metrics: &dyn TextMetrics,
    ) -> Self {
        let text = text.into();
        let flags = TextFlags::empty();
        let bounds = metrics.bounding_rect(&font, flags, &text, anchor);
        Self::new(
            anchor,
            Shape::Text(TextShape {
                text,
                font,
                flags,
                color: Color::BLACK,
                bounds,
            }),
        )
    }

    /// Set the stacking order.
    pub fn with_z(mut self, z: f64) -> Self {
        self.z = z;
        self
    }

    /// Set the outline style.
    pub fn with_pen(mut self, pen: Pen) -> Self {
        self.pen = pen;
        self
    }

    /// Set the interior style.
    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = fill;
        self
    }

    /// Set the visibility flag.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.flags.set(ItemFlags::VISIBLE, visible);
        self
    }

    /// Set the ellipse angles, in degrees. Ignored for other variants.
    pub fn with_angles(mut self, start: f64, sweep: f64) -> Self {
        self.set_angles(start, sweep);
        self
    }

    /// Set the text colour. Ignored for other variants.
    pub fn with_text_color(mut self, color: Color) -> Self {
        if let Shape::Text(t) = &mut self.shape {
            t.color = color;
        }
        self
    }

    /// Position (top-left anchor, or line/polygon origin).
    pub fn pos(&self) -> Point {
        self.pos
    }

    /// Horizontal position.
    pub fn x(&self) -> f64 {
        self.pos.x
    }

    /// Vertical position.
    pub fn y(&self) -> f64 {
        self.pos.y
    }

    /// Stacking order; higher draws on top.
    pub fn z(&self) -> f64 {
        self.z
    }

    /// State flags.
    pub fn flags(&self) -> ItemFlags {
        self.flags
    }

    /// Whether the item is visible.
    pub fn is_visible(&self) -> bool {
        self.flags.contains(ItemFlags::VISIBLE)
    }

    /// Whether the item is selected.
    pub fn is_selected(&self) -> bool {
        self.flags.contains(ItemFlags::SELECTED)
    }

    /// Whether the item is enabled.
    pub fn is_enabled(&self) -> bool {
        self.flags.contains(ItemFlags::ENABLED)
    }

    /// Whether the item is active.
    pub fn is_active(&self) -> bool {
        self.flags.contains(ItemFlags::ACTIVE)
    }

    /// Outline style.
    pub fn pen(&self) -> Pen {
        self.pen
    }

    /// Interior style.
    pub fn fill(&self) -> Fill {
        self.fill
    }

    /// Variant geometry.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Variant tag.
    pub fn kind(&self) -> ItemKind {
        match self.shape {
            Shape::Line { .. } => ItemKind::Line,
            Shape::Rect { .. } => ItemKind::Rect,
            Shape::Ellipse { .. } => ItemKind::Ellipse,
            Shape::Polygon(_) => ItemKind::Polygon,
            Shape::Text(_) => ItemKind::Text,
        }
    }

    /// Stroke allowance added around rectangles and ellipses: half the pen
    /// width rounded up, at least one unit, and zero without a pen.
    pub fn pen_margin(&self) -> f64 {
        match self.pen.width() {
            None => 0.0,
            Some(w) => (w / 2.0).ceil().max(1.0),
        }
    }

    fn margin_rect(&self, size: Size) -> Rect {
        Rect::from_origin_size(self.pos, size).inflate(self.pen_margin(), self.pen_margin())
    }

    /// Outline polygon covering everything the item draws, in surface
    /// coordinates.
    pub fn area_points(&self) -> Vec<Point> {
        match &self.shape {
            Shape::Rect { size } => {
                let r = self.margin_rect(*size);
                alloc::vec![
                    Point::new(r.x0, r.y0),
                    Point::new(r.x1, r.y0),
                    Point::new(r.x1, r.y1),
                    Point::new(r.x0, r.y1),
                ]
            }
            Shape::Ellipse { size, .. } => flatten_shape(
                &Ellipse::from_rect(self.margin_rect(*size)),
                FLATTEN_TOLERANCE,
            ),
            Shape::Line { from, to } => self.line_area(*from, *to),
            Shape::Polygon(points) => points.iter().map(|p| *p + self.pos.to_vec2()).collect(),
            Shape::Text(t) => {
                let r = t.bounds;
                alloc::vec![
                    Point::new(r.x0, r.y0),
                    Point::new(r.x1, r.y0),
                    Point::new(r.x1, r.y1),
                    Point::new(r.x0, r.y1),
                ]
            }
        }
    }

    /// A quadrilateral around the segment. Shallow diagonals (aspect ratio
    /// below 3:2) get a parallelogram so their corners are not clipped.
    fn line_area(&self, from: Point, to: Point) -> Vec<Point> {
        let w = self.pen.width().unwrap_or(0.0) * 4.0 / 3.0 + 2.0;
        let (x1, y1) = (from.x + self.pos.x, from.y + self.pos.y);
        let (x2, y2) = (to.x + self.pos.x, to.y + self.pos.y);
        let dx = (x1 - x2).abs();
        let dy = (y1 - y2).abs();
        let px = if x1 < x2 { -w } else { w };
        let py = if y1 < y2 { -w } else { w };

        let diagonal = dx != 0.0
            && dy != 0.0
            && if dx > dy {
                2.0 * dx < 3.0 * dy
            } else {
                2.0 * dy < 3.0 * dx
            };

        let quad = if diagonal {
            if px == py {
                [
                    (x1, y1 + py),
                    (x2 - px, y2),
                    (x2, y2 - py),
                    (x1 + px, y1),
                ]
            } else {
                [
                    (x1 + px, y1),
                    (x2, y2 - py),
                    (x2 - px, y2),
                    (x1, y1 + py),
                ]
            }
        } else if dx > dy {
            [
                (x1 + px, y1 + py),
                (x2 - px, y2 + py),
                (x2 - px, y2 - py),
                (x1 + px, y1 - py),
            ]
        } else {
            [
                (x1 + px, y1 + py),
                (x2 + px, y2 - py),
                (x2 - px, y2 - py),
                (x1 - px, y1 + py),
            ]
        };
        quad.into_iter().map(Point::from).collect()
    }

    /// Axis-aligned box covering the item's visible extent, stroke included.
    ///
    /// `None` only for a polygon without vertices.
    pub fn bounding_rect(&self) -> Option<Rect> {
        match &self.shape {
            Shape::Rect { size } | Shape::Ellipse { size, .. } => Some(self.margin_rect(*size)),
            Shape::Text(t) => Some(t.bounds),
            Shape::Line { .. } | Shape::Polygon(_) => polygon::bounds(&self.area_points()),
        }
    }

    /// Collision geometry, choosing the cheapest exact representation.
    pub fn collider(&self) -> Collider {
        match &self.shape {
            Shape::Rect { size } => Collider::Box(self.margin_rect(*size)),
            Shape::Text(t) => Collider::Box(t.bounds),
            Shape::Ellipse {
                size, sweep_angle, ..
            } if size.width == size.height && sweep_angle.abs() >= 360.0 => {
                let center = self.pos + size.to_vec2() / 2.0;
                Collider::Disk(Circle::new(center, size.width / 2.0))
            }
            Shape::Ellipse { size, .. } => Collider::Area(flatten_covering(
                &Ellipse::from_rect(self.margin_rect(*size)),
                FLATTEN_TOLERANCE,
            )),
            Shape::Line { .. } | Shape::Polygon(_) => Collider::Area(self.area_points()),
        }
    }

    pub(crate) fn flags_mut(&mut self) -> &mut ItemFlags {
        &mut self.flags
    }

    pub(crate) fn set_z(&mut self, z: f64) {
        self.z = z;
    }

    pub(crate) fn set_pen(&mut self, pen: Pen) {
        self.pen = pen;
    }

    pub(crate) fn set_fill(&mut self, fill: Fill) {
        self.fill = fill;
    }

    /// Move by `delta`. Text translates its cached box instead of
    /// measuring again.
    pub(crate) fn translate(&mut self, delta: Vec2) {
        self.pos += delta;
        if let Shape::Text(t) = &mut self.shape {
            t.bounds = t.bounds + delta;
        }
    }

    pub(crate) fn set_size(&mut self, new: Size) {
        if let Shape::Rect { size } | Shape::Ellipse { size, .. } = &mut self.shape {
            *size = new;
        }
    }

    pub(crate) fn set_angles(&mut self, start: f64, sweep: f64) {
        if let Shape::Ellipse {
            start_angle,
            sweep_angle,
            ..
        } = &mut self.shape
        {
            *start_angle = start;
            *sweep_angle = sweep;
        }
    }

    /// Place the segment between two surface points.
    pub(crate) fn set_line_points(&mut self, p1: Point, p2: Point) {
        let origin = self.pos.to_vec2();
        if let Shape::Line { from, to } = &mut self.shape {
            *from = p1 - origin;
            *to = p2 - origin;
        }
    }

    /// Replace the vertices with surface points.
    pub(crate) fn set_polygon_points(&mut self, points: &[Point]) {
        let origin = self.pos.to_vec2();
        if let Shape::Polygon(pts) = &mut self.shape {
            pts.clear();
            pts.extend(points.iter().map(|p| *p - origin));
        }
    }

    /// Edit the text attributes and measure again.
    pub(crate) fn edit_text(&mut self, metrics: &dyn TextMetrics, f: impl FnOnce(&mut TextShape)) {
        let anchor = self.pos;
        if let Shape::Text(t) = &mut self.shape {
            f(t);
            t.bounds = metrics.bounding_rect(&t.font, t.flags, &t.text, anchor);
        }
    }

    pub(crate) fn set_text_color(&mut self, color: Color) {
        if let Shape::Text(t) = &mut self.shape {
            t.color = color;
        }
    }
}

impl TextShape {
    pub(crate) fn set_text(&mut self, text: String) {
        self.text = text;
    }

    pub(crate) fn set_font(&mut self, font: Font) {
        self.font = font;
    }

    pub(crate) fn set_flags(&mut self, flags: TextFlags) {
        self.flags = flags;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ApproxMetrics;

    fn solid(width: f64) -> Pen {
        Pen::Solid {
            width,
            color: Color::BLACK,
        }
    }

    #[test]
    fn rect_bounds_include_pen_margin() {
        let item = Item::rect(Rect::new(10.0, 10.0, 30.0, 30.0)).with_pen(solid(2.0));
        assert_eq!(item.bounding_rect(), Some(Rect::new(9.0, 9.0, 31.0, 31.0)));

        // Odd widths round up; hairlines still get one unit.
        let item = item.with_pen(solid(3.0));
        assert_eq!(item.pen_margin(), 2.0);
        let item = item.with_pen(solid(0.0));
        assert_eq!(item.pen_margin(), 1.0);
        let item = item.with_pen(Pen::None);
        assert_eq!(item.bounding_rect(), Some(Rect::new(10.0, 10.0, 30.0, 30.0)));
    }

    #[test]
    fn horizontal_line_area_is_a_box() {
        let item = Item::line(Point::new(0.0, 10.0), Point::new(100.0, 10.0)).with_pen(solid(3.0));
        // 3 * 4 / 3 + 2 = 6 units either side.
        assert_eq!(
            item.bounding_rect(),
            Some(Rect::new(-6.0, 4.0, 106.0, 16.0))
        );
    }

    #[test]
    fn shallow_diagonal_gets_parallelogram() {
        let item = Item::line(Point::new(0.0, 0.0), Point::new(10.0, 8.0)).with_pen(Pen::None);
        let pts = item.area_points();
        assert_eq!(
            pts,
            [
                Point::new(0.0, -2.0),
                Point::new(12.0, 8.0),
                Point::new(10.0, 10.0),
                Point::new(-2.0, 0.0),
            ]
        );
    }

    #[test]
    fn polygon_follows_position() {
        let mut item =
            Item::polygon([Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(0.0, 4.0)]);
        item.translate(Vec2::new(10.0, 20.0));
        assert_eq!(item.bounding_rect(), Some(Rect::new(10.0, 20.0, 14.0, 24.0)));
        assert_eq!(Item::polygon(Vec::new()).bounding_rect(), None);
    }

    #[test]
    fn circular_ellipse_becomes_disk() {
        let e = Item::ellipse(Rect::new(-10.0, -10.0, 10.0, 10.0));
        assert_eq!(e.collider(), Collider::Disk(Circle::new((0.0, 0.0), 10.0)));

        let pie = e.clone().with_angles(0.0, 90.0);
        assert!(matches!(pie.collider(), Collider::Area(_)));

        let oval = Item::ellipse(Rect::new(0.0, 0.0, 20.0, 10.0));
        assert!(matches!(oval.collider(), Collider::Area(_)));
        assert_eq!(oval.kind(), ItemKind::Ellipse);
    }

    #[test]
    fn box_touching_oval_collides() {
        // Semi-axes 20 and 10 around (50, 50); the box corner sits on the curve
        // at a parametric angle of 60 degrees.
        let oval = Item::ellipse(Rect::new(30.0, 40.0, 70.0, 60.0)).with_pen(Pen::None);
        let touching =
            Item::rect(Rect::new(60.0, 30.0, 70.0, 41.33974596215561)).with_pen(Pen::None);
        assert!(chunkboard_collide::collide(&oval.collider(), &touching.collider()));

        let apart = Item::rect(Rect::new(61.0, 30.0, 70.0, 40.5)).with_pen(Pen::None);
        assert!(!chunkboard_collide::collide(&oval.collider(), &apart.collider()));
    }

    #[test]
    fn text_move_translates_cached_bounds() {
        let metrics = ApproxMetrics::default();
        let mut t = Item::text("hi", Font::new("mono", 10.0), Point::new(0.0, 0.0), &metrics);
        let before = t.bounding_rect().unwrap();
        t.translate(Vec2::new(5.0, 5.0));
        assert_eq!(t.bounding_rect(), Some(before + Vec2::new(5.0, 5.0)));
        assert!(matches!(t.collider(), Collider::Box(_)));
    }

    #[test]
    fn new_items_are_hidden() {
        let item = Item::rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        assert!(!item.is_visible());
        assert!(item.with_visible(true).is_visible());
    }
}
