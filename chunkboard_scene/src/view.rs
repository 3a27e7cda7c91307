// Copyright 2025 the Chunkboard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Outbound interfaces: redraw subscribers and drawing back ends.

use kurbo::{Affine, Rect};
use peniko::Color;

use crate::item::Item;
use crate::types::ItemId;

/// A redraw subscriber.
///
/// Each view sees the scene through its own transform and is told which
/// part of its own space to repaint.
pub trait View {
    /// Scene-to-view transform.
    fn transform(&self) -> Affine {
        Affine::IDENTITY
    }

    /// Repaint `rect`, in view coordinates.
    fn repaint(&mut self, rect: Rect);

    /// The scene surface now measures `width × height`.
    fn resized(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }
}

/// Drawing back end used by [`Scene::draw_area`](crate::Scene::draw_area)
/// and [`Scene::draw_changed`](crate::Scene::draw_changed).
///
/// Calls arrive back to front: background, then tiles, then items in
/// ascending z order.
pub trait Painter {
    /// Fill `rect` with the scene background colour.
    fn fill_background(&mut self, rect: Rect, color: Color);

    /// Draw background tile number `tile` into `rect`.
    fn draw_tile(&mut self, rect: Rect, tile: u32) {
        let _ = (rect, tile);
    }

    /// Draw one item.
    fn draw_item(&mut self, id: ItemId, item: &Item);
}
