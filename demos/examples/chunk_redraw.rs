// Copyright 2025 the Chunkboard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-chunk redraw: move items around and watch which regions repaint.
//!
//! A view prints every repaint request it receives and a painter prints the
//! draw calls issued for the dirty chunks.
//!
//! Run:
//! - `cargo run -p chunkboard_demos --example chunk_redraw`

use chunkboard_scene::{Fill, Font, Item, ItemId, Painter, Pen, Scene, View};
use kurbo::{Affine, Point, Rect};
use peniko::Color;

/// Prints repaint requests in its own (zoomed) coordinate space.
struct ConsoleView {
    name: &'static str,
    zoom: f64,
}

impl View for ConsoleView {
    fn transform(&self) -> Affine {
        Affine::scale(self.zoom)
    }

    fn repaint(&mut self, rect: Rect) {
        println!("  [{}] repaint {rect:?}", self.name);
    }

    fn resized(&mut self, width: u32, height: u32) {
        println!("  [{}] surface is now {width}x{height}", self.name);
    }
}

/// Prints draw calls instead of rasterising.
struct LogPainter;

impl Painter for LogPainter {
    fn fill_background(&mut self, rect: Rect, _color: Color) {
        println!("  background {rect:?}");
    }

    fn draw_item(&mut self, id: ItemId, item: &Item) {
        println!("  draw {id:?} {:?} z={}", item.kind(), item.z());
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    let mut scene = Scene::new(160, 96);
    scene.add_view(Box::new(ConsoleView { name: "main", zoom: 1.0 }));
    scene.add_view(Box::new(ConsoleView { name: "zoom", zoom: 2.0 }));

    let pen = Pen::Solid {
        width: 2.0,
        color: Color::BLACK,
    };
    let card = scene.insert(
        Item::rect(Rect::new(8.0, 8.0, 40.0, 28.0))
            .with_pen(pen)
            .with_fill(Fill::Solid(Color::WHITE))
            .with_visible(true),
    );
    let wire = scene.insert(
        Item::line(Point::new(40.0, 18.0), Point::new(120.0, 70.0))
            .with_z(-1.0)
            .with_visible(true),
    );
    let label = Item::text(
        "chunkboard",
        Font::new("sans-serif", 10.0),
        Point::new(100.0, 72.0),
        scene.metrics(),
    );
    let label = scene.insert(label.with_z(2.0).with_visible(true));

    println!("initial update (fresh scene is fully dirty):");
    scene.update();

    println!("move the card right by one chunk:");
    scene.move_by(card, 16.0, 0.0);
    let cells = scene.draw_changed(scene.rect(), &mut LogPainter);
    println!("  {} chunk(s) repainted", cells.len());

    println!("select the label:");
    scene.set_selected(label, true);
    scene.update();

    println!("hide the wire:");
    scene.hide(wire);
    if let Some(bounds) = scene.change_bounds() {
        println!("  pending {bounds:?}");
    }
    scene.update();

    println!("grow the surface:");
    scene.resize(240, 96);
    scene.update();
}
