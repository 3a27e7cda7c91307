// Copyright 2025 the Chunkboard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collision queries: slide one circle past another and report contacts.
//!
//! Run:
//! - `cargo run -p chunkboard_demos --example colliding_circles`

use chunkboard_scene::{Item, Query, Scene};
use kurbo::{Point, Rect};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut scene = Scene::new(200, 100);
    let still = scene.insert(Item::ellipse(Rect::new(40.0, 30.0, 80.0, 70.0)).with_visible(true));
    let moving = scene.insert(
        Item::ellipse(Rect::new(0.0, 30.0, 40.0, 70.0))
            .with_z(1.0)
            .with_visible(true),
    );

    for step in 0..12 {
        let touching = scene.collide(still, moving).unwrap_or(false);
        let near = scene.item_collisions(moving, false).len();
        let x = scene.item(moving).map_or(0.0, Item::x);
        println!("step {step:2}: x={x:5.1} touching={touching} chunk neighbours={near}");
        scene.move_by(moving, 10.0, 0.0);
    }

    let at = Point::new(60.0, 50.0);
    let hits = scene.collisions(Query::Point(at), None, true);
    println!("items under {at:?}, topmost first: {hits:?}");
}
