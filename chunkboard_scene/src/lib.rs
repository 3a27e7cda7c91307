// Copyright 2025 the Chunkboard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chunkboard Scene: a retained 2D canvas with chunk-based redraw.
//!
//! A [`Scene`] owns a fixed-size surface, a background colour, an optional
//! tile grid, and a set of [`Item`]s (lines, rectangles, ellipses, polygons,
//! text). The surface is partitioned into square chunks by
//! [`chunkboard_index::ChunkGrid`]; each chunk lists the visible items whose
//! bounding boxes overlap it and carries a dirty flag.
//!
//! - Item mutations go through the scene, which removes the item from its
//!   old chunks, applies the change, and re-adds it. Old and new regions are
//!   both marked dirty.
//! - [`Scene::change_bounds`] reports the union of dirty chunks;
//!   [`Scene::update`] forwards it to each registered [`View`] and marks it
//!   clean.
//! - [`Scene::draw_area`] and [`Scene::draw_changed`] drive a [`Painter`]
//!   back to front: background, tiles, then items by ascending z.
//! - [`Scene::collisions`] and [`Scene::item_collisions`] answer spatial
//!   queries, coarse by chunk or exact via [`chunkboard_collide`].
//!
//! Text is measured through a [`TextMetrics`] provider once per change of
//! text, font, or alignment; moving text reuses the cached box.
//!
//! ## Example
//!
//! ```rust
//! use chunkboard_scene::{Item, Query, Scene};
//! use kurbo::{Point, Rect};
//!
//! let mut scene = Scene::new(200, 100);
//! let back = scene.insert(Item::rect(Rect::new(10.0, 10.0, 90.0, 90.0)).with_visible(true));
//! let front = scene.insert(
//!     Item::ellipse(Rect::new(50.0, 20.0, 110.0, 80.0))
//!         .with_z(1.0)
//!         .with_visible(true),
//! );
//!
//! let hits = scene.collisions(Query::Point(Point::new(70.0, 50.0)), None, true);
//! assert_eq!(hits, [front, back]);
//!
//! // A fresh scene starts fully dirty.
//! assert_eq!(scene.update(), Some(Rect::new(0.0, 0.0, 209.0, 113.0)));
//! assert_eq!(scene.change_bounds(), None);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod item;
mod metrics;
mod scene;
mod tiles;
mod types;
mod util;
mod view;

pub use chunkboard_collide::Collider;
pub use item::{Item, Shape, TextShape};
pub use metrics::{ApproxMetrics, TextMetrics, align};
pub use scene::{DEFAULT_CHUNK_SIZE, Query, Scene, SceneConfig};
pub use tiles::TileMap;
pub use types::{Fill, Font, ItemFlags, ItemId, ItemKind, Pen, TextFlags, ViewId};
pub use view::{Painter, View};
