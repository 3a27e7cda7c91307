// Copyright 2025 the Chunkboard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chunkboard Index: a dense chunk grid for retained 2D surfaces.
//!
//! A surface of `width × height` units is split into square chunks. Each
//! chunk records which keys (typically item handles) overlap it and whether
//! it has changed since the last redraw.
//!
//! - Add and remove keys per chunk, per surface point, or per cell range.
//! - Mark regions dirty with [`ChunkGrid::set_changed`], ask for the
//!   redraw region with [`ChunkGrid::change_bounds`], and consume it with
//!   [`ChunkGrid::set_unchanged`] or [`ChunkGrid::take_changed`].
//! - Gather candidates for a region with [`ChunkGrid::visit_unique`].
//!
//! The crate does not depend on any geometry crate. Higher layers compute
//! item bounding boxes and feed them here as [`Aabb2D`] values.
//!
//! # Example
//!
//! ```rust
//! use chunkboard_index::{Aabb2D, ChunkGrid};
//!
//! let mut grid: ChunkGrid<u32> = ChunkGrid::new(100, 100, 16);
//! assert_eq!((grid.cols(), grid.rows()), (7, 7));
//!
//! // Register key 1 under the cells its box overlaps.
//! let cells = grid.cell_range(&Aabb2D::new(9.0, 9.0, 31.0, 31.0));
//! grid.add_to_range(1, cells);
//! assert!(grid.chunk(1, 1).unwrap().contains(1));
//! assert!(!grid.chunk(2, 2).unwrap().contains(1));
//!
//! // Consume everything dirty so far.
//! let dirty = grid.change_bounds().unwrap();
//! grid.set_unchanged(&dirty);
//! assert_eq!(grid.change_bounds(), None);
//! ```

#![no_std]

extern crate alloc;

mod chunk;
mod grid;
mod types;

pub use chunk::Chunk;
pub use grid::ChunkGrid;
pub use types::{Aabb2D, CellRange, cell_coord};
