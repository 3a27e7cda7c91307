// Copyright 2025 the Chunkboard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dense chunk grid over a fixed-size surface.
//!
//! The surface `0..width × 0..height` is partitioned into square cells of
//! `chunk_size` units. The grid has `ceil(width / chunk_size)` columns and
//! `ceil(height / chunk_size)` rows; the last column and row may extend past
//! the surface edge. Each cell is a [`Chunk`] holding the keys whose boxes
//! overlap it, plus a dirty flag consumed by redraw passes.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashSet;
use smallvec::SmallVec;

use crate::chunk::Chunk;
use crate::types::{Aabb2D, CellRange, cell_coord};

/// Dense grid of [`Chunk`]s covering a `width × height` surface.
pub struct ChunkGrid<K> {
    width: u32,
    height: u32,
    chunk_size: u32,
    cols: i32,
    rows: i32,
    chunks: Vec<Chunk<K>>,
}

impl<K: Copy + Eq + Hash> ChunkGrid<K> {
    /// Create a grid for a `width × height` surface with square cells of
    /// `chunk_size` units. Every chunk starts dirty.
    ///
    /// A zero `chunk_size` is treated as `1`.
    pub fn new(width: u32, height: u32, chunk_size: u32) -> Self {
        debug_assert!(chunk_size > 0, "chunk_size must be strictly positive");
        let chunk_size = chunk_size.max(1);
        let cols = dim(width, chunk_size);
        let rows = dim(height, chunk_size);
        let count = usize::try_from(cols).unwrap_or(0) * usize::try_from(rows).unwrap_or(0);
        let mut chunks = Vec::with_capacity(count);
        chunks.resize_with(count, Chunk::new);
        Self {
            width,
            height,
            chunk_size,
            cols,
            rows,
            chunks,
        }
    }

    /// Reallocate the grid for new dimensions, dropping all membership.
    ///
    /// Every chunk of the new grid is dirty afterwards.
    pub fn rebuild(&mut self, width: u32, height: u32, chunk_size: u32) {
        *self = Self::new(width, height, chunk_size);
        self.set_all_changed();
    }

    /// Surface width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Surface height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Edge length of one cell.
    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Number of columns.
    pub fn cols(&self) -> i32 {
        self.cols
    }

    /// Number of rows.
    pub fn rows(&self) -> i32 {
        self.rows
    }

    /// The surface rectangle `(0, 0)-(width, height)`.
    pub fn surface(&self) -> Aabb2D {
        Aabb2D::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Whether `(x, y)` lies on the surface. The right and bottom edges are
    /// excluded.
    pub fn on_surface(&self, x: f64, y: f64) -> bool {
        0.0 <= x && x < f64::from(self.width) && 0.0 <= y && y < f64::from(self.height)
    }

    /// Whether `(cx, cy)` addresses a chunk of this grid.
    pub fn valid_chunk(&self, cx: i32, cy: i32) -> bool {
        0 <= cx && cx < self.cols && 0 <= cy && cy < self.rows
    }

    /// The cell containing surface point `(x, y)`. Not clamped.
    pub fn cell_of(&self, x: f64, y: f64) -> (i32, i32) {
        let cs = f64::from(self.chunk_size);
        (cell_coord(x, cs), cell_coord(y, cs))
    }

    /// Whether two surface points fall into the same cell.
    pub fn same_chunk(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> bool {
        self.cell_of(x1, y1) == self.cell_of(x2, y2)
    }

    /// Surface rectangle of cell `(cx, cy)`.
    pub fn cell_rect(&self, cx: i32, cy: i32) -> Aabb2D {
        let cs = f64::from(self.chunk_size);
        let x = f64::from(cx) * cs;
        let y = f64::from(cy) * cs;
        Aabb2D::new(x, y, x + cs, y + cs)
    }

    /// Cells overlapped by `aabb`, clamped to the grid.
    ///
    /// Coverage is edge-inclusive: a box whose maximum lies exactly on a cell
    /// boundary also covers the following cell. Inverted boxes cover nothing.
    pub fn cell_range(&self, aabb: &Aabb2D) -> CellRange {
        if aabb.is_inverted() {
            return CellRange::EMPTY;
        }
        let (x0, y0) = self.cell_of(aabb.min_x, aabb.min_y);
        let (x1, y1) = self.cell_of(aabb.max_x, aabb.max_y);
        let r = CellRange::new(
            x0.max(0),
            y0.max(0),
            x1.min(self.cols - 1),
            y1.min(self.rows - 1),
        );
        if r.is_empty() { CellRange::EMPTY } else { r }
    }

    /// Cells overlapped by `aabb ∩ surface`.
    pub fn surface_range(&self, aabb: &Aabb2D) -> CellRange {
        self.cell_range(&aabb.intersect(&self.surface()))
    }

    /// The chunk at `(cx, cy)`, if it exists.
    pub fn chunk(&self, cx: i32, cy: i32) -> Option<&Chunk<K>> {
        self.index(cx, cy).map(|i| &self.chunks[i])
    }

    fn chunk_mut(&mut self, cx: i32, cy: i32) -> Option<&mut Chunk<K>> {
        self.index(cx, cy).map(|i| &mut self.chunks[i])
    }

    fn index(&self, cx: i32, cy: i32) -> Option<usize> {
        if !self.valid_chunk(cx, cy) {
            return None;
        }
        let cx = usize::try_from(cx).ok()?;
        let cy = usize::try_from(cy).ok()?;
        let cols = usize::try_from(self.cols).ok()?;
        Some(cy * cols + cx)
    }

    /// Add `key` to chunk `(cx, cy)`. Out-of-range cells are ignored.
    pub fn add_to_chunk(&mut self, key: K, cx: i32, cy: i32) {
        if let Some(c) = self.chunk_mut(cx, cy) {
            c.add(key);
        }
    }

    /// Remove `key` from chunk `(cx, cy)`. Out-of-range cells are ignored.
    pub fn remove_from_chunk(&mut self, key: K, cx: i32, cy: i32) {
        if let Some(c) = self.chunk_mut(cx, cy) {
            c.remove(key);
        }
    }

    /// Add `key` to the chunk containing surface point `(x, y)`.
    pub fn add_to_chunk_containing(&mut self, key: K, x: f64, y: f64) {
        if self.on_surface(x, y) {
            let (cx, cy) = self.cell_of(x, y);
            self.add_to_chunk(key, cx, cy);
        }
    }

    /// Remove `key` from the chunk containing surface point `(x, y)`.
    pub fn remove_from_chunk_containing(&mut self, key: K, x: f64, y: f64) {
        if self.on_surface(x, y) {
            let (cx, cy) = self.cell_of(x, y);
            self.remove_from_chunk(key, cx, cy);
        }
    }

    /// Add `key` to every chunk in `range`.
    pub fn add_to_range(&mut self, key: K, range: CellRange) {
        for (cx, cy) in range.iter() {
            self.add_to_chunk(key, cx, cy);
        }
    }

    /// Remove `key` from every chunk in `range`.
    pub fn remove_from_range(&mut self, key: K, range: CellRange) {
        for (cx, cy) in range.iter() {
            self.remove_from_chunk(key, cx, cy);
        }
    }

    /// Mark chunk `(cx, cy)` dirty. Out-of-range cells are ignored.
    pub fn set_changed_chunk(&mut self, cx: i32, cy: i32) {
        if let Some(c) = self.chunk_mut(cx, cy) {
            c.mark_dirty();
        }
    }

    /// Mark the chunk containing surface point `(x, y)` dirty.
    pub fn set_changed_chunk_containing(&mut self, x: f64, y: f64) {
        if self.on_surface(x, y) {
            let (cx, cy) = self.cell_of(x, y);
            self.set_changed_chunk(cx, cy);
        }
    }

    /// Mark every chunk in `range` dirty.
    pub fn set_changed_range(&mut self, range: CellRange) {
        for (cx, cy) in range.iter() {
            self.set_changed_chunk(cx, cy);
        }
    }

    /// Mark every chunk overlapping `rect ∩ surface` dirty.
    pub fn set_changed(&mut self, rect: &Aabb2D) {
        let range = self.surface_range(rect);
        self.set_changed_range(range);
    }

    /// Clear the dirty flag of every chunk overlapping `rect ∩ surface`.
    pub fn set_unchanged(&mut self, rect: &Aabb2D) {
        for (cx, cy) in self.surface_range(rect).iter() {
            if let Some(c) = self.chunk_mut(cx, cy) {
                c.mark_clean();
            }
        }
    }

    /// Mark every chunk dirty.
    pub fn set_all_changed(&mut self) {
        for c in &mut self.chunks {
            c.mark_dirty();
        }
    }

    /// Whether chunk `(cx, cy)` is dirty. Out-of-range cells are clean.
    pub fn is_dirty(&self, cx: i32, cy: i32) -> bool {
        self.chunk(cx, cy).is_some_and(Chunk::is_dirty)
    }

    /// Union of the cell rectangles of all dirty chunks, or `None` when
    /// nothing is dirty.
    ///
    /// Each cell contributes one extra unit on its right and bottom edges.
    /// Dirty flags are left untouched.
    pub fn change_bounds(&self) -> Option<Aabb2D> {
        let mut out: Option<Aabb2D> = None;
        for (cx, cy) in self.all_cells().iter() {
            if self.is_dirty(cx, cy) {
                let mut r = self.cell_rect(cx, cy);
                r.max_x += 1.0;
                r.max_y += 1.0;
                out = Some(match out {
                    Some(acc) => acc.union(&r),
                    None => r,
                });
            }
        }
        out
    }

    /// Consume the dirty flags of chunks overlapping `rect ∩ surface`.
    ///
    /// `f` is called once per chunk that was dirty, with its cell rectangle
    /// and current key list.
    pub fn take_changed(&mut self, rect: &Aabb2D, mut f: impl FnMut(Aabb2D, &[K])) {
        for (cx, cy) in self.surface_range(rect).iter() {
            let Some(i) = self.index(cx, cy) else {
                continue;
            };
            if self.chunks[i].take_dirty() {
                f(self.cell_rect(cx, cy), self.chunks[i].items());
            }
        }
    }

    /// Visit every key listed in `range`, in cell order. A key overlapping
    /// several cells is visited once per cell.
    pub fn visit_range(&self, range: CellRange, mut f: impl FnMut(K)) {
        for (cx, cy) in range.iter() {
            if let Some(c) = self.chunk(cx, cy) {
                for &k in c.items() {
                    f(k);
                }
            }
        }
    }

    /// Visit every distinct key listed in `range` exactly once.
    pub fn visit_unique(&self, range: CellRange, mut f: impl FnMut(K)) {
        let mut seen: HashSet<K> = HashSet::new();
        self.visit_range(range, |k| {
            if seen.insert(k) {
                f(k);
            }
        });
    }

    /// Cells in `range` whose chunk lists `key`.
    pub fn cells_containing(&self, key: K, range: CellRange) -> SmallVec<[(i32, i32); 4]> {
        range
            .iter()
            .filter(|&(cx, cy)| self.chunk(cx, cy).is_some_and(|c| c.contains(key)))
            .collect()
    }

    /// Remove every key from every chunk. Chunks that held keys become dirty.
    pub fn clear_items(&mut self) {
        for c in &mut self.chunks {
            c.clear();
        }
    }

    /// The range covering the whole grid.
    pub fn all_cells(&self) -> CellRange {
        CellRange::new(0, 0, self.cols - 1, self.rows - 1)
    }
}

fn dim(extent: u32, chunk_size: u32) -> i32 {
    i32::try_from(extent.div_ceil(chunk_size)).unwrap_or(i32::MAX)
}

impl<K: Copy + Eq> Debug for ChunkGrid<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let dirty = self.chunks.iter().filter(|c| c.is_dirty()).count();
        let entries: usize = self.chunks.iter().map(Chunk::len).sum();
        f.debug_struct("ChunkGrid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("chunk_size", &self.chunk_size)
            .field("cols", &self.cols)
            .field("rows", &self.rows)
            .field("dirty_chunks", &dirty)
            .field("entries", &entries)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn clean(grid: &mut ChunkGrid<u32>) {
        let all = grid.surface();
        grid.set_unchanged(&all);
    }

    #[test]
    fn dimensions_round_up() {
        let g = ChunkGrid::<u32>::new(100, 100, 16);
        assert_eq!((g.cols(), g.rows()), (7, 7));
        assert!(g.valid_chunk(6, 6));
        assert!(!g.valid_chunk(7, 0));
        assert!(!g.valid_chunk(-1, 0));
    }

    #[test]
    fn cell_range_clamps_to_grid() {
        let g = ChunkGrid::<u32>::new(100, 100, 16);
        let r = g.cell_range(&Aabb2D::new(-50., 9., 31., 500.));
        assert_eq!(r, CellRange::new(0, 0, 1, 6));

        let off = g.cell_range(&Aabb2D::new(-50., -50., -1., -1.));
        assert!(off.is_empty());

        let inverted = g.cell_range(&Aabb2D::new(10., 10., 5., 5.));
        assert!(inverted.is_empty());
    }

    #[test]
    fn cell_range_is_edge_inclusive() {
        let g = ChunkGrid::<u32>::new(100, 100, 16);
        let r = g.cell_range(&Aabb2D::new(0., 0., 16., 15.));
        assert_eq!(r, CellRange::new(0, 0, 1, 0));
    }

    #[test]
    fn out_of_range_membership_is_ignored() {
        let mut g = ChunkGrid::<u32>::new(32, 32, 16);
        g.add_to_chunk(1, 5, 5);
        g.remove_from_chunk(1, -1, 0);
        g.add_to_chunk_containing(1, 40., 0.);
        assert!(g.cells_containing(1, g.all_cells()).is_empty());

        g.add_to_chunk_containing(1, 20., 3.);
        assert_eq!(g.cells_containing(1, g.all_cells()).as_slice(), &[(1, 0)]);
        g.remove_from_chunk_containing(1, 20., 3.);
        assert!(g.cells_containing(1, g.all_cells()).is_empty());
    }

    #[test]
    fn fresh_grid_is_all_dirty() {
        let g = ChunkGrid::<u32>::new(20, 20, 10);
        assert_eq!(g.change_bounds(), Some(Aabb2D::new(0., 0., 21., 21.)));
    }

    #[test]
    fn change_bounds_unions_dirty_cells_with_slack() {
        let mut g = ChunkGrid::<u32>::new(100, 100, 16);
        clean(&mut g);
        assert_eq!(g.change_bounds(), None);

        g.set_changed_chunk(1, 1);
        g.set_changed_chunk(2, 3);
        assert_eq!(g.change_bounds(), Some(Aabb2D::new(16., 16., 49., 65.)));
    }

    #[test]
    fn set_unchanged_consumes_change_bounds() {
        let mut g = ChunkGrid::<u32>::new(100, 100, 16);
        clean(&mut g);
        g.set_changed(&Aabb2D::new(20., 20., 40., 40.));
        let bounds = g.change_bounds().unwrap();
        g.set_unchanged(&bounds);
        assert_eq!(g.change_bounds(), None);
    }

    #[test]
    fn set_changed_clips_to_surface() {
        let mut g = ChunkGrid::<u32>::new(100, 100, 16);
        clean(&mut g);
        g.set_changed(&Aabb2D::new(200., 200., 300., 300.));
        assert_eq!(g.change_bounds(), None);

        g.set_changed_chunk_containing(99.5, 0.);
        assert!(g.is_dirty(6, 0));
    }

    #[test]
    fn take_changed_reports_dirty_cells_once() {
        let mut g = ChunkGrid::<u32>::new(64, 64, 16);
        clean(&mut g);
        g.add_to_chunk(9, 1, 1);
        g.set_changed_chunk(3, 3);

        let all = g.surface();
        let mut seen = vec![];
        g.take_changed(&all, |r, items| seen.push((r, items.to_vec())));
        assert_eq!(
            seen,
            vec![
                (Aabb2D::new(16., 16., 32., 32.), vec![9]),
                (Aabb2D::new(48., 48., 64., 64.), vec![]),
            ]
        );

        let mut again = 0;
        g.take_changed(&all, |_, _| again += 1);
        assert_eq!(again, 0);
    }

    #[test]
    fn visit_unique_dedupes_across_cells() {
        let mut g = ChunkGrid::<u32>::new(64, 64, 16);
        let r = g.cell_range(&Aabb2D::new(0., 0., 20., 20.));
        g.add_to_range(1, r);
        g.add_to_chunk(2, 1, 1);

        let mut all = vec![];
        g.visit_range(r, |k| all.push(k));
        assert_eq!(all.len(), 5);

        let mut unique = vec![];
        g.visit_unique(r, |k| unique.push(k));
        unique.sort_unstable();
        assert_eq!(unique, vec![1, 2]);
    }

    #[test]
    fn rebuild_drops_membership_and_dirties_all() {
        let mut g = ChunkGrid::<u32>::new(64, 64, 16);
        g.add_to_chunk(1, 0, 0);
        clean(&mut g);
        g.rebuild(128, 32, 32);
        assert_eq!((g.cols(), g.rows()), (4, 1));
        assert!(g.cells_containing(1, g.all_cells()).is_empty());
        assert_eq!(g.change_bounds(), Some(Aabb2D::new(0., 0., 129., 33.)));
    }

    #[test]
    fn clear_items_dirties_only_occupied_chunks() {
        let mut g = ChunkGrid::<u32>::new(64, 64, 16);
        g.add_to_chunk(1, 2, 2);
        clean(&mut g);
        g.clear_items();
        assert!(g.is_dirty(2, 2));
        assert!(!g.is_dirty(0, 0));
        assert!(g.chunk(2, 2).unwrap().is_empty());
    }

    #[test]
    fn empty_surface_has_no_cells() {
        let g = ChunkGrid::<u32>::new(0, 0, 16);
        assert!(g.all_cells().is_empty());
        assert!(g.cell_range(&Aabb2D::new(0., 0., 10., 10.)).is_empty());
        assert_eq!(g.change_bounds(), None);
    }
}
