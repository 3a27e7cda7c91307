// Copyright 2025 the Chunkboard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Background tile grid.

use alloc::vec::Vec;

use kurbo::Rect;

/// A `h_tiles × v_tiles` grid of tile numbers drawn beneath all items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    h_tiles: u32,
    v_tiles: u32,
    tile_width: u32,
    tile_height: u32,
    tiles: Vec<u32>,
}

impl TileMap {
    /// A zero-filled tile grid.
    pub fn new(h_tiles: u32, v_tiles: u32, tile_width: u32, tile_height: u32) -> Self {
        let len = usize::try_from(u64::from(h_tiles) * u64::from(v_tiles)).unwrap_or(0);
        Self {
            h_tiles,
            v_tiles,
            tile_width,
            tile_height,
            tiles: alloc::vec![0; len],
        }
    }

    /// Number of tile columns.
    pub fn h_tiles(&self) -> u32 {
        self.h_tiles
    }

    /// Number of tile rows.
    pub fn v_tiles(&self) -> u32 {
        self.v_tiles
    }

    /// Tile width in surface units.
    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    /// Tile height in surface units.
    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.h_tiles || y >= self.v_tiles {
            return None;
        }
        usize::try_from(u64::from(y) * u64::from(self.h_tiles) + u64::from(x)).ok()
    }

    /// Tile number at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        self.index(x, y).map(|i| self.tiles[i])
    }

    /// Store `tile` at `(x, y)`. Returns whether anything changed.
    pub fn set(&mut self, x: u32, y: u32, tile: u32) -> bool {
        match self.index(x, y) {
            Some(i) if self.tiles[i] != tile => {
                self.tiles[i] = tile;
                true
            }
            _ => false,
        }
    }

    /// Surface rectangle of tile `(x, y)`.
    pub fn tile_rect(&self, x: u32, y: u32) -> Rect {
        let (w, h) = (f64::from(self.tile_width), f64::from(self.tile_height));
        let (x0, y0) = (f64::from(x) * w, f64::from(y) * h);
        Rect::new(x0, y0, x0 + w, y0 + h)
    }

    /// Visit every tile whose rectangle overlaps `area`, row by row.
    pub fn visit_overlapping(&self, area: Rect, mut f: impl FnMut(Rect, u32)) {
        for y in 0..self.v_tiles {
            for x in 0..self.h_tiles {
                let r = self.tile_rect(x, y);
                let overlaps =
                    r.x0 < area.x1 && area.x0 < r.x1 && r.y0 < area.y1 && area.y0 < r.y1;
                if overlaps && let Some(tile) = self.get(x, y) {
                    f(r, tile);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn set_reports_changes_and_ignores_out_of_range() {
        let mut t = TileMap::new(3, 2, 8, 8);
        assert_eq!(t.get(2, 1), Some(0));
        assert!(t.set(2, 1, 5));
        assert!(!t.set(2, 1, 5));
        assert!(!t.set(3, 0, 1));
        assert_eq!(t.get(3, 0), None);
    }

    #[test]
    fn overlapping_tiles_for_area() {
        let mut t = TileMap::new(4, 4, 10, 10);
        t.set(1, 1, 7);
        let mut hits = vec![];
        t.visit_overlapping(Rect::new(12.0, 12.0, 18.0, 25.0), |r, n| hits.push((r, n)));
        assert_eq!(
            hits,
            vec![
                (Rect::new(10.0, 10.0, 20.0, 20.0), 7),
                (Rect::new(10.0, 20.0, 20.0, 30.0), 0),
            ]
        );
    }
}
