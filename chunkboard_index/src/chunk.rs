// Copyright 2025 the Chunkboard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single grid cell: the keys overlapping it and a dirty flag.

use core::fmt::Debug;

use smallvec::SmallVec;

/// One cell of a [`ChunkGrid`](crate::ChunkGrid).
///
/// A chunk holds each key at most once. Every membership change marks the
/// chunk dirty, even when it turns out to be a no-op, so that a redraw pass
/// never misses a region that was touched.
#[derive(Clone)]
pub struct Chunk<K> {
    items: SmallVec<[K; 4]>,
    dirty: bool,
}

impl<K: Copy + Eq> Chunk<K> {
    /// Create an empty chunk. New chunks start dirty.
    pub fn new() -> Self {
        Self {
            items: SmallVec::new(),
            dirty: true,
        }
    }

    /// Add `key` to the front of the list unless it is already present.
    pub fn add(&mut self, key: K) {
        if !self.items.contains(&key) {
            self.items.insert(0, key);
        }
        self.dirty = true;
    }

    /// Remove every occurrence of `key`.
    pub fn remove(&mut self, key: K) {
        self.items.retain(|k| *k != key);
        self.dirty = true;
    }

    /// Whether `key` is listed in this chunk.
    pub fn contains(&self, key: K) -> bool {
        self.items.contains(&key)
    }

    /// The keys overlapping this chunk, most recently added first.
    pub fn items(&self) -> &[K] {
        &self.items
    }

    /// Number of keys in this chunk.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this chunk lists no keys.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Mark this chunk as needing a redraw.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clear the dirty flag without consuming it.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Whether this chunk needs a redraw.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Return the dirty flag and reset it.
    pub fn take_dirty(&mut self) -> bool {
        core::mem::replace(&mut self.dirty, false)
    }

    pub(crate) fn clear(&mut self) {
        if !self.items.is_empty() {
            self.items.clear();
            self.dirty = true;
        }
    }
}

impl<K: Copy + Eq> Default for Chunk<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Debug> Debug for Chunk<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Chunk")
            .field("items", &self.items.as_slice())
            .field("dirty", &self.dirty)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_chunk_starts_dirty() {
        let mut c = Chunk::<u32>::new();
        assert!(c.is_empty());
        assert!(c.take_dirty());
        assert!(!c.take_dirty());
    }

    #[test]
    fn add_prepends_and_dedupes() {
        let mut c = Chunk::new();
        c.add(1_u32);
        c.add(2);
        c.add(1);
        assert_eq!(c.items(), &[2, 1]);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn remove_marks_dirty_even_when_absent() {
        let mut c = Chunk::new();
        c.add(7_u32);
        c.mark_clean();
        c.remove(3);
        assert!(c.is_dirty());
        assert!(c.contains(7));

        c.mark_clean();
        c.remove(7);
        assert!(c.is_dirty());
        assert!(c.is_empty());
    }

    #[test]
    fn double_add_single_remove_empties() {
        let mut c = Chunk::new();
        c.add(5_u32);
        c.add(5);
        c.remove(5);
        assert!(!c.contains(5));
    }
}
