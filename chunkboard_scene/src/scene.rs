// Copyright 2025 the Chunkboard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core scene implementation: item arena, chunk membership, redraw, queries.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use chunkboard_collide::{Collider, collide, polygon};
use chunkboard_index::{Aabb2D, CellRange, Chunk, ChunkGrid};
use kurbo::{Point, Rect, Size, Vec2};
use peniko::Color;
use tracing::{debug, trace};

use crate::item::{Item, Shape};
use crate::metrics::{ApproxMetrics, TextMetrics};
use crate::tiles::TileMap;
use crate::types::{Fill, Font, ItemFlags, ItemId, Pen, TextFlags, ViewId};
use crate::util::{aabb_to_rect, lcm, rect_to_aabb, transform_rect_bbox};
use crate::view::{Painter, View};

/// Chunk edge length used when none is given.
pub const DEFAULT_CHUNK_SIZE: u32 = 16;

/// Construction parameters for a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneConfig {
    /// Surface width.
    pub width: u32,
    /// Surface height.
    pub height: u32,
    /// Chunk edge length; zero is treated as one.
    pub chunk_size: u32,
    /// Background colour.
    pub background: Color,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            background: Color::WHITE,
        }
    }
}

/// Probe shape for [`Scene::collisions`].
#[derive(Clone, Copy, Debug)]
pub enum Query<'a> {
    /// A single surface point.
    Point(Point),
    /// An axis-aligned rectangle, edges included.
    Rect(Rect),
    /// A filled polygon.
    Polygon(&'a [Point]),
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    /// Insertion order; breaks z ties.
    seq: u64,
    /// Chunk membership matches the current bounding box.
    valid: bool,
    item: Item,
}

fn slot_mut(slots: &mut [Option<Slot>], id: ItemId) -> Option<&mut Slot> {
    let s = slots.get_mut(id.idx())?.as_mut()?;
    if s.generation != id.1 {
        return None;
    }
    Some(s)
}

/// A retained 2D surface of items, indexed by a chunk grid.
///
/// Every visible item is listed in each chunk its bounding box overlaps
/// within the surface.
/// Mutations run remove-from-chunks, mutate, add-to-chunks, which keeps that
/// membership exact and marks both the old and new regions dirty. Redraw
/// consumers ask for [`Scene::change_bounds`] or call [`Scene::update`] to
/// notify registered views.
///
/// ## Example
///
/// ```rust
/// use chunkboard_scene::{Item, Pen, Scene};
/// use kurbo::Rect;
/// use peniko::Color;
///
/// let mut scene = Scene::new(100, 100);
/// let pen = Pen::Solid { width: 2.0, color: Color::BLACK };
/// let id = scene.insert(
///     Item::rect(Rect::new(10.0, 10.0, 30.0, 30.0))
///         .with_pen(pen)
///         .with_visible(true),
/// );
/// assert!(scene.chunk_items(1, 1).unwrap().contains(&id));
///
/// // Consume the pending redraw, then move the item.
/// scene.update();
/// scene.move_by(id, 50.0, 50.0);
/// assert!(!scene.chunk_items(0, 0).unwrap().contains(&id));
/// assert!(scene.change_bounds().is_some());
/// ```
pub struct Scene {
    slots: Vec<Option<Slot>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    next_seq: u64,
    grid: ChunkGrid<ItemId>,
    views: Vec<Option<Box<dyn View>>>,
    metrics: Box<dyn TextMetrics>,
    background: Color,
    tiles: Option<TileMap>,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.slots.len();
        let alive = self.slots.iter().filter(|s| s.is_some()).count();
        let views = self.views.iter().filter(|v| v.is_some()).count();
        f.debug_struct("Scene")
            .field("items_total", &total)
            .field("items_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("grid", &self.grid)
            .field("views", &views)
            .field("background", &self.background)
            .field("tiles", &self.tiles)
            .finish_non_exhaustive()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::with_config(SceneConfig::default())
    }
}

impl Scene {
    /// Create a `width × height` scene with [`DEFAULT_CHUNK_SIZE`] chunks.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_config(SceneConfig {
            width,
            height,
            ..SceneConfig::default()
        })
    }

    /// Create a scene from explicit parameters.
    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            next_seq: 0,
            grid: ChunkGrid::new(config.width, config.height, config.chunk_size.max(1)),
            views: Vec::new(),
            metrics: Box::new(ApproxMetrics::default()),
            background: config.background,
            tiles: None,
        }
    }

    /// Create a scene sized to an `h_tiles × v_tiles` tile grid, with chunks
    /// of `lcm(tile_width, tile_height)` units.
    pub fn with_tiles(h_tiles: u32, v_tiles: u32, tile_width: u32, tile_height: u32) -> Self {
        let chunk_size = match lcm(tile_width, tile_height) {
            0 => DEFAULT_CHUNK_SIZE,
            n => n,
        };
        let mut scene = Self::with_config(SceneConfig {
            width: h_tiles.saturating_mul(tile_width),
            height: v_tiles.saturating_mul(tile_height),
            chunk_size,
            ..SceneConfig::default()
        });
        scene.set_tiles(h_tiles, v_tiles, tile_width, tile_height);
        scene
    }

    /// Replace the text metrics provider.
    pub fn with_metrics(mut self, metrics: impl TextMetrics + 'static) -> Self {
        self.set_metrics(metrics);
        self
    }

    /// Replace the text metrics provider. Existing text keeps its cached box
    /// until its text, font or flags change.
    pub fn set_metrics(&mut self, metrics: impl TextMetrics + 'static) {
        self.metrics = Box::new(metrics);
    }

    /// The text metrics provider, for building [`Item::text`] values.
    pub fn metrics(&self) -> &dyn TextMetrics {
        &*self.metrics
    }

    // --- arena ---

    /// Attach `item`, returning its handle.
    ///
    /// The item enters the scene hidden and then takes its own visibility
    /// flag, so a visible item is added to the chunks it overlaps.
    pub fn insert(&mut self, mut item: Item) -> ItemId {
        let visible = item.is_visible();
        item.flags_mut().remove(ItemFlags::VISIBLE);
        let seq = self.next_seq;
        self.next_seq += 1;
        let mut slot = Slot {
            generation: 1,
            seq,
            valid: false,
            item,
        };
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            slot.generation = generation;
            self.slots[idx] = Some(slot);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ItemId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            self.slots.push(Some(slot));
            self.generations.push(1);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ItemId uses 32-bit indices by design."
            )]
            ((self.slots.len() - 1) as u32, 1)
        };
        let id = ItemId::new(idx, generation);
        trace!(item = ?id, visible, "insert");
        if visible {
            self.set_visible(id, true);
        }
        id
    }

    /// Detach an item and hand it back, visibility flag preserved.
    ///
    /// The handle goes stale. Returns `None` for stale handles.
    pub fn remove(&mut self, id: ItemId) -> Option<Item> {
        let visible = self.item(id)?.is_visible();
        self.set_visible(id, false);
        let mut slot = self.slots[id.idx()].take()?;
        self.free_list.push(id.idx());
        slot.item.flags_mut().set(ItemFlags::VISIBLE, visible);
        trace!(item = ?id, "remove");
        Some(slot.item)
    }

    /// Move an item into `other`, keeping its visibility.
    ///
    /// Returns the item's handle in `other`.
    pub fn transfer(&mut self, id: ItemId, other: &mut Self) -> Option<ItemId> {
        let item = self.remove(id)?;
        Some(other.insert(item))
    }

    /// Remove every item. No chunk keeps a reference afterwards.
    pub fn clear(&mut self) {
        let ids: Vec<ItemId> = self.items().map(|(id, _)| id).collect();
        for &id in &ids {
            self.remove(id);
        }
        self.grid.clear_items();
        debug!(removed = ids.len(), "scene cleared");
    }

    /// Returns true if `id` refers to a live item.
    pub fn is_alive(&self, id: ItemId) -> bool {
        self.slot(id).is_some()
    }

    /// The item behind a live handle.
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.slot(id).map(|s| &s.item)
    }

    /// All live items in slot order.
    pub fn items(&self) -> impl Iterator<Item = (ItemId, &Item)> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, s)| {
            let s = s.as_ref()?;
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ItemId uses 32-bit indices by design."
            )]
            Some((ItemId::new(idx as u32, s.generation), &s.item))
        })
    }

    /// Number of live items.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether the scene holds no items.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    fn slot(&self, id: ItemId) -> Option<&Slot> {
        let s = self.slots.get(id.idx())?.as_ref()?;
        (s.generation == id.1).then_some(s)
    }

    // --- chunk membership ---

    /// Chunks covered by the item's box clipped to the surface.
    fn cells_of(&self, item: &Item) -> CellRange {
        match item.bounding_rect() {
            Some(r) => self.grid.surface_range(&rect_to_aabb(r)),
            None => CellRange::EMPTY,
        }
    }

    fn add_to_chunks(&mut self, id: ItemId) {
        let Some(slot) = self.slot(id) else {
            return;
        };
        if !slot.item.is_visible() {
            return;
        }
        let cells = self.cells_of(&slot.item);
        self.grid.add_to_range(id, cells);
        if let Some(slot) = slot_mut(&mut self.slots, id) {
            slot.valid = true;
        }
    }

    fn remove_from_chunks(&mut self, id: ItemId) {
        let Some(slot) = self.slot(id) else {
            return;
        };
        if !slot.item.is_visible() || !slot.valid {
            return;
        }
        let cells = self.cells_of(&slot.item);
        self.grid.remove_from_range(id, cells);
    }

    /// Mark the item's chunks dirty, first repairing membership if it was
    /// invalidated.
    fn change_chunks(&mut self, id: ItemId) {
        let Some(slot) = self.slot(id) else {
            return;
        };
        if !slot.item.is_visible() {
            return;
        }
        if !slot.valid {
            self.add_to_chunks(id);
        }
        if let Some(slot) = self.slot(id) {
            let cells = self.cells_of(&slot.item);
            self.grid.set_changed_range(cells);
        }
    }

    /// Run `f` between removal under the old box and insertion under the new.
    fn relocate(&mut self, id: ItemId, f: impl FnOnce(&mut Item, &dyn TextMetrics)) {
        if !self.is_alive(id) {
            return;
        }
        self.remove_from_chunks(id);
        let metrics = &*self.metrics;
        if let Some(slot) = slot_mut(&mut self.slots, id) {
            f(&mut slot.item, metrics);
        }
        self.add_to_chunks(id);
    }

    /// Drop the item from its chunks and mark its membership stale. The next
    /// change that only requests a redraw puts it back.
    pub fn invalidate(&mut self, id: ItemId) {
        self.remove_from_chunks(id);
        if let Some(slot) = slot_mut(&mut self.slots, id) {
            slot.valid = false;
        }
    }

    // --- item mutation ---

    /// Move an item by `(dx, dy)`. A zero delta changes nothing.
    pub fn move_by(&mut self, id: ItemId, dx: f64, dy: f64) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        self.relocate(id, |item, _| item.translate(Vec2::new(dx, dy)));
    }

    /// Move an item to `(x, y)`.
    pub fn move_to(&mut self, id: ItemId, x: f64, y: f64) {
        if let Some(pos) = self.item(id).map(Item::pos) {
            self.move_by(id, x - pos.x, y - pos.y);
        }
    }

    /// Set the horizontal position.
    pub fn set_x(&mut self, id: ItemId, x: f64) {
        if let Some(pos) = self.item(id).map(Item::pos) {
            self.move_to(id, x, pos.y);
        }
    }

    /// Set the vertical position.
    pub fn set_y(&mut self, id: ItemId, y: f64) {
        if let Some(pos) = self.item(id).map(Item::pos) {
            self.move_to(id, pos.x, y);
        }
    }

    /// Update the stacking order.
    pub fn set_z(&mut self, id: ItemId, z: f64) {
        if let Some(slot) = slot_mut(&mut self.slots, id)
            && slot.item.z() != z
        {
            slot.item.set_z(z);
            self.change_chunks(id);
        }
    }

    /// Show or hide an item.
    ///
    /// Showing sets the flag before joining chunks; hiding leaves chunks
    /// before clearing the flag.
    pub fn set_visible(&mut self, id: ItemId, visible: bool) {
        let Some(item) = self.item(id) else {
            return;
        };
        if item.is_visible() == visible {
            return;
        }
        if visible {
            if let Some(slot) = slot_mut(&mut self.slots, id) {
                slot.item.flags_mut().insert(ItemFlags::VISIBLE);
            }
            self.add_to_chunks(id);
        } else {
            self.remove_from_chunks(id);
            if let Some(slot) = slot_mut(&mut self.slots, id) {
                slot.item.flags_mut().remove(ItemFlags::VISIBLE);
            }
        }
    }

    /// Make an item visible.
    pub fn show(&mut self, id: ItemId) {
        self.set_visible(id, true);
    }

    /// Make an item invisible.
    pub fn hide(&mut self, id: ItemId) {
        self.set_visible(id, false);
    }

    fn set_flag(&mut self, id: ItemId, flag: ItemFlags, on: bool) {
        if let Some(slot) = slot_mut(&mut self.slots, id)
            && slot.item.flags().contains(flag) != on
        {
            slot.item.flags_mut().set(flag, on);
            self.change_chunks(id);
        }
    }

    /// Update the selected flag.
    pub fn set_selected(&mut self, id: ItemId, selected: bool) {
        self.set_flag(id, ItemFlags::SELECTED, selected);
    }

    /// Update the enabled flag.
    pub fn set_enabled(&mut self, id: ItemId, enabled: bool) {
        self.set_flag(id, ItemFlags::ENABLED, enabled);
    }

    /// Update the active flag.
    pub fn set_active(&mut self, id: ItemId, active: bool) {
        self.set_flag(id, ItemFlags::ACTIVE, active);
    }

    /// Update the outline. The pen width feeds the bounding box.
    pub fn set_pen(&mut self, id: ItemId, pen: Pen) {
        if self.item(id).is_some_and(|item| item.pen() != pen) {
            self.relocate(id, |item, _| item.set_pen(pen));
        }
    }

    /// Update the interior style.
    pub fn set_fill(&mut self, id: ItemId, fill: Fill) {
        if let Some(slot) = slot_mut(&mut self.slots, id)
            && slot.item.fill() != fill
        {
            slot.item.set_fill(fill);
            self.change_chunks(id);
        }
    }

    /// Resize a rectangle or ellipse.
    pub fn set_size(&mut self, id: ItemId, size: Size) {
        let differs = self.item(id).is_some_and(|item| match item.shape() {
            Shape::Rect { size: s } | Shape::Ellipse { size: s, .. } => *s != size,
            _ => false,
        });
        if differs {
            self.relocate(id, |item, _| item.set_size(size));
        }
    }

    /// Set an ellipse's start angle and sweep, in degrees.
    pub fn set_angles(&mut self, id: ItemId, start: f64, sweep: f64) {
        let differs = self.item(id).is_some_and(|item| match item.shape() {
            Shape::Ellipse {
                start_angle,
                sweep_angle,
                ..
            } => *start_angle != start || *sweep_angle != sweep,
            _ => false,
        });
        if differs {
            self.relocate(id, |item, _| item.set_angles(start, sweep));
        }
    }

    /// Place a line between two surface points.
    pub fn set_line_points(&mut self, id: ItemId, p1: Point, p2: Point) {
        let differs = self.item(id).is_some_and(|item| match item.shape() {
            Shape::Line { from, to } => {
                let o = item.pos().to_vec2();
                *from + o != p1 || *to + o != p2
            }
            _ => false,
        });
        if differs {
            self.relocate(id, |item, _| item.set_line_points(p1, p2));
        }
    }

    /// Replace a polygon's vertices with surface points.
    pub fn set_polygon_points(&mut self, id: ItemId, points: &[Point]) {
        let differs = self.item(id).is_some_and(|item| match item.shape() {
            Shape::Polygon(pts) => {
                let o = item.pos().to_vec2();
                pts.len() != points.len() || pts.iter().zip(points).any(|(a, b)| *a + o != *b)
            }
            _ => false,
        });
        if differs {
            self.relocate(id, |item, _| item.set_polygon_points(points));
        }
    }

    /// Replace the string of a text item.
    pub fn set_text(&mut self, id: ItemId, text: impl Into<String>) {
        let text = text.into();
        let differs = self.item(id).is_some_and(|item| match item.shape() {
            Shape::Text(t) => t.text() != text,
            _ => false,
        });
        if differs {
            self.relocate(id, |item, metrics| {
                item.edit_text(metrics, |t| t.set_text(text));
            });
        }
    }

    /// Replace the font of a text item.
    pub fn set_font(&mut self, id: ItemId, font: Font) {
        let differs = self.item(id).is_some_and(|item| match item.shape() {
            Shape::Text(t) => *t.font() != font,
            _ => false,
        });
        if differs {
            self.relocate(id, |item, metrics| {
                item.edit_text(metrics, |t| t.set_font(font));
            });
        }
    }

    /// Replace the alignment flags of a text item.
    pub fn set_text_flags(&mut self, id: ItemId, flags: TextFlags) {
        let differs = self.item(id).is_some_and(|item| match item.shape() {
            Shape::Text(t) => t.flags() != flags,
            _ => false,
        });
        if differs {
            self.relocate(id, |item, metrics| {
                item.edit_text(metrics, |t| t.set_flags(flags));
            });
        }
    }

    /// Recolour a text item.
    pub fn set_text_color(&mut self, id: ItemId, color: Color) {
        let differs = self.item(id).is_some_and(|item| match item.shape() {
            Shape::Text(t) => t.color() != color,
            _ => false,
        });
        if differs {
            if let Some(slot) = slot_mut(&mut self.slots, id) {
                slot.item.set_text_color(color);
            }
            self.change_chunks(id);
        }
    }

    // --- surface ---

    /// Surface width.
    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    /// Surface height.
    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    /// Surface size.
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width()), f64::from(self.height()))
    }

    /// The surface rectangle.
    pub fn rect(&self) -> Rect {
        aabb_to_rect(self.grid.surface())
    }

    /// Chunk edge length.
    pub fn chunk_size(&self) -> u32 {
        self.grid.chunk_size()
    }

    /// Whether `(x, y)` lies on the surface.
    pub fn on_canvas(&self, x: f64, y: f64) -> bool {
        self.grid.on_surface(x, y)
    }

    /// Whether `(cx, cy)` addresses a chunk.
    pub fn valid_chunk(&self, cx: i32, cy: i32) -> bool {
        self.grid.valid_chunk(cx, cy)
    }

    /// Whether two surface points share a chunk.
    pub fn same_chunk(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> bool {
        self.grid.same_chunk(x1, y1, x2, y2)
    }

    fn visible_ids(&self) -> Vec<ItemId> {
        self.items()
            .filter(|(_, item)| item.is_visible())
            .map(|(id, _)| id)
            .collect()
    }

    fn rebuild_grid(&mut self, width: u32, height: u32, chunk_size: u32) {
        let shown = self.visible_ids();
        for &id in &shown {
            self.set_visible(id, false);
        }
        self.grid.rebuild(width, height, chunk_size);
        for &id in &shown {
            self.set_visible(id, true);
        }
        self.grid.set_all_changed();
    }

    /// Change the surface size. Visible items stay visible, the whole
    /// surface is marked changed, and views are told the new size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width() && height == self.height() {
            return;
        }
        self.rebuild_grid(width, height, self.chunk_size());
        for view in self.views.iter_mut().flatten() {
            view.resized(width, height);
        }
        debug!(width, height, "surface resized");
    }

    /// Change the chunk edge length. Zero is ignored.
    pub fn retune(&mut self, chunk_size: u32) {
        if chunk_size == 0 || chunk_size == self.chunk_size() {
            return;
        }
        self.rebuild_grid(self.width(), self.height(), chunk_size);
        debug!(chunk_size, "chunks retuned");
    }

    // --- chunks and dirty state ---

    /// Add an item to chunk `(cx, cy)`. Out-of-range chunks are ignored.
    pub fn add_item_to_chunk(&mut self, id: ItemId, cx: i32, cy: i32) {
        self.grid.add_to_chunk(id, cx, cy);
    }

    /// Remove an item from chunk `(cx, cy)`. Out-of-range chunks are ignored.
    pub fn remove_item_from_chunk(&mut self, id: ItemId, cx: i32, cy: i32) {
        self.grid.remove_from_chunk(id, cx, cy);
    }

    /// Add an item to the chunk containing surface point `(x, y)`.
    pub fn add_item_to_chunk_containing(&mut self, id: ItemId, x: f64, y: f64) {
        self.grid.add_to_chunk_containing(id, x, y);
    }

    /// Remove an item from the chunk containing surface point `(x, y)`.
    pub fn remove_item_from_chunk_containing(&mut self, id: ItemId, x: f64, y: f64) {
        self.grid.remove_from_chunk_containing(id, x, y);
    }

    /// Items listed in chunk `(cx, cy)`.
    pub fn chunk_items(&self, cx: i32, cy: i32) -> Option<&[ItemId]> {
        self.grid.chunk(cx, cy).map(Chunk::items)
    }

    /// Whether chunk `(cx, cy)` awaits a redraw.
    pub fn is_chunk_dirty(&self, cx: i32, cy: i32) -> bool {
        self.grid.is_dirty(cx, cy)
    }

    /// Mark chunk `(cx, cy)` dirty.
    pub fn set_changed_chunk(&mut self, cx: i32, cy: i32) {
        self.grid.set_changed_chunk(cx, cy);
    }

    /// Mark the chunk containing surface point `(x, y)` dirty.
    pub fn set_changed_chunk_containing(&mut self, x: f64, y: f64) {
        self.grid.set_changed_chunk_containing(x, y);
    }

    /// Mark every chunk overlapping `rect` dirty.
    pub fn set_changed(&mut self, rect: Rect) {
        self.grid.set_changed(&rect_to_aabb(rect));
    }

    /// Clear the dirty flag of every chunk overlapping `rect`.
    pub fn set_unchanged(&mut self, rect: Rect) {
        self.grid.set_unchanged(&rect_to_aabb(rect));
    }

    /// Mark the whole surface dirty.
    pub fn set_all_changed(&mut self) {
        self.grid.set_all_changed();
    }

    /// Region that needs a redraw, or `None` when nothing is dirty.
    ///
    /// Each dirty chunk contributes its rectangle plus one unit on the right
    /// and bottom. Dirty flags are not consumed.
    pub fn change_bounds(&self) -> Option<Rect> {
        self.grid.change_bounds().map(aabb_to_rect)
    }

    /// Send the pending redraw region to every view, then mark it clean.
    ///
    /// Each view receives the region mapped through its own transform.
    /// Returns the region in scene coordinates.
    pub fn update(&mut self) -> Option<Rect> {
        let bounds = self.change_bounds()?;
        for view in self.views.iter_mut().flatten() {
            view.repaint(transform_rect_bbox(view.transform(), bounds));
        }
        self.set_unchanged(bounds);
        trace!(rect = ?bounds, "update");
        Some(bounds)
    }

    // --- views ---

    /// Register a redraw subscriber.
    pub fn add_view(&mut self, view: Box<dyn View>) -> ViewId {
        self.views.push(Some(view));
        ViewId(self.views.len() - 1)
    }

    /// Unregister a view, handing it back.
    pub fn remove_view(&mut self, id: ViewId) -> Option<Box<dyn View>> {
        self.views.get_mut(id.0)?.take()
    }

    // --- background ---

    /// Background colour.
    pub fn background_color(&self) -> Color {
        self.background
    }

    /// Change the background colour, marking the surface changed.
    pub fn set_background_color(&mut self, color: Color) {
        if self.background != color {
            self.background = color;
            self.set_all_changed();
        }
    }

    /// Install a zero-filled `h_tiles × v_tiles` tile grid.
    ///
    /// Ignored when either tile dimension is zero. With many tiles the chunk
    /// size is retuned to fit the tile size.
    pub fn set_tiles(&mut self, h_tiles: u32, v_tiles: u32, tile_width: u32, tile_height: u32) {
        if tile_width == 0 || tile_height == 0 {
            return;
        }
        self.tiles = (h_tiles > 0 && v_tiles > 0)
            .then(|| TileMap::new(h_tiles, v_tiles, tile_width, tile_height));
        if h_tiles.saturating_add(v_tiles) > 10 {
            let common = lcm(tile_width, tile_height);
            self.retune(if common < 128 {
                common
            } else {
                tile_width.max(tile_height)
            });
        }
        self.set_all_changed();
        debug!(h_tiles, v_tiles, tile_width, tile_height, "tiles set");
    }

    /// Store a tile number, marking its area changed.
    ///
    /// Out-of-range tiles and unchanged values are ignored.
    pub fn set_tile(&mut self, x: u32, y: u32, tile: u32) {
        let Some(tiles) = &mut self.tiles else {
            return;
        };
        if !tiles.set(x, y, tile) {
            return;
        }
        let chunk_aligned = tiles.tile_width() == tiles.tile_height()
            && tiles.tile_width() == self.grid.chunk_size();
        let rect = tiles.tile_rect(x, y);
        if chunk_aligned {
            let cx = i32::try_from(x).unwrap_or(i32::MAX);
            let cy = i32::try_from(y).unwrap_or(i32::MAX);
            self.grid.set_changed_chunk(cx, cy);
        } else {
            self.set_changed(rect);
        }
    }

    /// Tile number at `(x, y)`.
    pub fn tile(&self, x: u32, y: u32) -> Option<u32> {
        self.tiles.as_ref()?.get(x, y)
    }

    /// The tile grid, if any.
    pub fn tiles(&self) -> Option<&TileMap> {
        self.tiles.as_ref()
    }

    // --- drawing ---

    /// Order ids back to front by z, then insertion, dropping repeats.
    fn back_to_front(&self, ids: Vec<ItemId>) -> Vec<ItemId> {
        let mut keyed: Vec<(f64, u64, ItemId)> = ids
            .into_iter()
            .filter_map(|id| self.slot(id).map(|s| (s.item.z(), s.seq, id)))
            .collect();
        keyed.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        keyed.dedup_by_key(|k| k.2);
        keyed.into_iter().map(|(_, _, id)| id).collect()
    }

    /// Items listed in the chunks overlapping `rect`, back to front.
    pub fn items_in(&self, rect: Rect) -> Vec<ItemId> {
        let range = self.grid.surface_range(&rect_to_aabb(rect));
        let mut ids = Vec::new();
        self.grid.visit_range(range, |id| ids.push(id));
        self.back_to_front(ids)
    }

    fn paint_background(&self, area: Rect, painter: &mut dyn Painter) {
        painter.fill_background(area, self.background);
        if let Some(tiles) = &self.tiles {
            tiles.visit_overlapping(area, |r, t| painter.draw_tile(r, t));
        }
    }

    fn paint_items(&self, ids: Vec<ItemId>, painter: &mut dyn Painter) {
        for id in self.back_to_front(ids) {
            if let Some(slot) = self.slot(id) {
                painter.draw_item(id, &slot.item);
            }
        }
    }

    /// Draw everything overlapping `rect`: background, tiles, then items in
    /// ascending z. Dirty flags are left alone.
    pub fn draw_area(&self, rect: Rect, painter: &mut dyn Painter) {
        let area = rect.abs().intersect(self.rect());
        if area.width() <= 0.0 || area.height() <= 0.0 {
            return;
        }
        self.paint_background(area, painter);
        let range = self.grid.surface_range(&rect_to_aabb(area));
        let mut ids = Vec::new();
        self.grid.visit_range(range, |id| ids.push(id));
        self.paint_items(ids, painter);
    }

    /// Redraw only the dirty chunks overlapping `rect`, consuming their dirty
    /// flags.
    ///
    /// Paints background for each dirty chunk and every item listed in
    /// them. Returns the repainted chunk rectangles, clipped to the surface;
    /// painters should clip item drawing to them.
    pub fn draw_changed(&mut self, rect: Rect, painter: &mut dyn Painter) -> Vec<Rect> {
        let surface = self.rect();
        let mut cells = Vec::new();
        let mut ids = Vec::new();
        self.grid.take_changed(&rect_to_aabb(rect), |cell, items| {
            cells.push(aabb_to_rect(cell).intersect(surface));
            ids.extend_from_slice(items);
        });
        for &cell in &cells {
            self.paint_background(cell, painter);
        }
        self.paint_items(ids, painter);
        cells
    }

    // --- collisions ---

    fn collisions_in(
        &self,
        range: CellRange,
        shape: &Collider,
        exclude: Option<ItemId>,
        exact: bool,
    ) -> Vec<ItemId> {
        let mut hits: Vec<(f64, u64, ItemId)> = Vec::new();
        self.grid.visit_unique(range, |id| {
            if Some(id) == exclude {
                return;
            }
            let Some(slot) = self.slot(id) else {
                return;
            };
            if !exact || collide(shape, &slot.item.collider()) {
                hits.push((slot.item.z(), slot.seq, id));
            }
        });
        hits.sort_unstable_by(|a, b| b.0.total_cmp(&a.0).then(b.1.cmp(&a.1)));
        hits.into_iter().map(|(_, _, id)| id).collect()
    }

    /// Items near or, when `exact`, touching the query shape, topmost first.
    ///
    /// The query is clipped to the surface. Without `exact` the result is
    /// every item sharing a chunk with the query, a superset of the true
    /// collisions.
    pub fn collisions(
        &self,
        query: Query<'_>,
        exclude: Option<ItemId>,
        exact: bool,
    ) -> Vec<ItemId> {
        let (aabb, shape) = match query {
            Query::Point(p) => {
                if !self.on_canvas(p.x, p.y) {
                    return Vec::new();
                }
                (Aabb2D::from_point(p.x, p.y), Collider::Point(p))
            }
            Query::Rect(r) => {
                let r = r.abs();
                (rect_to_aabb(r), Collider::Box(r))
            }
            Query::Polygon(points) => {
                let Some(bounds) = polygon::bounds(points) else {
                    return Vec::new();
                };
                (rect_to_aabb(bounds), Collider::Area(points.to_vec()))
            }
        };
        self.collisions_in(self.grid.surface_range(&aabb), &shape, exclude, exact)
    }

    /// Items colliding with `id`, topmost first, excluding `id` itself.
    ///
    /// Hidden items occupy no chunks and collide with nothing.
    pub fn item_collisions(&self, id: ItemId, exact: bool) -> Vec<ItemId> {
        let Some(item) = self.item(id) else {
            return Vec::new();
        };
        if !item.is_visible() {
            return Vec::new();
        }
        let range = self.cells_of(item);
        self.collisions_in(range, &item.collider(), Some(id), exact)
    }

    /// Whether two live items collide.
    pub fn collide(&self, a: ItemId, b: ItemId) -> Option<bool> {
        let a = self.item(a)?;
        let b = self.item(b)?;
        Some(collide(&a.collider(), &b.collider()))
    }
}
