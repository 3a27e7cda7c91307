// Copyright 2025 the Chunkboard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene: handles, flags, and styling.

use alloc::string::String;

use peniko::Color;

/// Identifier for an item in a [`Scene`](crate::Scene) (generational).
///
/// Handles of removed items go stale: a later item may reuse the slot, but
/// with a newer generation, so operations on the old handle are ignored.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub(crate) u32, pub(crate) u32);

impl ItemId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Identifier for a registered [`View`](crate::View).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ViewId(pub(crate) usize);

bitflags::bitflags! {
    /// Independent per-item state flags.
    ///
    /// Only [`ItemFlags::VISIBLE`] affects chunk membership; the others only
    /// request a redraw when they change.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ItemFlags: u8 {
        /// Item is drawn and listed in the chunks it overlaps.
        const VISIBLE  = 0b0000_0001;
        /// Item is selected.
        const SELECTED = 0b0000_0010;
        /// Item accepts interaction.
        const ENABLED  = 0b0000_0100;
        /// Item is the active one.
        const ACTIVE   = 0b0000_1000;
    }
}

impl Default for ItemFlags {
    fn default() -> Self {
        Self::empty()
    }
}

bitflags::bitflags! {
    /// Alignment of text relative to its anchor point.
    ///
    /// With no flags the anchor is the top-left corner of the text box.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TextFlags: u8 {
        /// Right edge at the anchor.
        const ALIGN_RIGHT   = 0b0000_0001;
        /// Horizontally centred on the anchor.
        const ALIGN_HCENTER = 0b0000_0010;
        /// Bottom edge at the anchor.
        const ALIGN_BOTTOM  = 0b0000_0100;
        /// Vertically centred on the anchor.
        const ALIGN_VCENTER = 0b0000_1000;
    }
}

impl Default for TextFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// The closed set of item variants.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ItemKind {
    /// A stroked segment.
    Line,
    /// An axis-aligned rectangle.
    Rect,
    /// An ellipse or elliptic pie.
    Ellipse,
    /// A filled polygon.
    Polygon,
    /// A run of text.
    Text,
}

/// Outline style.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Pen {
    /// No outline. Items drawn without a pen get no stroke allowance.
    None,
    /// A solid outline.
    Solid {
        /// Stroke width in surface units. Zero means a hairline.
        width: f64,
        /// Stroke colour.
        color: Color,
    },
}

impl Pen {
    /// One-unit black outline, used for new items.
    pub const DEFAULT: Self = Self::Solid {
        width: 1.0,
        color: Color::BLACK,
    };

    /// Stroke width, or `None` for [`Pen::None`].
    pub fn width(&self) -> Option<f64> {
        match self {
            Self::None => None,
            Self::Solid { width, .. } => Some(*width),
        }
    }
}

impl Default for Pen {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Interior style.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Fill {
    /// No fill.
    #[default]
    None,
    /// A solid fill.
    Solid(Color),
}

/// Font description handed to [`TextMetrics`](crate::TextMetrics).
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    /// Family name.
    pub family: String,
    /// Size in surface units.
    pub size: f64,
}

impl Font {
    /// Create a font description.
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new("sans-serif", 12.0)
    }
}
