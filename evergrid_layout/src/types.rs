// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Item identities and small geometry enums shared by all layout sources.

use alloc::collections::BTreeSet;
use core::fmt;
use core::ops::Range;

use kurbo::{Point, Vec2};

/// Logical identity of an item within one layout source.
///
/// Flat and custom sources use [`ItemIndex::Linear`]; grids use
/// [`ItemIndex::Grid`]. Indices may be negative for unbounded sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemIndex {
    /// A position in a 1D sequence.
    Linear(i64),
    /// A cell in a 2D grid.
    Grid {
        /// Column.
        x: i64,
        /// Row.
        y: i64,
    },
}

impl ItemIndex {
    /// Returns the linear index, if this is one.
    #[must_use]
    pub const fn linear(self) -> Option<i64> {
        match self {
            Self::Linear(i) => Some(i),
            Self::Grid { .. } => None,
        }
    }

    /// Returns the `(x, y)` grid cell, if this is one.
    #[must_use]
    pub const fn grid(self) -> Option<(i64, i64)> {
        match self {
            Self::Grid { x, y } => Some((x, y)),
            Self::Linear(_) => None,
        }
    }
}

impl From<i64> for ItemIndex {
    fn from(i: i64) -> Self {
        Self::Linear(i)
    }
}

impl From<(i64, i64)> for ItemIndex {
    fn from((x, y): (i64, i64)) -> Self {
        Self::Grid { x, y }
    }
}

impl fmt::Display for ItemIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear(i) => write!(f, "{i}"),
            Self::Grid { x, y } => write!(f, "{x}_{y}"),
        }
    }
}

/// The set of indices a source wants realized, in deterministic order.
pub type IndexSet = BTreeSet<ItemIndex>;

/// Collects a linear range into an [`IndexSet`].
#[must_use]
pub fn linear_indices(range: Range<i64>) -> IndexSet {
    range.map(ItemIndex::Linear).collect()
}

/// Category of item views that can be recycled for one another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReuseId(pub &'static str);

impl ReuseId {
    /// Reuse id of sources that do not name one.
    pub const DEFAULT: Self = Self("default");
}

impl Default for ReuseId {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A layout axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The x axis.
    Horizontal,
    /// The y axis.
    Vertical,
}

impl Axis {
    /// The other axis.
    #[must_use]
    pub const fn cross(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    /// Component of `v` along this axis.
    #[must_use]
    pub const fn of(self, v: Vec2) -> f64 {
        match self {
            Self::Horizontal => v.x,
            Self::Vertical => v.y,
        }
    }

    /// Coordinate of `p` along this axis.
    #[must_use]
    pub const fn of_point(self, p: Point) -> f64 {
        match self {
            Self::Horizontal => p.x,
            Self::Vertical => p.y,
        }
    }
}

/// A container edge an item can be pinned to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Pinned to the top; ignores vertical scroll.
    Top,
    /// Pinned to the bottom; ignores vertical scroll.
    Bottom,
    /// Pinned to the left; ignores horizontal scroll.
    Left,
    /// Pinned to the right; ignores horizontal scroll.
    Right,
}

impl Edge {
    /// The axis along which the pinned item ignores scroll.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Top | Self::Bottom => Axis::Vertical,
            Self::Left | Self::Right => Axis::Horizontal,
        }
    }

    /// `true` for the bottom and right edges.
    #[must_use]
    pub const fn is_far(self) -> bool {
        matches!(self, Self::Bottom | Self::Right)
    }
}

/// How a continuous location is turned into an index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Rounding {
    /// The cell containing the location.
    #[default]
    Floor,
    /// The nearest cell boundary.
    Round,
    /// The next cell boundary at or after the location.
    Ceil,
}

/// A half-open range of valid indices along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexBounds {
    /// First valid index.
    pub start: i64,
    /// One past the last valid index.
    pub end: i64,
}

impl IndexBounds {
    /// Creates bounds covering `start..end`.
    #[must_use]
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// `true` if `i` lies within the bounds.
    #[must_use]
    pub const fn contains(&self, i: i64) -> bool {
        self.start <= i && i < self.end
    }
}

impl From<Range<i64>> for IndexBounds {
    fn from(r: Range<i64>) -> Self {
        Self::new(r.start, r.end)
    }
}
