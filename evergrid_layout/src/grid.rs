// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A uniform two-dimensional grid.

use core::ops::Range;

use kurbo::{Point, Rect, Vec2};

use crate::props::LayoutProps;
use crate::source::LayoutSource;
use crate::span::{cell_at, limit_cells, visible_span};
use crate::types::{IndexBounds, IndexSet, ItemIndex, Rounding};

/// Lays out [`ItemIndex::Grid`] cells on a uniform grid.
///
/// Cell `{x, y}` occupies `(x * w, y * h)` to `((x + 1) * w, (y + 1) * h)`
/// where `(w, h)` is the current [`item_size`](LayoutProps::item_size).
/// Without bounds the grid is infinite in every direction.
///
/// ```rust
/// use evergrid_layout::{GridLayoutSource, ItemIndex, LayoutProps, LayoutSource, ReuseId, Rounding};
/// use kurbo::{Point, Rect, Vec2};
///
/// let grid = GridLayoutSource::new(
///     LayoutProps::new(ReuseId("photo")).with_item_size(Vec2::new(300.0, 300.0)),
/// );
/// assert_eq!(
///     grid.item_rect(ItemIndex::Grid { x: -1, y: 2 }),
///     Some(Rect::new(-300.0, 600.0, 0.0, 900.0)),
/// );
/// assert_eq!(
///     grid.grid_index(Point::new(450.0, -10.0), Rounding::Floor),
///     Some(ItemIndex::Grid { x: 1, y: -1 }),
/// );
/// ```
#[derive(Debug)]
pub struct GridLayoutSource {
    props: LayoutProps,
    columns: Option<IndexBounds>,
    rows: Option<IndexBounds>,
    edits: u64,
}

impl GridLayoutSource {
    /// Creates an unbounded grid.
    #[must_use]
    pub fn new(props: LayoutProps) -> Self {
        Self {
            props,
            columns: None,
            rows: None,
            edits: 0,
        }
    }

    /// Restricts the grid to the given column and row ranges.
    #[must_use]
    pub fn with_bounds(mut self, columns: Range<i64>, rows: Range<i64>) -> Self {
        self.set_bounds(Some(columns.into()), Some(rows.into()));
        self
    }

    /// Sets or clears the column and row bounds.
    pub fn set_bounds(&mut self, columns: Option<IndexBounds>, rows: Option<IndexBounds>) {
        self.columns = columns;
        self.rows = rows;
        self.edits = self.edits.wrapping_add(1);
    }

    /// Column bounds, if any.
    #[must_use]
    pub const fn columns(&self) -> Option<IndexBounds> {
        self.columns
    }

    /// Row bounds, if any.
    #[must_use]
    pub const fn rows(&self) -> Option<IndexBounds> {
        self.rows
    }

    /// Current cell size.
    #[must_use]
    pub fn cell_size(&self) -> Vec2 {
        self.props.item_size()
    }

    /// The cell at a source-local location, ignoring bounds.
    ///
    /// Returns `None` only when the cell size is degenerate.
    #[must_use]
    pub fn grid_index(&self, location: Point, rounding: Rounding) -> Option<ItemIndex> {
        let size = self.cell_size();
        let x = cell_at(location.x, size.x, rounding)?;
        let y = cell_at(location.y, size.y, rounding)?;
        Some(ItemIndex::Grid { x, y })
    }

    fn in_bounds(&self, x: i64, y: i64) -> bool {
        self.columns.is_none_or(|b| b.contains(x)) && self.rows.is_none_or(|b| b.contains(y))
    }
}

impl LayoutSource for GridLayoutSource {
    fn props(&self) -> &LayoutProps {
        &self.props
    }

    fn props_mut(&mut self) -> &mut LayoutProps {
        &mut self.props
    }

    fn item_rect(&self, index: ItemIndex) -> Option<Rect> {
        let (x, y) = index.grid()?;
        if !self.in_bounds(x, y) {
            return None;
        }
        let size = self.cell_size();
        let x0 = x as f64 * size.x;
        let y0 = y as f64 * size.y;
        Some(Rect::new(x0, y0, x0 + size.x, y0 + size.y))
    }

    fn visible_indices(&self, query: Rect) -> IndexSet {
        let size = self.cell_size();
        let columns = visible_span(query.x0, query.x1, size.x, self.columns);
        let rows = visible_span(query.y0, query.y1, size.y, self.rows);
        let (columns, rows) = limit_cells(columns, rows);
        let mut set = IndexSet::new();
        for y in rows {
            for x in columns.clone() {
                set.insert(ItemIndex::Grid { x, y });
            }
        }
        set
    }

    fn index_at_location(&self, location: Point, rounding: Rounding) -> Option<ItemIndex> {
        let index = self.grid_index(location, rounding)?;
        let (x, y) = index.grid()?;
        self.in_bounds(x, y).then_some(index)
    }

    fn revision(&self) -> u64 {
        self.props.revision().wrapping_add(self.edits)
    }
}

#[cfg(test)]
mod tests {
    use super::GridLayoutSource;
    use crate::error::LayoutError;
    use crate::props::LayoutProps;
    use crate::source::{LayoutSource, ListEdit};
    use crate::span::MAX_VISIBLE_CELLS;
    use crate::types::{ItemIndex, ReuseId, Rounding};
    use evergrid_value::AnimatedValue;
    use evergrid_value::Animation;
    use kurbo::{Insets, Point, Rect, Vec2};

    fn grid(size: f64) -> GridLayoutSource {
        GridLayoutSource::new(LayoutProps::new(ReuseId("cell")).with_item_size(Vec2::new(size, size)))
    }

    #[test]
    fn visible_cells_cover_the_query() {
        let g = grid(100.0);
        let set = g.visible_indices(Rect::new(-50.0, 0.0, 150.0, 100.0));
        let cells: alloc::vec::Vec<_> = set.into_iter().collect();
        assert_eq!(
            cells,
            [
                ItemIndex::Grid { x: -1, y: 0 },
                ItemIndex::Grid { x: 0, y: 0 },
                ItemIndex::Grid { x: 1, y: 0 },
            ]
        );
    }

    #[test]
    fn bounds_limit_rects_and_visibility() {
        let g = grid(10.0).with_bounds(0..3, 0..2);
        assert_eq!(g.item_rect(ItemIndex::Grid { x: 3, y: 0 }), None);
        assert_eq!(g.item_rect(ItemIndex::Linear(0)), None);
        assert_eq!(g.visible_indices(Rect::new(-100.0, -100.0, 100.0, 100.0)).len(), 6);
        assert_eq!(g.index_at_location(Point::new(35.0, 5.0), Rounding::Floor), None);
        assert_eq!(
            g.index_at_location(Point::new(25.0, 5.0), Rounding::Floor),
            Some(ItemIndex::Grid { x: 2, y: 0 })
        );
    }

    #[test]
    fn shared_item_size_resizes_cells() {
        let mut size = AnimatedValue::new(Vec2::new(10.0, 10.0));
        let g = GridLayoutSource::new(LayoutProps::new(ReuseId("cell")).with_item_size(size.handle()));
        let before = g.revision();
        size.animate_to(Vec2::new(20.0, 20.0), Animation::default());
        while size.tick(1.0 / 60.0) {}
        assert_ne!(g.revision(), before);
        assert_eq!(
            g.item_rect(ItemIndex::Grid { x: 1, y: 1 }),
            Some(Rect::new(20.0, 20.0, 40.0, 40.0))
        );
    }

    #[test]
    fn bounds_and_props_changes_move_the_revision() {
        let mut g = grid(10.0);
        let r0 = g.revision();
        g.set_bounds(Some((0..4).into()), None);
        let r1 = g.revision();
        assert_ne!(r1, r0);
        g.props_mut().set_insets(Insets::uniform(50.0));
        let r2 = g.revision();
        assert_ne!(r2, r1);
        g.props_mut().set_item_size(Vec2::new(99.0, 99.0));
        assert_ne!(g.revision(), r2);
        assert_eq!(
            g.item_rect(ItemIndex::Grid { x: 1, y: 1 }),
            Some(Rect::new(99.0, 99.0, 198.0, 198.0))
        );
    }

    #[test]
    fn zoomed_out_grids_realize_a_bounded_area() {
        // A 400 x 400 pixel view at scale 1e-3 over 300 unit cells.
        let g = grid(300.0);
        let set = g.visible_indices(Rect::new(-200_000.0, -200_000.0, 200_000.0, 200_000.0));
        assert!(set.len() as u64 <= MAX_VISIBLE_CELLS, "{} cells", set.len());
        assert!(set.contains(&ItemIndex::Grid { x: 0, y: 0 }));
    }

    #[test]
    fn grids_reject_list_edits() {
        let mut g = grid(10.0);
        assert_eq!(
            g.apply_edit(ListEdit::Insert { index: 0, count: 1 }),
            Err(LayoutError::EditUnsupported)
        );
    }

    #[test]
    fn zero_size_grid_shows_nothing() {
        let g = grid(0.0);
        assert!(g.visible_indices(Rect::new(0.0, 0.0, 100.0, 100.0)).is_empty());
        assert_eq!(g.grid_index(Point::ZERO, Rounding::Floor), None);
    }
}
