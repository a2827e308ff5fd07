// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layout source strategy trait and the helpers built on it.

use evergrid_view::Viewport;
use kurbo::{Point, Rect, Vec2};

use crate::error::LayoutError;
use crate::props::LayoutProps;
use crate::types::{Axis, IndexSet, ItemIndex, Rounding};

/// An insertion or removal in a linear source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListEdit {
    /// `count` items inserted before `index`.
    Insert {
        /// First new index.
        index: i64,
        /// Number of inserted items.
        count: usize,
    },
    /// `count` items removed starting at `index`.
    Remove {
        /// First removed index.
        index: i64,
        /// Number of removed items.
        count: usize,
    },
}

impl ListEdit {
    /// Where the item previously at `i` lives after the edit.
    ///
    /// Returns `None` for removed items.
    ///
    /// ```rust
    /// use evergrid_layout::ListEdit;
    ///
    /// let insert = ListEdit::Insert { index: 2, count: 1 };
    /// assert_eq!(insert.map_index(1), Some(1));
    /// assert_eq!(insert.map_index(2), Some(3));
    ///
    /// let remove = ListEdit::Remove { index: 2, count: 2 };
    /// assert_eq!(remove.map_index(3), None);
    /// assert_eq!(remove.map_index(4), Some(2));
    /// ```
    #[must_use]
    pub fn map_index(&self, i: i64) -> Option<i64> {
        match *self {
            Self::Insert { index, count } => {
                let count = i64::try_from(count).unwrap_or(i64::MAX);
                Some(if i >= index { i.saturating_add(count) } else { i })
            }
            Self::Remove { index, count } => {
                let count = i64::try_from(count).unwrap_or(i64::MAX);
                let end = index.saturating_add(count);
                if i < index {
                    Some(i)
                } else if i < end {
                    None
                } else {
                    Some(i - count)
                }
            }
        }
    }

    /// Maps an [`ItemIndex`]; grid indices are returned unchanged.
    #[must_use]
    pub fn map_item(&self, index: ItemIndex) -> Option<ItemIndex> {
        match index {
            ItemIndex::Linear(i) => self.map_index(i).map(ItemIndex::Linear),
            grid @ ItemIndex::Grid { .. } => Some(grid),
        }
    }
}

/// A strategy that places items in content space and reports which are visible.
///
/// Implementors work in *source-local, unshifted* content coordinates: the
/// source's [`origin`](LayoutProps::origin) and
/// [`item_origin`](LayoutProps::item_origin) are applied by the helpers in
/// this module ([`item_frame`], [`visible_set`]), so a source only has to
/// describe its own arrangement.
pub trait LayoutSource {
    /// Shared properties.
    fn props(&self) -> &LayoutProps;

    /// Shared properties, mutably.
    fn props_mut(&mut self) -> &mut LayoutProps;

    /// The rect of `index`, or `None` when the index is not part of this source.
    fn item_rect(&self, index: ItemIndex) -> Option<Rect>;

    /// Indices whose rects intersect `query`, in deterministic order.
    fn visible_indices(&self, query: Rect) -> IndexSet;

    /// The index at a source-local location, if the source is addressable that way.
    fn index_at_location(&self, location: Point, rounding: Rounding) -> Option<ItemIndex> {
        let _ = (location, rounding);
        None
    }

    /// Applies a list edit to the source's own bookkeeping.
    fn apply_edit(&mut self, edit: ListEdit) -> Result<(), LayoutError> {
        let _ = edit;
        Err(LayoutError::EditUnsupported)
    }

    /// A counter that changes whenever layout-affecting inputs change.
    fn revision(&self) -> u64 {
        self.props().revision()
    }
}

fn item_shift(props: &LayoutProps, size: Vec2) -> Vec2 {
    let origin = props.origin();
    Vec2::new(
        origin.x - props.item_origin().x * size.x,
        origin.y - props.item_origin().y * size.y,
    )
}

/// The rect of `index` in content space, with origin and item origin applied.
#[must_use]
pub fn item_content_rect(source: &dyn LayoutSource, index: ItemIndex) -> Option<Rect> {
    let rect = source.item_rect(index)?;
    let size = Vec2::new(rect.width(), rect.height());
    Some(rect + item_shift(source.props(), size))
}

/// The container-pixel frame of `index` under `view`.
///
/// Applies the sticky edge and the view-layout override, in that order.
#[must_use]
pub fn item_frame(source: &dyn LayoutSource, index: ItemIndex, view: &Viewport) -> Option<Rect> {
    let rect = source.item_rect(index)?;
    let props = source.props();
    let size = Vec2::new(rect.width(), rect.height());
    let mut frame = view.content_to_container_rect(rect + item_shift(props, size));
    let container = view.container_size();

    if let Some(edge) = props.sticky_edge() {
        let origin = props.origin();
        match edge.axis() {
            Axis::Vertical => {
                let base = if edge.is_far() { container.height } else { 0.0 };
                let y0 = base + origin.y - props.item_origin().y * size.y;
                frame.y0 = y0;
                frame.y1 = y0 + size.y;
            }
            Axis::Horizontal => {
                let base = if edge.is_far() { container.width } else { 0.0 };
                let x0 = base + origin.x - props.item_origin().x * size.x;
                frame.x0 = x0;
                frame.x1 = x0 + size.x;
            }
        }
    }

    if let Some(layout) = props.view_layout(index, container) {
        frame = layout.apply(frame, container);
    }
    Some(frame)
}

/// The query rect handed to [`LayoutSource::visible_indices`] for `view`.
///
/// This is the inset visible content rect, moved into source-local
/// coordinates and widened by the item-origin shift. Along a sticky axis the
/// query spans exactly one cell.
#[must_use]
pub fn visible_query(source: &dyn LayoutSource, view: &Viewport) -> Rect {
    let props = source.props();
    let size = props.item_size();
    let visible = view.visible_content_rect_with_insets(props.insets());
    let mut query = visible - item_shift(props, size);
    if let Some(edge) = props.sticky_edge() {
        match edge.axis() {
            Axis::Vertical => {
                query.y0 = 0.0;
                query.y1 = size.y;
            }
            Axis::Horizontal => {
                query.x0 = 0.0;
                query.x1 = size.x;
            }
        }
    }
    query
}

/// The indices of `source` visible in `view`.
#[must_use]
pub fn visible_set(source: &dyn LayoutSource, view: &Viewport) -> IndexSet {
    source.visible_indices(visible_query(source, view))
}

/// Converts a container point into a source-local content location.
#[must_use]
pub fn location_at(source: &dyn LayoutSource, container_point: Point, view: &Viewport) -> Point {
    let content = view.container_to_content_point(container_point);
    content - source.props().origin()
}

/// The top-most visible item whose frame contains `container_point`.
///
/// Later indices are treated as drawn above earlier ones.
#[must_use]
pub fn visible_item_at(
    source: &dyn LayoutSource,
    container_point: Point,
    view: &Viewport,
) -> Option<ItemIndex> {
    visible_set(source, view).into_iter().rev().find(|&index| {
        item_frame(source, index, view).is_some_and(|frame| frame.contains(container_point))
    })
}

#[cfg(test)]
mod tests {
    use super::{ListEdit, item_frame, visible_item_at, visible_query, visible_set};
    use crate::flat::FlatLayoutSource;
    use crate::grid::GridLayoutSource;
    use crate::props::{Dimension, LayoutProps, ViewLayout};
    use crate::types::{Axis, Edge, ItemIndex, ReuseId};
    use evergrid_view::Viewport;
    use kurbo::{Insets, Point, Rect, Size, Vec2};

    fn view() -> Viewport {
        Viewport::new(Size::new(100.0, 100.0))
    }

    #[test]
    fn item_origin_centers_items_on_positions() {
        let grid = GridLayoutSource::new(
            LayoutProps::new(ReuseId("cell"))
                .with_item_size(Vec2::new(10.0, 10.0))
                .with_item_origin(Vec2::new(0.5, 0.5)),
        );
        let frame = item_frame(&grid, ItemIndex::Grid { x: 0, y: 0 }, &view());
        assert_eq!(frame, Some(Rect::new(-5.0, -5.0, 5.0, 5.0)));
        // The half-visible cells above and left of the corner are still found.
        let visible = visible_set(&grid, &view());
        assert!(visible.contains(&ItemIndex::Grid { x: 10, y: 10 }));
        assert!(!visible.contains(&ItemIndex::Grid { x: -1, y: 0 }));
        assert_eq!(visible.len(), 11 * 11);
    }

    #[test]
    fn sticky_bottom_ignores_vertical_scroll() {
        let axis = FlatLayoutSource::new(
            LayoutProps::new(ReuseId("label"))
                .with_item_size(Vec2::new(20.0, 40.0))
                .with_origin(Vec2::new(0.0, -40.0))
                .with_sticky_edge(Edge::Bottom),
            Axis::Horizontal,
        );
        let mut v = view();
        v.set_offset(Point::new(30.0, 5000.0));
        let frame = item_frame(&axis, ItemIndex::Linear(2), &v).unwrap();
        assert_eq!(frame, Rect::new(10.0, 60.0, 30.0, 100.0));
        assert_eq!(visible_query(&axis, &v).y0, 0.0);
        assert!(!visible_set(&axis, &v).is_empty());
    }

    #[test]
    fn insets_shrink_the_visible_region() {
        let grid = GridLayoutSource::new(
            LayoutProps::new(ReuseId("cell"))
                .with_item_size(Vec2::new(10.0, 10.0))
                .with_insets(Insets::new(20.0, 0.0, 0.0, 0.0)),
        );
        let visible = visible_set(&grid, &view());
        assert!(!visible.contains(&ItemIndex::Grid { x: 1, y: 0 }));
        assert!(visible.contains(&ItemIndex::Grid { x: 2, y: 0 }));
    }

    #[test]
    fn view_layout_overrides_apply_after_sticky() {
        let lines = FlatLayoutSource::new(
            LayoutProps::new(ReuseId("line"))
                .with_item_size(Vec2::new(10.0, 1.0))
                .with_sticky_edge(Edge::Top)
                .with_view_layout(|_, _| ViewLayout {
                    height: Some(Dimension::FULL),
                    ..ViewLayout::default()
                }),
            Axis::Horizontal,
        );
        let frame = item_frame(&lines, ItemIndex::Linear(0), &view()).unwrap();
        assert_eq!(frame, Rect::new(0.0, 0.0, 10.0, 100.0));
    }

    #[test]
    fn hit_testing_prefers_later_items() {
        let list = FlatLayoutSource::new(
            LayoutProps::new(ReuseId("row")).with_item_size(Vec2::new(100.0, 30.0)),
            Axis::Vertical,
        )
        .with_len(10);
        assert_eq!(
            visible_item_at(&list, Point::new(50.0, 45.0), &view()),
            Some(ItemIndex::Linear(1))
        );
        assert_eq!(visible_item_at(&list, Point::new(150.0, 45.0), &view()), None);
    }

    #[test]
    fn edits_map_grid_indices_through() {
        let edit = ListEdit::Remove { index: 0, count: 1 };
        let grid = ItemIndex::Grid { x: 0, y: 0 };
        assert_eq!(edit.map_item(grid), Some(grid));
        assert_eq!(edit.map_item(ItemIndex::Linear(0)), None);
    }
}
