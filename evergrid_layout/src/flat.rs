// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A one-dimensional sequence of uniform items.

use kurbo::{Point, Rect};

use crate::error::LayoutError;
use crate::props::LayoutProps;
use crate::source::{LayoutSource, ListEdit};
use crate::span::{cell_at, visible_span};
use crate::types::{Axis, IndexBounds, IndexSet, ItemIndex, Rounding};

/// Lays out [`ItemIndex::Linear`] items one after another along an [`Axis`].
///
/// Item `i` spans `[i * s, (i + 1) * s)` along the flow axis (where `s` is
/// the item size on that axis) and `[0, c)` across it. With a length the
/// valid indices are `0..len`; without one the sequence is unbounded in both
/// directions, which suits axis labels and grid lines.
///
/// ```rust
/// use evergrid_layout::{Axis, FlatLayoutSource, ItemIndex, LayoutProps, LayoutSource, ListEdit, ReuseId};
/// use kurbo::{Rect, Vec2};
///
/// let mut inbox = FlatLayoutSource::new(
///     LayoutProps::new(ReuseId("email")).with_item_size(Vec2::new(320.0, 72.0)),
///     Axis::Vertical,
/// )
/// .with_len(3);
///
/// assert_eq!(inbox.item_rect(ItemIndex::Linear(1)), Some(Rect::new(0.0, 72.0, 320.0, 144.0)));
/// assert_eq!(inbox.item_rect(ItemIndex::Linear(3)), None);
///
/// inbox.apply_edit(ListEdit::Remove { index: 0, count: 1 }).unwrap();
/// assert_eq!(inbox.len(), Some(2));
/// ```
#[derive(Debug)]
pub struct FlatLayoutSource {
    props: LayoutProps,
    axis: Axis,
    len: Option<usize>,
    edits: u64,
}

impl FlatLayoutSource {
    /// Creates an unbounded sequence flowing along `axis`.
    #[must_use]
    pub fn new(props: LayoutProps, axis: Axis) -> Self {
        Self {
            props,
            axis,
            len: None,
            edits: 0,
        }
    }

    /// Limits the sequence to `0..len`.
    #[must_use]
    pub fn with_len(mut self, len: usize) -> Self {
        self.len = Some(len);
        self
    }

    /// The flow axis.
    #[must_use]
    pub const fn axis(&self) -> Axis {
        self.axis
    }

    /// The number of items, or `None` for an unbounded sequence.
    #[must_use]
    pub const fn len(&self) -> Option<usize> {
        self.len
    }

    /// `true` if the sequence is bounded and has no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self.len, Some(0))
    }

    /// Sets or clears the length.
    pub fn set_len(&mut self, len: Option<usize>) {
        if self.len != len {
            self.len = len;
            self.edits = self.edits.wrapping_add(1);
        }
    }

    fn bounds(&self) -> Option<IndexBounds> {
        self.len
            .map(|len| IndexBounds::new(0, i64::try_from(len).unwrap_or(i64::MAX)))
    }

    fn contains(&self, i: i64) -> bool {
        self.bounds().is_none_or(|b| b.contains(i))
    }
}

impl LayoutSource for FlatLayoutSource {
    fn props(&self) -> &LayoutProps {
        &self.props
    }

    fn props_mut(&mut self) -> &mut LayoutProps {
        &mut self.props
    }

    fn item_rect(&self, index: ItemIndex) -> Option<Rect> {
        let i = index.linear()?;
        if !self.contains(i) {
            return None;
        }
        let size = self.props.item_size();
        let step = self.axis.of(size);
        let cross = self.axis.cross().of(size);
        let start = i as f64 * step;
        Some(match self.axis {
            Axis::Horizontal => Rect::new(start, 0.0, start + step, cross),
            Axis::Vertical => Rect::new(0.0, start, cross, start + step),
        })
    }

    fn visible_indices(&self, query: Rect) -> IndexSet {
        let size = self.props.item_size();
        let cross = self.axis.cross().of(size);
        let (flow_min, flow_max, cross_min, cross_max) = match self.axis {
            Axis::Horizontal => (query.x0, query.x1, query.y0, query.y1),
            Axis::Vertical => (query.y0, query.y1, query.x0, query.x1),
        };
        if cross_min >= cross || cross_max <= 0.0 {
            return IndexSet::new();
        }
        visible_span(flow_min, flow_max, self.axis.of(size), self.bounds())
            .map(ItemIndex::Linear)
            .collect()
    }

    fn index_at_location(&self, location: Point, rounding: Rounding) -> Option<ItemIndex> {
        let step = self.axis.of(self.props.item_size());
        let i = cell_at(self.axis.of_point(location), step, rounding)?;
        self.contains(i).then_some(ItemIndex::Linear(i))
    }

    fn apply_edit(&mut self, edit: ListEdit) -> Result<(), LayoutError> {
        if let Some(len) = self.len {
            let (index, count) = match edit {
                ListEdit::Insert { index, count } | ListEdit::Remove { index, count } => {
                    (index, count)
                }
            };
            let out_of_range = LayoutError::EditOutOfRange { index, count, len };
            let start = usize::try_from(index).map_err(|_| out_of_range.clone())?;
            self.len = Some(match edit {
                ListEdit::Insert { .. } if start <= len => len + count,
                ListEdit::Remove { .. } if start.saturating_add(count) <= len => len - count,
                _ => return Err(out_of_range),
            });
        }
        self.edits = self.edits.wrapping_add(1);
        Ok(())
    }

    fn revision(&self) -> u64 {
        self.props.revision().wrapping_add(self.edits)
    }
}

#[cfg(test)]
mod tests {
    use super::FlatLayoutSource;
    use crate::error::LayoutError;
    use crate::props::LayoutProps;
    use crate::source::{LayoutSource, ListEdit};
    use crate::types::{Axis, ItemIndex, ReuseId, Rounding, linear_indices};
    use kurbo::{Point, Rect, Vec2};

    fn labels() -> FlatLayoutSource {
        FlatLayoutSource::new(
            LayoutProps::new(ReuseId("label")).with_item_size(Vec2::new(40.0, 20.0)),
            Axis::Horizontal,
        )
    }

    #[test]
    fn unbounded_sequences_go_negative() {
        let l = labels();
        assert_eq!(
            l.item_rect(ItemIndex::Linear(-2)),
            Some(Rect::new(-80.0, 0.0, -40.0, 20.0))
        );
        assert_eq!(
            l.visible_indices(Rect::new(-50.0, 0.0, 50.0, 20.0)),
            linear_indices(-2..2)
        );
    }

    #[test]
    fn cross_axis_misses_are_empty() {
        let l = labels();
        assert!(l.visible_indices(Rect::new(0.0, 20.0, 100.0, 40.0)).is_empty());
        assert!(l.visible_indices(Rect::new(0.0, -30.0, 100.0, 0.0)).is_empty());
        assert!(!l.visible_indices(Rect::new(0.0, 19.0, 100.0, 40.0)).is_empty());
    }

    #[test]
    fn vertical_lists_clip_to_len() {
        let list = FlatLayoutSource::new(
            LayoutProps::new(ReuseId("row")).with_item_size(Vec2::new(300.0, 50.0)),
            Axis::Vertical,
        )
        .with_len(4);
        assert_eq!(
            list.visible_indices(Rect::new(0.0, -100.0, 300.0, 1000.0)),
            linear_indices(0..4)
        );
        assert_eq!(
            list.index_at_location(Point::new(10.0, 120.0), Rounding::Floor),
            Some(ItemIndex::Linear(2))
        );
        assert_eq!(list.index_at_location(Point::new(10.0, 400.0), Rounding::Floor), None);
    }

    #[test]
    fn edits_resize_and_bump_revision() {
        let mut list = labels().with_len(3);
        let r0 = list.revision();
        list.apply_edit(ListEdit::Insert { index: 3, count: 2 }).unwrap();
        assert_eq!(list.len(), Some(5));
        assert_ne!(list.revision(), r0);
        list.apply_edit(ListEdit::Remove { index: 1, count: 4 }).unwrap();
        assert_eq!(list.len(), Some(1));
        assert!(!list.is_empty());
    }

    #[test]
    fn out_of_range_edits_are_rejected() {
        let mut list = labels().with_len(2);
        assert_eq!(
            list.apply_edit(ListEdit::Remove { index: 1, count: 2 }),
            Err(LayoutError::EditOutOfRange { index: 1, count: 2, len: 2 })
        );
        assert_eq!(
            list.apply_edit(ListEdit::Insert { index: -1, count: 1 }),
            Err(LayoutError::EditOutOfRange { index: -1, count: 1, len: 2 })
        );
        assert_eq!(
            list.apply_edit(ListEdit::Insert { index: 3, count: 1 }),
            Err(LayoutError::EditOutOfRange { index: 3, count: 1, len: 2 })
        );
        assert_eq!(list.len(), Some(2));
    }

    #[test]
    fn unbounded_sources_accept_any_edit() {
        let mut l = labels();
        assert!(l.apply_edit(ListEdit::Remove { index: -10, count: 3 }).is_ok());
        assert_eq!(l.len(), None);
    }
}
