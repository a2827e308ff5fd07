// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A layout driven entirely by caller-supplied closures.

use alloc::boxed::Box;
use core::fmt;

use kurbo::{Point, Rect, Vec2};

use crate::error::LayoutError;
use crate::props::LayoutProps;
use crate::source::{LayoutSource, ListEdit};
use crate::types::{IndexSet, ItemIndex};

/// Placement of one item in a [`CustomLayoutSource`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CustomItemLayout {
    /// Source-local position of the item's top-left corner, before the item origin shift.
    pub offset: Point,
    /// Item size; `None` uses the source's [`item_size`](LayoutProps::item_size).
    pub size: Option<Vec2>,
}

impl CustomItemLayout {
    /// An item at `offset` with the source's item size.
    #[must_use]
    pub const fn at(offset: Point) -> Self {
        Self { offset, size: None }
    }
}

impl From<Point> for CustomItemLayout {
    fn from(offset: Point) -> Self {
        Self::at(offset)
    }
}

type ItemLayoutFn = Box<dyn Fn(ItemIndex) -> Option<CustomItemLayout>>;
type VisibleFn = Box<dyn Fn(Rect) -> IndexSet>;

/// Places items wherever two closures say.
///
/// `item_layout` maps an index to its placement (or `None` for indices that
/// do not exist); `visible` maps a source-local query rect to the indices
/// that intersect it. The closures typically read host state through
/// [`ValueHandle`](evergrid_value::ValueHandle)s or shared cells; call
/// [`invalidate`](Self::invalidate) after changing state they read but the
/// source cannot observe.
///
/// ```rust
/// use evergrid_layout::{CustomItemLayout, CustomLayoutSource, ItemIndex, LayoutProps, LayoutSource, linear_indices};
/// use kurbo::{Point, Rect, Vec2};
///
/// // Points along y = x / 2, one every 40 units.
/// let points = CustomLayoutSource::new(
///     LayoutProps::new(Default::default()).with_item_size(Vec2::new(8.0, 8.0)),
///     |index| {
///         let i = index.linear()? as f64;
///         Some(CustomItemLayout::at(Point::new(i * 40.0, i * 20.0)))
///     },
///     |query| linear_indices((query.x0 / 40.0).floor() as i64..(query.x1 / 40.0).ceil() as i64),
/// );
/// assert_eq!(points.item_rect(ItemIndex::Linear(2)), Some(Rect::new(80.0, 40.0, 88.0, 48.0)));
/// assert_eq!(points.visible_indices(Rect::new(0.0, 0.0, 100.0, 100.0)).len(), 3);
/// ```
pub struct CustomLayoutSource {
    props: LayoutProps,
    item_layout: ItemLayoutFn,
    visible: VisibleFn,
    invalidations: u64,
}

impl CustomLayoutSource {
    /// Creates a source from its placement and visibility closures.
    #[must_use]
    pub fn new(
        props: LayoutProps,
        item_layout: impl Fn(ItemIndex) -> Option<CustomItemLayout> + 'static,
        visible: impl Fn(Rect) -> IndexSet + 'static,
    ) -> Self {
        Self {
            props,
            item_layout: Box::new(item_layout),
            visible: Box::new(visible),
            invalidations: 0,
        }
    }

    /// The placement of `index`, as reported by the closure.
    #[must_use]
    pub fn item_layout(&self, index: ItemIndex) -> Option<CustomItemLayout> {
        (self.item_layout)(index)
    }

    /// Marks the layout as changed so the container recomputes frames.
    pub fn invalidate(&mut self) {
        self.invalidations = self.invalidations.wrapping_add(1);
    }
}

impl fmt::Debug for CustomLayoutSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomLayoutSource")
            .field("props", &self.props)
            .field("invalidations", &self.invalidations)
            .finish_non_exhaustive()
    }
}

impl LayoutSource for CustomLayoutSource {
    fn props(&self) -> &LayoutProps {
        &self.props
    }

    fn props_mut(&mut self) -> &mut LayoutProps {
        &mut self.props
    }

    fn item_rect(&self, index: ItemIndex) -> Option<Rect> {
        let layout = self.item_layout(index)?;
        let size = layout.size.unwrap_or_else(|| self.props.item_size());
        Some(Rect::from_origin_size(layout.offset, size.to_size()))
    }

    fn visible_indices(&self, query: Rect) -> IndexSet {
        (self.visible)(query)
    }

    /// Custom sources keep no per-item state; the edit only marks the layout
    /// changed. Grid-shaped indices in the source are unaffected by edits.
    fn apply_edit(&mut self, edit: ListEdit) -> Result<(), LayoutError> {
        let _ = edit;
        self.invalidate();
        Ok(())
    }

    fn revision(&self) -> u64 {
        self.props.revision().wrapping_add(self.invalidations)
    }
}

#[cfg(test)]
mod tests {
    use super::{CustomItemLayout, CustomLayoutSource};
    use crate::props::LayoutProps;
    use crate::source::{LayoutSource, ListEdit};
    use crate::types::{IndexSet, ItemIndex, ReuseId, linear_indices};
    use alloc::rc::Rc;
    use core::cell::Cell;
    use kurbo::{Point, Rect, Vec2};

    fn wave(phase: Rc<Cell<f64>>) -> CustomLayoutSource {
        CustomLayoutSource::new(
            LayoutProps::new(ReuseId("point")).with_item_size(Vec2::new(10.0, 10.0)),
            move |index| {
                let i = index.linear()?;
                Some(Point::new(i as f64 * 40.0, phase.get() * i as f64).into())
            },
            |query| {
                let mut set = IndexSet::new();
                let mut i: i32 = 0;
                while f64::from(i) * 40.0 < query.x1 {
                    if f64::from(i) * 40.0 + 10.0 > query.x0 {
                        set.insert(ItemIndex::Linear(i64::from(i)));
                    }
                    i += 1;
                }
                set
            },
        )
    }

    #[test]
    fn closures_place_items() {
        let phase = Rc::new(Cell::new(2.0));
        let source = wave(phase.clone());
        assert_eq!(
            source.item_rect(ItemIndex::Linear(3)),
            Some(Rect::new(120.0, 6.0, 130.0, 16.0))
        );
        assert_eq!(
            source.visible_indices(Rect::new(45.0, 0.0, 125.0, 10.0)),
            linear_indices(1..4)
        );
        phase.set(0.0);
        assert_eq!(
            source.item_rect(ItemIndex::Linear(3)),
            Some(Rect::new(120.0, 0.0, 130.0, 10.0))
        );
    }

    #[test]
    fn explicit_size_overrides_item_size() {
        let source = CustomLayoutSource::new(
            LayoutProps::default(),
            |_| {
                Some(CustomItemLayout {
                    offset: Point::new(1.0, 2.0),
                    size: Some(Vec2::new(3.0, 4.0)),
                })
            },
            |_| IndexSet::new(),
        );
        assert_eq!(
            source.item_rect(ItemIndex::Linear(0)),
            Some(Rect::new(1.0, 2.0, 4.0, 6.0))
        );
    }

    #[test]
    fn invalidation_and_edits_bump_revision() {
        let mut source = wave(Rc::new(Cell::new(1.0)));
        let r0 = source.revision();
        source.invalidate();
        let r1 = source.revision();
        assert_ne!(r0, r1);
        assert!(source.apply_edit(ListEdit::Insert { index: 0, count: 1 }).is_ok());
        assert_ne!(source.revision(), r1);
    }
}
