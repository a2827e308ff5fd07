// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Properties shared by every layout source.

use alloc::boxed::Box;
use core::fmt;

use evergrid_value::ValueHandle;
use kurbo::{Insets, Rect, Size, Vec2};

use crate::types::{Edge, ItemIndex, ReuseId};

/// A length expressed as a fraction of the container extent plus pixels.
///
/// `Dimension::percent(100.0)` is the full container width (or height);
/// `Dimension::relative(1.0, -20.0)` is the full extent minus 20 pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimension {
    /// Fraction of the container extent along the same axis.
    pub fraction: f64,
    /// Absolute pixels added after the fraction.
    pub px: f64,
}

impl Dimension {
    /// The full container extent.
    pub const FULL: Self = Self::relative(1.0, 0.0);

    /// An absolute pixel length.
    #[must_use]
    pub const fn px(px: f64) -> Self {
        Self { fraction: 0.0, px }
    }

    /// A percentage of the container extent.
    #[must_use]
    pub const fn percent(percent: f64) -> Self {
        Self {
            fraction: percent / 100.0,
            px: 0.0,
        }
    }

    /// A fraction of the container extent plus pixels.
    #[must_use]
    pub const fn relative(fraction: f64, px: f64) -> Self {
        Self { fraction, px }
    }

    /// Resolves against a container extent.
    #[must_use]
    pub fn resolve(self, extent: f64) -> f64 {
        self.fraction * extent + self.px
    }
}

/// Per-item overrides of the computed container-pixel frame.
///
/// Position overrides move the frame's leading edge; size overrides keep the
/// leading edge and change the extent. Unset fields keep the computed value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewLayout {
    /// Left edge.
    pub x: Option<Dimension>,
    /// Top edge.
    pub y: Option<Dimension>,
    /// Width.
    pub width: Option<Dimension>,
    /// Height.
    pub height: Option<Dimension>,
}

impl ViewLayout {
    /// Applies the overrides to `frame` inside a container of `container` size.
    #[must_use]
    pub fn apply(&self, frame: Rect, container: Size) -> Rect {
        let x0 = self.x.map_or(frame.x0, |d| d.resolve(container.width));
        let y0 = self.y.map_or(frame.y0, |d| d.resolve(container.height));
        let width = self
            .width
            .map_or(frame.width(), |d| d.resolve(container.width));
        let height = self
            .height
            .map_or(frame.height(), |d| d.resolve(container.height));
        Rect::new(x0, y0, x0 + width, y0 + height)
    }
}

/// Computes per-item [`ViewLayout`] overrides.
///
/// Receives the item index and the current container size.
pub type ViewLayoutFn = Box<dyn Fn(ItemIndex, Size) -> ViewLayout>;

/// Decides whether a slot rebound from one index to another must re-render.
///
/// Items whose content depends only on their position (for example, grid
/// lines) can skip re-rendering when recycled.
pub type RenderPredicate = Box<dyn Fn(ItemIndex, ItemIndex) -> bool>;

/// When a recycled slot must re-render its content.
#[derive(Default)]
pub enum RenderPolicy {
    /// Every rebind re-renders.
    #[default]
    Always,
    /// Rebinds never re-render; only explicit render requests do.
    Never,
    /// The predicate receives `(new, previous)` and returns whether to render.
    Custom(RenderPredicate),
}

impl fmt::Debug for RenderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("Always"),
            Self::Never => f.write_str("Never"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Properties common to all layout sources.
///
/// Every setter bumps [`revision`](Self::revision), as do changes to a shared
/// item size or origin handle.
pub struct LayoutProps {
    reuse_id: ReuseId,
    item_size: ValueHandle<Vec2>,
    origin: ValueHandle<Vec2>,
    item_origin: Vec2,
    insets: Insets,
    sticky_edge: Option<Edge>,
    view_layout: Option<ViewLayoutFn>,
    render_policy: RenderPolicy,
    edits: u64,
}

impl LayoutProps {
    /// Creates props with a `1 x 1` item size and no origin, insets, or pinning.
    #[must_use]
    pub fn new(reuse_id: ReuseId) -> Self {
        Self {
            reuse_id,
            item_size: ValueHandle::fixed(Vec2::new(1.0, 1.0)),
            origin: ValueHandle::fixed(Vec2::ZERO),
            item_origin: Vec2::ZERO,
            insets: Insets::ZERO,
            sticky_edge: None,
            view_layout: None,
            render_policy: RenderPolicy::Always,
            edits: 0,
        }
    }

    /// Sets the item size, fixed or shared.
    #[must_use]
    pub fn with_item_size(mut self, size: impl Into<ValueHandle<Vec2>>) -> Self {
        self.set_item_size(size);
        self
    }

    /// Sets the source origin, fixed or shared.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<ValueHandle<Vec2>>) -> Self {
        self.set_origin(origin);
        self
    }

    /// Sets the fractional item anchor.
    #[must_use]
    pub fn with_item_origin(mut self, item_origin: Vec2) -> Self {
        self.set_item_origin(item_origin);
        self
    }

    /// Sets visibility insets in container pixels.
    #[must_use]
    pub fn with_insets(mut self, insets: Insets) -> Self {
        self.set_insets(insets);
        self
    }

    /// Pins items to `edge`.
    #[must_use]
    pub fn with_sticky_edge(mut self, edge: Edge) -> Self {
        self.set_sticky_edge(Some(edge));
        self
    }

    /// Installs per-item frame overrides.
    #[must_use]
    pub fn with_view_layout(mut self, f: impl Fn(ItemIndex, Size) -> ViewLayout + 'static) -> Self {
        self.set_view_layout(Some(Box::new(f)));
        self
    }

    /// Sets the re-render policy for recycled slots.
    #[must_use]
    pub fn with_render_policy(mut self, policy: RenderPolicy) -> Self {
        self.set_render_policy(policy);
        self
    }

    /// Recycling category of this source's item views.
    #[must_use]
    pub const fn reuse_id(&self) -> ReuseId {
        self.reuse_id
    }

    /// Current size of one item in content units.
    #[must_use]
    pub fn item_size(&self) -> Vec2 {
        self.item_size.get()
    }

    /// The handle the item size is read from.
    #[must_use]
    pub const fn item_size_handle(&self) -> &ValueHandle<Vec2> {
        &self.item_size
    }

    /// Current content-space offset applied to all items of this source.
    ///
    /// Along a sticky axis this is a pixel offset from the pinned edge.
    #[must_use]
    pub fn origin(&self) -> Vec2 {
        self.origin.get()
    }

    /// The handle the origin is read from.
    #[must_use]
    pub const fn origin_handle(&self) -> &ValueHandle<Vec2> {
        &self.origin
    }

    /// Fractional anchor of each item: `(0.5, 0.5)` centers items on their positions.
    #[must_use]
    pub const fn item_origin(&self) -> Vec2 {
        self.item_origin
    }

    /// Pixel insets that shrink the region in which items count as visible.
    #[must_use]
    pub const fn insets(&self) -> Insets {
        self.insets
    }

    /// The container edge items are pinned to, if any.
    #[must_use]
    pub const fn sticky_edge(&self) -> Option<Edge> {
        self.sticky_edge
    }

    /// The per-item frame override for `index` in a container of `container` size.
    #[must_use]
    pub fn view_layout(&self, index: ItemIndex, container: Size) -> Option<ViewLayout> {
        self.view_layout.as_ref().map(|f| f(index, container))
    }

    /// When recycled slots must re-render.
    #[must_use]
    pub const fn render_policy(&self) -> &RenderPolicy {
        &self.render_policy
    }

    /// Replaces the item size handle.
    pub fn set_item_size(&mut self, size: impl Into<ValueHandle<Vec2>>) {
        let size = size.into();
        self.bump_for_swap(self.item_size.version(), size.version());
        self.item_size = size;
    }

    /// Replaces the origin handle.
    pub fn set_origin(&mut self, origin: impl Into<ValueHandle<Vec2>>) {
        let origin = origin.into();
        self.bump_for_swap(self.origin.version(), origin.version());
        self.origin = origin;
    }

    /// Sets the fractional item anchor.
    pub fn set_item_origin(&mut self, item_origin: Vec2) {
        self.item_origin = item_origin;
        self.bump();
    }

    /// Sets visibility insets in container pixels.
    pub fn set_insets(&mut self, insets: Insets) {
        self.insets = insets;
        self.bump();
    }

    /// Pins items to `edge`, or unpins them.
    pub fn set_sticky_edge(&mut self, edge: Option<Edge>) {
        self.sticky_edge = edge;
        self.bump();
    }

    /// Installs or removes per-item frame overrides.
    pub fn set_view_layout(&mut self, f: Option<ViewLayoutFn>) {
        self.view_layout = f;
        self.bump();
    }

    /// Sets the re-render policy for recycled slots.
    pub fn set_render_policy(&mut self, policy: RenderPolicy) {
        self.render_policy = policy;
        self.bump();
    }

    fn bump(&mut self) {
        self.edits = self.edits.wrapping_add(1);
    }

    /// Keeps the revision moving forward by one when a handle with version
    /// `old` is replaced by one with version `new`.
    fn bump_for_swap(&mut self, old: u64, new: u64) {
        self.edits = self
            .edits
            .wrapping_add(old.wrapping_sub(new))
            .wrapping_add(1);
    }

    /// A counter that changes whenever a setter runs or a shared item size or
    /// origin changes.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.item_size
            .version()
            .wrapping_add(self.origin.version())
            .wrapping_add(self.edits)
    }

    /// Whether a slot showing `previous` must re-render to show `index`.
    #[must_use]
    pub fn should_render(&self, index: ItemIndex, previous: ItemIndex) -> bool {
        match &self.render_policy {
            RenderPolicy::Always => true,
            RenderPolicy::Never => false,
            RenderPolicy::Custom(f) => f(index, previous),
        }
    }
}

impl Default for LayoutProps {
    fn default() -> Self {
        Self::new(ReuseId::DEFAULT)
    }
}

impl fmt::Debug for LayoutProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutProps")
            .field("reuse_id", &self.reuse_id)
            .field("item_size", &self.item_size.get())
            .field("origin", &self.origin.get())
            .field("item_origin", &self.item_origin)
            .field("insets", &self.insets)
            .field("sticky_edge", &self.sticky_edge)
            .field("render_policy", &self.render_policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{Dimension, LayoutProps, RenderPolicy, ViewLayout};
    use crate::types::{Edge, ItemIndex, ReuseId};
    use alloc::boxed::Box;
    use evergrid_value::Observable;
    use kurbo::{Insets, Rect, Size, Vec2};

    #[test]
    fn full_height_override_keeps_position() {
        let layout = ViewLayout {
            height: Some(Dimension::percent(100.0)),
            ..ViewLayout::default()
        };
        let frame = layout.apply(Rect::new(40.0, 0.0, 60.0, 10.0), Size::new(300.0, 500.0));
        assert_eq!(frame, Rect::new(40.0, 0.0, 60.0, 500.0));
    }

    #[test]
    fn relative_dimension_mixes_fraction_and_pixels() {
        assert_eq!(Dimension::relative(0.5, -10.0).resolve(200.0), 90.0);
        assert_eq!(Dimension::FULL.resolve(320.0), 320.0);
        assert_eq!(Dimension::px(12.0).resolve(999.0), 12.0);
    }

    #[test]
    fn revision_follows_shared_item_size() {
        let mut size = Observable::new(Vec2::new(10.0, 10.0));
        let props = LayoutProps::new(ReuseId("cell")).with_item_size(size.handle());
        let before = props.revision();
        size.set(Vec2::new(20.0, 20.0));
        assert_ne!(props.revision(), before);
        assert_eq!(props.item_size(), Vec2::new(20.0, 20.0));
    }

    #[test]
    fn every_setter_moves_the_revision() {
        let mut props = LayoutProps::new(ReuseId("cell"));
        let mut seen = alloc::vec![props.revision()];
        let mut check = |props: &LayoutProps| {
            let r = props.revision();
            assert!(!seen.contains(&r), "revision {r} repeated");
            seen.push(r);
        };
        props.set_insets(Insets::uniform(50.0));
        check(&props);
        props.set_item_origin(Vec2::new(0.5, 0.5));
        check(&props);
        props.set_sticky_edge(Some(Edge::Left));
        check(&props);
        props.set_item_size(Vec2::new(99.0, 99.0));
        check(&props);
        props.set_origin(Vec2::new(3.0, 0.0));
        check(&props);
        props.set_render_policy(RenderPolicy::Never);
        check(&props);
        props.set_view_layout(None);
        check(&props);
        assert_eq!(props.item_size(), Vec2::new(99.0, 99.0));
        assert_eq!(props.insets(), Insets::uniform(50.0));
    }

    #[test]
    fn swapping_a_shared_handle_for_a_fixed_one_moves_the_revision() {
        let mut size = Observable::new(Vec2::new(10.0, 10.0));
        let mut props = LayoutProps::new(ReuseId("cell")).with_item_size(size.handle());
        size.set(Vec2::new(20.0, 20.0));
        let before = props.revision();
        // The fixed handle has an older version than the shared one.
        props.set_item_size(Vec2::new(20.0, 20.0));
        assert_eq!(props.revision(), before.wrapping_add(1));
    }

    #[test]
    fn render_policy_predicate_sees_both_indices() {
        let props = LayoutProps::default().with_render_policy(RenderPolicy::Custom(Box::new(
            |new, old| new.linear() != old.linear(),
        )));
        assert!(props.should_render(ItemIndex::Linear(2), ItemIndex::Linear(1)));
        assert!(!props.should_render(ItemIndex::Linear(1), ItemIndex::Linear(1)));
        let never = LayoutProps::default().with_render_policy(RenderPolicy::Never);
        assert!(!never.should_render(ItemIndex::Linear(2), ItemIndex::Linear(1)));
    }
}
