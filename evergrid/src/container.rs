// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The container: sources, viewport, gestures, recycling, and animation.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use evergrid_gesture::{GestureAction, GestureActions, GestureConfig, GestureState, PointerId};
use evergrid_layout::{
    Axis, ItemIndex, LayoutSource, ListEdit, ReuseId, item_frame, location_at, visible_item_at,
    visible_set,
};
use evergrid_recycler::{Recycler, SlotId, SlotKey, SourceId};
use evergrid_value::{AnimatedValue, Animation, ValueHandle};
use evergrid_view::Viewport;
use hashbrown::HashMap;
use kurbo::{Point, Rect, Size, Vec2};

use crate::error::EvergridError;
use crate::event::{EvergridEvent, EvergridEvents};
use crate::frame::{FrameUpdate, ItemView, SlotChange};
use crate::options::EvergridOptions;
use crate::scroll::ScrollAlign;
use crate::snap::{SnapFn, SnapQuery, SnapTarget};
use crate::transition::Transition;

/// A layout source that can also be downcast to its concrete type.
trait Source: LayoutSource + Any {}

impl<T: LayoutSource + Any> Source for T {}

/// A virtualized, pannable, zoomable container over any number of layout sources.
///
/// The container is headless. Hosts feed it pointer input and frame ticks and
/// apply the [`FrameUpdate`] returned by [`update`](Self::update) to their own
/// item views. Per update it:
///
/// 1. advances the offset and scale animations (momentum, snapping, programmatic scrolls),
/// 2. asks every source for its visible indices under the viewport,
/// 3. reconciles item view slots against them (reusing views per [`ReuseId`]),
/// 4. computes each live view's frame, interpolating reflow transitions.
///
/// ```rust
/// use evergrid::{Evergrid, EvergridOptions, SlotChange};
/// use evergrid_layout::{GridLayoutSource, LayoutProps, ReuseId};
/// use kurbo::{Size, Vec2};
///
/// let mut grid = Evergrid::new(Size::new(300.0, 200.0), EvergridOptions::default());
/// let photos = grid.add_source(GridLayoutSource::new(
///     LayoutProps::new(ReuseId("photo")).with_item_size(Vec2::new(100.0, 100.0)),
/// ));
///
/// let frame = grid.update(0.0);
/// assert_eq!(frame.items.len(), 6);
/// assert_eq!(frame.renders().count(), 6);
/// assert!(frame.items.iter().all(|item| item.key.source == photos));
///
/// // Scroll by one column: one view is recycled, the rest stay put.
/// grid.scroll_to(kurbo::Point::new(100.0, 0.0), None);
/// let frame = grid.update(1.0 / 60.0);
/// let rebinds = frame
///     .changes
///     .iter()
///     .filter(|c| matches!(c, SlotChange::Rebind { .. }))
///     .count();
/// assert_eq!(rebinds, 2);
/// ```
pub struct Evergrid {
    options: EvergridOptions,
    viewport: Viewport,
    offset: AnimatedValue<Vec2>,
    scale: AnimatedValue<Vec2>,
    sources: BTreeMap<SourceId, Box<dyn Source>>,
    next_source: u32,
    recycler: Recycler,
    gesture: GestureState,
    snap: Option<SnapFn>,
    transitions: HashMap<SlotId, Transition>,
    frames: HashMap<SlotId, Rect>,
    pending_hidden: Vec<(SlotId, SlotKey)>,
    size_changed: Option<Size>,
}

impl fmt::Debug for Evergrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evergrid")
            .field("viewport", &self.viewport)
            .field("sources", &self.sources.len())
            .field("recycler", &self.recycler)
            .field("phase", &self.gesture.phase())
            .field("transitions", &self.transitions.len())
            .field("snap", &self.snap.is_some())
            .finish_non_exhaustive()
    }
}

fn is_valid_scale(scale: Vec2) -> bool {
    scale.x.is_finite() && scale.y.is_finite() && scale.x != 0.0 && scale.y != 0.0
}

fn magnitude(v: f64) -> f64 {
    if v < 0.0 { -v } else { v }
}

impl Evergrid {
    /// Creates a container of `container_size` pixels.
    ///
    /// An invalid initial scale or offset in `options` is ignored (with a
    /// warning) in favor of the defaults.
    #[must_use]
    pub fn new(container_size: Size, options: EvergridOptions) -> Self {
        let mut viewport = Viewport::new(container_size);
        viewport.set_anchor(options.anchor);
        viewport.set_scale_limits(options.min_scale, options.max_scale);
        if is_valid_scale(options.scale) {
            viewport.set_scale(options.scale);
        } else {
            tracing::warn!(scale = ?options.scale, "ignoring invalid initial scale");
        }
        viewport.set_content_bounds(options.content_bounds);
        viewport.set_clamp_mode(options.clamp_mode);
        if options.offset.is_finite() {
            viewport.set_offset(options.offset);
        } else {
            tracing::warn!(offset = ?options.offset, "ignoring non-finite initial offset");
        }

        Self {
            offset: AnimatedValue::new(viewport.offset().to_vec2()),
            scale: AnimatedValue::new(viewport.scale()),
            recycler: Recycler::with_max_spare_per_reuse(options.max_spare_per_reuse),
            gesture: GestureState::new(options.gesture),
            size_changed: Some(viewport.container_size()),
            viewport,
            options,
            sources: BTreeMap::new(),
            next_source: 0,
            snap: None,
            transitions: HashMap::new(),
            frames: HashMap::new(),
            pending_hidden: Vec::new(),
        }
    }

    /// The options the container was created with.
    #[must_use]
    pub const fn options(&self) -> &EvergridOptions {
        &self.options
    }

    /// The current viewport.
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    // --- sources ---

    /// Adds a layout source. Sources added later are drawn and hit-tested above earlier ones.
    pub fn add_source<S: LayoutSource + 'static>(&mut self, source: S) -> SourceId {
        let id = SourceId::new(self.next_source);
        self.next_source = self.next_source.wrapping_add(1);
        tracing::debug!(
            source = id.get(),
            reuse_id = source.props().reuse_id().0,
            "added layout source"
        );
        self.sources.insert(id, Box::new(source));
        id
    }

    /// Removes a source; its item views are hidden by the next update.
    pub fn remove_source(&mut self, id: SourceId) -> Option<Box<dyn LayoutSource>> {
        let source: Box<dyn LayoutSource> = self.sources.remove(&id)?;
        let lost = self.recycler.remap(id, |_| None);
        self.forget_slots(&lost);
        self.pending_hidden.extend(lost);
        tracing::debug!(source = id.get(), "removed layout source");
        Some(source)
    }

    /// The source behind `id`.
    #[must_use]
    pub fn source(&self, id: SourceId) -> Option<&dyn LayoutSource> {
        let source: &(dyn LayoutSource + 'static) = &**self.sources.get(&id)?;
        Some(source)
    }

    /// The source behind `id`, mutably. Layout changes show up in the next update.
    pub fn source_mut(&mut self, id: SourceId) -> Option<&mut (dyn LayoutSource + 'static)> {
        let source: &mut (dyn LayoutSource + 'static) = &mut **self.sources.get_mut(&id)?;
        Some(source)
    }

    /// The source behind `id` as its concrete type.
    #[must_use]
    pub fn source_as<S: LayoutSource + 'static>(&self, id: SourceId) -> Option<&S> {
        let source: &(dyn Any + 'static) = &**self.sources.get(&id)?;
        source.downcast_ref()
    }

    /// The source behind `id` as its concrete type, mutably.
    pub fn source_as_mut<S: LayoutSource + 'static>(&mut self, id: SourceId) -> Option<&mut S> {
        let source: &mut (dyn Any + 'static) = &mut **self.sources.get_mut(&id)?;
        source.downcast_mut()
    }

    fn layout(&self, id: SourceId) -> Result<&dyn Source, EvergridError> {
        self.sources
            .get(&id)
            .map(|s| &**s)
            .ok_or(EvergridError::UnknownSource(id))
    }

    // --- frame loop ---

    /// Advances animations by `dt` seconds and brings item views up to date.
    pub fn update(&mut self, dt: f64) -> FrameUpdate {
        let mut animating = self.offset.tick(dt);
        animating |= self.scale.tick(dt);
        self.sync_viewport();

        let mut desired: Vec<(SlotKey, ReuseId)> = Vec::new();
        for (&id, source) in &self.sources {
            let reuse_id = source.props().reuse_id();
            desired.extend(
                visible_set(&**source, &self.viewport)
                    .into_iter()
                    .map(|index| (SlotKey::new(id, index), reuse_id)),
            );
        }
        let diff = self.recycler.reconcile(desired);

        let mut changes = Vec::new();
        let mut hidden = core::mem::take(&mut self.pending_hidden);
        hidden.extend_from_slice(&diff.hidden);
        self.forget_slots(&hidden);
        changes.extend(
            hidden
                .into_iter()
                .map(|(slot, key)| SlotChange::Hide { slot, key }),
        );
        for &slot in &diff.destroyed {
            self.transitions.remove(&slot);
            self.frames.remove(&slot);
            changes.push(SlotChange::Destroy { slot });
        }
        for &(slot, key) in &diff.created {
            let reuse_id = self
                .recycler
                .slot(slot)
                .map_or(ReuseId::DEFAULT, |s| s.reuse_id());
            changes.push(SlotChange::Create {
                slot,
                key,
                reuse_id,
            });
        }
        for rebind in &diff.rebound {
            self.transitions.remove(&rebind.slot);
            self.frames.remove(&rebind.slot);
            changes.push(SlotChange::Rebind {
                slot: rebind.slot,
                from: rebind.from,
                to: rebind.to,
            });
            let render = match rebind.from {
                Some(from) if from.source == rebind.to.source => {
                    self.sources.get(&rebind.to.source).is_none_or(|source| {
                        source.props().should_render(rebind.to.index, from.index)
                    })
                }
                _ => true,
            };
            if render {
                self.recycler.mark_slot_needs_render(rebind.slot);
            }
        }
        changes.extend(
            diff.rebound
                .iter()
                .filter(|rebind| rebind.revived)
                .map(|rebind| SlotChange::Show { slot: rebind.slot }),
        );
        changes.extend(
            self.recycler
                .take_needs_render()
                .into_iter()
                .map(|(slot, key)| SlotChange::Render { slot, key }),
        );

        let mut items = Vec::with_capacity(self.recycler.bound_len());
        let mut frames = HashMap::with_capacity(self.recycler.bound_len());
        for (key, slot) in self.recycler.bindings() {
            let Some(source) = self.sources.get(&key.source) else {
                continue;
            };
            let Some(target) = item_frame(&**source, key.index, &self.viewport) else {
                continue;
            };
            let mut frame = target;
            let mut transitioning = false;
            if let Some(transition) = self.transitions.get_mut(&slot) {
                transitioning = transition.tick(dt);
                frame = transition.apply(target);
                if !transitioning {
                    self.transitions.remove(&slot);
                }
            }
            animating |= transitioning;
            frames.insert(slot, frame);
            items.push(ItemView {
                slot,
                key,
                reuse_id: source.props().reuse_id(),
                frame,
                transitioning,
            });
        }
        self.frames = frames;

        tracing::trace!(
            items = items.len(),
            changes = changes.len(),
            animating,
            "frame updated"
        );
        FrameUpdate {
            changes,
            items,
            viewport_size: self.size_changed.take(),
            offset: self.viewport.offset(),
            scale: self.viewport.scale(),
            animating,
        }
    }

    /// `true` while the offset, the scale, or an item transition is animating.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.offset.is_animating() || self.scale.is_animating() || !self.transitions.is_empty()
    }

    fn forget_slots(&mut self, slots: &[(SlotId, SlotKey)]) {
        for (slot, _) in slots {
            self.transitions.remove(slot);
            self.frames.remove(slot);
        }
    }

    /// Pushes the animated offset and scale into the viewport, writing clamped
    /// values back.
    fn sync_viewport(&mut self) {
        let scale = self.scale.get();
        if scale != self.viewport.scale() && is_valid_scale(scale) {
            self.viewport.set_scale(scale);
        }
        if self.viewport.scale() != scale {
            self.scale.set_value(self.viewport.scale());
        }
        let offset = self.offset.get().to_point();
        if offset.is_finite() {
            self.viewport.set_offset(offset);
        }
        let clamped = self.viewport.offset().to_vec2();
        if clamped != self.offset.get() {
            self.offset.set_value(clamped);
        }
    }

    fn commit_viewport(&mut self) {
        self.offset.set_value(self.viewport.offset().to_vec2());
        self.scale.set_value(self.viewport.scale());
    }

    // --- container geometry ---

    /// Container size in pixels.
    #[must_use]
    pub const fn container_size(&self) -> Size {
        self.viewport.container_size()
    }

    /// Resizes the container; the next update reports the new size.
    pub fn set_container_size(&mut self, size: Size) {
        if self.viewport.set_container_size(size) {
            self.size_changed = Some(self.viewport.container_size());
            self.offset.set_value(self.viewport.offset().to_vec2());
        }
    }

    /// Sets where the container's top-left corner is on screen.
    pub fn set_container_origin(&mut self, origin: Point) {
        self.viewport.set_container_origin(origin);
    }

    // --- transforms ---

    /// Maps a screen point to container pixels.
    #[must_use]
    pub fn transform_point_from_screen_to_container(&self, point: Point) -> Point {
        self.viewport.screen_to_container_point(point)
    }

    /// Maps a container point to content units.
    #[must_use]
    pub fn transform_point_from_container_to_content(&self, point: Point) -> Point {
        self.viewport.container_to_content_point(point)
    }

    /// Maps a content point to container pixels.
    #[must_use]
    pub fn transform_point_from_content_to_container(&self, point: Point) -> Point {
        self.viewport.content_to_container_point(point)
    }

    /// The source-local content location under a container point.
    pub fn location_in_source(
        &self,
        source: SourceId,
        container_point: Point,
    ) -> Result<Point, EvergridError> {
        let layout = self.layout(source)?;
        Ok(location_at(layout, container_point, &self.viewport))
    }

    /// The top-most visible item of `source` under a container point.
    pub fn visible_item_at(
        &self,
        source: SourceId,
        container_point: Point,
    ) -> Result<Option<ItemIndex>, EvergridError> {
        let layout = self.layout(source)?;
        Ok(visible_item_at(layout, container_point, &self.viewport))
    }

    /// The top-most visible item of any source under a container point.
    #[must_use]
    pub fn item_at(&self, container_point: Point) -> Option<SlotKey> {
        self.sources.iter().rev().find_map(|(&id, source)| {
            visible_item_at(&**source, container_point, &self.viewport)
                .map(|index| SlotKey::new(id, index))
        })
    }

    /// The frame `index` of `source` would have under the current viewport.
    pub fn item_frame(&self, source: SourceId, index: ItemIndex) -> Result<Rect, EvergridError> {
        let layout = self.layout(source)?;
        item_frame(layout, index, &self.viewport).ok_or(EvergridError::UnknownItem { source, index })
    }

    // --- scrolling and zoom ---

    /// Content point under the anchor.
    #[must_use]
    pub const fn offset(&self) -> Point {
        self.viewport.offset()
    }

    /// Read-only handle to the (unclamped, animated) offset.
    #[must_use]
    pub fn offset_handle(&self) -> ValueHandle<Vec2> {
        self.offset.handle()
    }

    /// Moves the content point `offset` under the anchor, jumping or animating.
    pub fn scroll_to(&mut self, offset: Point, animation: Option<Animation>) {
        if !offset.is_finite() {
            tracing::warn!(?offset, "ignoring non-finite scroll target");
            return;
        }
        match animation {
            Some(animation) => self.offset.animate_to(offset.to_vec2(), animation),
            None => {
                self.offset.set_value(offset.to_vec2());
                self.sync_viewport();
            }
        }
    }

    /// Scrolls until `index` of `source` satisfies `align` on every scrolling axis.
    ///
    /// Alignment is measured in container pixels against the container shrunk
    /// by the source's insets. Axes the source is pinned on are left alone.
    pub fn scroll_to_item(
        &mut self,
        source: SourceId,
        index: ItemIndex,
        align: ScrollAlign,
        animation: Option<Animation>,
    ) -> Result<(), EvergridError> {
        let layout = self.layout(source)?;
        let frame = item_frame(layout, index, &self.viewport)
            .ok_or(EvergridError::UnknownItem { source, index })?;
        let props = layout.props();
        let region = self.viewport.content_to_container_rect(
            self.viewport.visible_content_rect_with_insets(props.insets()),
        );
        let pinned = props.sticky_edge().map(|edge| edge.axis());

        let mut shift = Vec2::new(
            align.shift(frame.x0, frame.x1, region.x0, region.x1),
            align.shift(frame.y0, frame.y1, region.y0, region.y1),
        );
        match pinned {
            Some(Axis::Horizontal) => shift.x = 0.0,
            Some(Axis::Vertical) => shift.y = 0.0,
            None => {}
        }
        let scale = self.viewport.scale();
        let target = self.viewport.offset() - Vec2::new(shift.x / scale.x, shift.y / scale.y);
        tracing::debug!(
            source = source.get(),
            %index,
            ?align,
            x = target.x,
            y = target.y,
            "scrolling to item"
        );
        self.scroll_to(target, animation);
        Ok(())
    }

    /// Pixels per content unit.
    #[must_use]
    pub const fn scale(&self) -> Vec2 {
        self.viewport.scale()
    }

    /// Read-only handle to the (animated) scale, for values that follow zoom.
    #[must_use]
    pub fn scale_handle(&self) -> ValueHandle<Vec2> {
        self.scale.handle()
    }

    /// Sets the scale immediately, keeping the offset under the anchor.
    pub fn set_scale(&mut self, scale: Vec2) -> Result<(), EvergridError> {
        if !is_valid_scale(scale) {
            return Err(EvergridError::InvalidScale {
                x: scale.x,
                y: scale.y,
            });
        }
        self.scale.set_value(scale);
        self.sync_viewport();
        Ok(())
    }

    /// Animates the scale towards `scale`, keeping the offset under the anchor.
    pub fn animate_scale(&mut self, scale: Vec2, animation: Animation) -> Result<(), EvergridError> {
        if !is_valid_scale(scale) {
            return Err(EvergridError::InvalidScale {
                x: scale.x,
                y: scale.y,
            });
        }
        self.scale.animate_to(scale, animation);
        Ok(())
    }

    /// Zooms by `factor` about a container point, keeping the content under it fixed.
    pub fn zoom_about(&mut self, focal: Point, factor: Vec2) {
        if !is_valid_scale(factor) {
            return;
        }
        self.offset.stop();
        self.scale.stop();
        self.viewport.zoom_about(focal, factor);
        self.commit_viewport();
    }

    // --- gestures ---

    /// Installs a callback deciding where released pans settle.
    pub fn set_snap(&mut self, snap: impl Fn(&SnapQuery) -> Option<SnapTarget> + 'static) {
        self.snap = Some(Box::new(snap));
    }

    /// Removes the snap callback; released pans coast freely.
    pub fn clear_snap(&mut self) {
        self.snap = None;
    }

    /// Replaces the gesture thresholds.
    pub fn set_gesture_config(&mut self, config: GestureConfig) {
        self.options.gesture = config;
        self.gesture.set_config(config);
    }

    /// Handles a pointer press at a screen position (`timestamp` in milliseconds).
    pub fn pointer_down(
        &mut self,
        pointer: PointerId,
        screen_position: Point,
        timestamp: u64,
    ) -> EvergridEvents {
        if !self.gesture.is_claimed() && self.gesture.pointer_count() == 0 {
            // Touching the content catches it.
            self.offset.stop();
        }
        let position = self.viewport.screen_to_container_point(screen_position);
        let actions = self.gesture.pointer_down(pointer, position, timestamp);
        self.apply_actions(actions, true)
    }

    /// Handles pointer movement at a screen position.
    pub fn pointer_move(
        &mut self,
        pointer: PointerId,
        screen_position: Point,
        timestamp: u64,
    ) -> EvergridEvents {
        let position = self.viewport.screen_to_container_point(screen_position);
        let actions = self.gesture.pointer_move(pointer, position, timestamp);
        self.apply_actions(actions, true)
    }

    /// Handles a pointer release at a screen position.
    pub fn pointer_up(
        &mut self,
        pointer: PointerId,
        screen_position: Point,
        timestamp: u64,
    ) -> EvergridEvents {
        let position = self.viewport.screen_to_container_point(screen_position);
        let actions = self.gesture.pointer_up(pointer, position, timestamp);
        self.apply_actions(actions, true)
    }

    /// Handles a cancelled pointer.
    pub fn pointer_cancel(&mut self, pointer: PointerId, timestamp: u64) -> EvergridEvents {
        let actions = self.gesture.pointer_cancel(pointer, timestamp);
        self.apply_actions(actions, true)
    }

    /// Advances gesture timers; reports a long press once its hold time elapses.
    pub fn poll(&mut self, timestamp: u64) -> EvergridEvents {
        let actions: GestureActions = self.gesture.poll(timestamp).into_iter().collect();
        self.apply_actions(actions, true)
    }

    /// Hands the current pointer sequence to the host.
    ///
    /// A pan in progress stops where it is, without momentum or snapping, and
    /// further moves arrive as [`EvergridEvent::CustomMove`].
    pub fn prevent_default_pan(&mut self) -> EvergridEvents {
        let actions = self.gesture.prevent_default_pan();
        self.apply_actions(actions, false)
    }

    /// `true` while a pan or pinch is moving the content.
    #[must_use]
    pub const fn is_panning_content(&self) -> bool {
        self.gesture.is_panning_content()
    }

    fn apply_actions(&mut self, actions: GestureActions, settle: bool) -> EvergridEvents {
        let mut events = EvergridEvents::new();
        for action in actions {
            match action {
                GestureAction::PanStart { .. } => self.offset.stop(),
                GestureAction::PanBy { delta } => {
                    self.viewport.pan_by(delta);
                    self.commit_viewport();
                }
                GestureAction::PanEnd { velocity } => {
                    if settle {
                        self.release(velocity);
                    }
                }
                GestureAction::PinchStart { .. } => {
                    self.offset.stop();
                    self.scale.stop();
                }
                GestureAction::PinchBy {
                    focal,
                    factor,
                    delta,
                } => {
                    self.viewport.pan_by(delta);
                    if is_valid_scale(factor) {
                        self.viewport.zoom_about(focal, factor);
                    }
                    self.commit_viewport();
                }
                GestureAction::PinchEnd => {}
                GestureAction::LongPress { position } => events.push(EvergridEvent::LongPress {
                    position,
                    location: self.viewport.container_to_content_point(position),
                    item: self.item_at(position),
                }),
                GestureAction::Tap { position } => events.push(EvergridEvent::Tap {
                    position,
                    location: self.viewport.container_to_content_point(position),
                    item: self.item_at(position),
                }),
                GestureAction::CustomMove { pointer, position } => {
                    events.push(EvergridEvent::CustomMove { pointer, position });
                }
                GestureAction::SequenceEnd => events.push(EvergridEvent::SequenceEnd),
            }
        }
        events
    }

    /// Starts momentum or snapping for a pan released at `velocity` pixels per second.
    fn release(&mut self, velocity: Vec2) {
        let scale = self.viewport.scale();
        // Content moves against the offset.
        let scaled_velocity = if self.options.momentum {
            Vec2::new(-velocity.x / scale.x, -velocity.y / scale.y)
        } else {
            Vec2::ZERO
        };
        let zoom = magnitude(scale.x).max(magnitude(scale.y));
        let decay = self
            .options
            .decay
            .with_stop_velocity(self.options.decay.stop_velocity / zoom);
        let current = self.offset.get();
        let projected = decay.projected_end(current, scaled_velocity).to_point();

        if let Some(snap) = &self.snap {
            let query = SnapQuery {
                location: projected,
                scaled_velocity,
                offset: current.to_point(),
            };
            if let Some(target) = snap(&query) {
                let goal = target.resolve(projected);
                tracing::debug!(x = goal.x, y = goal.y, "snapping released pan");
                self.offset.set_velocity(scaled_velocity);
                self.offset
                    .animate_to(goal.to_vec2(), self.options.snap_animation);
                return;
            }
        }
        if scaled_velocity != Vec2::ZERO {
            tracing::debug!(
                vx = scaled_velocity.x,
                vy = scaled_velocity.y,
                "starting momentum"
            );
            self.offset.decay(scaled_velocity, decay);
        }
    }

    // --- items ---

    /// Flags the view showing `index` of `source` for rendering in the next update.
    ///
    /// Returns `false` if the item has no view.
    pub fn set_item_needs_render(&mut self, source: SourceId, index: ItemIndex) -> bool {
        self.recycler.mark_needs_render(SlotKey::new(source, index))
    }

    /// Re-renders every view of `source` and, with an animation, moves the
    /// views from where they are displayed to their new layout frames.
    ///
    /// Call this after changing a source's layout inputs.
    pub fn update_items(
        &mut self,
        source: SourceId,
        animation: Option<Animation>,
    ) -> Result<(), EvergridError> {
        self.layout(source)?;
        self.recycler.mark_source_needs_render(source);
        if let Some(animation) = animation {
            self.start_reflow(source, animation);
        }
        Ok(())
    }

    /// Inserts an item before `index` in a linear source.
    ///
    /// Views of items after `index` follow their items without re-rendering,
    /// animating to their new frames when `animation` is given.
    pub fn insert_item(
        &mut self,
        source: SourceId,
        index: i64,
        animation: Option<Animation>,
    ) -> Result<(), EvergridError> {
        self.apply_edit(source, ListEdit::Insert { index, count: 1 }, animation)
    }

    /// Removes the item at `index` from a linear source.
    ///
    /// The removed item's view is hidden by the next update; views of later
    /// items follow their items as with [`insert_item`](Self::insert_item).
    pub fn remove_item(
        &mut self,
        source: SourceId,
        index: i64,
        animation: Option<Animation>,
    ) -> Result<(), EvergridError> {
        self.apply_edit(source, ListEdit::Remove { index, count: 1 }, animation)
    }

    fn apply_edit(
        &mut self,
        source: SourceId,
        edit: ListEdit,
        animation: Option<Animation>,
    ) -> Result<(), EvergridError> {
        self.sources
            .get_mut(&source)
            .ok_or(EvergridError::UnknownSource(source))?
            .apply_edit(edit)?;
        let lost = self.recycler.remap(source, |index| edit.map_item(index));
        tracing::debug!(source = source.get(), ?edit, lost = lost.len(), "applied list edit");
        self.forget_slots(&lost);
        self.pending_hidden.extend(lost);
        if let Some(animation) = animation {
            self.start_reflow(source, animation);
        }
        Ok(())
    }

    fn start_reflow(&mut self, id: SourceId, animation: Animation) {
        let Some(source) = self.sources.get(&id) else {
            return;
        };
        for (key, slot) in self.recycler.bindings() {
            if key.source != id {
                continue;
            }
            let Some(&from) = self.frames.get(&slot) else {
                continue;
            };
            let Some(to) = item_frame(&**source, key.index, &self.viewport) else {
                continue;
            };
            match Transition::new(from, to, animation) {
                Some(transition) => {
                    self.transitions.insert(slot, transition);
                }
                None => {
                    self.transitions.remove(&slot);
                }
            }
        }
    }
}
