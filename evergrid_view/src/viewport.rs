// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The viewport: which part of content space the container shows, and how.

use kurbo::{Affine, Insets, Point, Rect, Size, Vec2};

/// How [`Viewport::clamp_offset`] constrains the offset against content bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClampMode {
    /// Never clamp; content is unbounded.
    #[default]
    Free,
    /// Keep the visible content rect inside the content bounds. On an axis where
    /// the bounds are smaller than the visible extent, center the bounds instead.
    Contain,
}

/// A pannable, zoomable window onto content space.
///
/// Three coordinate spaces are involved:
///
/// - **screen**: host window pixels; `screen = container + container_origin`.
/// - **container**: pixels relative to the container's top-left corner.
/// - **content**: the space layout sources place items in;
///   `container = (content - offset) * scale + anchor * container_size`.
///
/// `offset` is therefore the content point that sits under the anchor. With an
/// anchor of `(0.5, 0.5)` the offset is the content point at the center of the
/// container, and zooming keeps it fixed.
///
/// Scale is per axis and may be negative (for example `y = -50` to make content
/// `y` grow upwards in a chart). Zero and non-finite scale components are rejected.
///
/// ```rust
/// use evergrid_view::Viewport;
/// use kurbo::{Point, Size, Vec2};
///
/// let mut view = Viewport::new(Size::new(400.0, 300.0));
/// view.set_anchor(Vec2::new(0.5, 0.5));
/// view.set_scale(Vec2::new(50.0, -50.0));
///
/// // Content origin sits at the container center.
/// assert_eq!(view.content_to_container_point(Point::ZERO), Point::new(200.0, 150.0));
/// // One unit up in content is 50 pixels up on screen.
/// assert_eq!(view.content_to_container_point(Point::new(0.0, 1.0)), Point::new(200.0, 100.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    container_size: Size,
    container_origin: Point,
    offset: Point,
    scale: Vec2,
    anchor: Vec2,
    content_bounds: Option<Rect>,
    clamp_mode: ClampMode,
    min_scale: f64,
    max_scale: f64,
}

impl Viewport {
    /// Creates a viewport of the given container size with unit scale, a
    /// top-left anchor, and the content origin at the anchor.
    #[must_use]
    pub fn new(container_size: Size) -> Self {
        Self {
            container_size: non_negative(container_size),
            container_origin: Point::ZERO,
            offset: Point::ZERO,
            scale: Vec2::new(1.0, 1.0),
            anchor: Vec2::ZERO,
            content_bounds: None,
            clamp_mode: ClampMode::Free,
            min_scale: f64::MIN_POSITIVE,
            max_scale: f64::MAX,
        }
    }

    /// Container size in pixels.
    #[must_use]
    pub const fn container_size(&self) -> Size {
        self.container_size
    }

    /// Sets the container size. Returns `true` if it changed.
    pub fn set_container_size(&mut self, size: Size) -> bool {
        let size = non_negative(size);
        if size == self.container_size {
            return false;
        }
        self.container_size = size;
        self.clamp_offset();
        true
    }

    /// Position of the container's top-left corner in screen coordinates.
    #[must_use]
    pub const fn container_origin(&self) -> Point {
        self.container_origin
    }

    /// Sets the container's screen position.
    pub fn set_container_origin(&mut self, origin: Point) {
        self.container_origin = origin;
    }

    /// Content point under the anchor.
    #[must_use]
    pub const fn offset(&self) -> Point {
        self.offset
    }

    /// Sets the content point under the anchor, then applies clamping.
    pub fn set_offset(&mut self, offset: Point) {
        debug_assert!(offset.is_finite(), "viewport offset must be finite; got {offset:?}");
        if !offset.is_finite() {
            return;
        }
        self.offset = offset;
        self.clamp_offset();
    }

    /// Moves the content by `delta` container pixels (content follows the pointer).
    pub fn pan_by(&mut self, delta: Vec2) {
        let d = Vec2::new(delta.x / self.scale.x, delta.y / self.scale.y);
        self.set_offset(self.offset - d);
    }

    /// Pixels per content unit along each axis.
    #[must_use]
    pub const fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Sets the scale, keeping the offset (the content under the anchor) fixed.
    ///
    /// Components are clamped in magnitude to the scale limits; signs are kept.
    /// Returns `false` and leaves the scale untouched if a component is zero or
    /// not finite.
    pub fn set_scale(&mut self, scale: Vec2) -> bool {
        debug_assert!(
            is_valid_scale(scale),
            "viewport scale must be finite and non-zero; got {scale:?}"
        );
        if !is_valid_scale(scale) {
            return false;
        }
        self.scale = Vec2::new(self.limit(scale.x), self.limit(scale.y));
        self.clamp_offset();
        true
    }

    /// Limits the magnitude of each scale component to `[min, max]`.
    pub fn set_scale_limits(&mut self, min: f64, max: f64) {
        let min = if min > 0.0 { min } else { f64::MIN_POSITIVE };
        self.min_scale = min;
        self.max_scale = max.max(min);
        let scale = self.scale;
        self.set_scale(scale);
    }

    /// Fraction of the container where the offset appears.
    #[must_use]
    pub const fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// Sets the anchor.
    pub fn set_anchor(&mut self, anchor: Vec2) {
        self.anchor = anchor;
        self.clamp_offset();
    }

    /// Optional bounds of the content, used for clamping.
    #[must_use]
    pub const fn content_bounds(&self) -> Option<Rect> {
        self.content_bounds
    }

    /// Sets the content bounds and re-applies clamping.
    pub fn set_content_bounds(&mut self, bounds: Option<Rect>) {
        self.content_bounds = bounds;
        self.clamp_offset();
    }

    /// Current clamp mode.
    #[must_use]
    pub const fn clamp_mode(&self) -> ClampMode {
        self.clamp_mode
    }

    /// Sets the clamp mode and re-applies clamping.
    pub fn set_clamp_mode(&mut self, mode: ClampMode) {
        self.clamp_mode = mode;
        self.clamp_offset();
    }

    /// Zooms by `factor` about `focal` (container pixels): the content point
    /// under `focal` stays under `focal`.
    pub fn zoom_about(&mut self, focal: Point, factor: Vec2) {
        let pinned = self.container_to_content_point(focal);
        if !self.set_scale(Vec2::new(self.scale.x * factor.x, self.scale.y * factor.y)) {
            return;
        }
        self.offset = self.offset_placing(pinned, focal);
        self.clamp_offset();
    }

    /// The offset that would place `content` at the container point `at`.
    #[must_use]
    pub fn offset_placing(&self, content: Point, at: Point) -> Point {
        let anchor = self.anchor_point();
        Point::new(
            content.x - (at.x - anchor.x) / self.scale.x,
            content.y - (at.y - anchor.y) / self.scale.y,
        )
    }

    /// The anchor in container pixels.
    #[must_use]
    pub fn anchor_point(&self) -> Point {
        Point::new(
            self.anchor.x * self.container_size.width,
            self.anchor.y * self.container_size.height,
        )
    }

    /// The container rectangle in container coordinates.
    #[must_use]
    pub fn container_rect(&self) -> Rect {
        self.container_size.to_rect()
    }

    /// Affine transform from content to container coordinates.
    #[must_use]
    pub fn content_to_container_affine(&self) -> Affine {
        let anchor = self.anchor_point();
        Affine::new([
            self.scale.x,
            0.0,
            0.0,
            self.scale.y,
            anchor.x - self.offset.x * self.scale.x,
            anchor.y - self.offset.y * self.scale.y,
        ])
    }

    /// Maps a content point to container coordinates.
    #[must_use]
    pub fn content_to_container_point(&self, p: Point) -> Point {
        let anchor = self.anchor_point();
        Point::new(
            (p.x - self.offset.x) * self.scale.x + anchor.x,
            (p.y - self.offset.y) * self.scale.y + anchor.y,
        )
    }

    /// Maps a container point to content coordinates.
    #[must_use]
    pub fn container_to_content_point(&self, p: Point) -> Point {
        let anchor = self.anchor_point();
        Point::new(
            (p.x - anchor.x) / self.scale.x + self.offset.x,
            (p.y - anchor.y) / self.scale.y + self.offset.y,
        )
    }

    /// Maps a screen point to container coordinates.
    #[must_use]
    pub fn screen_to_container_point(&self, p: Point) -> Point {
        p - self.container_origin.to_vec2()
    }

    /// Maps a container point to screen coordinates.
    #[must_use]
    pub fn container_to_screen_point(&self, p: Point) -> Point {
        p + self.container_origin.to_vec2()
    }

    /// Maps a content rect to a (normalized) container rect.
    #[must_use]
    pub fn content_to_container_rect(&self, r: Rect) -> Rect {
        Rect::from_points(
            self.content_to_container_point(Point::new(r.x0, r.y0)),
            self.content_to_container_point(Point::new(r.x1, r.y1)),
        )
    }

    /// Maps a container rect to a (normalized) content rect.
    #[must_use]
    pub fn container_to_content_rect(&self, r: Rect) -> Rect {
        Rect::from_points(
            self.container_to_content_point(Point::new(r.x0, r.y0)),
            self.container_to_content_point(Point::new(r.x1, r.y1)),
        )
    }

    /// The content rect currently visible in the container.
    #[must_use]
    pub fn visible_content_rect(&self) -> Rect {
        self.container_to_content_rect(self.container_rect())
    }

    /// The content rect visible in the container after shrinking it by `insets` pixels.
    ///
    /// Insets larger than the container collapse the rect to zero area.
    #[must_use]
    pub fn visible_content_rect_with_insets(&self, insets: Insets) -> Rect {
        self.container_to_content_rect(inset_rect(self.container_rect(), insets))
    }

    /// Applies the clamp mode to the current offset.
    pub fn clamp_offset(&mut self) {
        let (ClampMode::Contain, Some(bounds)) = (self.clamp_mode, self.content_bounds) else {
            return;
        };
        let visible = self.visible_content_rect();
        let dx = clamp_shift(visible.x0, visible.x1, bounds.x0, bounds.x1);
        let dy = clamp_shift(visible.y0, visible.y1, bounds.y0, bounds.y1);
        self.offset += Vec2::new(dx, dy);
    }

    fn limit(&self, s: f64) -> f64 {
        let magnitude = if s < 0.0 { -s } else { s };
        let clamped = magnitude.clamp(self.min_scale, self.max_scale);
        if s < 0.0 { -clamped } else { clamped }
    }
}

/// Shrinks `rect` by `insets`, collapsing instead of inverting.
pub(crate) fn inset_rect(rect: Rect, insets: Insets) -> Rect {
    let x0 = rect.x0 + insets.x0;
    let y0 = rect.y0 + insets.y0;
    let x1 = (rect.x1 - insets.x1).max(x0);
    let y1 = (rect.y1 - insets.y1).max(y0);
    Rect::new(x0, y0, x1, y1)
}

fn clamp_shift(v0: f64, v1: f64, b0: f64, b1: f64) -> f64 {
    if v1 - v0 >= b1 - b0 {
        (b0 + b1) * 0.5 - (v0 + v1) * 0.5
    } else if v0 < b0 {
        b0 - v0
    } else if v1 > b1 {
        b1 - v1
    } else {
        0.0
    }
}

fn is_valid_scale(scale: Vec2) -> bool {
    scale.is_finite() && scale.x != 0.0 && scale.y != 0.0
}

fn non_negative(size: Size) -> Size {
    Size::new(size.width.max(0.0), size.height.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::{ClampMode, Viewport};
    use kurbo::{Insets, Point, Rect, Size, Vec2};

    fn assert_close(a: Point, b: Point) {
        assert!((a - b).hypot() < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn round_trips_between_spaces() {
        let mut view = Viewport::new(Size::new(800.0, 600.0));
        view.set_anchor(Vec2::new(0.5, 0.5));
        view.set_scale(Vec2::new(2.0, -3.0));
        view.set_offset(Point::new(10.0, -4.0));
        view.set_container_origin(Point::new(100.0, 50.0));

        let content = Point::new(12.5, 7.0);
        let container = view.content_to_container_point(content);
        assert_close(view.container_to_content_point(container), content);
        assert_close(view.content_to_container_affine() * content, container);

        let screen = view.container_to_screen_point(container);
        assert_close(view.screen_to_container_point(screen), container);
    }

    #[test]
    fn negative_scale_rects_are_normalized() {
        let mut view = Viewport::new(Size::new(100.0, 100.0));
        view.set_scale(Vec2::new(10.0, -10.0));
        let r = view.content_to_container_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(r, Rect::new(0.0, -10.0, 10.0, 0.0));
        assert!(r.width() > 0.0 && r.height() > 0.0);
    }

    #[test]
    fn pan_moves_content_with_pointer() {
        let mut view = Viewport::new(Size::new(100.0, 100.0));
        view.set_scale(Vec2::new(2.0, 2.0));
        let before = view.content_to_container_point(Point::new(5.0, 5.0));
        view.pan_by(Vec2::new(20.0, -10.0));
        let after = view.content_to_container_point(Point::new(5.0, 5.0));
        assert_close(after, before + Vec2::new(20.0, -10.0));
    }

    #[test]
    fn zoom_keeps_focal_point_fixed() {
        let mut view = Viewport::new(Size::new(400.0, 400.0));
        view.set_anchor(Vec2::new(0.5, 0.5));
        let focal = Point::new(300.0, 120.0);
        let under = view.container_to_content_point(focal);
        view.zoom_about(focal, Vec2::new(1.6, 1.6));
        assert_eq!(view.scale(), Vec2::new(1.6, 1.6));
        assert_close(view.content_to_container_point(under), focal);
    }

    #[test]
    fn invalid_scale_is_rejected_and_limits_apply() {
        let mut view = Viewport::new(Size::new(10.0, 10.0));
        view.set_scale_limits(0.5, 4.0);
        view.set_scale(Vec2::new(10.0, -0.1));
        assert_eq!(view.scale(), Vec2::new(4.0, -0.5));
    }

    #[test]
    fn contain_clamps_and_centers() {
        let mut view = Viewport::new(Size::new(100.0, 100.0));
        view.set_content_bounds(Some(Rect::new(0.0, 0.0, 1000.0, 50.0)));
        view.set_clamp_mode(ClampMode::Contain);

        view.set_offset(Point::new(-30.0, 0.0));
        // x is clamped to the left edge, y (bounds smaller than view) is centered.
        assert_close(view.offset(), Point::new(0.0, -25.0));

        view.set_offset(Point::new(5000.0, 0.0));
        assert_close(view.offset(), Point::new(900.0, -25.0));
    }

    #[test]
    fn insets_shrink_visible_rect() {
        let view = Viewport::new(Size::new(100.0, 80.0));
        let r = view.visible_content_rect_with_insets(Insets::new(10.0, 0.0, 20.0, 40.0));
        assert_eq!(r, Rect::new(10.0, 0.0, 80.0, 40.0));
        let collapsed = view.visible_content_rect_with_insets(Insets::uniform(100.0));
        assert_eq!(collapsed.area(), 0.0);
    }

    #[test]
    fn container_resize_reports_change() {
        let mut view = Viewport::new(Size::new(10.0, 10.0));
        assert!(!view.set_container_size(Size::new(10.0, 10.0)));
        assert!(view.set_container_size(Size::new(20.0, -5.0)));
        assert_eq!(view.container_size(), Size::new(20.0, 0.0));
    }
}
