// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Snapping the offset after a pan is released.

use alloc::boxed::Box;

use kurbo::{Point, Vec2};

/// What a snap callback is told when a pan is released.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapQuery {
    /// Where momentum would bring the offset to rest (content units).
    pub location: Point,
    /// Release velocity of the offset in content units per second.
    pub scaled_velocity: Vec2,
    /// The offset at release.
    pub offset: Point,
}

/// Where the offset should settle. Missing axes keep the momentum end.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SnapTarget {
    /// Horizontal target offset.
    pub x: Option<f64>,
    /// Vertical target offset.
    pub y: Option<f64>,
}

impl SnapTarget {
    /// Snap both axes to `target`.
    #[must_use]
    pub const fn to(target: Point) -> Self {
        Self {
            x: Some(target.x),
            y: Some(target.y),
        }
    }

    /// Snap the horizontal axis only.
    #[must_use]
    pub const fn x(x: f64) -> Self {
        Self { x: Some(x), y: None }
    }

    /// Snap the vertical axis only.
    #[must_use]
    pub const fn y(y: f64) -> Self {
        Self { x: None, y: Some(y) }
    }

    /// Fills missing axes from `fallback`.
    #[must_use]
    pub fn resolve(self, fallback: Point) -> Point {
        Point::new(self.x.unwrap_or(fallback.x), self.y.unwrap_or(fallback.y))
    }
}

/// Decides where a released pan settles; `None` lets momentum run freely.
pub type SnapFn = Box<dyn Fn(&SnapQuery) -> Option<SnapTarget>>;

#[cfg(test)]
mod tests {
    use super::SnapTarget;
    use kurbo::Point;

    #[test]
    fn missing_axes_fall_back() {
        let end = Point::new(120.0, -40.0);
        assert_eq!(SnapTarget::x(100.0).resolve(end), Point::new(100.0, -40.0));
        assert_eq!(SnapTarget::y(0.0).resolve(end), Point::new(120.0, 0.0));
        assert_eq!(SnapTarget::default().resolve(end), end);
        assert_eq!(SnapTarget::to(Point::ZERO).resolve(end), Point::ZERO);
    }
}
