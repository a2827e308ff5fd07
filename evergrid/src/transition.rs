// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animated reflow of item frames.

use evergrid_value::{AnimatedValue, Animation};
use kurbo::{Rect, Vec2};

/// Moves an item from a displayed frame to its layout frame.
///
/// Stores the displacement from the target rather than absolute frames, so a
/// target that keeps moving (scrolling during the reflow) is followed exactly.
#[derive(Debug)]
pub(crate) struct Transition {
    position: AnimatedValue<Vec2>,
    size: AnimatedValue<Vec2>,
}

impl Transition {
    /// Starts a transition from `from` to `to`, or `None` if they coincide.
    pub(crate) fn new(from: Rect, to: Rect, animation: Animation) -> Option<Self> {
        let position = Vec2::new(from.x0 - to.x0, from.y0 - to.y0);
        let size = Vec2::new(from.width() - to.width(), from.height() - to.height());
        if position == Vec2::ZERO && size == Vec2::ZERO {
            return None;
        }
        let mut t = Self {
            position: AnimatedValue::new(position),
            size: AnimatedValue::new(size),
        };
        t.position.animate_to(Vec2::ZERO, animation);
        t.size.animate_to(Vec2::ZERO, animation);
        Some(t)
    }

    /// Advances by `dt` seconds; returns `true` while still moving.
    pub(crate) fn tick(&mut self, dt: f64) -> bool {
        let moving = self.position.tick(dt);
        self.size.tick(dt) || moving
    }

    /// The displayed frame for a layout frame of `target`.
    pub(crate) fn apply(&self, target: Rect) -> Rect {
        let p = self.position.get();
        let s = self.size.get();
        let x0 = target.x0 + p.x;
        let y0 = target.y0 + p.y;
        Rect::new(
            x0,
            y0,
            x0 + (target.width() + s.x).max(0.0),
            y0 + (target.height() + s.y).max(0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Transition;
    use evergrid_value::{Animation, Easing, TimingSpec};
    use kurbo::Rect;

    #[test]
    fn moves_from_old_frame_to_target() {
        let linear = Animation::Timing(TimingSpec::new(100).with_easing(Easing::Linear));
        let from = Rect::new(0.0, 0.0, 100.0, 50.0);
        let to = Rect::new(0.0, 50.0, 100.0, 100.0);
        let mut t = Transition::new(from, to, linear).unwrap();
        assert_eq!(t.apply(to), from);

        assert!(t.tick(0.05));
        assert_eq!(t.apply(to), Rect::new(0.0, 25.0, 100.0, 75.0));

        // The target moved (scrolling); the remaining displacement follows it.
        let scrolled = to + kurbo::Vec2::new(0.0, -10.0);
        assert_eq!(t.apply(scrolled), Rect::new(0.0, 15.0, 100.0, 65.0));

        assert!(!t.tick(0.05));
        assert_eq!(t.apply(to), to);
    }

    #[test]
    fn identical_frames_need_no_transition() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert!(Transition::new(r, r, Animation::default()).is_none());
    }
}
