// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The pointer arbitration state machine.

use alloc::collections::BTreeMap;
use core::num::NonZeroU64;

use kurbo::{Point, Vec2};
use smallvec::SmallVec;

use crate::config::GestureConfig;
use crate::velocity::VelocityTracker;

/// Pointer identifier for tracking multiple concurrent contacts.
pub type PointerId = NonZeroU64;

/// Who currently owns the pointer sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum GesturePhase {
    /// No pointer is being tracked for a gesture.
    #[default]
    Idle,
    /// A pointer is down but has not moved past the slop.
    Pending,
    /// One pointer is panning the content.
    Panning,
    /// Two pointers are zooming the content.
    Pinching,
    /// The host claimed the sequence; pointer moves are forwarded untouched.
    Custom,
}

/// An instruction produced by [`GestureState`] for the container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureAction {
    /// Panning started; the container stops momentum and follows the pointer.
    PanStart {
        /// Pointer position when the pan began.
        position: Point,
    },
    /// Move the content by `delta` pointer units, already masked to enabled axes.
    PanBy {
        /// Displacement since the previous action.
        delta: Vec2,
    },
    /// Panning finished.
    PanEnd {
        /// Release velocity in pointer units per second, masked to enabled axes.
        /// Zero when the pan was interrupted rather than released.
        velocity: Vec2,
    },
    /// A second pointer started a pinch.
    PinchStart {
        /// Midpoint between the two pointers.
        focal: Point,
    },
    /// Zoom by `factor` about `focal`, after panning by `delta`.
    PinchBy {
        /// Current midpoint between the two pointers.
        focal: Point,
        /// Scale ratio since the previous action.
        factor: Vec2,
        /// Movement of the midpoint since the previous action.
        delta: Vec2,
    },
    /// The pinch finished.
    PinchEnd,
    /// A press was held past the long-press time without panning.
    LongPress {
        /// Pointer position when the long press fired.
        position: Point,
    },
    /// A press was released quickly without panning.
    Tap {
        /// Release position.
        position: Point,
    },
    /// A pointer moved while the host owns the sequence.
    CustomMove {
        /// The pointer that moved.
        pointer: PointerId,
        /// Its new position.
        position: Point,
    },
    /// The last pointer lifted; the next press starts a fresh sequence.
    SequenceEnd,
}

/// Actions produced by a single input event.
pub type GestureActions = SmallVec<[GestureAction; 4]>;

#[derive(Clone, Copy, Debug)]
struct Press {
    pointer: PointerId,
    down_position: Point,
    down_time: u64,
    long_press_fired: bool,
}

#[derive(Clone, Copy, Debug)]
struct Pinch {
    a: PointerId,
    b: PointerId,
    focal: Point,
    distance: f64,
}

/// Arbitrates a pointer sequence between content panning, pinching, and the host.
///
/// Feed it pointer events (positions in one consistent space, timestamps in
/// milliseconds) and apply the returned [`GestureAction`]s. Priority rules:
///
/// 1. A host claim ([`prevent_default_pan`](Self::prevent_default_pan)) wins
///    over everything until all pointers lift.
/// 2. A second pointer preempts panning with pinching, when pinch is enabled.
/// 3. A pending press becomes a pan once movement on an enabled axis exceeds
///    [`pan_slop`](GestureConfig::pan_slop).
/// 4. A pending press fires [`GestureAction::LongPress`] once, when held for
///    [`long_press_ms`](GestureConfig::long_press_ms).
///
/// ```rust
/// use core::num::NonZeroU64;
/// use evergrid_gesture::{GestureAction, GestureConfig, GesturePhase, GestureState};
/// use kurbo::{Point, Vec2};
///
/// let finger = NonZeroU64::new(1).unwrap();
/// let mut state = GestureState::new(GestureConfig::default());
///
/// state.pointer_down(finger, Point::new(100.0, 100.0), 0);
/// assert_eq!(state.phase(), GesturePhase::Pending);
///
/// let actions = state.pointer_move(finger, Point::new(100.0, 130.0), 16);
/// assert_eq!(state.phase(), GesturePhase::Panning);
/// assert_eq!(actions[1], GestureAction::PanBy { delta: Vec2::new(0.0, 30.0) });
///
/// let actions = state.pointer_up(finger, Point::new(100.0, 130.0), 32);
/// assert!(matches!(actions[0], GestureAction::PanEnd { .. }));
/// assert_eq!(actions[1], GestureAction::SequenceEnd);
/// ```
#[derive(Clone, Debug)]
pub struct GestureState {
    config: GestureConfig,
    phase: GesturePhase,
    pointers: BTreeMap<PointerId, Point>,
    press: Option<Press>,
    last_pan_position: Point,
    pinch: Option<Pinch>,
    claimed: bool,
    velocity: VelocityTracker,
}

impl Default for GestureState {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl GestureState {
    /// Creates an idle state machine.
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            phase: GesturePhase::Idle,
            pointers: BTreeMap::new(),
            press: None,
            last_pan_position: Point::ZERO,
            pinch: None,
            claimed: false,
            velocity: VelocityTracker::new(config.velocity_window_ms),
        }
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Replaces the configuration; takes effect for subsequent events.
    pub fn set_config(&mut self, config: GestureConfig) {
        self.config = config;
        self.velocity = VelocityTracker::new(config.velocity_window_ms);
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// `true` while a pan or pinch is moving the content.
    #[must_use]
    pub const fn is_panning_content(&self) -> bool {
        matches!(self.phase, GesturePhase::Panning | GesturePhase::Pinching)
    }

    /// Number of pointers currently down.
    #[must_use]
    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// `true` if the host has claimed the current (or next) sequence.
    #[must_use]
    pub const fn is_claimed(&self) -> bool {
        self.claimed
    }

    /// Hands the current pointer sequence to the host.
    ///
    /// Any pan or pinch in progress ends without momentum, and the state
    /// machine forwards moves as [`GestureAction::CustomMove`] until every
    /// pointer lifts. Called while idle, the claim applies to the next sequence.
    pub fn prevent_default_pan(&mut self) -> GestureActions {
        let mut out = GestureActions::new();
        self.claimed = true;
        match self.phase {
            GesturePhase::Panning => out.push(GestureAction::PanEnd {
                velocity: Vec2::ZERO,
            }),
            GesturePhase::Pinching => out.push(GestureAction::PinchEnd),
            GesturePhase::Idle | GesturePhase::Pending | GesturePhase::Custom => {}
        }
        if !self.pointers.is_empty() {
            self.pinch = None;
            self.press = None;
            self.set_phase(GesturePhase::Custom);
        }
        out
    }

    /// Handles a pointer press.
    pub fn pointer_down(
        &mut self,
        pointer: PointerId,
        position: Point,
        timestamp: u64,
    ) -> GestureActions {
        let mut out = GestureActions::new();
        self.pointers.insert(pointer, position);

        match self.phase {
            GesturePhase::Idle => {
                if self.claimed {
                    self.set_phase(GesturePhase::Custom);
                } else {
                    self.press = Some(Press {
                        pointer,
                        down_position: position,
                        down_time: timestamp,
                        long_press_fired: false,
                    });
                    self.velocity.reset();
                    self.velocity.add(timestamp, position);
                    self.set_phase(GesturePhase::Pending);
                }
            }
            GesturePhase::Pending | GesturePhase::Panning => {
                if self.config.pinch {
                    if self.phase == GesturePhase::Panning {
                        out.push(GestureAction::PanEnd {
                            velocity: Vec2::ZERO,
                        });
                    }
                    self.start_pinch(&mut out);
                }
            }
            GesturePhase::Pinching | GesturePhase::Custom => {}
        }
        out
    }

    /// Handles pointer movement.
    pub fn pointer_move(
        &mut self,
        pointer: PointerId,
        position: Point,
        timestamp: u64,
    ) -> GestureActions {
        let mut out = GestureActions::new();
        let Some(slot) = self.pointers.get_mut(&pointer) else {
            return out;
        };
        *slot = position;

        match self.phase {
            GesturePhase::Idle => {}
            GesturePhase::Pending => {
                self.check_long_press(timestamp, &mut out);
                let Some(press) = self.press.filter(|p| p.pointer == pointer) else {
                    return out;
                };
                self.velocity.add(timestamp, position);
                let moved = self.config.axes.mask(position - press.down_position);
                if moved.hypot() > self.config.pan_slop {
                    self.set_phase(GesturePhase::Panning);
                    self.last_pan_position = position;
                    out.push(GestureAction::PanStart {
                        position: press.down_position,
                    });
                    out.push(GestureAction::PanBy { delta: moved });
                }
            }
            GesturePhase::Panning => {
                if self.press.is_some_and(|p| p.pointer == pointer) {
                    self.velocity.add(timestamp, position);
                    let delta = self.config.axes.mask(position - self.last_pan_position);
                    self.last_pan_position = position;
                    if delta != Vec2::ZERO {
                        out.push(GestureAction::PanBy { delta });
                    }
                }
            }
            GesturePhase::Pinching => {
                let Some(pinch) = self.pinch else {
                    return out;
                };
                if pointer != pinch.a && pointer != pinch.b {
                    return out;
                }
                let (focal, distance) = self.pinch_geometry(pinch.a, pinch.b);
                let ratio = if pinch.distance >= self.config.min_pinch_distance
                    && distance >= self.config.min_pinch_distance
                {
                    distance / pinch.distance
                } else {
                    1.0
                };
                let delta = self.config.axes.mask(focal - pinch.focal);
                self.pinch = Some(Pinch {
                    focal,
                    distance,
                    ..pinch
                });
                out.push(GestureAction::PinchBy {
                    focal,
                    factor: Vec2::new(ratio, ratio),
                    delta,
                });
            }
            GesturePhase::Custom => out.push(GestureAction::CustomMove { pointer, position }),
        }
        out
    }

    /// Handles a pointer release.
    pub fn pointer_up(
        &mut self,
        pointer: PointerId,
        position: Point,
        timestamp: u64,
    ) -> GestureActions {
        self.release(pointer, position, timestamp, true)
    }

    /// Handles a cancelled pointer: like a release, but never taps or flings.
    pub fn pointer_cancel(&mut self, pointer: PointerId, timestamp: u64) -> GestureActions {
        let position = self.pointers.get(&pointer).copied().unwrap_or(Point::ZERO);
        self.release(pointer, position, timestamp, false)
    }

    /// Advances timers; fires a pending long press once its hold time elapses.
    pub fn poll(&mut self, timestamp: u64) -> Option<GestureAction> {
        let mut out = GestureActions::new();
        self.check_long_press(timestamp, &mut out);
        out.into_iter().next()
    }

    /// Forgets every pointer and any claim, returning to [`GesturePhase::Idle`].
    pub fn reset(&mut self) {
        self.pointers.clear();
        self.press = None;
        self.pinch = None;
        self.claimed = false;
        self.velocity.reset();
        self.set_phase(GesturePhase::Idle);
    }

    fn release(
        &mut self,
        pointer: PointerId,
        position: Point,
        timestamp: u64,
        completed: bool,
    ) -> GestureActions {
        let mut out = GestureActions::new();
        if self.pointers.remove(&pointer).is_none() {
            return out;
        }
        let is_press = self.press.is_some_and(|p| p.pointer == pointer);

        match self.phase {
            GesturePhase::Idle | GesturePhase::Custom => {}
            GesturePhase::Pending => {
                if is_press {
                    let fired = self.press.is_some_and(|p| p.long_press_fired);
                    if completed && !fired {
                        out.push(GestureAction::Tap { position });
                    }
                    self.press = None;
                    self.set_phase(GesturePhase::Idle);
                }
            }
            GesturePhase::Panning => {
                if is_press {
                    let velocity = if completed {
                        self.velocity.add(timestamp, position);
                        self.config.axes.mask(self.velocity.velocity())
                    } else {
                        Vec2::ZERO
                    };
                    out.push(GestureAction::PanEnd { velocity });
                    self.press = None;
                    self.set_phase(GesturePhase::Idle);
                }
            }
            GesturePhase::Pinching => {
                if self.pinch.is_some_and(|p| p.a == pointer || p.b == pointer) {
                    out.push(GestureAction::PinchEnd);
                    self.pinch = None;
                    self.resume_pan(timestamp, &mut out);
                }
            }
        }

        if self.pointers.is_empty() {
            self.press = None;
            self.pinch = None;
            self.claimed = false;
            self.set_phase(GesturePhase::Idle);
            out.push(GestureAction::SequenceEnd);
        }
        out
    }

    fn start_pinch(&mut self, out: &mut GestureActions) {
        let mut ids = self.pointers.keys().copied();
        let (Some(a), Some(b)) = (ids.next(), ids.next()) else {
            return;
        };
        let (focal, distance) = self.pinch_geometry(a, b);
        self.pinch = Some(Pinch {
            a,
            b,
            focal,
            distance,
        });
        self.press = None;
        self.set_phase(GesturePhase::Pinching);
        out.push(GestureAction::PinchStart { focal });
    }

    fn resume_pan(&mut self, timestamp: u64, out: &mut GestureActions) {
        let Some((&pointer, &position)) = self.pointers.iter().next() else {
            return;
        };
        self.press = Some(Press {
            pointer,
            down_position: position,
            down_time: timestamp,
            long_press_fired: true,
        });
        self.last_pan_position = position;
        self.velocity.reset();
        self.velocity.add(timestamp, position);
        self.set_phase(GesturePhase::Panning);
        out.push(GestureAction::PanStart { position });
    }

    fn pinch_geometry(&self, a: PointerId, b: PointerId) -> (Point, f64) {
        let pa = self.pointers.get(&a).copied().unwrap_or(Point::ZERO);
        let pb = self.pointers.get(&b).copied().unwrap_or(Point::ZERO);
        (pa.midpoint(pb), pa.distance(pb))
    }

    fn check_long_press(&mut self, timestamp: u64, out: &mut GestureActions) {
        if self.phase != GesturePhase::Pending {
            return;
        }
        let Some(press) = self.press.as_mut() else {
            return;
        };
        if press.long_press_fired
            || timestamp.saturating_sub(press.down_time) < self.config.long_press_ms
        {
            return;
        }
        press.long_press_fired = true;
        let position = self
            .pointers
            .get(&press.pointer)
            .copied()
            .unwrap_or(press.down_position);
        tracing::debug!(x = position.x, y = position.y, "long press");
        out.push(GestureAction::LongPress { position });
    }

    fn set_phase(&mut self, phase: GesturePhase) {
        if self.phase != phase {
            tracing::trace!(from = ?self.phase, to = ?phase, "gesture phase changed");
            self.phase = phase;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GestureAction, GesturePhase, GestureState, PointerId};
    use crate::config::{GestureConfig, ScrollAxes};
    use kurbo::{Point, Vec2};

    fn id(n: u64) -> PointerId {
        PointerId::new(n).unwrap()
    }

    fn state() -> GestureState {
        GestureState::new(GestureConfig::default())
    }

    #[test]
    fn small_moves_stay_pending_and_tap() {
        let mut s = state();
        s.pointer_down(id(1), Point::new(10.0, 10.0), 0);
        assert!(s.pointer_move(id(1), Point::new(14.0, 13.0), 10).is_empty());
        assert_eq!(s.phase(), GesturePhase::Pending);
        let out = s.pointer_up(id(1), Point::new(14.0, 13.0), 50);
        assert_eq!(
            out.as_slice(),
            [
                GestureAction::Tap { position: Point::new(14.0, 13.0) },
                GestureAction::SequenceEnd,
            ]
        );
        assert_eq!(s.phase(), GesturePhase::Idle);
    }

    #[test]
    fn slop_counts_only_enabled_axes() {
        let mut s = GestureState::new(GestureConfig {
            axes: ScrollAxes::HORIZONTAL,
            ..GestureConfig::default()
        });
        s.pointer_down(id(1), Point::ZERO, 0);
        assert!(s.pointer_move(id(1), Point::new(0.0, 50.0), 10).is_empty());
        let out = s.pointer_move(id(1), Point::new(20.0, 60.0), 20);
        assert_eq!(out[0], GestureAction::PanStart { position: Point::ZERO });
        assert_eq!(out[1], GestureAction::PanBy { delta: Vec2::new(20.0, 0.0) });
        let out = s.pointer_move(id(1), Point::new(25.0, 0.0), 30);
        assert_eq!(out.as_slice(), [GestureAction::PanBy { delta: Vec2::new(5.0, 0.0) }]);
    }

    #[test]
    fn release_reports_fling_velocity() {
        let mut s = state();
        s.pointer_down(id(1), Point::ZERO, 0);
        s.pointer_move(id(1), Point::new(0.0, 25.0), 25);
        let out = s.pointer_up(id(1), Point::new(0.0, 50.0), 50);
        let GestureAction::PanEnd { velocity } = out[0] else {
            panic!("expected PanEnd, got {out:?}");
        };
        assert_eq!(velocity, Vec2::new(0.0, 1000.0));
    }

    #[test]
    fn long_press_fires_once_and_suppresses_tap() {
        let mut s = state();
        s.pointer_down(id(1), Point::new(5.0, 5.0), 1_000);
        assert_eq!(s.poll(1_499), None);
        assert_eq!(
            s.poll(1_500),
            Some(GestureAction::LongPress { position: Point::new(5.0, 5.0) })
        );
        assert_eq!(s.poll(2_000), None);
        let out = s.pointer_up(id(1), Point::new(5.0, 5.0), 2_100);
        assert_eq!(out.as_slice(), [GestureAction::SequenceEnd]);
    }

    #[test]
    fn long_press_never_fires_after_panning() {
        let mut s = state();
        s.pointer_down(id(1), Point::ZERO, 0);
        s.pointer_move(id(1), Point::new(30.0, 0.0), 100);
        assert_eq!(s.poll(10_000), None);
    }

    #[test]
    fn second_pointer_preempts_pan_with_pinch() {
        let mut s = state();
        s.pointer_down(id(1), Point::new(100.0, 100.0), 0);
        s.pointer_move(id(1), Point::new(100.0, 150.0), 10);
        assert_eq!(s.phase(), GesturePhase::Panning);

        let out = s.pointer_down(id(2), Point::new(200.0, 150.0), 20);
        assert_eq!(out[0], GestureAction::PanEnd { velocity: Vec2::ZERO });
        assert_eq!(out[1], GestureAction::PinchStart { focal: Point::new(150.0, 150.0) });
        assert_eq!(s.phase(), GesturePhase::Pinching);
        assert!(s.is_panning_content());

        // Spread the fingers to double the distance around a fixed midpoint.
        let out = s.pointer_move(id(2), Point::new(250.0, 150.0), 30);
        let out2 = s.pointer_move(id(1), Point::new(50.0, 150.0), 30);
        assert!(matches!(out[0], GestureAction::PinchBy { .. }));
        let GestureAction::PinchBy { focal, factor, .. } = out2[0] else {
            panic!("expected PinchBy, got {out2:?}");
        };
        assert_eq!(focal, Point::new(150.0, 150.0));
        let GestureAction::PinchBy { factor: f1, .. } = out[0] else {
            unreachable!()
        };
        let total = f1.x * factor.x;
        assert!(total > 2.0 - 1e-12 && total < 2.0 + 1e-12, "total zoom {total}");

        // Lifting one finger resumes panning with the other.
        let out = s.pointer_up(id(2), Point::new(250.0, 150.0), 40);
        assert_eq!(out[0], GestureAction::PinchEnd);
        assert_eq!(out[1], GestureAction::PanStart { position: Point::new(50.0, 150.0) });
        assert_eq!(s.phase(), GesturePhase::Panning);
    }

    #[test]
    fn pinch_disabled_ignores_second_pointer() {
        let mut s = GestureState::new(GestureConfig {
            pinch: false,
            ..GestureConfig::default()
        });
        s.pointer_down(id(1), Point::ZERO, 0);
        assert!(s.pointer_down(id(2), Point::new(50.0, 0.0), 5).is_empty());
        assert_eq!(s.phase(), GesturePhase::Pending);
        assert!(s.pointer_move(id(2), Point::new(90.0, 0.0), 10).is_empty());
    }

    #[test]
    fn host_claim_wins_until_all_pointers_lift() {
        let mut s = state();
        s.pointer_down(id(1), Point::ZERO, 0);
        s.pointer_move(id(1), Point::new(20.0, 0.0), 10);
        let out = s.prevent_default_pan();
        assert_eq!(out.as_slice(), [GestureAction::PanEnd { velocity: Vec2::ZERO }]);
        assert_eq!(s.phase(), GesturePhase::Custom);
        assert!(!s.is_panning_content());

        // A second finger cannot start a pinch while the host owns the sequence.
        assert!(s.pointer_down(id(2), Point::new(50.0, 0.0), 20).is_empty());
        let out = s.pointer_move(id(1), Point::new(40.0, 0.0), 30);
        assert_eq!(
            out.as_slice(),
            [GestureAction::CustomMove { pointer: id(1), position: Point::new(40.0, 0.0) }]
        );

        assert!(s.pointer_up(id(1), Point::new(40.0, 0.0), 40).is_empty());
        assert_eq!(s.pointer_up(id(2), Point::new(50.0, 0.0), 50).as_slice(), [GestureAction::SequenceEnd]);
        assert!(!s.is_claimed());

        // The next sequence pans normally again.
        s.pointer_down(id(1), Point::ZERO, 100);
        assert_eq!(s.phase(), GesturePhase::Pending);
    }

    #[test]
    fn claim_while_idle_applies_to_next_sequence() {
        let mut s = state();
        assert!(s.prevent_default_pan().is_empty());
        s.pointer_down(id(1), Point::ZERO, 0);
        assert_eq!(s.phase(), GesturePhase::Custom);
    }

    #[test]
    fn cancel_ends_without_fling_or_tap() {
        let mut s = state();
        s.pointer_down(id(1), Point::ZERO, 0);
        s.pointer_move(id(1), Point::new(100.0, 0.0), 10);
        let out = s.pointer_cancel(id(1), 20);
        assert_eq!(
            out.as_slice(),
            [GestureAction::PanEnd { velocity: Vec2::ZERO }, GestureAction::SequenceEnd]
        );

        s.pointer_down(id(1), Point::ZERO, 100);
        assert_eq!(s.pointer_cancel(id(1), 110).as_slice(), [GestureAction::SequenceEnd]);
    }

    #[test]
    fn unknown_pointers_are_ignored() {
        let mut s = state();
        assert!(s.pointer_move(id(7), Point::ZERO, 0).is_empty());
        assert!(s.pointer_up(id(7), Point::ZERO, 0).is_empty());
    }
}
