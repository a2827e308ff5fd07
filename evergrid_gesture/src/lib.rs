// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Evergrid Gesture: pointer arbitration for a pannable, zoomable container.
//!
//! A container that pans and zooms its content has to share the pointer with
//! the item views inside it. This crate makes that sharing an explicit state
//! machine, [`GestureState`], instead of a set of interacting callbacks:
//!
//! - [`GesturePhase`]: `Idle`, `Pending`, `Panning`, `Pinching`, or `Custom`
//!   (the host owns the sequence).
//! - [`GestureAction`]: what the container should do in response to an event:
//!   pan, pinch, end with a fling velocity, report a tap or long press, or
//!   forward a move to the host.
//! - [`VelocityTracker`]: release velocity over a short time window.
//! - [`GestureConfig`]: slop, long-press time, enabled [`ScrollAxes`], pinch.
//!
//! The state machine does no hit testing, owns no timers, and never touches
//! the viewport. Timestamps are caller-supplied milliseconds; call
//! [`GestureState::poll`] from the frame loop to fire long presses.
//!
//! ## Features
//!
//! - `std` (default): forwards to `kurbo/std`.
//! - `libm`: `no_std` float math for `kurbo`.
//! - `serde`: `Serialize`/`Deserialize` for [`GestureConfig`] and [`ScrollAxes`].
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod state;
mod velocity;

pub use config::{GestureConfig, ScrollAxes};
pub use state::{GestureAction, GestureActions, GesturePhase, GestureState, PointerId};
pub use velocity::VelocityTracker;
