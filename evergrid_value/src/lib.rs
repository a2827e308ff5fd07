// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Evergrid Value: owned observable values and animation.
//!
//! Layout sources, the container, and host code frequently need to share one
//! value: a grid's item size that its axis decorations also follow, or the
//! container's scale that a label's font size is derived from. Rather than
//! passing a mutable object around, this crate separates ownership from
//! observation:
//!
//! - [`Observable`]: the single owner; the only type that can write.
//! - [`ValueHandle`]: a clonable read-only view with a change [`version`](ValueHandle::version).
//!   Handles can also be constants ([`ValueHandle::fixed`]) or derived from other
//!   handles ([`ValueHandle::map`], [`ValueHandle::combine`]).
//! - [`AnimatedValue`]: an observable driven by an [`Animation`] (spring or timing)
//!   or a momentum [`DecaySpec`], advanced explicitly with [`AnimatedValue::tick`].
//!
//! Values are single-threaded (`Rc`-based); hosts drive them from their UI thread.
//!
//! ## Example
//!
//! ```rust
//! use evergrid_value::{AnimatedValue, Animation, SpringSpec};
//! use kurbo::Vec2;
//!
//! let mut item_size = AnimatedValue::new(Vec2::new(300.0, 300.0));
//! let grid_reads = item_size.handle();
//! let axis_reads = item_size.handle().map(|s| Vec2::new(s.x, 40.0));
//!
//! item_size.animate_to(Vec2::new(480.0, 480.0), Animation::Spring(SpringSpec::DEFAULT));
//! while item_size.tick(1.0 / 60.0) {}
//!
//! assert_eq!(grid_reads.get(), Vec2::new(480.0, 480.0));
//! assert_eq!(axis_reads.get(), Vec2::new(480.0, 40.0));
//! ```
//!
//! ## Features
//!
//! - `std` (default): use `std` float math.
//! - `libm`: `no_std` float math via `libm`.
//! - `serde`: `Serialize`/`Deserialize` for the animation specs.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("evergrid_value requires either the `std` or `libm` feature");

mod animation;
mod easing;
mod observable;
mod util;

pub use animation::{AnimatedValue, Animatable, Animation, DecaySpec, SpringSpec, TimingSpec};
pub use easing::Easing;
pub use observable::{Observable, Subscription, ValueHandle};
