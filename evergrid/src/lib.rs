// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Evergrid: a headless, virtualized, pannable and zoomable 2D container.
//!
//! [`Evergrid`] aggregates any number of layout sources (grids, lists,
//! sticky axis decorations, free-form scatters) over one shared viewport and
//! keeps only the visible items realized. Hosts own the actual item views; the
//! container tells them, once per frame, which views exist, which item each
//! shows, where it goes, and when its content must be rendered.
//!
//! Per frame the control flow is:
//!
//! 1. pointer input moves the offset and scale (pans, pinches, momentum, snapping),
//! 2. the viewport yields the visible content rect,
//! 3. every source computes its visible index set,
//! 4. the recycler diffs the new sets against the bound views and reuses,
//!    creates, hides, or destroys views,
//! 5. the host applies the resulting [`FrameUpdate`].
//!
//! The building blocks live in their own crates and are re-exported here:
//!
//! - [`evergrid_value`]: observable and animated values ([`AnimatedValue`], [`ValueHandle`]).
//! - [`evergrid_view`]: the [`Viewport`] and its coordinate transforms.
//! - [`evergrid_layout`]: [`LayoutSource`] and the grid, flat, and custom sources.
//! - [`evergrid_recycler`]: the slot pool behind [`SlotChange`]s.
//! - [`evergrid_gesture`]: pointer arbitration between panning, pinching, and the host.
//!
//! ## Example
//!
//! ```rust
//! use core::num::NonZeroU64;
//! use evergrid::{Evergrid, EvergridOptions, SlotChange};
//! use evergrid::layout::{Axis, FlatLayoutSource, LayoutProps, ReuseId};
//! use kurbo::{Point, Size, Vec2};
//!
//! let mut inbox = Evergrid::new(Size::new(320.0, 480.0), EvergridOptions::default());
//! let rows = inbox.add_source(
//!     FlatLayoutSource::new(
//!         LayoutProps::new(ReuseId("email")).with_item_size(Vec2::new(320.0, 80.0)),
//!         Axis::Vertical,
//!     )
//!     .with_len(1_000),
//! );
//!
//! // Six rows fit; each needs a view and content.
//! let frame = inbox.update(0.0);
//! assert_eq!(frame.items.len(), 6);
//! assert_eq!(frame.renders().count(), 6);
//!
//! // Drag up by 100 pixels.
//! let finger = NonZeroU64::new(1).unwrap();
//! inbox.pointer_down(finger, Point::new(160.0, 400.0), 0);
//! inbox.pointer_move(finger, Point::new(160.0, 300.0), 16);
//! assert_eq!(inbox.offset(), Point::new(0.0, 100.0));
//!
//! // Row 0 left and its view now shows row 6; row 7 got a new view.
//! let frame = inbox.update(1.0 / 60.0);
//! assert!(frame.changes.iter().any(|c| matches!(c, SlotChange::Rebind { .. })));
//! assert!(frame.changes.iter().any(|c| matches!(c, SlotChange::Create { .. })));
//! assert_eq!(frame.items.len(), 7);
//! # let _ = rows;
//! ```
//!
//! ## Features
//!
//! - `std` (default): use `std` float math in the component crates.
//! - `libm`: `no_std` float math via `libm`.
//! - `serde`: `Serialize`/`Deserialize` for [`EvergridOptions`] and the animation settings it holds.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod container;
mod error;
mod event;
mod frame;
mod options;
mod scroll;
mod snap;
mod transition;

pub use container::Evergrid;
pub use error::EvergridError;
pub use event::{EvergridEvent, EvergridEvents};
pub use frame::{FrameUpdate, ItemView, SlotChange};
pub use options::EvergridOptions;
pub use scroll::ScrollAlign;
pub use snap::{SnapFn, SnapQuery, SnapTarget};

pub use evergrid_gesture::{GestureConfig, PointerId, ScrollAxes};
pub use evergrid_recycler::{SlotId, SlotKey, SourceId};
pub use evergrid_value::{
    AnimatedValue, Animation, DecaySpec, Easing, Observable, SpringSpec, TimingSpec, ValueHandle,
};
pub use evergrid_view::{ClampMode, Viewport};

/// Layout sources and their building blocks.
pub mod layout {
    pub use evergrid_layout::*;
}

pub use evergrid_layout::{ItemIndex, LayoutSource};
