// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Evergrid Layout: pluggable layout sources for a virtualized 2D container.
//!
//! A [`LayoutSource`] places items in content space and reports which of them
//! intersect a query rect. The container asks every source for its visible
//! [`IndexSet`] each frame and realizes only those items. This crate provides:
//!
//! - [`GridLayoutSource`]: a uniform grid, infinite unless bounded.
//! - [`FlatLayoutSource`]: a 1D sequence along an [`Axis`], optionally pinned to
//!   a container [`Edge`] (axis labels, grid lines) and editable with [`ListEdit`]s.
//! - [`CustomLayoutSource`]: arbitrary placement from caller closures.
//!
//! All sources share [`LayoutProps`]: a [`ReuseId`] for recycling, an item size
//! that can be a shared [`ValueHandle`](evergrid_value::ValueHandle), an origin,
//! a fractional item origin, visibility insets, a sticky edge, per-item
//! [`ViewLayout`] overrides, and a [`RenderPolicy`].
//!
//! Sources describe geometry in source-local coordinates. The free functions
//! [`item_frame`], [`visible_set`], [`location_at`], and [`visible_item_at`]
//! combine a source with an [`evergrid_view::Viewport`] to get container
//! pixels, so sources stay independent of scrolling and zoom.
//!
//! ## Example
//!
//! ```rust
//! use evergrid_layout::{item_frame, visible_set, GridLayoutSource, ItemIndex, LayoutProps, ReuseId};
//! use evergrid_view::Viewport;
//! use kurbo::{Point, Rect, Size, Vec2};
//!
//! let grid = GridLayoutSource::new(
//!     LayoutProps::new(ReuseId("photo")).with_item_size(Vec2::new(100.0, 100.0)),
//! );
//! let mut view = Viewport::new(Size::new(250.0, 100.0));
//! view.set_offset(Point::new(50.0, 0.0));
//!
//! // Columns 0 through 2 are (partly) on screen.
//! assert_eq!(visible_set(&grid, &view).len(), 3);
//! assert_eq!(
//!     item_frame(&grid, ItemIndex::Grid { x: 0, y: 0 }, &view),
//!     Some(Rect::new(-50.0, 0.0, 50.0, 100.0)),
//! );
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("evergrid_layout requires either the `std` or `libm` feature");

mod custom;
mod error;
mod flat;
mod grid;
mod props;
mod source;
mod span;
mod types;
mod util;

pub use custom::{CustomItemLayout, CustomLayoutSource};
pub use error::LayoutError;
pub use flat::FlatLayoutSource;
pub use grid::GridLayoutSource;
pub use props::{Dimension, LayoutProps, RenderPolicy, RenderPredicate, ViewLayout, ViewLayoutFn};
pub use source::{
    LayoutSource, ListEdit, item_content_rect, item_frame, location_at, visible_item_at,
    visible_query, visible_set,
};
pub use span::{MAX_SPAN_LEN, MAX_VISIBLE_CELLS, cell_at, visible_span};
pub use types::{
    Axis, Edge, IndexBounds, IndexSet, ItemIndex, ReuseId, Rounding, linear_indices,
};
