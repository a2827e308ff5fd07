// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Evergrid Recycler: a reuse-keyed pool of item view slots.
//!
//! A virtualized container shows a small window onto a large (or infinite)
//! set of items. Creating a host view per item is too expensive, so views are
//! kept in *slots* that are rebound to whichever items are currently visible.
//! This crate owns that bookkeeping:
//!
//! - [`SlotId`]: a generational handle to one host view.
//! - [`SlotKey`]: what a slot shows, a `(source, index)` pair.
//! - [`Recycler::reconcile`]: moves from the current bindings to a desired set
//!   in one atomic step and reports the [`RecycleDiff`] (created, rebound,
//!   kept, hidden, destroyed).
//! - [`Recycler::remap`]: follows list insertions and removals without
//!   re-rendering items that merely moved.
//! - Render flags: slots that must (re)render their content.
//!
//! Slots only ever move between items with the same
//! [`ReuseId`](evergrid_layout::ReuseId), and each item key is bound to at most
//! one slot.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod recycler;
mod types;

pub use recycler::{DEFAULT_MAX_SPARE_PER_REUSE, Rebind, RecycleDiff, Recycler};
pub use types::{Slot, SlotId, SlotKey, SourceId};
