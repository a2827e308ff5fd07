// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame output of the container.

use alloc::vec::Vec;

use evergrid_layout::ReuseId;
use evergrid_recycler::{SlotId, SlotKey};
use kurbo::{Point, Rect, Size, Vec2};

/// One step the host applies to its item views.
///
/// [`FrameUpdate::changes`] lists these in a fixed order: all `Hide`s, then
/// `Destroy`, `Create`, `Rebind`, `Show`, and finally `Render`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotChange {
    /// Hide the view; it stays pooled for reuse.
    Hide {
        /// The hidden slot.
        slot: SlotId,
        /// The binding it no longer shows.
        key: SlotKey,
    },
    /// Drop the view; the slot id is dead from now on.
    Destroy {
        /// The destroyed slot.
        slot: SlotId,
    },
    /// Create a view for a new slot.
    Create {
        /// The new slot.
        slot: SlotId,
        /// Its first binding.
        key: SlotKey,
        /// Which kind of view to create.
        reuse_id: ReuseId,
    },
    /// The view now shows a different item.
    Rebind {
        /// The recycled slot.
        slot: SlotId,
        /// Its previous binding, if it ever had one.
        from: Option<SlotKey>,
        /// Its new binding.
        to: SlotKey,
    },
    /// Show a previously hidden view.
    Show {
        /// The revived slot.
        slot: SlotId,
    },
    /// Render the item content for the slot's binding.
    Render {
        /// The slot to render.
        slot: SlotId,
        /// What to render into it.
        key: SlotKey,
    },
}

/// A live item view and where to place it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemView {
    /// The view's slot.
    pub slot: SlotId,
    /// What the view shows.
    pub key: SlotKey,
    /// The view's kind.
    pub reuse_id: ReuseId,
    /// Frame in container pixels.
    pub frame: Rect,
    /// `true` while the frame is animating towards its layout position.
    pub transitioning: bool,
}

/// Everything that changed in one [`Evergrid::update`](crate::Evergrid::update).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameUpdate {
    /// Ordered slot changes to apply before laying out [`items`](Self::items).
    pub changes: Vec<SlotChange>,
    /// Every bound item view, ordered by key.
    pub items: Vec<ItemView>,
    /// The new container size, when it changed since the previous update
    /// (and on the first update).
    pub viewport_size: Option<Size>,
    /// Content point under the anchor.
    pub offset: Point,
    /// Pixels per content unit.
    pub scale: Vec2,
    /// `true` if something is still animating; schedule another update.
    pub animating: bool,
}

impl FrameUpdate {
    /// The item view for `slot`, if it is bound.
    #[must_use]
    pub fn item(&self, slot: SlotId) -> Option<&ItemView> {
        self.items.iter().find(|item| item.slot == slot)
    }

    /// The item view showing `key`, if any.
    #[must_use]
    pub fn item_for(&self, key: SlotKey) -> Option<&ItemView> {
        self.items
            .binary_search_by(|item| item.key.cmp(&key))
            .ok()
            .map(|i| &self.items[i])
    }

    /// Slots whose content must be rendered this frame.
    pub fn renders(&self) -> impl Iterator<Item = (SlotId, SlotKey)> + '_ {
        self.changes.iter().filter_map(|change| match *change {
            SlotChange::Render { slot, key } => Some((slot, key)),
            _ => None,
        })
    }
}
