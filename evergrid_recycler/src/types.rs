// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identifiers for sources, bindings, and slots.

use core::fmt;

use evergrid_layout::{ItemIndex, ReuseId};

/// Identifier of a layout source within one container.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u32);

impl SourceId {
    /// Wraps a raw source number.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw source number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// What a slot is bound to: one index of one source.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    /// The owning source.
    pub source: SourceId,
    /// The item index within the source.
    pub index: ItemIndex,
}

impl SlotKey {
    /// Creates a key.
    #[must_use]
    pub const fn new(source: SourceId, index: ItemIndex) -> Self {
        Self { source, index }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source.0, self.index)
    }
}

/// Identifier for an item view slot (generational).
///
/// A destroyed slot's id never becomes live again, even if its storage is reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub(crate) u32, pub(crate) u32);

impl SlotId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Storage index; stable for the lifetime of the slot.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Generation of the storage index when the slot was created.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.1
    }
}

/// A pooled item view.
#[derive(Clone, Debug)]
pub struct Slot {
    pub(crate) generation: u32,
    pub(crate) reuse_id: ReuseId,
    pub(crate) key: Option<SlotKey>,
    pub(crate) last_key: Option<SlotKey>,
    pub(crate) needs_render: bool,
}

impl Slot {
    pub(crate) const fn new(generation: u32, reuse_id: ReuseId) -> Self {
        Self {
            generation,
            reuse_id,
            key: None,
            last_key: None,
            needs_render: false,
        }
    }

    /// Recycling category; fixed for the slot's lifetime.
    #[must_use]
    pub const fn reuse_id(&self) -> ReuseId {
        self.reuse_id
    }

    /// The current binding, or `None` while the slot is a hidden spare.
    #[must_use]
    pub const fn key(&self) -> Option<SlotKey> {
        self.key
    }

    /// The most recent binding, kept while the slot is a spare.
    #[must_use]
    pub const fn last_key(&self) -> Option<SlotKey> {
        self.last_key
    }

    /// Whether the host must render this slot's content for its binding.
    #[must_use]
    pub const fn needs_render(&self) -> bool {
        self.needs_render
    }
}
