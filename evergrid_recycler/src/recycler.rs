// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The slot pool and its diff step.

use alloc::collections::{BTreeMap, VecDeque};
use alloc::vec::Vec;
use core::fmt;

use evergrid_layout::{ItemIndex, ReuseId};
use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::types::{Slot, SlotId, SlotKey, SourceId};

/// Default number of hidden slots kept per reuse id.
pub const DEFAULT_MAX_SPARE_PER_REUSE: usize = 16;

/// A slot moved from one binding to another.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rebind {
    /// The recycled slot.
    pub slot: SlotId,
    /// The binding the slot last showed; `None` only for a spare that was never bound.
    pub from: Option<SlotKey>,
    /// The new binding.
    pub to: SlotKey,
    /// `true` if the slot was a hidden spare and must be shown again.
    pub revived: bool,
}

/// The outcome of one [`Recycler::reconcile`] call.
///
/// Lists are built in a deterministic order (by reuse id, then [`SlotKey`]),
/// so identical inputs always yield identical diffs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecycleDiff {
    /// Newly allocated slots and their bindings; these always need rendering.
    pub created: Vec<(SlotId, SlotKey)>,
    /// Existing slots that now show a different binding.
    pub rebound: Vec<Rebind>,
    /// Slots whose binding did not change.
    pub kept: Vec<(SlotId, SlotKey)>,
    /// Slots that were unbound and parked as spares, with the binding they lost.
    pub hidden: Vec<(SlotId, SlotKey)>,
    /// Spare slots dropped because their pool was over capacity.
    pub destroyed: Vec<SlotId>,
}

impl RecycleDiff {
    /// `true` if no slot was created, rebound, hidden, or destroyed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.rebound.is_empty()
            && self.hidden.is_empty()
            && self.destroyed.is_empty()
    }
}

/// A pool of item view slots keyed by reuse id.
///
/// The recycler maintains a one-to-one mapping between live bindings
/// ([`SlotKey`]s) and bound slots. [`reconcile`](Self::reconcile) moves from
/// the current mapping to the desired one in a single step: it computes the
/// complete new mapping before publishing it, so no observer ever sees a key
/// with two slots or a slot with two keys.
///
/// Slots are only reused within their [`ReuseId`]. Slots released in the same
/// pass are reused first, then pooled spares; new slots are created last.
///
/// ```rust
/// use evergrid_layout::{ItemIndex, ReuseId};
/// use evergrid_recycler::{Recycler, SlotKey, SourceId};
///
/// let photos = SourceId::new(0);
/// let key = |i| (SlotKey::new(photos, ItemIndex::Linear(i)), ReuseId("photo"));
///
/// let mut recycler = Recycler::new();
/// let first = recycler.reconcile([key(0), key(1)]);
/// assert_eq!(first.created.len(), 2);
///
/// // Scroll by one: item 0 leaves, item 2 arrives and takes over its slot.
/// let second = recycler.reconcile([key(1), key(2)]);
/// assert!(second.created.is_empty());
/// assert_eq!(second.rebound.len(), 1);
/// assert_eq!(second.rebound[0].slot, first.created[0].0);
/// ```
pub struct Recycler {
    slots: Vec<Option<Slot>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    bound: HashMap<SlotKey, SlotId>,
    spares: HashMap<ReuseId, SmallVec<[SlotId; 4]>>,
    max_spare_per_reuse: usize,
}

impl fmt::Debug for Recycler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let live = self.slots.iter().filter(|s| s.is_some()).count();
        let spare: usize = self.spares.values().map(SmallVec::len).sum();
        f.debug_struct("Recycler")
            .field("slots_live", &live)
            .field("slots_bound", &self.bound.len())
            .field("slots_spare", &spare)
            .field("free_list", &self.free_list.len())
            .field("max_spare_per_reuse", &self.max_spare_per_reuse)
            .finish_non_exhaustive()
    }
}

impl Default for Recycler {
    fn default() -> Self {
        Self::new()
    }
}

impl Recycler {
    /// Creates an empty recycler keeping up to [`DEFAULT_MAX_SPARE_PER_REUSE`] spares per reuse id.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_spare_per_reuse(DEFAULT_MAX_SPARE_PER_REUSE)
    }

    /// Creates an empty recycler with the given spare capacity per reuse id.
    #[must_use]
    pub fn with_max_spare_per_reuse(max: usize) -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            bound: HashMap::new(),
            spares: HashMap::new(),
            max_spare_per_reuse: max,
        }
    }

    /// Spare capacity per reuse id.
    #[must_use]
    pub const fn max_spare_per_reuse(&self) -> usize {
        self.max_spare_per_reuse
    }

    /// Changes the spare capacity, destroying spares over the new limit.
    pub fn set_max_spare_per_reuse(&mut self, max: usize) -> Vec<SlotId> {
        self.max_spare_per_reuse = max;
        let mut destroyed = Vec::new();
        self.trim_spares(&mut destroyed);
        destroyed
    }

    /// Returns `true` if `id` refers to a live slot.
    #[must_use]
    pub fn is_alive(&self, id: SlotId) -> bool {
        self.slot(id).is_some()
    }

    /// The slot behind `id`, if it is live.
    #[must_use]
    pub fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.slots
            .get(id.idx())
            .and_then(Option::as_ref)
            .filter(|s| s.generation == id.1)
    }

    fn slot_mut(&mut self, id: SlotId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.idx())
            .and_then(Option::as_mut)
            .filter(|s| s.generation == id.1)
    }

    /// The slot bound to `key`, if any.
    #[must_use]
    pub fn slot_for(&self, key: SlotKey) -> Option<SlotId> {
        self.bound.get(&key).copied()
    }

    /// Number of live slots, bound or spare.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    /// `true` if there are no live slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of bound slots.
    #[must_use]
    pub fn bound_len(&self) -> usize {
        self.bound.len()
    }

    /// Number of hidden spares for `reuse_id`.
    #[must_use]
    pub fn spare_count(&self, reuse_id: ReuseId) -> usize {
        self.spares.get(&reuse_id).map_or(0, SmallVec::len)
    }

    /// All bindings, ordered by key.
    #[must_use]
    pub fn bindings(&self) -> Vec<(SlotKey, SlotId)> {
        let mut out: Vec<_> = self.bound.iter().map(|(k, id)| (*k, *id)).collect();
        out.sort_unstable();
        out
    }

    /// Brings the bindings in line with `desired`.
    ///
    /// `desired` lists every binding that should have a slot after this call,
    /// with the reuse id of its source. Duplicate keys keep their first reuse id.
    pub fn reconcile(
        &mut self,
        desired: impl IntoIterator<Item = (SlotKey, ReuseId)>,
    ) -> RecycleDiff {
        let mut wanted: BTreeMap<SlotKey, ReuseId> = BTreeMap::new();
        for (key, reuse_id) in desired {
            wanted.entry(key).or_insert(reuse_id);
        }

        let mut diff = RecycleDiff::default();
        let mut next: HashMap<SlotKey, SlotId> = HashMap::with_capacity(wanted.len());
        let mut released: BTreeMap<ReuseId, VecDeque<(SlotId, SlotKey)>> = BTreeMap::new();

        for (key, id) in self.bindings() {
            let Some(reuse_id) = self.slot(id).map(Slot::reuse_id) else {
                debug_assert!(false, "recycler invariant violated: {key} bound to dead slot");
                continue;
            };
            if wanted.get(&key) == Some(&reuse_id) {
                next.insert(key, id);
                diff.kept.push((id, key));
            } else {
                released.entry(reuse_id).or_default().push_back((id, key));
            }
        }

        for (&key, &reuse_id) in &wanted {
            if next.contains_key(&key) {
                continue;
            }
            let recycled = released
                .get_mut(&reuse_id)
                .and_then(VecDeque::pop_front)
                .map(|(id, from)| (id, Some(from), false))
                .or_else(|| {
                    let id = self.spares.get_mut(&reuse_id)?.pop()?;
                    Some((id, self.slot(id).and_then(Slot::last_key), true))
                });
            let id = match recycled {
                Some((id, from, revived)) => {
                    diff.rebound.push(Rebind {
                        slot: id,
                        from,
                        to: key,
                        revived,
                    });
                    id
                }
                None => {
                    let id = self.allocate(reuse_id);
                    diff.created.push((id, key));
                    id
                }
            };
            if let Some(slot) = self.slot_mut(id) {
                let fresh = slot.key.is_none() && slot.last_key.is_none();
                slot.key = Some(key);
                slot.last_key = Some(key);
                slot.needs_render = fresh;
            }
            next.insert(key, id);
        }

        for (reuse_id, rest) in released {
            for (id, key) in rest {
                self.park(id, reuse_id);
                diff.hidden.push((id, key));
            }
        }

        self.trim_spares(&mut diff.destroyed);
        self.bound = next;

        if !diff.is_empty() {
            tracing::debug!(
                created = diff.created.len(),
                rebound = diff.rebound.len(),
                kept = diff.kept.len(),
                hidden = diff.hidden.len(),
                destroyed = diff.destroyed.len(),
                "reconciled item slots"
            );
        }
        diff
    }

    /// Rewrites the indices of every binding of `source` through `f`.
    ///
    /// Bindings for which `f` returns `None`, or whose new key is already
    /// taken, lose their slot: the slot is parked as a spare and returned
    /// along with the key it lost. Use this to follow insertions and removals
    /// without re-rendering the items that merely moved.
    pub fn remap(
        &mut self,
        source: SourceId,
        mut f: impl FnMut(ItemIndex) -> Option<ItemIndex>,
    ) -> Vec<(SlotId, SlotKey)> {
        let affected: Vec<(SlotKey, SlotId)> = self
            .bindings()
            .into_iter()
            .filter(|(key, _)| key.source == source)
            .collect();
        for (key, _) in &affected {
            self.bound.remove(key);
        }

        let mut lost = Vec::new();
        for (old, id) in affected {
            let new = f(old.index).map(|index| SlotKey::new(source, index));
            match new {
                Some(new) if !self.bound.contains_key(&new) => {
                    self.bound.insert(new, id);
                    if let Some(slot) = self.slot_mut(id) {
                        slot.key = Some(new);
                        slot.last_key = Some(new);
                    }
                }
                _ => {
                    if let Some(reuse_id) = self.slot(id).map(Slot::reuse_id) {
                        self.park(id, reuse_id);
                    }
                    lost.push((id, old));
                }
            }
        }
        if !lost.is_empty() {
            tracing::trace!(source = source.get(), lost = lost.len(), "remapped item slots");
        }
        lost
    }

    /// Flags the slot bound to `key` for rendering. Returns `false` if `key` has no slot.
    pub fn mark_needs_render(&mut self, key: SlotKey) -> bool {
        match self.slot_for(key) {
            Some(id) => self.mark_slot_needs_render(id),
            None => false,
        }
    }

    /// Flags a bound slot for rendering. Returns `false` for spares and dead ids.
    pub fn mark_slot_needs_render(&mut self, id: SlotId) -> bool {
        match self.slot_mut(id) {
            Some(slot) if slot.key.is_some() => {
                slot.needs_render = true;
                true
            }
            _ => false,
        }
    }

    /// Flags every bound slot of `source` for rendering.
    pub fn mark_source_needs_render(&mut self, source: SourceId) {
        let ids: SmallVec<[SlotId; 32]> = self
            .bound
            .iter()
            .filter(|(key, _)| key.source == source)
            .map(|(_, id)| *id)
            .collect();
        for id in ids {
            self.mark_slot_needs_render(id);
        }
    }

    /// Returns the slots flagged for rendering, ordered by key, and clears the flags.
    pub fn take_needs_render(&mut self) -> Vec<(SlotId, SlotKey)> {
        let mut out = Vec::new();
        for (key, id) in self.bindings() {
            if let Some(slot) = self.slot_mut(id) {
                if slot.needs_render {
                    slot.needs_render = false;
                    out.push((id, key));
                }
            }
        }
        out
    }

    /// Destroys every slot. Returns the destroyed ids in slot order.
    pub fn clear(&mut self) -> Vec<SlotId> {
        let mut destroyed: Vec<SlotId> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(idx, s)| {
                let s = s.as_ref()?;
                Some(SlotId::new(u32::try_from(idx).ok()?, s.generation))
            })
            .collect();
        destroyed.sort_unstable();
        for id in &destroyed {
            self.destroy(*id);
        }
        self.bound.clear();
        self.spares.clear();
        destroyed
    }

    fn allocate(&mut self, reuse_id: ReuseId) -> SlotId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(Slot::new(generation, reuse_id));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.slots.push(Some(Slot::new(generation, reuse_id)));
            self.generations.push(generation);
            (self.slots.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "SlotId uses 32-bit indices; a container never holds 2^32 item views."
        )]
        let id = SlotId::new(idx as u32, generation);
        tracing::trace!(slot = ?id, reuse_id = reuse_id.0, "created item slot");
        id
    }

    fn park(&mut self, id: SlotId, reuse_id: ReuseId) {
        if let Some(slot) = self.slot_mut(id) {
            slot.key = None;
            slot.needs_render = false;
            self.spares.entry(reuse_id).or_default().push(id);
        }
    }

    fn destroy(&mut self, id: SlotId) {
        if self.slot(id).is_some() {
            self.slots[id.idx()] = None;
            self.free_list.push(id.idx());
        }
    }

    fn trim_spares(&mut self, destroyed: &mut Vec<SlotId>) {
        let max = self.max_spare_per_reuse;
        let mut excess: Vec<SlotId> = Vec::new();
        for pool in self.spares.values_mut() {
            if pool.len() > max {
                let extra = pool.len() - max;
                // Oldest spares go first; the newest are reused next.
                excess.extend(pool.drain(..extra));
            }
        }
        excess.sort_unstable();
        for id in excess {
            self.destroy(id);
            destroyed.push(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Rebind, Recycler};
    use crate::types::{SlotKey, SourceId};
    use alloc::vec::Vec;
    use evergrid_layout::{ItemIndex, ReuseId};

    const A: SourceId = SourceId::new(0);
    const B: SourceId = SourceId::new(1);

    fn want(
        source: SourceId,
        reuse: &'static str,
        range: core::ops::Range<i64>,
    ) -> Vec<(SlotKey, ReuseId)> {
        range
            .map(|i| (SlotKey::new(source, ItemIndex::Linear(i)), ReuseId(reuse)))
            .collect()
    }

    fn key(source: SourceId, i: i64) -> SlotKey {
        SlotKey::new(source, ItemIndex::Linear(i))
    }

    #[test]
    fn bindings_stay_one_to_one() {
        let mut r = Recycler::new();
        r.reconcile(want(A, "cell", 0..5));
        let diff = r.reconcile(want(A, "cell", 3..9));
        assert_eq!(diff.kept.len(), 2);
        assert_eq!(diff.rebound.len(), 3);
        assert_eq!(diff.created.len(), 1);
        assert!(diff.hidden.is_empty());

        let bindings = r.bindings();
        assert_eq!(bindings.len(), 6);
        let mut ids: Vec<_> = bindings.iter().map(|(_, id)| *id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 6, "a slot is bound twice");
        for (k, id) in bindings {
            assert_eq!(r.slot(id).and_then(|s| s.key()), Some(k));
        }
    }

    #[test]
    fn reuse_never_crosses_reuse_ids() {
        let mut r = Recycler::new();
        r.reconcile(want(A, "photo", 0..3));
        let diff = r.reconcile(want(B, "label", 0..3));
        assert_eq!(diff.created.len(), 3);
        assert_eq!(diff.hidden.len(), 3);
        assert!(diff.rebound.is_empty());
        assert_eq!(r.spare_count(ReuseId("photo")), 3);
        assert_eq!(r.len(), 6);
    }

    #[test]
    fn released_slots_are_preferred_over_spares() {
        let mut r = Recycler::new();
        r.reconcile(want(A, "cell", 0..2));
        let parked = r.reconcile(want(A, "cell", 0..1));
        assert_eq!(parked.hidden.len(), 1);
        assert_eq!(parked.hidden[0].1, key(A, 1));
        let spare = parked.hidden[0].0;

        // Item 0 leaves and item 5 arrives: 0's slot is reused, the spare is not.
        let released = r.slot_for(key(A, 0)).unwrap();
        let diff = r.reconcile(want(A, "cell", 5..6));
        assert_eq!(
            diff.rebound,
            [Rebind {
                slot: released,
                from: Some(key(A, 0)),
                to: key(A, 5),
                revived: false,
            }]
        );
        assert_eq!(r.slot_for(key(A, 5)), Some(released));
        assert!(r.slot(spare).is_some_and(|s| s.key().is_none()));

        // A second arrival picks the spare and reports what it last showed.
        let diff = r.reconcile(want(A, "cell", 5..7));
        assert_eq!(
            diff.rebound,
            [Rebind {
                slot: spare,
                from: Some(key(A, 1)),
                to: key(A, 6),
                revived: true,
            }]
        );
    }

    #[test]
    fn pool_shrinks_to_capacity() {
        let mut r = Recycler::with_max_spare_per_reuse(2);
        r.reconcile(want(A, "cell", 0..5));
        let diff = r.reconcile(Vec::new());
        assert_eq!(diff.hidden.len(), 5);
        assert_eq!(diff.destroyed.len(), 3);
        assert_eq!(r.spare_count(ReuseId("cell")), 2);
        assert_eq!(r.len(), 2);
        for id in &diff.destroyed {
            assert!(!r.is_alive(*id));
        }

        let destroyed = r.set_max_spare_per_reuse(0);
        assert_eq!(destroyed.len(), 2);
        assert!(r.is_empty());
    }

    #[test]
    fn dead_ids_do_not_resurrect() {
        let mut r = Recycler::with_max_spare_per_reuse(0);
        let first = r.reconcile(want(A, "cell", 0..1)).created[0].0;
        r.reconcile(Vec::new());
        let second = r.reconcile(want(A, "cell", 0..1)).created[0].0;
        assert_eq!(first.index(), second.index());
        assert_ne!(first, second);
        assert!(!r.is_alive(first));
        assert!(r.is_alive(second));
    }

    #[test]
    fn created_slots_need_render_and_flags_clear() {
        let mut r = Recycler::new();
        r.reconcile(want(A, "cell", 0..3));
        assert_eq!(r.take_needs_render().len(), 3);
        assert!(r.take_needs_render().is_empty());

        assert!(r.mark_needs_render(key(A, 1)));
        assert!(!r.mark_needs_render(key(A, 9)));
        let pending = r.take_needs_render();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].1, key(A, 1));

        r.mark_source_needs_render(A);
        assert_eq!(r.take_needs_render().len(), 3);
    }

    #[test]
    fn remap_follows_insertions_and_removals() {
        let mut r = Recycler::new();
        let mut desired = want(A, "row", 0..4);
        desired.extend(want(B, "row", 0..1));
        r.reconcile(desired);
        r.take_needs_render();
        let s1 = r.slot_for(key(A, 1)).unwrap();
        let s2 = r.slot_for(key(A, 2)).unwrap();

        // Remove item 1: 2 and 3 shift down, 1 loses its slot.
        let lost = r.remap(A, |i| match i {
            ItemIndex::Linear(1) => None,
            ItemIndex::Linear(i) if i > 1 => Some(ItemIndex::Linear(i - 1)),
            other => Some(other),
        });
        assert_eq!(lost, [(s1, key(A, 1))]);
        assert_eq!(r.slot_for(key(A, 1)), Some(s2));
        assert_eq!(r.slot_for(key(A, 3)), None);
        assert!(r.slot_for(key(B, 0)).is_some(), "other sources are untouched");
        assert_eq!(r.spare_count(ReuseId("row")), 1);

        // Insert at 0: everything shifts up without rebinding.
        let lost = r.remap(A, |i| i.linear().map(|i| ItemIndex::Linear(i + 1)));
        assert!(lost.is_empty());
        assert_eq!(r.slot_for(key(A, 2)), Some(s2));
        assert!(r.take_needs_render().is_empty(), "moved items must not re-render");
    }

    #[test]
    fn clear_destroys_everything() {
        let mut r = Recycler::new();
        r.reconcile(want(A, "cell", 0..3));
        r.reconcile(want(A, "cell", 0..1));
        assert_eq!(r.clear().len(), 3);
        assert!(r.is_empty());
        assert_eq!(r.bound_len(), 0);
    }
}
