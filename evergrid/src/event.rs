// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Events reported to the host while handling pointer input.

use evergrid_gesture::PointerId;
use evergrid_recycler::SlotKey;
use kurbo::Point;
use smallvec::SmallVec;

/// Something the host may want to react to.
///
/// Positions are in container pixels; locations are in content units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EvergridEvent {
    /// A quick press and release without panning.
    Tap {
        /// Release position.
        position: Point,
        /// Content point under the release position.
        location: Point,
        /// Top-most visible item under the release position.
        item: Option<SlotKey>,
    },
    /// A press held without panning.
    LongPress {
        /// Press position.
        position: Point,
        /// Content point under the press position.
        location: Point,
        /// Top-most visible item under the press position.
        item: Option<SlotKey>,
    },
    /// A pointer moved while the host owns the sequence.
    CustomMove {
        /// The pointer that moved.
        pointer: PointerId,
        /// Its position.
        position: Point,
    },
    /// The last pointer lifted.
    SequenceEnd,
}

/// Events produced by a single input call.
pub type EvergridEvents = SmallVec<[EvergridEvent; 2]>;
