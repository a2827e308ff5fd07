// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::types::ItemIndex;

/// Errors reported by layout sources.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// The source computes its items from closures and cannot apply list edits.
    #[error("layout source does not support list edits")]
    EditUnsupported,
    /// A list edit addressed indices outside the source's current length.
    #[error("list edit at {index} (count {count}) is out of range for length {len}")]
    EditOutOfRange {
        /// First index of the edit.
        index: i64,
        /// Number of items inserted or removed.
        count: usize,
        /// Source length before the edit.
        len: usize,
    },
    /// The index has the wrong shape for the source, or lies outside its bounds.
    #[error("index {0} is not valid for this layout source")]
    InvalidIndex(ItemIndex),
}
