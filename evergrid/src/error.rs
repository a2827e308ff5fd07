// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use evergrid_layout::{ItemIndex, LayoutError};
use evergrid_recycler::SourceId;

/// Errors reported by [`Evergrid`](crate::Evergrid) operations.
#[derive(Clone, Debug, PartialEq)]
pub enum EvergridError {
    /// No source with this id was added, or it has been removed.
    UnknownSource(SourceId),
    /// The source does not place an item at this index.
    UnknownItem {
        /// The source that was asked.
        source: SourceId,
        /// The missing index.
        index: ItemIndex,
    },
    /// A scale component was zero or not finite.
    InvalidScale {
        /// Requested horizontal scale.
        x: f64,
        /// Requested vertical scale.
        y: f64,
    },
    /// The layout source rejected the operation.
    Layout(LayoutError),
}

// Implemented by hand rather than with `thiserror::Error`: thiserror treats any
// field named `source` as the error cause, which `SourceId` is not.
impl core::fmt::Display for EvergridError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownSource(id) => write!(f, "unknown layout source {}", id.get()),
            Self::UnknownItem { source, index } => {
                write!(f, "source {} has no item at {index}", source.get())
            }
            Self::InvalidScale { x, y } => write!(
                f,
                "scale must be finite and non-zero on both axes; got ({x}, {y})"
            ),
            Self::Layout(err) => core::fmt::Display::fmt(err, f),
        }
    }
}

impl core::error::Error for EvergridError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Layout(err) => core::error::Error::source(err),
            _ => None,
        }
    }
}

impl From<LayoutError> for EvergridError {
    fn from(source: LayoutError) -> Self {
        Self::Layout(source)
    }
}
