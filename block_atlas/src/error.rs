// Copyright 2025 the Block Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

/// Errors that can occur when releasing blocks.
///
/// A request that does not fit is not an error: [`alloc`](crate::BlockAllocator::alloc)
/// returns `None` and the caller moves on to another atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BlockError {
    /// No live block has the given origin.
    ///
    /// The block was already freed, belongs to a different allocator, or the handle is corrupt.
    #[error("Tried to free an invalid block at ({left}, {top})")]
    InvalidFree {
        /// Left edge of the rejected origin.
        left: u32,
        /// Top edge of the rejected origin.
        top: u32,
    },
}
