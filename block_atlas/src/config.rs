// Copyright 2025 the Block Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Default horizontal distance between candidate origins of the grid search.
pub(crate) const DEFAULT_STEP_X: u32 = 8;
/// Default vertical distance between candidate origins of the grid search.
pub(crate) const DEFAULT_STEP_Y: u32 = 16;

/// Options controlling how a [`BlockAllocator`](crate::BlockAllocator) searches for free space.
///
/// Larger steps make failed and late searches cheaper but leave more gaps between blocks. The
/// gaps are partly recovered by sliding each placement up and then left, one pixel at a time.
///
/// The defaults match the packing layout of existing atlases built with 8×16 steps; changing
/// them changes where blocks end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatorOptions {
    /// Horizontal distance between candidate origins. Must be positive.
    pub step_x: u32,
    /// Vertical distance between candidate origins. Must be positive.
    pub step_y: u32,
}

impl Default for AllocatorOptions {
    fn default() -> Self {
        Self {
            step_x: DEFAULT_STEP_X,
            step_y: DEFAULT_STEP_Y,
        }
    }
}
