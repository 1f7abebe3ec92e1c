// Copyright 2025 the Block Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

/// A rectangular region placed on an atlas surface.
///
/// Coordinates are in pixels relative to the top-left corner of the surface. The column at
/// [`right`](Self::right) and the row at [`bottom`](Self::bottom) lie outside the block.
///
/// A block is a plain value: the allocator keeps its own record of every live block, and the
/// `(left, top)` origin is the handle passed back to [`free`](crate::BlockAllocator::free).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Block {
    /// Offset of the left edge from the left of the surface.
    pub left: u32,
    /// Offset of the top edge from the top of the surface.
    pub top: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Block {
    /// Create a block from its origin and size.
    pub const fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// The first column past the right edge.
    ///
    /// Widened to `u64` so blocks near `u32::MAX` cannot overflow.
    pub const fn right(&self) -> u64 {
        self.left as u64 + self.width as u64
    }

    /// The first row past the bottom edge.
    pub const fn bottom(&self) -> u64 {
        self.top as u64 + self.height as u64
    }

    /// The `(left, top)` origin identifying this block.
    pub const fn origin(&self) -> (u32, u32) {
        (self.left, self.top)
    }

    /// Area in pixels.
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Whether the interiors of the two blocks overlap.
    ///
    /// Blocks that only share an edge do not intersect.
    pub const fn intersects(&self, other: &Self) -> bool {
        (self.left as u64) < other.right()
            && (other.left as u64) < self.right()
            && (self.top as u64) < other.bottom()
            && (other.top as u64) < self.bottom()
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}@({}, {})",
            self.width, self.height, self.left, self.top
        )
    }
}
