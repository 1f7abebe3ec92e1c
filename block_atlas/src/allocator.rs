// Copyright 2025 the Block Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The grid-search block allocator.

use log::{debug, trace, warn};

use crate::{AllocatorOptions, Block, BlockError};

/// Packs rectangles onto a single fixed-size surface.
///
/// Placement tries, in order:
///
/// 1. the origin of the most recently placed block (the hint), which keeps sequential packing
///    close to constant time;
/// 2. every origin of a coarse grid, row by row, taking the first free one and sliding it up
///    and then left as far as it stays free.
///
/// When the grid search comes up empty, the failed size is remembered as a pessimism bound:
/// later requests exceeding it in *both* dimensions fail immediately, until the next free.
///
/// Blocks are never moved, merged or split once placed.
pub struct BlockAllocator {
    width: u32,
    height: u32,
    options: AllocatorOptions,
    /// Live blocks, in no particular order.
    blocks: Vec<Block>,
    first_x: u32,
    first_y: u32,
    max_w: u32,
    max_h: u32,
}

impl BlockAllocator {
    /// Create an allocator for an empty `width`×`height` surface using the default search grid.
    ///
    /// # Panics
    ///
    /// If either dimension is zero.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_options(width, height, AllocatorOptions::default())
    }

    /// Create an allocator for an empty `width`×`height` surface.
    ///
    /// # Panics
    ///
    /// If either dimension or either grid step is zero.
    pub fn with_options(width: u32, height: u32, options: AllocatorOptions) -> Self {
        assert!(width > 0, "atlas width must be positive");
        assert!(height > 0, "atlas height must be positive");
        assert!(options.step_x > 0, "horizontal grid step must be positive");
        assert!(options.step_y > 0, "vertical grid step must be positive");

        Self {
            width,
            height,
            options,
            blocks: Vec::new(),
            first_x: 0,
            first_y: 0,
            max_w: width,
            max_h: height,
        }
    }

    /// The width of the surface.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The height of the surface.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The search options this allocator was created with.
    pub fn options(&self) -> &AllocatorOptions {
        &self.options
    }

    /// Number of live blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no blocks are live.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate over the live blocks, in unspecified order.
    pub fn blocks(&self) -> impl ExactSizeIterator<Item = Block> + '_ {
        self.blocks.iter().copied()
    }

    /// Total area covered by live blocks, in pixels.
    pub fn allocated_area(&self) -> u64 {
        self.blocks.iter().map(Block::area).sum()
    }

    /// Fraction of the surface covered by live blocks (0.0 to 1.0).
    pub fn usage(&self) -> f32 {
        let total = u64::from(self.width) * u64::from(self.height);
        self.allocated_area() as f32 / total as f32
    }

    /// Whether `block` lies entirely on the surface without overlapping any live block.
    pub fn is_free(&self, block: &Block) -> bool {
        // The right-th column and the bottom-th row are outside of the block.
        if block.right() > u64::from(self.width) || block.bottom() > u64::from(self.height) {
            return false;
        }

        !self.blocks.iter().any(|live| live.intersects(block))
    }

    /// Find room for a `width`×`height` rectangle.
    ///
    /// Returns `None` if the rectangle doesn't currently fit, in which case the caller should
    /// try another atlas (or create one). Zero-sized requests never fit.
    pub fn alloc(&mut self, width: u32, height: u32) -> Option<Block> {
        if width == 0 || height == 0 {
            return None;
        }

        // The rect wouldn't even fit onto the surface.
        if width > self.width || height > self.height {
            return None;
        }

        // It could fit in theory, but an earlier search for something smaller already failed.
        if width > self.max_w && height > self.max_h {
            return None;
        }

        let hinted = Block::new(self.first_x, self.first_y, width, height);
        if self.is_free(&hinted) {
            trace!("placed {hinted} at the hint");
            self.blocks.push(hinted);
            return Some(hinted);
        }

        if let Some(block) = self.grid_search(width, height) {
            trace!("placed {block} by grid search");
            self.first_x = block.left;
            self.first_y = block.top;
            self.blocks.push(block);
            return Some(block);
        }

        // Nothing this large in both dimensions fits until something is freed.
        self.max_w = width - 1;
        self.max_h = height - 1;
        debug!(
            "no room for {width}x{height} on {}x{} atlas with {} blocks; bound now {}x{}",
            self.width,
            self.height,
            self.blocks.len(),
            self.max_w,
            self.max_h
        );
        None
    }

    /// Release the live block with origin `(left, top)`, returning it.
    ///
    /// # Panics
    ///
    /// If no live block starts at `(left, top)`. This means the caller freed a block twice,
    /// freed it on the wrong allocator, or mangled the handle; the allocator is left untouched.
    /// Use [`try_free`](Self::try_free) to handle this case without panicking.
    pub fn free(&mut self, left: u32, top: u32) -> Block {
        match self.try_free(left, top) {
            Ok(block) => block,
            Err(err) => panic!("{err}"),
        }
    }

    /// Release the live block with origin `(left, top)`, returning it.
    ///
    /// Fails with [`BlockError::InvalidFree`] if no such block is live, without changing any
    /// state.
    pub fn try_free(&mut self, left: u32, top: u32) -> Result<Block, BlockError> {
        let Some(index) = self
            .blocks
            .iter()
            .position(|block| block.origin() == (left, top))
        else {
            warn!("tried to free unknown block at ({left}, {top})");
            return Err(BlockError::InvalidFree { left, top });
        };

        let block = self.blocks.swap_remove(index);
        self.reopen(&block);
        Ok(block)
    }

    /// Drop every live block and forget all search state.
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.first_x = 0;
        self.first_y = 0;
        self.max_w = self.width;
        self.max_h = self.height;
    }

    fn grid_search(&self, width: u32, height: u32) -> Option<Block> {
        let step_x = self.options.step_x as usize;
        let step_y = self.options.step_y as usize;

        for y in (0..=self.height - height).step_by(step_y) {
            for x in (0..=self.width - width).step_by(step_x) {
                let mut block = Block::new(x, y, width, height);
                if !self.is_free(&block) {
                    continue;
                }

                // Make up for the coarse stepping.
                while block.top > 0 && self.is_free(&Block { top: block.top - 1, ..block }) {
                    block.top -= 1;
                }
                while block.left > 0 && self.is_free(&Block { left: block.left - 1, ..block }) {
                    block.left -= 1;
                }

                return Some(block);
            }
        }

        None
    }

    /// Forget the pessimism bound after `freed` was released.
    ///
    /// The freed space may join up with other free regions in ways a single block says nothing
    /// about, so the next request of any size gets a full search again.
    fn reopen(&mut self, freed: &Block) {
        if (self.max_w, self.max_h) != (self.width, self.height) {
            debug!(
                "freeing {freed} reopened bound {}x{} to {}x{}",
                self.max_w, self.max_h, self.width, self.height
            );
        }
        self.max_w = self.width;
        self.max_h = self.height;
    }
}

impl core::fmt::Debug for BlockAllocator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BlockAllocator")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("options", &self.options)
            .field("block_count", &self.blocks.len())
            .field("hint", &(self.first_x, self.first_y))
            .field("bound", &(self.max_w, self.max_h))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_allocation_placed_at_origin() {
        let mut atlas = BlockAllocator::new(256, 256);
        let block = atlas.alloc(10, 20).unwrap();
        assert_eq!(block, Block::new(0, 0, 10, 20));
        assert_eq!(atlas.len(), 1);
    }

    #[test]
    fn quadrants_fill_the_surface() {
        let mut atlas = BlockAllocator::new(64, 64);
        assert_eq!(atlas.alloc(32, 32), Some(Block::new(0, 0, 32, 32)));
        assert_eq!(atlas.alloc(32, 32), Some(Block::new(32, 0, 32, 32)));
        assert_eq!(atlas.alloc(32, 32), Some(Block::new(0, 32, 32, 32)));
        assert_eq!(atlas.alloc(32, 32), Some(Block::new(32, 32, 32, 32)));
        assert_eq!(atlas.alloc(1, 1), None);
        assert_eq!(atlas.usage(), 1.0);
    }

    #[test]
    fn too_big_never_fits() {
        let mut atlas = BlockAllocator::new(10, 10);
        assert!(atlas.alloc(11, 5).is_none());
        assert!(atlas.alloc(5, 11).is_none());
        // Oversized requests are not search failures and leave the bound alone.
        assert_eq!((atlas.max_w, atlas.max_h), (10, 10));
        assert!(atlas.alloc(10, 10).is_some());
    }

    #[test]
    fn zero_size_allocation_returns_none() {
        let mut atlas = BlockAllocator::new(64, 64);
        assert!(atlas.alloc(0, 10).is_none());
        assert!(atlas.alloc(10, 0).is_none());
        assert!(atlas.is_empty());
        assert_eq!((atlas.max_w, atlas.max_h), (64, 64));
    }

    #[test]
    fn exact_fit_succeeds() {
        let mut atlas = BlockAllocator::new(100, 100);
        assert_eq!(atlas.alloc(100, 100), Some(Block::new(0, 0, 100, 100)));
        assert!(atlas.alloc(1, 1).is_none());
    }

    #[test]
    fn placement_slides_left_past_grid() {
        let mut atlas = BlockAllocator::new(64, 64);
        assert_eq!(atlas.alloc(5, 5), Some(Block::new(0, 0, 5, 5)));
        // The grid finds x = 8, which then slides left until it touches the first block.
        assert_eq!(atlas.alloc(5, 5), Some(Block::new(5, 0, 5, 5)));
        assert_eq!((atlas.first_x, atlas.first_y), (5, 0));
    }

    #[test]
    fn placement_slides_up_past_grid() {
        let mut atlas = BlockAllocator::new(10, 64);
        assert_eq!(atlas.alloc(10, 5), Some(Block::new(0, 0, 10, 5)));
        // The grid finds y = 16, which then slides up until it touches the first block.
        assert_eq!(atlas.alloc(10, 5), Some(Block::new(0, 5, 10, 5)));
    }

    #[test]
    fn hint_reuses_freed_origin() {
        let mut atlas = BlockAllocator::new(64, 64);
        atlas.alloc(16, 16).unwrap();
        let second = atlas.alloc(16, 16).unwrap();
        assert_eq!((atlas.first_x, atlas.first_y), second.origin());

        atlas.free(second.left, second.top);
        assert_eq!(atlas.alloc(16, 16), Some(second));
    }

    #[test]
    fn failure_records_bound() {
        let mut atlas = BlockAllocator::new(64, 64);
        atlas.alloc(48, 48).unwrap();
        assert!(atlas.alloc(32, 32).is_none());
        assert_eq!((atlas.max_w, atlas.max_h), (31, 31));

        // Larger in both dimensions: rejected without looking.
        assert!(atlas.alloc(40, 40).is_none());
        assert_eq!((atlas.max_w, atlas.max_h), (31, 31));

        // Narrow enough to get a search, which finds the strip on the right.
        assert_eq!(atlas.alloc(16, 64), Some(Block::new(48, 0, 16, 64)));
    }

    #[test]
    fn free_reopens_bound() {
        let mut atlas = BlockAllocator::new(64, 64);
        for _ in 0..4 {
            atlas.alloc(32, 32).unwrap();
        }
        assert!(atlas.alloc(1, 1).is_none());
        assert_eq!((atlas.max_w, atlas.max_h), (0, 0));

        atlas.free(32, 32);
        assert_eq!((atlas.max_w, atlas.max_h), (64, 64));
        assert_eq!(atlas.alloc(32, 32), Some(Block::new(32, 32, 32, 32)));
    }

    #[test]
    fn free_at_origin_reopens_freed_size() {
        let mut atlas = BlockAllocator::new(64, 64);
        for _ in 0..4 {
            atlas.alloc(32, 32).unwrap();
        }
        assert!(atlas.alloc(1, 1).is_none());

        atlas.free(0, 0);
        assert_eq!(atlas.alloc(32, 32), Some(Block::new(0, 0, 32, 32)));
    }

    #[test]
    fn freed_neighbours_fit_a_larger_block() {
        let mut atlas = BlockAllocator::new(64, 64);
        while atlas.alloc(16, 16).is_some() {}
        assert_eq!(atlas.len(), 16);
        assert_eq!((atlas.max_w, atlas.max_h), (15, 15));

        // Four adjacent tiles leave room for a block larger than any one of them.
        for (left, top) in [(16, 16), (0, 0), (16, 0), (0, 16)] {
            atlas.free(left, top);
        }
        let merged = Block::new(0, 0, 32, 32);
        assert!(atlas.is_free(&merged));
        assert_eq!(atlas.alloc(32, 32), Some(merged));
    }

    #[test]
    fn freeing_last_block_resets_bound() {
        let mut atlas = BlockAllocator::new(64, 64);
        let block = atlas.alloc(48, 48).unwrap();
        assert!(atlas.alloc(32, 32).is_none());
        atlas.free(block.left, block.top);
        assert_eq!((atlas.max_w, atlas.max_h), (64, 64));
    }

    #[test]
    #[should_panic(expected = "Tried to free an invalid block at (3, 4)")]
    fn free_unknown_origin_panics() {
        let mut atlas = BlockAllocator::new(64, 64);
        atlas.alloc(8, 8).unwrap();
        atlas.free(3, 4);
    }

    #[test]
    fn try_free_unknown_origin_leaves_state() {
        let mut atlas = BlockAllocator::new(64, 64);
        let block = atlas.alloc(8, 8).unwrap();
        assert_eq!(
            atlas.try_free(3, 4),
            Err(BlockError::InvalidFree { left: 3, top: 4 })
        );
        assert_eq!(atlas.blocks().collect::<Vec<_>>(), vec![block]);
        assert_eq!((atlas.max_w, atlas.max_h), (64, 64));
    }

    #[test]
    fn double_free_is_rejected() {
        let mut atlas = BlockAllocator::new(64, 64);
        let block = atlas.alloc(8, 8).unwrap();
        assert_eq!(atlas.try_free(block.left, block.top), Ok(block));
        assert!(atlas.try_free(block.left, block.top).is_err());
    }

    #[test]
    fn clear_resets_everything() {
        let mut atlas = BlockAllocator::new(32, 32);
        atlas.alloc(32, 16).unwrap();
        atlas.alloc(32, 16).unwrap();
        assert!(atlas.alloc(8, 8).is_none());

        atlas.clear();
        assert!(atlas.is_empty());
        assert_eq!(atlas.allocated_area(), 0);
        assert_eq!(atlas.alloc(32, 32), Some(Block::new(0, 0, 32, 32)));
    }

    #[test]
    fn finer_grid_packs_tighter() {
        // 5 is off the default 8-pixel grid, so the last gap on the row is never probed.
        let mut coarse = BlockAllocator::new(35, 5);
        let placed = (0..7).filter_map(|_| coarse.alloc(5, 5)).count();
        assert_eq!(placed, 5);

        let options = AllocatorOptions {
            step_x: 1,
            step_y: 1,
        };
        let mut fine = BlockAllocator::with_options(35, 5, options);
        for i in 0..7 {
            assert_eq!(fine.alloc(5, 5), Some(Block::new(5 * i, 0, 5, 5)));
        }
        assert!(fine.alloc(5, 5).is_none());
    }

    #[test]
    fn is_free_rejects_out_of_bounds() {
        let atlas = BlockAllocator::new(16, 16);
        assert!(atlas.is_free(&Block::new(0, 0, 16, 16)));
        assert!(!atlas.is_free(&Block::new(1, 0, 16, 16)));
        assert!(!atlas.is_free(&Block::new(0, 1, 16, 16)));
        assert!(!atlas.is_free(&Block::new(u32::MAX, 0, 2, 2)));
    }

    #[test]
    #[should_panic(expected = "atlas width must be positive")]
    fn zero_width_panics() {
        let _ = BlockAllocator::new(0, 16);
    }

    #[test]
    #[should_panic(expected = "vertical grid step must be positive")]
    fn zero_step_panics() {
        let _ = BlockAllocator::with_options(
            16,
            16,
            AllocatorOptions {
                step_x: 8,
                step_y: 0,
            },
        );
    }
}
