// Copyright 2025 the Block Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A rectangle allocator for texture atlases.
//!
//! Game and UI renderers pack many small images (glyphs, sprites, icons) into a few large
//! textures to keep texture binds down. [`BlockAllocator`] manages the sub-regions of one such
//! fixed-size surface: it hands out non-overlapping [`Block`]s for requested sizes, takes them
//! back on [`free`](BlockAllocator::free), and reuses the released space for later requests.
//!
//! Placed blocks never move. A block is identified by its top-left origin for as long as it is
//! live, so drawing code can keep referring to the region it was given.
//!
//! # Usage
//!
//! ```
//! use block_atlas::BlockAllocator;
//!
//! let mut atlas = BlockAllocator::new(64, 64);
//! let glyph = atlas.alloc(32, 32).expect("an empty atlas has room");
//! assert_eq!((glyph.left, glyph.top), (0, 0));
//!
//! // Copy pixels into `glyph` with your rendering backend, draw, and eventually release it.
//! atlas.free(glyph.left, glyph.top);
//! assert!(atlas.is_empty());
//! ```
//!
//! # Placement
//!
//! The allocator favors quick, good-enough placement over optimal packing:
//!
//! - The origin of the most recently placed block is probed first.
//! - Otherwise candidate origins are scanned on a coarse grid (8 pixels across, 16 down by
//!   default, see [`AllocatorOptions`]), and the first free one is pulled towards the top-left
//!   corner.
//! - After a failed search, requests larger than the failed one in both dimensions are
//!   rejected without searching until space is freed.
//!
//! Choosing between several atlases, copying pixel data, and anything else involving the
//! rendering backend is left to the caller.
// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

mod allocator;
mod block;
mod config;
mod error;

pub use allocator::BlockAllocator;
pub use block::Block;
pub use config::AllocatorOptions;
pub use error::BlockError;
