// Copyright 2025 the Block Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::collections::VecDeque;

use block_atlas::{Block, BlockAllocator};
use criterion::{black_box, Criterion};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::SEED;

const ATLAS_SIZE: u32 = 256;
const TILE: u32 = 16;

/// An atlas covered edge to edge by `TILE`-sized blocks, with its bound recorded.
fn full_atlas() -> BlockAllocator {
    let mut atlas = BlockAllocator::new(ATLAS_SIZE, ATLAS_SIZE);
    while atlas.alloc(TILE, TILE).is_some() {}
    atlas
}

pub fn allocator(c: &mut Criterion) {
    hint_reuse(c);
    grid_fill(c);
    reject_on_full_surface(c);
    glyph_cache_turnover(c);
}

/// Free the most recently placed tile and take it again, which lands on the hint.
fn hint_reuse(c: &mut Criterion) {
    let mut atlas = full_atlas();
    let last = atlas.blocks().last().unwrap();
    atlas.free(last.left, last.top);
    atlas.alloc(TILE, TILE).unwrap();

    let mut g = c.benchmark_group("allocator");
    g.bench_function("hint_reuse_full_atlas", |b| {
        b.iter(|| {
            atlas.free(last.left, last.top);
            black_box(atlas.alloc(TILE, TILE));
        });
    });
    g.finish();
}

/// Pack glyph-sized tiles onto an empty atlas. Every tile after the first misses the hint,
/// and the grid search has to walk past more occupied rows as the atlas fills.
fn grid_fill(c: &mut Criterion) {
    let mut g = c.benchmark_group("allocator");
    g.bench_function("grid_fill_16x16", |b| {
        b.iter(|| black_box(full_atlas()));
    });
    g.bench_function("grid_fill_12x20_off_grid", |b| {
        b.iter(|| {
            let mut atlas = BlockAllocator::new(ATLAS_SIZE, ATLAS_SIZE);
            let mut count = 0_u32;
            while atlas.alloc(12, 20).is_some() {
                count += 1;
            }
            black_box(count);
        });
    });
    g.finish();
}

/// A request that cannot fit on a full surface, once rejected by the recorded bound and once
/// with the bound reopened by a free so it pays for the whole grid search.
fn reject_on_full_surface(c: &mut Criterion) {
    let mut g = c.benchmark_group("allocator");

    let mut atlas = full_atlas();
    assert!(atlas.alloc(64, 64).is_none());
    g.bench_function("reject_by_bound", |b| {
        b.iter(|| black_box(atlas.alloc(64, 64)));
    });

    let mut atlas = full_atlas();
    let corner = atlas.blocks().next().unwrap();
    g.bench_function("reject_by_search", |b| {
        b.iter(|| {
            atlas.free(corner.left, corner.top);
            atlas.alloc(TILE, TILE).unwrap();
            black_box(atlas.alloc(64, 64));
        });
    });
    g.finish();
}

/// A nearly full glyph cache evicting its oldest entry for every new glyph.
fn glyph_cache_turnover(c: &mut Criterion) {
    let mut rng = SmallRng::from_seed(SEED);
    let glyphs: Vec<(u32, u32)> = (0..400)
        .map(|_| (rng.gen_range(6..=24), rng.gen_range(10..=28)))
        .collect();

    let mut g = c.benchmark_group("allocator");
    g.bench_function("glyph_cache_turnover", |b| {
        b.iter(|| {
            let mut atlas = BlockAllocator::new(ATLAS_SIZE, ATLAS_SIZE);
            let mut cache: VecDeque<Block> = VecDeque::new();
            for &(w, h) in &glyphs {
                let block = loop {
                    if let Some(block) = atlas.alloc(w, h) {
                        break Some(block);
                    }
                    let Some(oldest) = cache.pop_front() else {
                        break None;
                    };
                    atlas.free(oldest.left, oldest.top);
                };
                cache.extend(block);
            }
            black_box(atlas.usage());
        });
    });
    g.finish();
}
