#![allow(dead_code)]

use std::collections::HashSet;

use freelist_alloc::{
  Allocator, AllocatorConfig, BlockId, Coalescing, HEADER_SIZE, HeapSource, Region,
  align::WORD_SIZE,
  index::{FreeSpaceIndex, Index},
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_tracing() {
  let _ = tracing_subscriber::registry()
    .with(EnvFilter::from_default_env())
    .with(tracing_subscriber::fmt::layer().with_test_writer())
    .try_init();
}

pub fn region_allocator(config: AllocatorConfig) -> Allocator<Region> {
  init_tracing();
  Allocator::with_config(Region::with_capacity(1 << 20), config).unwrap()
}

/// Checks headers, statistics and index membership against each other.
pub fn check_heap<S: HeapSource>(alloc: &Allocator<S>) {
  let stats = alloc.stats();
  let blocks: Vec<_> = alloc.blocks().map(|(id, block)| (id, *block)).collect();

  assert_eq!(blocks.len(), stats.blocks, "block count");

  let free: Vec<_> = blocks.iter().filter(|(_, block)| block.is_free()).collect();
  assert_eq!(free.len(), stats.free_blocks, "free block count");
  assert_eq!(
    free.iter().map(|(_, block)| block.size).sum::<usize>(),
    stats.free_bytes,
    "free bytes"
  );

  let spans: usize = blocks.iter().map(|(_, block)| block.span()).sum();
  assert_eq!(spans, alloc.heap().extent(), "blocks tile the heap");
  assert_eq!(spans, stats.heap_bytes, "heap bytes");

  for (_, block) in &blocks {
    assert_eq!(block.size % WORD_SIZE, 0, "word-aligned size");
  }

  for pair in blocks.windows(2) {
    let ((id, block), (next_id, next)) = (pair[0], pair[1]);

    assert_eq!(next_id.offset(), id.offset() + HEADER_SIZE + block.size, "adjacency");
    assert_eq!(next.prev_size, block.size, "prev_size");
    assert!(!block.last && !next.first);

    if alloc.config().coalescing == Coalescing::Bidirectional {
      assert!(block.used || next.used, "two adjacent free blocks");
    }
  }

  let tracked = tracked_ids(alloc);
  let expected: HashSet<BlockId> = blocks
    .iter()
    .filter(|(_, block)| alloc.index().tracks(block))
    .map(|(id, _)| *id)
    .collect();

  assert_eq!(tracked, expected, "index membership");
}

fn tracked_ids<S: HeapSource>(alloc: &Allocator<S>) -> HashSet<BlockId> {
  let heap = alloc.heap();

  match alloc.index() {
    Index::Implicit(list) => list.list().ids(heap).into_iter().collect(),
    Index::Explicit(list) => list.list().ids(heap).into_iter().collect(),
    Index::SegregatedImplicit(index) => {
      for (class, bucket) in index.buckets().iter().enumerate() {
        for (_, block) in bucket.list().iter(heap) {
          assert_eq!(index.class_of(block.size), class, "block in the wrong bucket");
        }
      }
      index.buckets().iter().flat_map(|bucket| bucket.list().ids(heap)).collect()
    }
    Index::SegregatedExplicit(index) => {
      for (class, bucket) in index.buckets().iter().enumerate() {
        for (_, block) in bucket.list().iter(heap) {
          assert_eq!(index.class_of(block.size), class, "block in the wrong bucket");
        }
      }
      index.buckets().iter().flat_map(|bucket| bucket.list().ids(heap)).collect()
    }
  }
}
