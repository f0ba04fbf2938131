//! Block selection policies.
//!
//! Each policy is a pure function over `(handle, header)` candidates, so the
//! same code serves every index: used blocks in the candidate stream are
//! skipped, which lets lists that hold all blocks share it with free lists.

use crate::block::{Block, BlockId};

/// How a list picks among the free blocks that are large enough.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fit {
  /// The first fitting block from the head.
  First,
  /// The first fitting block from where the last search stopped, wrapping
  /// around once. Spreads allocations across the heap.
  Next,
  /// The smallest fitting block; an exact fit ends the scan early.
  #[default]
  Best,
}

pub fn first_fit<'h>(
  candidates: impl IntoIterator<Item = (BlockId, &'h Block)>,
  size: usize,
) -> Option<BlockId> {
  candidates
    .into_iter()
    .find(|(_, block)| block.is_free() && block.size >= size)
    .map(|(id, _)| id)
}

pub fn best_fit<'h>(
  candidates: impl IntoIterator<Item = (BlockId, &'h Block)>,
  size: usize,
) -> Option<BlockId> {
  let mut best: Option<(BlockId, usize)> = None;

  for (id, block) in candidates {
    if !block.is_free() || block.size < size {
      continue;
    }

    if block.size == size {
      return Some(id);
    }

    if best.is_none_or(|(_, best_size)| block.size < best_size) {
      best = Some((id, block.size));
    }
  }

  best.map(|(id, _)| id)
}
