//! Merging a block with the free block physically after it.

use crate::{block::BlockId, heap::Heap, index::FreeSpaceIndex};

/// Whether the block right after `id` exists and is free.
pub fn can_coalesce(
  heap: &Heap,
  id: BlockId,
) -> bool {
  heap.successor(id).is_some_and(|next| heap.block(next).is_free())
}

/// Absorbs the free successor of `id` into it. Returns `false`, changing
/// nothing, when there is no free successor.
pub fn coalesce<I: FreeSpaceIndex + ?Sized>(
  heap: &mut Heap,
  index: &mut I,
  id: BlockId,
) -> bool {
  let Some(next) = heap.successor(id).filter(|&next| heap.block(next).is_free()) else {
    return false;
  };

  index.remove(heap, next);
  let old_size = absorb(heap, id, next);
  index.resized(heap, id, old_size);

  tracing::trace!(?id, absorbed = ?next, size = heap.block(id).size, "blocks coalesced");

  true
}

/// Folds `next`, the physical successor of `id`, into `id`. Returns the old
/// size of `id`.
fn absorb(
  heap: &mut Heap,
  id: BlockId,
  next: BlockId,
) -> usize {
  let absorbed = *heap.block(next);

  debug_assert!(absorbed.is_free(), "coalescing with a used block");
  debug_assert_eq!(heap.successor(id), Some(next), "coalescing with a non-adjacent block");

  let survivor = heap.block_mut(id);
  let old_size = survivor.size;
  survivor.size += absorbed.span();
  survivor.last = absorbed.last;
  let size = survivor.size;

  if let Some(after) = heap.successor(id) {
    heap.block_mut(after).prev_size = size;
  }

  if heap.tail() == Some(next) {
    heap.set_tail(id);
  }

  old_size
}
