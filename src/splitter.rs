//! Carving an oversized block down to a request.
//!
//! ```text
//!   before   ┌────────┬──────────────────────────────────────────┐
//!            │ header │               block.size                 │
//!            └────────┴──────────────────────────────────────────┘
//!
//!   after    ┌────────┬──────────┬────────┬──────────────────────┐
//!            │ header │   size   │ header │ block.size - size -  │
//!            │ (used) │          │ (free) │     HEADER_SIZE      │
//!            └────────┴──────────┴────────┴──────────────────────┘
//! ```

use crate::{
  block::{Block, BlockId, HEADER_SIZE, MIN_BLOCK_SIZE},
  heap::Heap,
  index::FreeSpaceIndex,
};

/// Whether `block` can give up `size` bytes and still leave room for a
/// header plus at least one word.
pub fn can_split(
  block: &Block,
  size: usize,
) -> bool {
  block
    .size
    .checked_sub(size)
    .is_some_and(|rest| rest >= HEADER_SIZE + MIN_BLOCK_SIZE)
}

/// Shrinks `id` to exactly `size` bytes and turns the rest into a free block
/// right after it. Returns the remainder, or `None` when the block is too
/// small to split, in which case nothing changes.
pub fn split<I: FreeSpaceIndex + ?Sized>(
  heap: &mut Heap,
  index: &mut I,
  id: BlockId,
  size: usize,
) -> Option<BlockId> {
  let block = *heap.block(id);

  if !can_split(&block, size) {
    return None;
  }

  let rest_id = id.following(size);
  let rest = Block {
    size: block.size - size - HEADER_SIZE,
    prev_size: size,
    used: false,
    first: false,
    last: block.last,
    next: None,
    prev: None,
  };

  heap.write(rest_id, rest);

  if let Some(after) = heap.successor(rest_id) {
    heap.block_mut(after).prev_size = rest.size;
  }

  let shrunk = heap.block_mut(id);
  shrunk.size = size;
  shrunk.last = false;

  if heap.tail() == Some(id) {
    heap.set_tail(rest_id);
  }

  index.resized(heap, id, block.size);
  index.insert_after(heap, id, rest_id);

  tracing::trace!(?id, size, rest = rest.size, "block split");

  Some(rest_id)
}
