use super::{FreeSpaceIndex, select};
use crate::{
  block::{Block, BlockId},
  fit::Fit,
  heap::Heap,
  list::BlockList,
};

/// Every block, used or free, in one list.
///
/// Blocks are appended as the heap grows and split remainders go right after
/// the block they came from, so the list stays in address order. Searches
/// skip used blocks.
#[derive(Debug, Default, Clone)]
pub struct ImplicitList {
  blocks: BlockList,
  fit: Fit,
}

impl ImplicitList {
  pub fn new(fit: Fit) -> Self {
    Self {
      blocks: BlockList::new(),
      fit,
    }
  }

  pub fn fit(&self) -> Fit {
    self.fit
  }

  pub fn list(&self) -> &BlockList {
    &self.blocks
  }
}

impl FreeSpaceIndex for ImplicitList {
  fn find(
    &mut self,
    heap: &Heap,
    size: usize,
  ) -> Option<BlockId> {
    select(&mut self.blocks, self.fit, heap, size)
  }

  fn insert(
    &mut self,
    heap: &mut Heap,
    id: BlockId,
  ) {
    self.blocks.push_back(heap, id);
  }

  fn insert_after(
    &mut self,
    heap: &mut Heap,
    anchor: BlockId,
    id: BlockId,
  ) {
    self.blocks.insert_after(heap, anchor, id);
  }

  fn remove(
    &mut self,
    heap: &mut Heap,
    id: BlockId,
  ) {
    self.blocks.remove(heap, id);
  }

  fn mark_used(
    &mut self,
    _heap: &mut Heap,
    _id: BlockId,
  ) {
  }

  fn mark_free(
    &mut self,
    _heap: &mut Heap,
    _id: BlockId,
  ) {
  }

  fn tracks(
    &self,
    _block: &Block,
  ) -> bool {
    true
  }

  fn len(&self) -> usize {
    self.blocks.len()
  }

  fn clear(&mut self) {
    self.blocks.clear();
  }
}
