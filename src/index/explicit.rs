use super::{FreeSpaceIndex, select};
use crate::{
  block::{Block, BlockId},
  fit::Fit,
  heap::Heap,
  list::BlockList,
};

/// Free blocks only, most recently released first.
///
/// A block leaves the list the moment it is handed out and comes back the
/// moment it is released.
#[derive(Debug, Default, Clone)]
pub struct ExplicitList {
  free: BlockList,
  fit: Fit,
}

impl ExplicitList {
  pub fn new(fit: Fit) -> Self {
    Self {
      free: BlockList::new(),
      fit,
    }
  }

  pub fn fit(&self) -> Fit {
    self.fit
  }

  pub fn list(&self) -> &BlockList {
    &self.free
  }
}

impl FreeSpaceIndex for ExplicitList {
  fn find(
    &mut self,
    heap: &Heap,
    size: usize,
  ) -> Option<BlockId> {
    select(&mut self.free, self.fit, heap, size)
  }

  fn insert(
    &mut self,
    heap: &mut Heap,
    id: BlockId,
  ) {
    if heap.block(id).is_free() {
      self.free.push_front(heap, id);
    }
  }

  fn insert_after(
    &mut self,
    heap: &mut Heap,
    anchor: BlockId,
    id: BlockId,
  ) {
    // The remainder takes the anchor's place once the anchor is handed out.
    if heap.block(anchor).is_free() {
      self.free.insert_after(heap, anchor, id);
    } else {
      self.free.push_front(heap, id);
    }
  }

  fn remove(
    &mut self,
    heap: &mut Heap,
    id: BlockId,
  ) {
    if heap.block(id).is_free() {
      self.free.remove(heap, id);
    }
  }

  fn mark_used(
    &mut self,
    heap: &mut Heap,
    id: BlockId,
  ) {
    self.free.remove(heap, id);
  }

  fn mark_free(
    &mut self,
    heap: &mut Heap,
    id: BlockId,
  ) {
    self.free.push_front(heap, id);
  }

  fn tracks(
    &self,
    block: &Block,
  ) -> bool {
    block.is_free()
  }

  fn len(&self) -> usize {
    self.free.len()
  }

  fn clear(&mut self) {
    self.free.clear();
  }
}
