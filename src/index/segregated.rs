use super::FreeSpaceIndex;
use crate::{
  align::WORD_SIZE,
  block::{Block, BlockId},
  heap::Heap,
};

/// One bucket per size class.
///
/// A block always sits in the bucket of its current size; splitting and
/// coalescing move it when the size crosses a class boundary. A search only
/// looks at the request's own class unless `overflow` is set.
#[derive(Debug, Clone)]
pub struct Segregated<L> {
  boundaries: Vec<usize>,
  buckets: Vec<L>,
  overflow: bool,
}

impl<L: FreeSpaceIndex> Segregated<L> {
  /// `boundaries` are class lower bounds in words, strictly increasing.
  pub fn new(
    boundaries: Vec<usize>,
    overflow: bool,
    bucket: impl FnMut() -> L,
  ) -> Self {
    let buckets = std::iter::repeat_with(bucket).take(boundaries.len()).collect();

    Self {
      boundaries,
      buckets,
      overflow,
    }
  }

  /// Class serving blocks of `size` bytes. Sizes below the first boundary
  /// fall into the first class.
  pub fn class_of(
    &self,
    size: usize,
  ) -> usize {
    let words = size / WORD_SIZE;

    self.boundaries.iter().rposition(|&bound| words >= bound).unwrap_or(0)
  }

  pub fn buckets(&self) -> &[L] {
    &self.buckets
  }

  pub fn boundaries(&self) -> &[usize] {
    &self.boundaries
  }

  fn bucket_for(
    &mut self,
    heap: &Heap,
    id: BlockId,
  ) -> &mut L {
    let class = self.class_of(heap.block(id).size);
    &mut self.buckets[class]
  }
}

impl<L: FreeSpaceIndex> FreeSpaceIndex for Segregated<L> {
  fn find(
    &mut self,
    heap: &Heap,
    size: usize,
  ) -> Option<BlockId> {
    let class = self.class_of(size);
    let hit = self.buckets[class].find(heap, size);

    if hit.is_some() || !self.overflow {
      return hit;
    }

    self.buckets[class + 1..].iter_mut().find_map(|bucket| bucket.find(heap, size))
  }

  fn insert(
    &mut self,
    heap: &mut Heap,
    id: BlockId,
  ) {
    self.bucket_for(heap, id).insert(heap, id);
  }

  fn insert_after(
    &mut self,
    heap: &mut Heap,
    anchor: BlockId,
    id: BlockId,
  ) {
    let anchor_class = self.class_of(heap.block(anchor).size);
    let class = self.class_of(heap.block(id).size);
    let bucket = &mut self.buckets[class];

    if anchor_class == class && bucket.tracks(heap.block(anchor)) {
      bucket.insert_after(heap, anchor, id);
    } else {
      bucket.insert(heap, id);
    }
  }

  fn remove(
    &mut self,
    heap: &mut Heap,
    id: BlockId,
  ) {
    self.bucket_for(heap, id).remove(heap, id);
  }

  fn mark_used(
    &mut self,
    heap: &mut Heap,
    id: BlockId,
  ) {
    self.bucket_for(heap, id).mark_used(heap, id);
  }

  fn mark_free(
    &mut self,
    heap: &mut Heap,
    id: BlockId,
  ) {
    self.bucket_for(heap, id).mark_free(heap, id);
  }

  fn resized(
    &mut self,
    heap: &mut Heap,
    id: BlockId,
    old_size: usize,
  ) {
    let from = self.class_of(old_size);
    let to = self.class_of(heap.block(id).size);

    if from == to || !self.buckets[from].tracks(heap.block(id)) {
      return;
    }

    self.buckets[from].remove(heap, id);
    self.buckets[to].insert(heap, id);

    tracing::trace!(?id, from, to, "block moved between size classes");
  }

  fn tracks(
    &self,
    block: &Block,
  ) -> bool {
    self.buckets.first().is_some_and(|bucket| bucket.tracks(block))
  }

  fn len(&self) -> usize {
    self.buckets.iter().map(L::len).sum()
  }

  fn clear(&mut self) {
    self.buckets.iter_mut().for_each(L::clear);
  }
}
