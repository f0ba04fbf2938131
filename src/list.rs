//! Doubly linked lists threaded through block headers.
//!
//! Links are [`BlockId`] handles stored in each header's `next`/`prev`, so
//! insert and remove are O(1) and never hold a reference into the heap.

use std::iter::FusedIterator;

use crate::{
  block::{Block, BlockId},
  heap::Heap,
};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BlockList {
  head: Option<BlockId>,
  tail: Option<BlockId>,
  len: usize,
  /// Block the last roving search returned. The next one starts right after
  /// it, so anything linked in behind it is seen first.
  rover: Option<BlockId>,
}

impl BlockList {
  pub const fn new() -> Self {
    Self {
      head: None,
      tail: None,
      len: 0,
      rover: None,
    }
  }

  pub fn head(&self) -> Option<BlockId> {
    self.head
  }

  pub fn tail(&self) -> Option<BlockId> {
    self.tail
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub fn rover(&self) -> Option<BlockId> {
    self.rover
  }

  pub fn push_front(
    &mut self,
    heap: &mut Heap,
    id: BlockId,
  ) {
    let block = heap.block_mut(id);
    block.prev = None;
    block.next = self.head;

    match self.head {
      Some(head) => heap.block_mut(head).prev = Some(id),
      None => self.tail = Some(id),
    }

    self.head = Some(id);
    self.len += 1;
  }

  pub fn push_back(
    &mut self,
    heap: &mut Heap,
    id: BlockId,
  ) {
    match self.tail {
      Some(tail) => self.insert_after(heap, tail, id),
      None => self.push_front(heap, id),
    }
  }

  /// Links `id` right after `anchor`, which must be in this list.
  pub fn insert_after(
    &mut self,
    heap: &mut Heap,
    anchor: BlockId,
    id: BlockId,
  ) {
    debug_assert_ne!(anchor, id);

    let after = heap.block(anchor).next;

    let block = heap.block_mut(id);
    block.prev = Some(anchor);
    block.next = after;

    heap.block_mut(anchor).next = Some(id);

    match after {
      Some(after) => heap.block_mut(after).prev = Some(id),
      None => self.tail = Some(id),
    }

    self.len += 1;
  }

  /// Unlinks `id`, which must be in this list.
  pub fn remove(
    &mut self,
    heap: &mut Heap,
    id: BlockId,
  ) {
    debug_assert!(self.len > 0, "remove from an empty list");

    let Block { next, prev, .. } = *heap.block(id);

    match prev {
      Some(prev) => heap.block_mut(prev).next = next,
      None => self.head = next,
    }

    match next {
      Some(next) => heap.block_mut(next).prev = prev,
      None => self.tail = prev,
    }

    if self.rover == Some(id) {
      self.rover = prev;
    }

    let block = heap.block_mut(id);
    block.next = None;
    block.prev = None;

    self.len -= 1;
  }

  /// Moves the rover to `id`, so the next roving search starts after it.
  pub fn rove_past(
    &mut self,
    id: BlockId,
  ) {
    self.rover = Some(id);
  }

  pub fn contains(
    &self,
    heap: &Heap,
    id: BlockId,
  ) -> bool {
    self.iter(heap).any(|(member, _)| member == id)
  }

  pub fn iter<'h>(
    &self,
    heap: &'h Heap,
  ) -> Iter<'h> {
    Iter { heap, next: self.head }
  }

  /// Every member once, starting after the rover and wrapping around at the
  /// tail. The rover itself comes last.
  pub fn iter_from_rover<'h>(
    &self,
    heap: &'h Heap,
  ) -> Rotation<'h> {
    let start = self.rover.and_then(|id| heap.block(id).next).or(self.head);

    Rotation {
      heap,
      head: self.head,
      start,
      current: start,
      wrapped: false,
    }
  }

  pub fn ids(
    &self,
    heap: &Heap,
  ) -> Vec<BlockId> {
    self.iter(heap).map(|(id, _)| id).collect()
  }

  pub fn clear(&mut self) {
    *self = Self::new();
  }
}

pub struct Iter<'h> {
  heap: &'h Heap,
  next: Option<BlockId>,
}

impl<'h> Iterator for Iter<'h> {
  type Item = (BlockId, &'h Block);

  fn next(&mut self) -> Option<Self::Item> {
    let id = self.next?;
    let block = self.heap.block(id);
    self.next = block.next;

    Some((id, block))
  }
}

impl FusedIterator for Iter<'_> {}

pub struct Rotation<'h> {
  heap: &'h Heap,
  head: Option<BlockId>,
  start: Option<BlockId>,
  current: Option<BlockId>,
  wrapped: bool,
}

impl<'h> Iterator for Rotation<'h> {
  type Item = (BlockId, &'h Block);

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      match self.current {
        Some(id) if self.wrapped && Some(id) == self.start => {
          self.current = None;
          return None;
        }
        Some(id) => {
          let block = self.heap.block(id);
          self.current = block.next;
          return Some((id, block));
        }
        None if self.wrapped || self.start == self.head => return None,
        None => {
          self.wrapped = true;
          self.current = self.head;
        }
      }
    }
  }
}
