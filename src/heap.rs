//! Headers in heap memory, addressed by [`BlockId`].
//!
//! This is the only place that turns handles into addresses. Everything above
//! it talks in handles and copies of [`Block`] records.

use std::{iter::FusedIterator, ptr, ptr::NonNull};

use crate::{
  align::WORD_SIZE,
  block::{Block, BlockId, HEADER_SIZE},
};

pub struct Heap {
  /// Address of the first header ever claimed, null while the heap is empty.
  base: *mut u8,
  /// Offset one past the last claimed byte.
  top: usize,
  /// Block with the highest address.
  tail: Option<BlockId>,
}

impl Heap {
  pub(crate) const fn new() -> Self {
    Self {
      base: ptr::null_mut(),
      top: 0,
      tail: None,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.base.is_null()
  }

  pub fn base(&self) -> Option<NonNull<u8>> {
    NonNull::new(self.base)
  }

  /// Bytes between the base and the end of the last block, gaps included.
  pub fn extent(&self) -> usize {
    self.top
  }

  pub fn tail(&self) -> Option<BlockId> {
    self.tail
  }

  pub(crate) fn set_tail(
    &mut self,
    id: BlockId,
  ) {
    self.tail = Some(id);
  }

  fn header(
    &self,
    id: BlockId,
  ) -> *mut Block {
    debug_assert!(!self.base.is_null(), "block handle into an empty heap");
    debug_assert!(id.offset() + HEADER_SIZE <= self.top, "block handle past the heap top");
    debug_assert_eq!(id.offset() % WORD_SIZE, 0, "misaligned block handle");

    self.base.wrapping_add(id.offset()).cast::<Block>()
  }

  pub fn block(
    &self,
    id: BlockId,
  ) -> &Block {
    // SAFETY: handles only come from `claim` and the splitter, both of which
    // write a header at that offset inside the claimed range.
    unsafe { &*self.header(id) }
  }

  pub fn block_mut(
    &mut self,
    id: BlockId,
  ) -> &mut Block {
    // SAFETY: see `block`; `&mut self` keeps the header unaliased.
    unsafe { &mut *self.header(id) }
  }

  /// Writes a fresh header at `id`, which must lie inside claimed memory.
  pub(crate) fn write(
    &mut self,
    id: BlockId,
    block: Block,
  ) {
    // SAFETY: the caller carves `id` out of a span it owns; the span is word
    // aligned because the base and every size are.
    unsafe { self.header(id).write(block) }
  }

  /// Pointer handed to the user for the block at `id`.
  pub fn user_ptr(
    &self,
    id: BlockId,
  ) -> NonNull<u8> {
    let ptr = self.header(id).cast::<u8>().wrapping_add(HEADER_SIZE);

    // SAFETY: `header` is derived from the non-null base plus an in-range offset.
    unsafe { NonNull::new_unchecked(ptr) }
  }

  /// Recovers the handle of the block a user pointer belongs to.
  ///
  /// `ptr` must have been returned by this heap and not released since.
  pub fn id_for_ptr(
    &self,
    ptr: NonNull<u8>,
  ) -> BlockId {
    let addr = ptr.as_ptr() as usize;
    let base = self.base as usize;

    debug_assert!(
      !self.base.is_null() && addr >= base + HEADER_SIZE && addr <= base + self.top,
      "pointer {ptr:?} was not handed out by this heap"
    );

    BlockId::from_offset(addr.wrapping_sub(base).wrapping_sub(HEADER_SIZE))
  }

  /// Starts a new used block of `size` bytes at `start`, fresh from the source.
  ///
  /// The block is linked physically to the previous tail when `start` is
  /// exactly where the last block ended.
  pub(crate) fn claim(
    &mut self,
    start: NonNull<u8>,
    size: usize,
  ) -> BlockId {
    if self.base.is_null() {
      self.base = start.as_ptr();
    }

    debug_assert!(start.as_ptr() >= self.base, "break moved below the heap base");

    let offset = start.as_ptr() as usize - self.base as usize;
    let id = BlockId::from_offset(offset);
    let mut block = Block::new(size, true);

    if let Some(tail) = self.tail {
      if offset == self.top {
        block.first = false;
        block.prev_size = self.block(tail).size;
        self.block_mut(tail).last = false;
      }
    }

    self.top = offset + block.span();
    self.write(id, block);
    self.tail = Some(id);

    id
  }

  /// The block physically right after `id`, if any.
  pub fn successor(
    &self,
    id: BlockId,
  ) -> Option<BlockId> {
    let block = self.block(id);

    (!block.last).then(|| id.following(block.size))
  }

  /// The block physically right before `id`, if any.
  pub fn predecessor(
    &self,
    id: BlockId,
  ) -> Option<BlockId> {
    let block = self.block(id);

    (!block.first).then(|| id.preceding(block.prev_size))
  }

  /// Fills the first `len` user bytes of `id` with zeros.
  pub(crate) fn zero(
    &mut self,
    id: BlockId,
    len: usize,
  ) {
    debug_assert!(len <= self.block(id).size);

    // SAFETY: the first `len` user bytes of `id` belong to the block.
    unsafe { ptr::write_bytes(self.user_ptr(id).as_ptr(), 0, len) }
  }

  /// Copies `len` user bytes from `from` to `to`.
  pub(crate) fn copy(
    &mut self,
    from: BlockId,
    to: BlockId,
    len: usize,
  ) {
    debug_assert_ne!(from, to);
    debug_assert!(len <= self.block(from).size && len <= self.block(to).size);

    // SAFETY: distinct blocks never overlap and both spans hold `len` bytes.
    unsafe {
      ptr::copy_nonoverlapping(self.user_ptr(from).as_ptr(), self.user_ptr(to).as_ptr(), len)
    }
  }

  /// Walks blocks in address order from the base up to the first block
  /// without a physical successor.
  pub fn blocks(&self) -> Blocks<'_> {
    Blocks {
      heap: self,
      next: (!self.is_empty()).then_some(BlockId::from_offset(0)),
    }
  }

  pub(crate) fn clear(&mut self) {
    *self = Self::new();
  }
}

pub struct Blocks<'h> {
  heap: &'h Heap,
  next: Option<BlockId>,
}

impl<'h> Iterator for Blocks<'h> {
  type Item = (BlockId, &'h Block);

  fn next(&mut self) -> Option<Self::Item> {
    let id = self.next?;
    self.next = self.heap.successor(id);

    Some((id, self.heap.block(id)))
  }
}

impl FusedIterator for Blocks<'_> {}
