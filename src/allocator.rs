use std::ptr::{self, NonNull};

use crate::{
  align::checked_align,
  arena::{Arena, Grown},
  block::{Block, BlockId, HEADER_SIZE},
  coalescer,
  config::{AllocatorConfig, Coalescing},
  error::{AllocError, ConfigError, Result},
  heap::{Blocks, Heap},
  index::{FreeSpaceIndex, Index},
  source::{HeapSource, Region, Sbrk},
  splitter,
  stats::HeapStats,
};

/// Operands up to this bound multiply without overflow on 32-bit targets.
const SMALL_OPERAND: usize = u16::MAX as usize;

/// A free-list allocator over one growable heap.
///
/// All state lives in the value, so independent allocators never interfere.
/// The allocator is single threaded: it holds raw pointers and is neither
/// `Send` nor `Sync`.
pub struct Allocator<S: HeapSource = Sbrk> {
  arena: Arena<S>,
  index: Index,
  config: AllocatorConfig,
  stats: HeapStats,
}

impl Allocator<Sbrk> {
  /// An allocator on the process program break, with the default config.
  pub fn new() -> Self {
    Self::with_source(Sbrk)
  }
}

impl Default for Allocator<Sbrk> {
  fn default() -> Self {
    Self::new()
  }
}

impl Allocator<Region> {
  /// An allocator confined to a private buffer of `bytes` bytes.
  pub fn with_capacity(bytes: usize) -> Self {
    Self::with_source(Region::with_capacity(bytes))
  }
}

impl<S: HeapSource> Allocator<S> {
  pub fn with_source(source: S) -> Self {
    Self::build(source, AllocatorConfig::default())
  }

  pub fn with_config(
    source: S,
    config: AllocatorConfig,
  ) -> std::result::Result<Self, ConfigError> {
    config.validate()?;

    Ok(Self::build(source, config))
  }

  fn build(
    source: S,
    config: AllocatorConfig,
  ) -> Self {
    Self {
      arena: Arena::new(source),
      index: Index::new(&config.strategy),
      config,
      stats: HeapStats::default(),
    }
  }

  pub fn config(&self) -> &AllocatorConfig {
    &self.config
  }

  pub fn stats(&self) -> HeapStats {
    self.stats
  }

  pub fn index(&self) -> &Index {
    &self.index
  }

  pub fn heap(&self) -> &Heap {
    self.arena.heap()
  }

  pub fn source(&self) -> &S {
    self.arena.source()
  }

  /// Allocates at least `size` word-aligned bytes.
  ///
  /// Returns null when `size` is zero or the heap cannot grow.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> *mut u8 {
    self.try_allocate(size).map_or(ptr::null_mut(), NonNull::as_ptr)
  }

  pub fn try_allocate(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>> {
    if size == 0 {
      tracing::trace!("zero-sized allocation refused");
      return Err(AllocError::InvalidSize);
    }

    let size = checked_align(size).ok_or(AllocError::OutOfMemory)?;

    let id = match self.reuse(size) {
      Some(id) => id,
      None => self.grow(size)?,
    };

    Ok(self.arena.heap().user_ptr(id))
  }

  /// Hands out a tracked free block, split down to `size` when possible.
  fn reuse(
    &mut self,
    size: usize,
  ) -> Option<BlockId> {
    let heap = self.arena.heap_mut();
    let id = self.index.find(heap, size)?;

    if self.config.split && splitter::split(heap, &mut self.index, id, size).is_some() {
      self.stats.split_free();
    }

    let block = heap.block_mut(id);
    block.used = true;
    let got = block.size;

    self.index.mark_used(heap, id);
    self.stats.taken(got);

    tracing::trace!(?id, requested = size, size = got, "free block reused");

    Some(id)
  }

  fn grow(
    &mut self,
    size: usize,
  ) -> Result<BlockId> {
    let Grown { id, bytes } = self.arena.grow(size)?;

    self.index.insert(self.arena.heap_mut(), id);
    self.stats.grew(bytes);

    tracing::trace!(?id, size, "block allocated from fresh heap");

    Ok(id)
  }

  /// Gives a block back. Null is ignored.
  ///
  /// `ptr` must come from this allocator and not have been released since.
  pub fn release(
    &mut self,
    ptr: *mut u8,
  ) {
    let Some(ptr) = NonNull::new(ptr) else {
      return;
    };

    let heap = self.arena.heap_mut();
    let mut id = heap.id_for_ptr(ptr);

    debug_assert!(heap.block(id).used, "release of a block that is not in use");

    if self.config.coalescing != Coalescing::Disabled {
      loop {
        let before = heap.block(id).size;

        if !coalescer::coalesce(heap, &mut self.index, id) {
          break;
        }

        self.stats.merged_into_used(heap.block(id).size - before - HEADER_SIZE);
      }
    }

    let block = heap.block_mut(id);
    block.used = false;
    let size = block.size;

    self.index.mark_free(heap, id);
    self.stats.released(size);

    if self.config.coalescing == Coalescing::Bidirectional {
      if let Some(prev) = heap.predecessor(id).filter(|&prev| heap.block(prev).is_free()) {
        coalescer::coalesce(heap, &mut self.index, prev);
        self.stats.merged_into_free();
        id = prev;
      }
    }

    tracing::trace!(?id, size = heap.block(id).size, "block released");
  }

  /// Grows an allocation to at least `size` bytes, moving it if needed.
  ///
  /// Null behaves like [`allocate`](Self::allocate). A block that already
  /// holds `size` bytes is returned as is. On failure the original block is
  /// left untouched and null is returned.
  pub fn resize(
    &mut self,
    ptr: *mut u8,
    size: usize,
  ) -> *mut u8 {
    self.try_resize(ptr, size).map_or(ptr::null_mut(), NonNull::as_ptr)
  }

  pub fn try_resize(
    &mut self,
    ptr: *mut u8,
    size: usize,
  ) -> Result<NonNull<u8>> {
    let Some(old) = NonNull::new(ptr) else {
      return self.try_allocate(size);
    };

    let heap = self.arena.heap();
    let old_id = heap.id_for_ptr(old);
    let old_size = heap.block(old_id).size;

    if size <= old_size {
      return Ok(old);
    }

    let new = self.try_allocate(size)?;

    let heap = self.arena.heap_mut();
    let new_id = heap.id_for_ptr(new);
    heap.copy(old_id, new_id, old_size);

    self.release(old.as_ptr());

    tracing::trace!(from = ?old_id, to = ?new_id, size, "block moved to grow");

    Ok(new)
  }

  /// Allocates `count * size` zeroed bytes.
  ///
  /// Returns null when either operand is zero, when the product overflows,
  /// or when the heap cannot grow.
  pub fn allocate_zeroed(
    &mut self,
    count: usize,
    size: usize,
  ) -> *mut u8 {
    self.try_allocate_zeroed(count, size).map_or(ptr::null_mut(), NonNull::as_ptr)
  }

  pub fn try_allocate_zeroed(
    &mut self,
    count: usize,
    size: usize,
  ) -> Result<NonNull<u8>> {
    if count == 0 || size == 0 {
      return Err(AllocError::InvalidSize);
    }

    if (count > SMALL_OPERAND || size > SMALL_OPERAND) && usize::MAX / count < size {
      tracing::trace!(count, size, "zeroed allocation size overflows");
      return Err(AllocError::OutOfMemory);
    }

    let total = count * size;
    let ptr = self.try_allocate(total)?;

    let heap = self.arena.heap_mut();
    let id = heap.id_for_ptr(ptr);
    heap.zero(id, total);

    Ok(ptr)
  }

  /// Returns the whole heap to the source and forgets every block.
  ///
  /// Every pointer handed out before becomes dangling. Meant for starting
  /// over between independent scenarios.
  pub fn reset_heap(&mut self) {
    // A failed shrink is logged by the arena; the state is dropped either way.
    let _ = self.arena.reset();

    self.index.clear();
    self.stats = HeapStats::default();
  }

  /// Copy of the header of the block `ptr` points into, `None` for null.
  pub fn block_of(
    &self,
    ptr: *const u8,
  ) -> Option<Block> {
    let ptr = NonNull::new(ptr.cast_mut())?;
    let heap = self.arena.heap();

    Some(*heap.block(heap.id_for_ptr(ptr)))
  }

  /// Blocks in address order, up to the first gap in the heap.
  pub fn blocks(&self) -> Blocks<'_> {
    self.arena.heap().blocks()
  }
}

#[cfg(test)]
mod tests {
  use std::io;

  use super::*;
  use crate::{
    align::{WORD_SIZE, align},
    config::{BucketKind, SegregatedConfig, Strategy},
    fit::Fit,
    index::{ImplicitList, Segregated},
    test_utils::init_tracing,
  };

  const W: usize = WORD_SIZE;

  fn allocator(config: AllocatorConfig) -> Allocator<Region> {
    init_tracing();
    Allocator::with_config(Region::with_capacity(1 << 20), config).unwrap()
  }

  fn every_config() -> Vec<AllocatorConfig> {
    let segregated = |bucket| SegregatedConfig {
      bucket,
      ..SegregatedConfig::default()
    };

    vec![
      AllocatorConfig::implicit(Fit::First),
      AllocatorConfig::implicit(Fit::Next),
      AllocatorConfig::implicit(Fit::Best),
      AllocatorConfig::explicit(Fit::First),
      AllocatorConfig::explicit(Fit::Next),
      AllocatorConfig::explicit(Fit::Best),
      AllocatorConfig::segregated(segregated(BucketKind::Implicit)),
      AllocatorConfig::segregated(segregated(BucketKind::Explicit)),
    ]
  }

  fn free_blocks<S: HeapSource>(alloc: &Allocator<S>) -> Vec<Block> {
    alloc.blocks().map(|(_, block)| *block).filter(Block::is_free).collect()
  }

  #[test]
  fn sizes_round_up_to_a_word() {
    let mut alloc = allocator(AllocatorConfig::implicit(Fit::First));

    let p1 = alloc.allocate(3);
    assert_eq!(alloc.block_of(p1).unwrap().size, W);

    let p2 = alloc.allocate(8);
    assert_eq!(alloc.block_of(p2).unwrap().size, align(8));

    alloc.release(p2);
    assert!(alloc.block_of(p2).unwrap().is_free());

    let p3 = alloc.allocate(5);
    assert_eq!(p3, p2);
  }

  #[test]
  fn zero_size_and_null_are_harmless() {
    for config in every_config() {
      let mut alloc = allocator(config);

      assert!(alloc.allocate(0).is_null());
      assert_eq!(alloc.try_allocate(0), Err(AllocError::InvalidSize));

      alloc.release(ptr::null_mut());
      let nothing = alloc.allocate(0);
      alloc.release(nothing);

      assert_eq!(alloc.stats(), HeapStats::default());
    }
  }

  #[test]
  fn user_pointers_sit_right_after_their_header() {
    let mut alloc = allocator(AllocatorConfig::default());

    let p = alloc.allocate(24);
    let base = alloc.heap().base().unwrap().as_ptr();

    assert_eq!(p, base.wrapping_add(HEADER_SIZE));
    assert_eq!(p as usize % W, 0);
  }

  #[test]
  fn released_block_is_reused() {
    for config in every_config() {
      let mut alloc = allocator(config.clone());

      let p = alloc.allocate(8 * W);
      alloc.release(p);

      assert_eq!(alloc.allocate(8 * W), p, "{config:?}");
      alloc.release(p);
      assert_eq!(alloc.allocate(5 * W), p, "{config:?}");
    }
  }

  #[test]
  fn memory_is_writable_and_distinct() {
    for config in every_config() {
      let mut alloc = allocator(config);
      let sizes = [1, 7, 8, 100, 3, 256];
      let ptrs: Vec<_> = sizes.iter().map(|&size| alloc.allocate(size)).collect();

      for (i, (&ptr, &size)) in ptrs.iter().zip(&sizes).enumerate() {
        unsafe { ptr::write_bytes(ptr, i as u8, size) };
      }
      for (i, (&ptr, &size)) in ptrs.iter().zip(&sizes).enumerate() {
        let bytes = unsafe { std::slice::from_raw_parts(ptr, size) };
        assert!(bytes.iter().all(|&b| b == i as u8));
      }
    }
  }

  #[test]
  fn split_leaves_a_free_remainder_behind() {
    let mut alloc = allocator(AllocatorConfig::explicit(Fit::Best));

    let big = alloc.allocate(64 * W);
    let _guard = alloc.allocate(W);
    alloc.release(big);

    let small = alloc.allocate(5);

    assert_eq!(small, big);
    assert_eq!(alloc.block_of(small).unwrap().size, W);

    let rest = alloc.heap().successor(alloc.heap().id_for_ptr(NonNull::new(small).unwrap()));
    let rest = *alloc.heap().block(rest.unwrap());
    assert!(rest.is_free());
    assert_eq!(rest.size, 64 * W - HEADER_SIZE - W);
  }

  #[test]
  fn split_can_be_disabled() {
    let mut alloc = allocator(AllocatorConfig::explicit(Fit::Best).with_split(false));

    let big = alloc.allocate(64 * W);
    alloc.release(big);
    let small = alloc.allocate(W);

    assert_eq!(small, big);
    assert_eq!(alloc.block_of(small).unwrap().size, 64 * W);
    assert_eq!(alloc.stats().blocks, 1);
  }

  #[test]
  fn adjacent_releases_merge_in_either_order() {
    for config in every_config() {
      for flip in [false, true] {
        let mut alloc = allocator(config.clone());
        let a = alloc.allocate(3 * W);
        let b = alloc.allocate(5 * W);
        let _guard = alloc.allocate(W);

        let (first, second) = if flip { (b, a) } else { (a, b) };
        alloc.release(first);
        alloc.release(second);

        let free = free_blocks(&alloc);
        assert_eq!(free.len(), 1, "{config:?} flip={flip}");
        assert_eq!(free[0].size, 3 * W + 5 * W + HEADER_SIZE);
        assert_eq!(alloc.block_of(a).unwrap(), free[0]);
      }
    }
  }

  #[test]
  fn forward_coalescing_only_merges_successors() {
    let config = AllocatorConfig::implicit(Fit::First).with_coalescing(Coalescing::Forward);
    let mut alloc = allocator(config.clone());
    let a = alloc.allocate(W);
    let b = alloc.allocate(W);
    let _guard = alloc.allocate(W);

    alloc.release(a);
    alloc.release(b);
    assert_eq!(free_blocks(&alloc).len(), 2);

    let mut alloc = allocator(config);
    let a = alloc.allocate(W);
    let b = alloc.allocate(W);
    let _guard = alloc.allocate(W);

    alloc.release(b);
    alloc.release(a);
    assert_eq!(free_blocks(&alloc).len(), 1);
  }

  #[test]
  fn forward_coalescing_swallows_a_run_of_free_blocks() {
    let config = AllocatorConfig::implicit(Fit::First).with_coalescing(Coalescing::Forward);
    let mut alloc = allocator(config);
    let a = alloc.allocate(W);
    let b = alloc.allocate(W);
    let c = alloc.allocate(W);

    alloc.release(b);
    alloc.release(c);
    alloc.release(a);

    let free = free_blocks(&alloc);
    assert_eq!(free.len(), 1);
    assert_eq!(free[0].size, 3 * W + 2 * HEADER_SIZE);
    assert_eq!(alloc.stats().blocks, 1);
  }

  #[test]
  fn disabled_coalescing_keeps_neighbours_apart() {
    let config = AllocatorConfig::explicit(Fit::Best).with_coalescing(Coalescing::Disabled);
    let mut alloc = allocator(config);
    let a = alloc.allocate(W);
    let b = alloc.allocate(W);

    alloc.release(b);
    alloc.release(a);

    assert_eq!(free_blocks(&alloc).len(), 2);
  }

  #[test]
  fn best_fit_picks_the_tightest_free_block() {
    for config in [AllocatorConfig::implicit(Fit::Best), AllocatorConfig::explicit(Fit::Best)] {
      let mut alloc = allocator(config.with_split(false));
      let large = alloc.allocate(32 * W);
      let _g1 = alloc.allocate(W);
      let tight = alloc.allocate(6 * W);
      let _g2 = alloc.allocate(W);
      let medium = alloc.allocate(12 * W);
      let _g3 = alloc.allocate(W);

      alloc.release(large);
      alloc.release(tight);
      alloc.release(medium);

      assert_eq!(alloc.allocate(5 * W), tight);
      assert_eq!(alloc.allocate(5 * W), medium);
      assert_eq!(alloc.allocate(5 * W), large);
    }
  }

  #[test]
  fn first_fit_takes_the_lowest_address() {
    let mut alloc = allocator(AllocatorConfig::implicit(Fit::First).with_split(false));
    let large = alloc.allocate(32 * W);
    let _g1 = alloc.allocate(W);
    let tight = alloc.allocate(6 * W);
    let _g2 = alloc.allocate(W);

    alloc.release(tight);
    alloc.release(large);

    assert_eq!(alloc.allocate(5 * W), large);
  }

  #[test]
  fn next_fit_does_not_return_to_the_same_block() {
    let mut alloc = allocator(AllocatorConfig::implicit(Fit::Next).with_split(false));
    let blocks: Vec<_> = (0..4).map(|_| alloc.allocate(2 * W)).collect();
    let _guard = alloc.allocate(W);

    alloc.release(blocks[0]);
    alloc.release(blocks[2]);

    let first = alloc.allocate(W);
    alloc.release(first);
    let second = alloc.allocate(W);

    assert_eq!(first, blocks[0]);
    assert_eq!(second, blocks[2]);

    alloc.release(second);
    assert_eq!(alloc.allocate(W), blocks[0]);
  }

  #[test]
  fn next_fit_resumes_at_the_split_remainder() {
    for config in [AllocatorConfig::implicit(Fit::Next), AllocatorConfig::explicit(Fit::Next)] {
      let mut alloc = allocator(config.with_coalescing(Coalescing::Disabled));
      let large = alloc.allocate(32 * W);
      let _g1 = alloc.allocate(W);
      let small = alloc.allocate(2 * W);
      let _g2 = alloc.allocate(W);

      alloc.release(small);
      alloc.release(large);

      let first = alloc.allocate(W);
      let second = alloc.allocate(W);

      assert_eq!(first, large);
      assert_eq!(second, large.wrapping_add(W + HEADER_SIZE));
      assert_ne!(second, small);
    }
  }

  #[test]
  fn segregated_requests_stay_in_their_bucket() {
    let config = AllocatorConfig::segregated(SegregatedConfig::default());
    let mut alloc = allocator(config);

    let a1 = alloc.allocate(8);
    let a2 = alloc.allocate(125);
    let a3 = alloc.allocate(W * 128);
    let a4 = alloc.allocate(8);

    let Index::SegregatedImplicit(index) = alloc.index() else {
      unreachable!("segregated config builds a segregated index");
    };
    let bucket = |index: &Segregated<ImplicitList>, class: usize| {
      index.buckets()[class].list().ids(alloc.heap())
    };
    let id = |ptr: *mut u8| alloc.heap().id_for_ptr(NonNull::new(ptr).unwrap());

    assert_eq!(alloc.block_of(a2).unwrap().size, align(125));
    assert_eq!(bucket(index, 0), vec![id(a1), id(a4)]);
    assert_eq!(bucket(index, index.class_of(align(125))), vec![id(a2)]);
    assert_eq!(bucket(index, 4), vec![id(a3)]);
  }

  #[test]
  fn segregated_miss_grows_instead_of_borrowing_a_larger_class() {
    let config = AllocatorConfig::segregated(SegregatedConfig::default())
      .with_coalescing(Coalescing::Disabled);
    let mut alloc = allocator(config);

    let big = alloc.allocate(32 * W);
    alloc.release(big);
    let small = alloc.allocate(W);

    assert_ne!(small, big);
    assert!(alloc.block_of(big).unwrap().is_free());
  }

  #[test]
  fn segregated_overflow_borrows_a_larger_class() {
    let config = AllocatorConfig::segregated(SegregatedConfig {
      overflow: true,
      ..SegregatedConfig::default()
    });
    let mut alloc = allocator(config);

    let big = alloc.allocate(32 * W);
    alloc.release(big);

    assert_eq!(alloc.allocate(W), big);
  }

  #[test]
  fn out_of_memory_yields_null() {
    let mut alloc = Allocator::with_capacity(HEADER_SIZE + 4 * W);

    let p = alloc.allocate(4 * W);
    assert!(!p.is_null());
    assert!(alloc.allocate(1).is_null());
    assert_eq!(alloc.try_allocate(1), Err(AllocError::OutOfMemory));
    assert_eq!(alloc.try_allocate(usize::MAX), Err(AllocError::OutOfMemory));

    alloc.release(p);
    assert_eq!(alloc.allocate(W), p);
  }

  #[test]
  fn resize_of_null_allocates() {
    let mut alloc = allocator(AllocatorConfig::default());

    let p = alloc.resize(ptr::null_mut(), 10);

    assert!(!p.is_null());
    assert_eq!(alloc.block_of(p).unwrap().size, align(10));
  }

  #[test]
  fn resize_within_the_block_keeps_the_pointer() {
    let mut alloc = allocator(AllocatorConfig::default());
    let p = alloc.allocate(4 * W);

    assert_eq!(alloc.resize(p, 4 * W), p);
    assert_eq!(alloc.resize(p, 1), p);
    assert_eq!(alloc.resize(p, 0), p);
    assert_eq!(alloc.block_of(p).unwrap().size, 4 * W);
  }

  #[test]
  fn resize_moves_and_keeps_contents() {
    for config in every_config() {
      let mut alloc = allocator(config);
      let p = alloc.allocate(2 * W);
      let _guard = alloc.allocate(W);
      unsafe { ptr::write_bytes(p, 0x5A, 2 * W) };

      let q = alloc.resize(p, 10 * W);

      assert_ne!(q, p);
      let moved = unsafe { std::slice::from_raw_parts(q, 2 * W) };
      assert!(moved.iter().all(|&b| b == 0x5A));
      assert!(alloc.block_of(p).unwrap().is_free());
    }
  }

  #[test]
  fn failed_resize_keeps_the_original() {
    let mut alloc = Allocator::with_capacity(HEADER_SIZE + 2 * W);
    let p = alloc.allocate(2 * W);
    unsafe { p.write(7) };

    assert!(alloc.resize(p, 64).is_null());
    assert_eq!(unsafe { p.read() }, 7);
    assert!(alloc.block_of(p).unwrap().used);
  }

  #[test]
  fn zeroed_allocation_clears_reused_memory() {
    let mut alloc = allocator(AllocatorConfig::explicit(Fit::Best));
    let p = alloc.allocate(16 * W);
    unsafe { ptr::write_bytes(p, 0xFF, 16 * W) };
    alloc.release(p);

    let q = alloc.allocate_zeroed(4, 4 * W);

    assert_eq!(q, p);
    let bytes = unsafe { std::slice::from_raw_parts(q, 16 * W) };
    assert!(bytes.iter().all(|&b| b == 0));
  }

  #[test]
  fn zeroed_allocation_rejects_overflow_and_zero() {
    let mut alloc = allocator(AllocatorConfig::default());

    assert_eq!(alloc.try_allocate_zeroed(usize::MAX, 2), Err(AllocError::OutOfMemory));
    assert_eq!(alloc.try_allocate_zeroed(2, usize::MAX / 2 + 1), Err(AllocError::OutOfMemory));
    assert_eq!(alloc.try_allocate_zeroed(0, 8), Err(AllocError::InvalidSize));
    assert_eq!(alloc.try_allocate_zeroed(8, 0), Err(AllocError::InvalidSize));
    assert!(alloc.allocate_zeroed(1 << 17, 1 << 17).is_null());
    assert!(!alloc.allocate_zeroed(3, 5).is_null());
  }

  #[test]
  fn stats_follow_the_heap() {
    let mut alloc = allocator(AllocatorConfig::explicit(Fit::Best));
    let a = alloc.allocate(32 * W);
    let _b = alloc.allocate(W);

    let stats = alloc.stats();
    assert_eq!(stats.grows, 2);
    assert_eq!(stats.heap_bytes, 2 * HEADER_SIZE + 33 * W);
    assert_eq!(stats.used_blocks(), 2);

    alloc.release(a);
    let _c = alloc.allocate(W);

    let stats = alloc.stats();
    assert_eq!(stats.blocks, 3);
    assert_eq!(stats.free_blocks, 1);
    assert_eq!(stats.free_bytes, 31 * W - HEADER_SIZE);
    assert_eq!(stats.grows, 2);
    assert_eq!(alloc.index().len(), 1);
  }

  #[test]
  fn reset_starts_over_from_the_origin() {
    let mut alloc = allocator(AllocatorConfig::default());
    let first = alloc.allocate(W);
    alloc.allocate(100);
    alloc.release(first);

    alloc.reset_heap();

    assert!(alloc.heap().is_empty());
    assert!(alloc.index().is_empty());
    assert_eq!(alloc.stats(), HeapStats::default());
    assert_eq!(alloc.source().used(), 0);
    assert_eq!(alloc.allocate(W), first);
  }

  /// A region whose break is also pushed by someone else between growths.
  struct Interleaved {
    region: Region,
    grown: bool,
  }

  impl HeapSource for Interleaved {
    fn current_break(&mut self) -> *mut u8 {
      if self.grown {
        let _ = self.region.extend(4 * W);
      }
      self.region.current_break()
    }

    fn extend(
      &mut self,
      increment: usize,
    ) -> Result<NonNull<u8>> {
      self.grown = true;
      self.region.extend(increment)
    }

    unsafe fn shrink_to(
      &mut self,
      addr: NonNull<u8>,
    ) -> io::Result<()> {
      unsafe { self.region.shrink_to(addr) }
    }
  }

  #[test]
  fn blocks_never_merge_across_foreign_memory() {
    init_tracing();
    let source = Interleaved {
      region: Region::with_capacity(4096),
      grown: false,
    };
    let mut alloc = Allocator::with_config(source, AllocatorConfig::implicit(Fit::First)).unwrap();

    let a = alloc.allocate(2 * W);
    let b = alloc.allocate(2 * W);
    let c = alloc.allocate(2 * W);

    alloc.release(a);
    alloc.release(c);
    alloc.release(b);

    for ptr in [a, b, c] {
      let block = alloc.block_of(ptr).unwrap();
      assert!(block.first && block.last);
      assert!(block.is_free());
      assert_eq!(block.size, 2 * W);
    }

    let stats = alloc.stats();
    assert_eq!(stats.blocks, 3);
    assert_eq!(stats.free_blocks, 3);
    assert_eq!(stats.free_bytes, 6 * W);
    assert_eq!(stats.heap_bytes, 3 * (HEADER_SIZE + 2 * W));
    assert_eq!(alloc.index().len(), 3);

    assert_eq!(alloc.allocate(2 * W), a);

    alloc.reset_heap();
    assert_eq!(alloc.source().region.used(), 0);
  }

  #[test]
  fn bad_config_is_rejected() {
    let config = AllocatorConfig {
      strategy: Strategy::Segregated(SegregatedConfig {
        boundaries: vec![],
        ..SegregatedConfig::default()
      }),
      ..AllocatorConfig::default()
    };

    assert!(matches!(
      Allocator::with_config(Region::with_capacity(64), config),
      Err(ConfigError::NoSizeClasses)
    ));
  }
}
