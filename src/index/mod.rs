//! Free-space bookkeeping.
//!
//! Three shapes track which blocks can be handed out again:
//!
//! ```text
//!   implicit    ┌───┐   ┌───┐   ┌───┐   ┌───┐
//!               │ U │──▶│ F │──▶│ U │──▶│ F │     every block, address order
//!               └───┘   └───┘   └───┘   └───┘
//!
//!   explicit    ┌───┐   ┌───┐
//!               │ F │──▶│ F │                     free blocks, newest first
//!               └───┘   └───┘
//!
//!   segregated  [1..16)   ┌───┐──▶┌───┐
//!               [16..32)  ┌───┐                   one list per size class
//!               [32..64)  ∅
//!               ...
//! ```
//!
//! All of them thread their links through the block headers, so tracking a
//! block never allocates.

mod explicit;
mod implicit;
mod segregated;

pub use explicit::ExplicitList;
pub use implicit::ImplicitList;
pub use segregated::Segregated;

use crate::{
  block::{Block, BlockId},
  config::{BucketKind, Strategy},
  fit::{Fit, best_fit, first_fit},
  heap::Heap,
  list::BlockList,
};

/// Tracks blocks through their state changes and picks blocks to reuse.
///
/// The allocator updates a header first, then tells the index:
/// `mark_used` sees `used == true`, `mark_free` sees `used == false`, and
/// `resized` sees the new size.
pub trait FreeSpaceIndex {
  /// A free block of at least `size` bytes, if the index knows one.
  fn find(
    &mut self,
    heap: &Heap,
    size: usize,
  ) -> Option<BlockId>;

  /// A block fresh from the arena.
  fn insert(
    &mut self,
    heap: &mut Heap,
    id: BlockId,
  );

  /// `id` is a free remainder split off the end of `anchor`.
  fn insert_after(
    &mut self,
    heap: &mut Heap,
    anchor: BlockId,
    id: BlockId,
  );

  /// `id` is about to be absorbed by a neighbour.
  fn remove(
    &mut self,
    heap: &mut Heap,
    id: BlockId,
  );

  fn mark_used(
    &mut self,
    heap: &mut Heap,
    id: BlockId,
  );

  fn mark_free(
    &mut self,
    heap: &mut Heap,
    id: BlockId,
  );

  /// `id` was split or grew by absorbing a neighbour.
  fn resized(
    &mut self,
    _heap: &mut Heap,
    _id: BlockId,
    _old_size: usize,
  ) {
  }

  /// Whether a block in this state is linked into the index.
  fn tracks(
    &self,
    block: &Block,
  ) -> bool;

  /// Number of tracked blocks.
  fn len(&self) -> usize;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }

  fn clear(&mut self);
}

/// Runs `fit` over `list`, moving the rover on a next-fit hit.
pub(crate) fn select(
  list: &mut BlockList,
  fit: Fit,
  heap: &Heap,
  size: usize,
) -> Option<BlockId> {
  match fit {
    Fit::First => first_fit(list.iter(heap), size),
    Fit::Best => best_fit(list.iter(heap), size),
    Fit::Next => {
      let hit = first_fit(list.iter_from_rover(heap), size);

      if let Some(id) = hit {
        list.rove_past(id);
      }

      hit
    }
  }
}

/// The index an allocator runs with, chosen by [`Strategy`].
#[derive(Debug, Clone)]
pub enum Index {
  Implicit(ImplicitList),
  Explicit(ExplicitList),
  SegregatedImplicit(Segregated<ImplicitList>),
  SegregatedExplicit(Segregated<ExplicitList>),
}

impl Index {
  /// Builds the index for `strategy`, whose boundaries must be validated.
  pub fn new(strategy: &Strategy) -> Self {
    match strategy {
      Strategy::Implicit(fit) => Self::Implicit(ImplicitList::new(*fit)),
      Strategy::Explicit(fit) => Self::Explicit(ExplicitList::new(*fit)),
      Strategy::Segregated(config) => match config.bucket {
        BucketKind::Implicit => Self::SegregatedImplicit(Segregated::new(
          config.boundaries.clone(),
          config.overflow,
          || ImplicitList::new(Fit::Best),
        )),
        BucketKind::Explicit => Self::SegregatedExplicit(Segregated::new(
          config.boundaries.clone(),
          config.overflow,
          || ExplicitList::new(Fit::Best),
        )),
      }
    }
  }

  fn inner(&self) -> &dyn FreeSpaceIndex {
    match self {
      Self::Implicit(index) => index,
      Self::Explicit(index) => index,
      Self::SegregatedImplicit(index) => index,
      Self::SegregatedExplicit(index) => index,
    }
  }

  fn inner_mut(&mut self) -> &mut dyn FreeSpaceIndex {
    match self {
      Self::Implicit(index) => index,
      Self::Explicit(index) => index,
      Self::SegregatedImplicit(index) => index,
      Self::SegregatedExplicit(index) => index,
    }
  }
}

impl FreeSpaceIndex for Index {
  fn find(
    &mut self,
    heap: &Heap,
    size: usize,
  ) -> Option<BlockId> {
    self.inner_mut().find(heap, size)
  }

  fn insert(
    &mut self,
    heap: &mut Heap,
    id: BlockId,
  ) {
    self.inner_mut().insert(heap, id);
  }

  fn insert_after(
    &mut self,
    heap: &mut Heap,
    anchor: BlockId,
    id: BlockId,
  ) {
    self.inner_mut().insert_after(heap, anchor, id);
  }

  fn remove(
    &mut self,
    heap: &mut Heap,
    id: BlockId,
  ) {
    self.inner_mut().remove(heap, id);
  }

  fn mark_used(
    &mut self,
    heap: &mut Heap,
    id: BlockId,
  ) {
    self.inner_mut().mark_used(heap, id);
  }

  fn mark_free(
    &mut self,
    heap: &mut Heap,
    id: BlockId,
  ) {
    self.inner_mut().mark_free(heap, id);
  }

  fn resized(
    &mut self,
    heap: &mut Heap,
    id: BlockId,
    old_size: usize,
  ) {
    self.inner_mut().resized(heap, id, old_size);
  }

  fn tracks(
    &self,
    block: &Block,
  ) -> bool {
    self.inner().tracks(block)
  }

  fn len(&self) -> usize {
    self.inner().len()
  }

  fn clear(&mut self) {
    self.inner_mut().clear();
  }
}
