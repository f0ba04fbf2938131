use std::{fmt, mem};

use crate::align::WORD_SIZE;

/// Handle to a block: the byte offset of its header from the arena base.
///
/// Handles are only minted by the arena (growth) and the splitter, so a
/// handle always names a header that was written by this allocator.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(usize);

impl BlockId {
  pub(crate) const fn from_offset(offset: usize) -> Self {
    Self(offset)
  }

  pub const fn offset(self) -> usize {
    self.0
  }

  /// Handle of the block that starts right after a block of `size` user bytes
  /// beginning at `self`.
  pub(crate) const fn following(
    self,
    size: usize,
  ) -> Self {
    Self(self.0 + HEADER_SIZE + size)
  }

  /// Handle of the block of `size` user bytes that ends right before `self`.
  pub(crate) const fn preceding(
    self,
    size: usize,
  ) -> Self {
    Self(self.0 - HEADER_SIZE - size)
  }
}

impl fmt::Debug for BlockId {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "BlockId({:#x})", self.0)
  }
}

/// Header written in front of every span of user bytes.
///
/// ```text
///   ┌──────┬───────────┬─────────────────┬──────┬──────┬─────────────────┐
///   │ size │ prev_size │ used first last │ next │ prev │ size user bytes │
///   └──────┴───────────┴─────────────────┴──────┴──────┴─────────────────┘
///                                                      ▲
///                                                      └── pointer handed out
/// ```
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
  /// User-usable bytes, always a multiple of the word size.
  pub size: usize,
  /// Size of the physical predecessor. Meaningless when `first` is set.
  pub prev_size: usize,
  pub used: bool,
  /// No block sits physically right before this one.
  pub first: bool,
  /// No block sits physically right after this one.
  pub last: bool,
  /// Index links. Which list they thread depends on the index strategy.
  pub next: Option<BlockId>,
  pub prev: Option<BlockId>,
}

pub const HEADER_SIZE: usize = mem::size_of::<Block>();

const _: () = assert!(HEADER_SIZE % WORD_SIZE == 0);
const _: () = assert!(mem::align_of::<Block>() <= WORD_SIZE);

/// Smallest user span a split remainder may have.
pub const MIN_BLOCK_SIZE: usize = WORD_SIZE;

impl Block {
  pub fn new(
    size: usize,
    used: bool,
  ) -> Self {
    Self {
      size,
      prev_size: 0,
      used,
      first: true,
      last: true,
      next: None,
      prev: None,
    }
  }

  /// Bytes covered by header and user span together.
  pub const fn span(&self) -> usize {
    HEADER_SIZE + self.size
  }

  pub const fn is_free(&self) -> bool {
    !self.used
  }
}
