use std::mem;

/// Size of a machine word, the smallest unit the allocator hands out.
pub const WORD_SIZE: usize = mem::size_of::<usize>();

/// Calculates the machine word alignment for the given size.
///
/// # Examples
///
/// ```rust
/// use freelist_alloc::align;
///
/// match std::mem::size_of::<usize>() {
///     8 => assert_eq!(align!(13), 16), // 64 bit machine.
///     4 => assert_eq!(align!(11), 12), // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value + ::std::mem::size_of::<usize>() - 1) & !(::std::mem::size_of::<usize>() - 1)
  };
}

/// Rounds `size` up to the next multiple of [`WORD_SIZE`].
///
/// `size` must be at most `usize::MAX - WORD_SIZE + 1`; callers validate
/// request sizes with [`checked_align`] first.
pub const fn align(size: usize) -> usize {
  align!(size)
}

/// Like [`align`], but `None` when rounding up would overflow.
pub const fn checked_align(size: usize) -> Option<usize> {
  match size.checked_add(WORD_SIZE - 1) {
    Some(padded) => Some(padded & !(WORD_SIZE - 1)),
    None => None,
  }
}

/// Padding needed to bring `addr` up to a word boundary.
pub(crate) const fn padding_for(addr: usize) -> usize {
  align(addr) - addr
}
