//! Where heap memory comes from.
//!
//! The allocator only needs a break pointer it can read and push forward.
//! [`Sbrk`] is the process data segment; [`Region`] simulates a break inside
//! a fixed buffer, which keeps heaps independent of each other and of the
//! process allocator.

use std::{io, ptr, ptr::NonNull};

use libc::{c_void, intptr_t, sbrk};

use crate::{
  align::WORD_SIZE,
  error::{AllocError, Result},
};

/// A monotonically growing break pointer.
pub trait HeapSource {
  /// Reports the current break without moving it.
  fn current_break(&mut self) -> *mut u8;

  /// Pushes the break forward by `increment` bytes and returns the old break,
  /// which is the start of the fresh region.
  fn extend(
    &mut self,
    increment: usize,
  ) -> Result<NonNull<u8>>;

  /// Moves the break back down to `addr`.
  ///
  /// # Safety
  ///
  /// Every byte above `addr` becomes invalid. `addr` must be a break this
  /// source returned earlier.
  unsafe fn shrink_to(
    &mut self,
    addr: NonNull<u8>,
  ) -> io::Result<()>;
}

/// The process program break, moved with `sbrk(2)`.
///
/// Other users of the break (the libc allocator, for one) may move it
/// between two calls; the arena copes with the resulting gaps.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sbrk;

impl HeapSource for Sbrk {
  fn current_break(&mut self) -> *mut u8 {
    // SAFETY: sbrk(0) only reads the break.
    unsafe { sbrk(0) as *mut u8 }
  }

  fn extend(
    &mut self,
    increment: usize,
  ) -> Result<NonNull<u8>> {
    let increment = intptr_t::try_from(increment).map_err(|_| AllocError::OutOfMemory)?;

    // SAFETY: growing the break hands us fresh memory and touches nothing
    // that was already in use.
    let previous = unsafe { sbrk(increment) };

    if previous == usize::MAX as *mut c_void {
      return Err(AllocError::OutOfMemory);
    }

    NonNull::new(previous as *mut u8).ok_or(AllocError::OutOfMemory)
  }

  unsafe fn shrink_to(
    &mut self,
    addr: NonNull<u8>,
  ) -> io::Result<()> {
    let current = self.current_break() as usize;
    let decrement = current
      .checked_sub(addr.as_ptr() as usize)
      .and_then(|delta| intptr_t::try_from(delta).ok())
      .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidInput))?;

    // SAFETY: the caller guarantees nothing above `addr` is still in use.
    let previous = unsafe { sbrk(-decrement) };

    if previous == usize::MAX as *mut c_void {
      return Err(io::Error::last_os_error());
    }

    Ok(())
  }
}

/// A fixed-capacity buffer with a simulated break.
///
/// Growing past the capacity fails with [`AllocError::OutOfMemory`], which
/// makes out-of-memory paths reproducible.
pub struct Region {
  start: NonNull<usize>,
  words: usize,
  brk: usize,
}

impl Region {
  /// Creates a region of at least `bytes` bytes, rounded up to whole words.
  pub fn with_capacity(bytes: usize) -> Self {
    let words = bytes.div_ceil(WORD_SIZE);
    let buffer = vec![0usize; words].into_boxed_slice();
    let start = NonNull::from(Box::leak(buffer)).cast::<usize>();

    Self { start, words, brk: 0 }
  }

  pub fn capacity(&self) -> usize {
    self.words * WORD_SIZE
  }

  /// Bytes below the break.
  pub fn used(&self) -> usize {
    self.brk
  }

  fn start(&self) -> *mut u8 {
    self.start.as_ptr().cast::<u8>()
  }
}

impl HeapSource for Region {
  fn current_break(&mut self) -> *mut u8 {
    self.start().wrapping_add(self.brk)
  }

  fn extend(
    &mut self,
    increment: usize,
  ) -> Result<NonNull<u8>> {
    let new_brk = self
      .brk
      .checked_add(increment)
      .filter(|&brk| brk <= self.capacity())
      .ok_or(AllocError::OutOfMemory)?;

    let previous = self.current_break();
    self.brk = new_brk;

    NonNull::new(previous).ok_or(AllocError::OutOfMemory)
  }

  unsafe fn shrink_to(
    &mut self,
    addr: NonNull<u8>,
  ) -> io::Result<()> {
    let offset = (addr.as_ptr() as usize)
      .checked_sub(self.start() as usize)
      .filter(|&offset| offset <= self.brk)
      .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidInput))?;

    self.brk = offset;
    Ok(())
  }
}

impl Drop for Region {
  fn drop(&mut self) {
    // SAFETY: `start` and `words` describe the boxed slice leaked in
    // `with_capacity`, and nothing else frees it.
    unsafe {
      drop(Box::from_raw(ptr::slice_from_raw_parts_mut(self.start.as_ptr(), self.words)));
    }
  }
}
