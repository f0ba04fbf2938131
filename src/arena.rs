use std::{io, ptr::NonNull};

use crate::{
  align::padding_for,
  block::{BlockId, HEADER_SIZE},
  error::{AllocError, Result},
  heap::Heap,
  source::HeapSource,
};

/// The growable heap: a break-pointer source plus the headers laid in it.
pub struct Arena<S> {
  source: S,
  heap: Heap,
  /// Break observed before the first growth, where `reset` returns to.
  origin: Option<NonNull<u8>>,
}

/// A block fresh from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grown {
  pub id: BlockId,
  /// Bytes taken from the source, alignment padding included.
  pub bytes: usize,
}

impl<S: HeapSource> Arena<S> {
  pub fn new(source: S) -> Self {
    Self {
      source,
      heap: Heap::new(),
      origin: None,
    }
  }

  pub fn heap(&self) -> &Heap {
    &self.heap
  }

  pub fn heap_mut(&mut self) -> &mut Heap {
    &mut self.heap
  }

  pub fn source(&self) -> &S {
    &self.source
  }

  /// Grows the heap by one used block of `size` user bytes.
  ///
  /// `size` must already be word aligned.
  pub fn grow(
    &mut self,
    size: usize,
  ) -> Result<Grown> {
    let brk = self.source.current_break();
    let padding = padding_for(brk as usize);

    let bytes = padding
      .checked_add(HEADER_SIZE)
      .and_then(|bytes| bytes.checked_add(size))
      .ok_or(AllocError::OutOfMemory)?;

    let previous = self.source.extend(bytes).inspect_err(|_| {
      tracing::warn!(size, bytes, "heap source refused to grow");
    })?;

    debug_assert_eq!(previous.as_ptr(), brk, "break moved between two reads");

    self.origin.get_or_insert(previous);

    // SAFETY: `previous + padding` lies inside the `bytes` just obtained.
    let start = unsafe { NonNull::new_unchecked(previous.as_ptr().add(padding)) };
    let id = self.heap.claim(start, size);

    tracing::debug!(?id, size, bytes, padding, "heap grown");

    Ok(Grown { id, bytes })
  }

  /// Hands every byte back to the source and forgets all blocks.
  ///
  /// Pointers returned before the reset dangle afterwards.
  pub fn reset(&mut self) -> io::Result<()> {
    let result = match self.origin.take() {
      // SAFETY: every block lives above `origin`, and all of them are
      // discarded together with the heap below.
      Some(origin) => unsafe { self.source.shrink_to(origin) },
      None => Ok(()),
    };

    if let Err(err) = &result {
      tracing::warn!(%err, "failed to move the break back to the heap origin");
    }

    self.heap.clear();
    tracing::debug!("heap reset");

    result
  }
}
