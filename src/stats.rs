use crate::block::HEADER_SIZE;

/// Heap occupancy, kept current by every allocator operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeapStats {
  /// Bytes taken from the heap source, headers and padding included.
  pub heap_bytes: usize,
  pub blocks: usize,
  pub free_blocks: usize,
  /// User bytes in free blocks.
  pub free_bytes: usize,
  /// Times the heap source was asked for more memory.
  pub grows: usize,
}

impl HeapStats {
  pub fn used_blocks(&self) -> usize {
    self.blocks - self.free_blocks
  }

  pub(crate) fn grew(
    &mut self,
    bytes: usize,
  ) {
    self.heap_bytes += bytes;
    self.blocks += 1;
    self.grows += 1;
  }

  /// A free block gave up a header's worth of bytes to a new free remainder.
  pub(crate) fn split_free(&mut self) {
    self.blocks += 1;
    self.free_blocks += 1;
    self.free_bytes -= HEADER_SIZE;
  }

  pub(crate) fn taken(
    &mut self,
    size: usize,
  ) {
    self.free_blocks -= 1;
    self.free_bytes -= size;
  }

  pub(crate) fn released(
    &mut self,
    size: usize,
  ) {
    self.free_blocks += 1;
    self.free_bytes += size;
  }

  /// A used block absorbed a free successor of `size` bytes.
  pub(crate) fn merged_into_used(
    &mut self,
    size: usize,
  ) {
    self.blocks -= 1;
    self.free_blocks -= 1;
    self.free_bytes -= size;
  }

  /// A free block absorbed a free successor; its header became user bytes.
  pub(crate) fn merged_into_free(&mut self) {
    self.blocks -= 1;
    self.free_blocks -= 1;
    self.free_bytes += HEADER_SIZE;
  }
}
