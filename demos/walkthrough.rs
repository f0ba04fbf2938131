use std::{io::Read, ptr};

use freelist_alloc::{Allocator, HEADER_SIZE};
use libc::sbrk;

/// Waits until the user presses ENTER.
/// Useful when you want to inspect memory state with tools like `pmap`, `htop`,
/// `gdb`, or just visually track how allocations change the program break.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

/// Prints the current program break using `sbrk(0)`.
fn print_program_break(label: &str) {
  println!(
    "[{}] PID = {}, program break (sbrk(0)) = {:?}",
    label,
    std::process::id(),
    unsafe { sbrk(0) },
  );
}

/// Prints every block of the heap in address order.
fn print_heap(allocator: &Allocator) {
  let stats = allocator.stats();

  println!(
    "    heap: {} bytes, {} blocks ({} free, {} free bytes)",
    stats.heap_bytes, stats.blocks, stats.free_blocks, stats.free_bytes
  );

  for (id, block) in allocator.blocks() {
    println!(
      "    {:?}  size = {:>6}  {}",
      id,
      block.size,
      if block.used { "used" } else { "free" }
    );
  }
}

fn main() {
  // Explicit free list, best fit, splitting and coalescing on both sides.
  let mut allocator = Allocator::new();

  print_program_break("start");
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 1) Allocate a u32. Requests are rounded up to a whole word and every
  //    block carries a header right in front of the user bytes.
  // --------------------------------------------------------------------
  let first = allocator.allocate(size_of::<u32>());
  println!("\n[1] Allocate u32 at {first:?} (header is {HEADER_SIZE} bytes)");

  unsafe {
    let first_ptr = first.cast::<u32>();
    first_ptr.write(0xDEADBEEF);
    println!("[1] Value written = 0x{:X}", first_ptr.read());
  }

  print_heap(&allocator);
  print_program_break("after first alloc");
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 2) Two more blocks of odd sizes.
  // --------------------------------------------------------------------
  let second = allocator.allocate(12);
  unsafe { ptr::write_bytes(second, 0xAB, 12) };
  let third = allocator.allocate(200);

  println!("\n[2] Allocate 12 bytes at {second:?} and 200 bytes at {third:?}");
  print_heap(&allocator);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 3) Release the first two blocks. They sit next to each other, so they
  //    merge into one free block.
  // --------------------------------------------------------------------
  allocator.release(first);
  allocator.release(second);

  println!("\n[3] Released the first two blocks");
  print_heap(&allocator);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 4) A small request reuses the merged block instead of growing the heap.
  // --------------------------------------------------------------------
  let fourth = allocator.allocate(2);
  println!(
    "\n[4] Allocate 2 bytes at {fourth:?}, reused the freed block? {}",
    fourth == first
  );
  print_heap(&allocator);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 5) Grow the 200 byte block. It moves, keeping its contents, and its
  //    old place becomes free.
  // --------------------------------------------------------------------
  let moved = allocator.resize(third, 1024);
  println!("\n[5] Resize {third:?} to 1024 bytes, now at {moved:?}");
  print_heap(&allocator);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 6) A zeroed array, then a large block to move the program break.
  // --------------------------------------------------------------------
  let zeroed = allocator.allocate_zeroed(16, size_of::<u16>());
  println!("\n[6] Allocate zeroed [u16; 16] at {zeroed:?}");

  print_program_break("before large alloc");
  let big = allocator.allocate(64 * 1024);
  println!("[6] Allocate 64 KiB at {big:?}");
  print_program_break("after large alloc");

  print_heap(&allocator);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 7) End of demo. The OS reclaims the heap when the process exits.
  // --------------------------------------------------------------------
  println!("\n[7] End of example.");
}
