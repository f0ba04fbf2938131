//! # freelist-alloc - A Free-List Heap Allocator
//!
//! This crate provides a general-purpose **free-list allocator** that manages
//! one growable heap, by default the process data segment moved with `sbrk`.
//!
//! ## Overview
//!
//! Every allocation is a block: a header followed by the bytes handed to the
//! caller. Released blocks are remembered and handed out again before the heap
//! grows:
//!
//! ```text
//!   Free-List Heap:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                         HEAP MEMORY                                  │
//!   │                                                                      │
//!   │   ┌──────┬──────┬──────┬──────┬──────┬──────┐                        │
//!   │   │ H|A1 │ H|   │ H|A3 │ H|   │ H|A5 │ H|A6 │                        │
//!   │   └──────┴──────┴──────┴──────┴──────┴──────┘                        │
//!   │             ▲             ▲                 ▲                   ▲    │
//!   │             └─────────────┘                 │                   │    │
//!   │            free blocks, reused           Heap top           Program  │
//!   │            before the heap grows                             Break   │
//!   │                                                                      │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   freelist_alloc
//!   ├── align      - Word alignment (align!, align)
//!   ├── block      - Block header and handles
//!   ├── source     - Break pointer sources (Sbrk, Region)
//!   ├── heap       - Handle/pointer conversion, header access (internal)
//!   ├── arena      - Heap growth and reset (internal)
//!   ├── list       - Handle-linked lists (internal)
//!   ├── fit        - First, next and best fit
//!   ├── index      - Implicit, explicit and segregated free-space indexes
//!   ├── splitter   - Splitting oversized blocks
//!   ├── coalescer  - Merging adjacent free blocks
//!   ├── config     - AllocatorConfig
//!   └── allocator  - Allocator: allocate, release, resize, allocate_zeroed
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use freelist_alloc::Allocator;
//!
//! let mut allocator = Allocator::with_capacity(4096);
//!
//! let ptr = allocator.allocate(std::mem::size_of::<u64>()) as *mut u64;
//! assert!(!ptr.is_null());
//!
//! unsafe {
//!     *ptr = 42;
//!     assert_eq!(*ptr, 42);
//! }
//!
//! allocator.release(ptr as *mut u8);
//! ```
//!
//! ## How It Works
//!
//! ```text
//!   allocate(n)
//!     │ n == 0 ──────────────────────────────────────▶ null
//!     ▼
//!   align n to a word
//!     │
//!     ▼
//!   index.find(n) ──── hit ───▶ split? ──▶ mark used ──▶ pointer
//!     │ miss
//!     ▼
//!   arena.grow(header + n) ── refused ───────────────▶ null
//!     │
//!     ▼
//!   new used block ──▶ index.insert ──────────────────▶ pointer
//!
//!   release(p)
//!     │ null ────────────────────────────────────────▶ done
//!     ▼
//!   header = p - HEADER_SIZE
//!     │
//!     ▼
//!   absorb free successors ──▶ mark free ──▶ merge into free predecessor
//! ```
//!
//! Each block carries its header right before the user bytes:
//!
//! ```text
//!   Single Allocation:
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │    Block Header       │         User Data              │
//!   │  ┌─────────────────┐  │                                │
//!   │  │ size: N         │  │  ┌──────────────────────────┐  │
//!   │  │ prev_size       │  │  │                          │  │
//!   │  │ used/first/last │  │  │     N bytes usable       │  │
//!   │  │ next, prev      │  │  │                          │  │
//!   │  └─────────────────┘  │  └──────────────────────────┘  │
//!   └───────────────────────┴────────────────────────────────┘
//!                           ▲
//!                           └── Pointer returned to user
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no synchronization; the allocator is `!Send`
//! - **No shrinking**: released memory is reused but never returned to the OS,
//!   except by [`Allocator::reset_heap`]
//! - **Word alignment only**: user pointers are aligned to `usize`
//! - **Unix-only** for [`Sbrk`]: requires `libc` and `sbrk(2)`
//!
//! ## Safety
//!
//! Pointers passed to [`Allocator::release`] and [`Allocator::resize`] must
//! come from the same allocator and still be live. Misuse is caught by debug
//! assertions only.

pub mod align;
mod allocator;
mod arena;
mod block;
pub mod coalescer;
pub mod config;
mod error;
pub mod fit;
mod heap;
pub mod index;
mod list;
mod source;
pub mod splitter;
mod stats;

#[cfg(test)]
mod test_utils;

pub use allocator::Allocator;
pub use block::{Block, BlockId, HEADER_SIZE, MIN_BLOCK_SIZE};
pub use config::{AllocatorConfig, BucketKind, Coalescing, SegregatedConfig, Strategy};
pub use error::{AllocError, ConfigError};
pub use fit::Fit;
pub use heap::{Blocks, Heap};
pub use list::BlockList;
pub use source::{HeapSource, Region, Sbrk};
pub use stats::HeapStats;
