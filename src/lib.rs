//! # rallocator - A Segregated Free-List Memory Allocator
//!
//! This crate provides a userspace dynamic memory allocator serving the
//! standard four-call contract — `allocate`, `release`, `resize`, and
//! `zeroed_allocate` — over a single contiguous, monotonically growing heap
//! region.
//!
//! ## Overview
//!
//! Unlike a bump allocator, released memory is tracked and reused: every
//! block carries boundary tags (a header and footer encoding its size and
//! allocation state), freed blocks are immediately coalesced with their free
//! neighbors, and a segregated index of size classes gives O(1)
//! insertion/removal with O(k) best-class lookup.
//!
//! ```text
//!   Segregated Free-List Allocator Concept:
//!
//!   class[0] (<=32)   -> [free] <-> [free]
//!   class[1] (<=64)   -> [free]
//!   class[2] (<=128)  -> (empty)
//!   ...
//!   class[K-1] (>2048) -> [free] <-> [free] <-> [free]
//!
//!   Each class is a doubly-linked list of free blocks whose size falls in
//!   that class's range. allocate() walks classes from the request's class
//!   upward; release() coalesces the freed block with its neighbors before
//!   reinserting it at the head of its (possibly new) class.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   rallocator
//!   ├── align       - Alignment helpers (align!, align8)
//!   ├── block       - Boundary-tag block layout (internal)
//!   ├── classes     - Segregated size-class index (internal)
//!   ├── region      - sbrk-style region trait + SbrkRegion/VecRegion
//!   ├── config      - Config, FitStrategy
//!   ├── error       - AllocError
//!   ├── checker     - debug-only heap consistency checker
//!   └── segregated  - SegregatedAllocator implementation
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rallocator::{Config, SegregatedAllocator, VecRegion};
//!
//! let region = VecRegion::with_capacity(1 << 20);
//! let mut allocator = SegregatedAllocator::new(region, Config::default());
//!
//! unsafe {
//!     let ptr = allocator.allocate(64) as *mut u64;
//!     assert!(!ptr.is_null());
//!     *ptr = 42;
//!     assert_eq!(*ptr, 42);
//!     allocator.release(ptr as *mut u8);
//! }
//! ```
//!
//! ## Safety
//!
//! This crate is inherently unsafe as it deals with raw memory management.
//! All allocation and deallocation operations require `unsafe` blocks; the
//! `try_*` convenience methods on [`SegregatedAllocator`] are safe to call
//! but still hand back raw capability (a [`std::ptr::NonNull<u8>`]) whose
//! use is unsafe.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no synchronization primitives; `SegregatedAllocator` is neither `Send` nor `Sync`.
//! - **No OS reclamation**: the region only ever grows.
//! - **8-byte alignment only**: requests needing stricter alignment are not specially honored.
//! - **No misuse defense**: double-free, releasing a foreign or interior pointer, and buffer overflows corrupting tags are undefined behavior, same as `malloc`/`free`.

pub mod align;
mod block;
mod checker;
mod classes;
pub mod config;
pub mod error;
pub mod region;
mod segregated;

pub use config::{Config, FitStrategy};
pub use error::AllocError;
pub use region::{Region, SbrkRegion, VecRegion};
pub use segregated::SegregatedAllocator;
