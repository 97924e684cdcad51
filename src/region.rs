//! Region interface: the sbrk-style collaborator the allocator core sits on top of.
//!
//! The core never calls `libc::sbrk` directly. It depends on the [`Region`]
//! trait so the allocator can be driven against a fake, in-memory region in
//! tests without perturbing the real process break.

use std::ptr;

use libc::{c_void, intptr_t, sbrk};

/// A contiguous, append-only byte region that only ever grows.
///
/// Implementors must guarantee that addresses returned by [`Region::extend`]
/// are contiguous and monotonically increasing, that [`Region::low`] is fixed
/// after the first successful `extend`, and that [`Region::high`] advances by
/// exactly the extended amount on every successful call.
pub trait Region {
    /// Grow the region by `n_bytes`, returning the base address of the new
    /// span, or `None` if the region cannot grow further.
    ///
    /// # Safety
    ///
    /// The returned pointer is valid for reads and writes of `n_bytes` bytes
    /// until the region is dropped or further extended.
    unsafe fn extend(&mut self, n_bytes: usize) -> Option<*mut u8>;

    /// Fixed base address of the region, or null before the first `extend`.
    fn low(&self) -> *mut u8;

    /// Current upper bound (exclusive) of the region.
    fn high(&self) -> *mut u8;
}

/// Production region backed by the process break via `sbrk(2)`.
///
/// Grounded on `rallocator`'s `bump` module, which already wraps `sbrk` for a
/// single-threaded, single-owner heap.
pub struct SbrkRegion {
    low: *mut u8,
    high: *mut u8,
}

impl SbrkRegion {
    pub fn new() -> Self {
        Self {
            low: ptr::null_mut(),
            high: ptr::null_mut(),
        }
    }
}

impl Default for SbrkRegion {
    fn default() -> Self {
        Self::new()
    }
}

impl Region for SbrkRegion {
    unsafe fn extend(&mut self, n_bytes: usize) -> Option<*mut u8> {
        let base = unsafe { sbrk(n_bytes as intptr_t) };
        if base == usize::MAX as *mut c_void {
            log::warn!("sbrk({n_bytes}) failed, program break not advanced");
            return None;
        }

        let base = base as *mut u8;
        if self.low.is_null() {
            self.low = base;
        }
        self.high = unsafe { base.add(n_bytes) };
        Some(base)
    }

    fn low(&self) -> *mut u8 {
        self.low
    }

    fn high(&self) -> *mut u8 {
        self.high
    }
}

/// In-memory region for tests: a fixed-capacity arena that never moves, so
/// pointers handed out by `extend` stay valid for the arena's lifetime.
///
/// Real `sbrk` also draws from a reserved, non-moving span of virtual address
/// space; this mirrors that without touching the process break.
pub struct VecRegion {
    arena: Box<[u8]>,
    used: usize,
}

impl VecRegion {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: vec![0u8; capacity].into_boxed_slice(),
            used: 0,
        }
    }
}

impl Region for VecRegion {
    unsafe fn extend(&mut self, n_bytes: usize) -> Option<*mut u8> {
        if self.used + n_bytes > self.arena.len() {
            return None;
        }
        let base = unsafe { self.arena.as_mut_ptr().add(self.used) };
        self.used += n_bytes;
        Some(base)
    }

    fn low(&self) -> *mut u8 {
        self.arena.as_ptr() as *mut u8
    }

    fn high(&self) -> *mut u8 {
        unsafe { self.arena.as_ptr().add(self.used) as *mut u8 }
    }
}
