//! The segregated-free-list allocator: lazy initialization, heap extension,
//! fit search, placement, coalescing, and the four-call contract
//! (`allocate`/`release`/`resize`/`zeroed_allocate`).
//!
//! Grounded on `rallocator`'s `BumpAllocator` for the overall shape (a
//! struct owning the region handle, `pub unsafe fn` entry points taking
//! `&mut self`) but implements a free-list allocator rather than a bump
//! allocator: releases reuse memory instead of leaking it until process
//! exit.

use std::alloc::Layout;
use std::ptr::{self, NonNull};

use crate::block;
use crate::checker;
use crate::classes::ClassIndex;
use crate::config::{Config, FitStrategy};
use crate::error::AllocError;
use crate::region::Region;

/// Owns a heap region and its size-class index. Not `Send`/`Sync`: the
/// allocator assumes single-threaded, non-reentrant access, and callers
/// must enforce that externally (see the design's concurrency model).
pub struct SegregatedAllocator<R: Region> {
    region: R,
    config: Config,
    classes: ClassIndex,
    /// Payload pointer of the prologue block, null until `init` runs.
    heap_listp: *mut u8,
    /// Bytes in the region before the prologue header (class-slot
    /// reservation + alignment pad), needed to check invariant 6.
    prelude_bytes: usize,
}

impl<R: Region> SegregatedAllocator<R> {
    pub fn new(region: R, config: Config) -> Self {
        let classes = ClassIndex::new(config.class_bounds.clone());
        Self {
            region,
            config,
            classes,
            heap_listp: ptr::null_mut(),
            prelude_bytes: 0,
        }
    }

    pub fn with_default_config(region: R) -> Self {
        Self::new(region, Config::default())
    }

    fn initialized(&self) -> bool {
        !self.heap_listp.is_null()
    }

    /// Lay down the class-slot reservation, alignment pad, prologue and
    /// epilogue sentinels, then seed the first free block. See the heap
    /// layout table in the design notes.
    fn init(&mut self) -> bool {
        let k = self.classes.num_classes();
        let prelude = k * 16 + 16;

        let base = match unsafe { self.region.extend(prelude) } {
            Some(base) => base,
            None => {
                log::error!("failed to reserve initial {prelude} bytes for heap prelude");
                return false;
            }
        };

        unsafe {
            let pad = base.add(k * 16);
            let prologue_header = pad.add(4);
            let prologue_footer = pad.add(8);
            let epilogue_header = pad.add(12);

            block::write_tag(prologue_header, 8, true);
            block::write_tag(prologue_footer, 8, true);
            block::write_tag(epilogue_header, 0, true);

            self.heap_listp = prologue_footer;
        }
        self.prelude_bytes = k * 16 + 4;

        let chunk_size = self.config.chunk_size;
        let seeded = unsafe { self.extend_heap(chunk_size) }.is_some();
        if seeded {
            log::debug!("heap initialized: {} classes, {chunk_size}-byte chunks", k);
        }
        seeded
    }

    fn asize_for(&self, size: usize) -> usize {
        if size <= 16 {
            block::MIN_BLOCK_SIZE
        } else if self.config.size_448_tuning && (448..=449).contains(&size) {
            512
        } else {
            8 * (size + 8).div_ceil(8)
        }
    }

    /// # Safety
    /// `asize` must be 8-aligned.
    unsafe fn find_fit(&self, asize: usize) -> *mut u8 {
        let start = self.classes.class_of(asize);
        match self.config.fit_strategy {
            FitStrategy::FirstFit => {
                for id in start..self.classes.num_classes() {
                    let mut bp = self.classes.head(id);
                    while !bp.is_null() {
                        if unsafe { block::size_of(block::header(bp)) } >= asize {
                            return bp;
                        }
                        bp = unsafe { block::list_next(bp) };
                    }
                }
                ptr::null_mut()
            }
            FitStrategy::BestFit => {
                let mut best = ptr::null_mut();
                let mut best_size = usize::MAX;
                let mut bp = self.classes.head(start);
                while !bp.is_null() {
                    let size = unsafe { block::size_of(block::header(bp)) };
                    if size >= asize && size < best_size {
                        best = bp;
                        best_size = size;
                    }
                    bp = unsafe { block::list_next(bp) };
                }
                best
            }
        }
    }

    /// # Safety
    /// `bp` must be a free block currently linked in its class, with
    /// `asize <= size(bp)`.
    unsafe fn place(&mut self, bp: *mut u8, asize: usize) {
        let csize = unsafe { block::size_of(block::header(bp)) };

        unsafe { self.classes.unlink(bp) };

        if csize - asize >= block::MIN_BLOCK_SIZE {
            unsafe {
                block::set_tags(bp, asize, true);
                let rem = block::next_block(bp);
                block::set_tags(rem, csize - asize, false);
                self.classes.insert_head(rem);
            }
        } else {
            unsafe { block::set_tags(bp, csize, true) };
        }
    }

    /// # Safety
    /// `bp` must be a free block not currently linked in any class, with
    /// header/footer already marked unallocated.
    unsafe fn coalesce(&mut self, bp: *mut u8) -> *mut u8 {
        let prev_alloc = unsafe { block::is_alloc(block::footer(block::prev_block(bp))) };
        let next_alloc = unsafe { block::is_alloc(block::header(block::next_block(bp))) };
        let mut size = unsafe { block::size_of(block::header(bp)) };

        let merged = match (prev_alloc, next_alloc) {
            (true, true) => bp,
            (true, false) => unsafe {
                let next = block::next_block(bp);
                size += block::size_of(block::header(next));
                self.classes.unlink(next);
                block::set_tags(bp, size, false);
                bp
            },
            (false, true) => unsafe {
                let prev = block::prev_block(bp);
                size += block::size_of(block::header(prev));
                self.classes.unlink(prev);
                block::set_tags(prev, size, false);
                prev
            },
            (false, false) => unsafe {
                let prev = block::prev_block(bp);
                let next = block::next_block(bp);
                size += block::size_of(block::header(prev)) + block::size_of(block::header(next));
                self.classes.unlink(prev);
                self.classes.unlink(next);
                block::set_tags(prev, size, false);
                prev
            },
        };

        unsafe { self.classes.insert_head(merged) };
        merged
    }

    /// Grow the region by `bytes` (rounded up to 8), turning the new span
    /// into one maximal free block, coalesced with any free tail.
    unsafe fn extend_heap(&mut self, bytes: usize) -> Option<*mut u8> {
        let bytes = (bytes + 7) & !7;
        let bp = unsafe { self.region.extend(bytes) }?;

        unsafe {
            block::set_tags(bp, bytes, false);
            let next_bp = block::next_block(bp);
            block::write_tag(block::header(next_bp), 0, true);
        }

        log::trace!("extend_heap({bytes}) -> {bp:p}");
        Some(unsafe { self.coalesce(bp) })
    }

    /// Allocate at least `size` bytes, returning null on failure or `size == 0`.
    ///
    /// # Safety
    /// Must not be called reentrantly (e.g. from within the region provider).
    pub unsafe fn allocate(&mut self, size: usize) -> *mut u8 {
        if !self.initialized() && !self.init() {
            return ptr::null_mut();
        }
        if size == 0 {
            return ptr::null_mut();
        }

        let asize = self.asize_for(size);
        let bp = unsafe { self.find_fit(asize) };
        let bp = if !bp.is_null() {
            unsafe { self.place(bp, asize) };
            bp
        } else {
            let extend_size = asize.max(self.config.chunk_size);
            match unsafe { self.extend_heap(extend_size) } {
                Some(bp) => {
                    unsafe { self.place(bp, asize) };
                    bp
                }
                None => {
                    log::warn!("allocate({size}) failed: region provider out of address space");
                    return ptr::null_mut();
                }
            }
        };

        log::trace!("allocate({size}) -> {bp:p} (asize={asize})");
        self.assert_consistent();
        bp
    }

    /// Free a block previously returned by `allocate`/`resize`/`zeroed_allocate`.
    /// A null `ptr` is a no-op.
    ///
    /// # Safety
    /// `ptr` must have been returned by this allocator and not already released.
    pub unsafe fn release(&mut self, ptr: *mut u8) {
        if ptr.is_null() {
            return;
        }
        let size = unsafe { block::size_of(block::header(ptr)) };
        unsafe {
            block::set_tags(ptr, size, false);
            self.coalesce(ptr);
        }
        log::trace!("release({ptr:p}) size={size}");
        self.assert_consistent();
    }

    /// Resize a block in place when possible, otherwise allocate, copy, and
    /// release. `size == 0` is a free; a null `ptr` is an allocate.
    ///
    /// # Safety
    /// `ptr` must be null or a live pointer returned by this allocator.
    pub unsafe fn resize(&mut self, ptr: *mut u8, size: usize) -> *mut u8 {
        if size == 0 {
            unsafe { self.release(ptr) };
            return ptr::null_mut();
        }
        if ptr.is_null() {
            return unsafe { self.allocate(size) };
        }

        let rsize = crate::align::align8(size).max(16);
        let oldpay = unsafe { block::size_of(block::header(ptr)) } - 8;

        if rsize <= oldpay {
            return ptr;
        }

        let next = unsafe { block::next_block(ptr) };
        let next_alloc = unsafe { block::is_alloc(block::header(next)) };
        let next_size = unsafe { block::size_of(block::header(next)) };

        if !next_alloc && oldpay + next_size >= rsize {
            unsafe { self.classes.unlink(next) };
            let asize = rsize + 8;
            let combined = oldpay + 8 + next_size;

            if combined - asize >= block::MIN_BLOCK_SIZE {
                unsafe {
                    block::set_tags(ptr, asize, true);
                    let rem = block::next_block(ptr);
                    block::set_tags(rem, combined - asize, false);
                    self.classes.insert_head(rem);
                }
            } else {
                unsafe { block::set_tags(ptr, combined, true) };
            }

            log::trace!("resize({ptr:p}, {size}) -> in-place, absorbed next block");
            self.assert_consistent();
            return ptr;
        }

        let new = unsafe { self.allocate(size) };
        if new.is_null() {
            return ptr::null_mut();
        }
        unsafe {
            ptr::copy_nonoverlapping(ptr, new, size.min(oldpay));
            self.release(ptr);
        }
        log::debug!("resize({ptr:p}, {size}) -> copied to {new:p}, no in-place neighbor");
        new
    }

    /// Allocate `n * size` bytes and zero them. Returns null on overflow or
    /// allocation failure, without calling the region provider in the
    /// overflow case.
    ///
    /// # Safety
    /// Same as [`allocate`](Self::allocate).
    pub unsafe fn zeroed_allocate(&mut self, n: usize, size: usize) -> *mut u8 {
        let total = match n.checked_mul(size) {
            Some(total) => total,
            None => {
                log::warn!("zeroed_allocate({n}, {size}) overflowed");
                return ptr::null_mut();
            }
        };
        let p = unsafe { self.allocate(total) };
        if !p.is_null() {
            unsafe { ptr::write_bytes(p, 0, total) };
        }
        p
    }

    /// Typed-error convenience wrapper over [`allocate`](Self::allocate).
    ///
    /// Alignments greater than 8 bytes are out of scope; `layout.align()`
    /// beyond 8 is accepted but not specially honored, matching the non-goal
    /// in the design notes.
    pub fn try_allocate(&mut self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let size = layout.size();
        let ptr = unsafe { self.allocate(size) };
        NonNull::new(ptr).ok_or(AllocError::OutOfAddressSpace { requested: size })
    }

    /// # Safety
    /// Same as [`release`](Self::release).
    pub unsafe fn try_release(&mut self, ptr: NonNull<u8>) {
        unsafe { self.release(ptr.as_ptr()) }
    }

    /// # Safety
    /// Same as [`resize`](Self::resize), except `ptr` may not be null (use
    /// [`try_allocate`](Self::try_allocate) instead).
    pub unsafe fn try_resize(&mut self, ptr: NonNull<u8>, size: usize) -> Result<NonNull<u8>, AllocError> {
        let p = unsafe { self.resize(ptr.as_ptr(), size) };
        NonNull::new(p).ok_or(AllocError::OutOfAddressSpace { requested: size })
    }

    pub fn try_zeroed_allocate(&mut self, n: usize, size: usize) -> Result<NonNull<u8>, AllocError> {
        let total = n.checked_mul(size).ok_or(AllocError::SizeOverflow)?;
        let p = unsafe { self.zeroed_allocate(n, size) };
        NonNull::new(p).ok_or(AllocError::OutOfAddressSpace { requested: total })
    }

    /// Current lower bound of the managed region (for invariant 4).
    pub fn heap_low(&self) -> *mut u8 {
        self.region.low()
    }

    /// Current upper bound (exclusive) of the managed region.
    pub fn heap_high(&self) -> *mut u8 {
        self.region.high()
    }

    /// Run the full invariant walk from the design's testable-properties
    /// section. Safe to call at any point between API calls.
    pub fn check_heap(&self) -> Result<(), AllocError> {
        if !self.initialized() {
            return Ok(());
        }
        let span = unsafe { self.region.high().offset_from(self.region.low()) } as usize - self.prelude_bytes;
        unsafe { checker::check_heap(self.heap_listp, &self.classes, span) }
    }

    #[cfg(feature = "debug-checks")]
    fn assert_consistent(&self) {
        if let Err(err) = self.check_heap() {
            log::error!("heap corruption detected: {err}");
            panic!("heap corruption detected: {err}");
        }
    }

    #[cfg(not(feature = "debug-checks"))]
    #[inline(always)]
    fn assert_consistent(&self) {}
}
