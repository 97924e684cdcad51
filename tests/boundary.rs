//! Literal boundary scenarios from the allocator's design notes, driven
//! against an in-memory region so the tests don't touch the real process
//! break.

use rallocator::{Config, SegregatedAllocator, VecRegion};

fn new_allocator() -> SegregatedAllocator<VecRegion> {
    SegregatedAllocator::new(VecRegion::with_capacity(4 << 20), Config::default())
}

/// Read a block's size straight out of its header tag, the same way the
/// allocator itself does, without exposing internal state through the
/// public API just for tests.
fn block_size(ptr: *mut u8) -> usize {
    unsafe { *(ptr.sub(4) as *const u32) as usize & !0x7 }
}

#[test]
fn allocate_one_byte_is_aligned_into_min_block() {
    let mut alloc = new_allocator();
    let p = unsafe { alloc.allocate(1) };
    assert!(!p.is_null());
    assert_eq!((p as usize) % 8, 0);
    assert_eq!(block_size(p), 24);
    alloc.check_heap().unwrap();
}

#[test]
fn allocate_sixteen_vs_seventeen_bytes() {
    let mut alloc = new_allocator();
    let p16 = unsafe { alloc.allocate(16) };
    let p17 = unsafe { alloc.allocate(17) };
    assert_eq!(block_size(p16), 24);
    assert_eq!(block_size(p17), 32);
    alloc.check_heap().unwrap();
}

#[test]
fn allocate_448_gets_tuned_to_512() {
    let mut alloc = new_allocator();
    let p = unsafe { alloc.allocate(448) };
    assert_eq!(block_size(p), 512);
    alloc.check_heap().unwrap();
}

#[test]
fn releasing_two_adjacent_blocks_coalesces() {
    let mut alloc = new_allocator();
    let p1 = unsafe { alloc.allocate(100) };
    let p2 = unsafe { alloc.allocate(100) };
    let size1 = block_size(p1);
    let size2 = block_size(p2);

    unsafe {
        alloc.release(p1);
        alloc.release(p2);
    }
    alloc.check_heap().unwrap();

    // The next allocation big enough to need the combined span should land
    // exactly where p1 did, proving the two blocks merged into one.
    let combined_payload = size1 + size2 - 8;
    let p3 = unsafe { alloc.allocate(combined_payload - 8) };
    assert_eq!(p3, p1);
}

#[test]
fn resize_to_smaller_size_is_a_no_op() {
    let mut alloc = new_allocator();
    let p = unsafe { alloc.allocate(100) };
    let q = unsafe { alloc.resize(p, 80) };
    assert_eq!(p, q);
    alloc.check_heap().unwrap();
}

#[test]
fn resize_absorbs_free_neighbor_in_place() {
    let mut alloc = new_allocator();
    let p = unsafe { alloc.allocate(100) };
    let p2 = unsafe { alloc.allocate(100) };
    unsafe { alloc.release(p2) };

    let q = unsafe { alloc.resize(p, 150) };
    assert_eq!(p, q);
    alloc.check_heap().unwrap();
}

#[test]
fn resize_pattern_is_preserved_on_growth() {
    let mut alloc = new_allocator();
    let p = unsafe { alloc.allocate(32) };
    unsafe {
        for i in 0..32u8 {
            p.add(i as usize).write(i);
        }
    }

    let q = unsafe { alloc.resize(p, 128) };
    assert!(!q.is_null());
    unsafe {
        for i in 0..32u8 {
            assert_eq!(q.add(i as usize).read(), i);
        }
    }
    alloc.check_heap().unwrap();
}

#[test]
fn resize_to_zero_frees_and_returns_null() {
    let mut alloc = new_allocator();
    let p = unsafe { alloc.allocate(64) };
    let q = unsafe { alloc.resize(p, 0) };
    assert!(q.is_null());
    alloc.check_heap().unwrap();
}

#[test]
fn release_of_null_is_a_no_op() {
    let mut alloc = new_allocator();
    unsafe { alloc.release(std::ptr::null_mut()) };
    alloc.check_heap().unwrap();
}

#[test]
fn allocate_zero_returns_null() {
    let mut alloc = new_allocator();
    let p = unsafe { alloc.allocate(0) };
    assert!(p.is_null());
}

#[test]
fn zeroed_allocate_zeroes_the_whole_region() {
    let mut alloc = new_allocator();
    let p = unsafe { alloc.zeroed_allocate(16, 8) };
    assert!(!p.is_null());
    unsafe {
        for i in 0..128 {
            assert_eq!(p.add(i).read(), 0);
        }
    }
}

#[test]
fn zeroed_allocate_overflow_returns_null() {
    let mut alloc = new_allocator();
    let p = unsafe { alloc.zeroed_allocate(usize::MAX, 2) };
    assert!(p.is_null());
}
