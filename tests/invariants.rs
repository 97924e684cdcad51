//! Exercises the allocator with a mixed workload and checks the full
//! invariant walk after every mutating call, plus the allocate/release law
//! and the "isomorphic after n equal-size alloc/free pairs" law.

use rallocator::{Config, SegregatedAllocator, VecRegion};

fn new_allocator() -> SegregatedAllocator<VecRegion> {
    SegregatedAllocator::new(VecRegion::with_capacity(8 << 20), Config::default())
}

#[test]
fn invariants_hold_after_mixed_workload() {
    let mut alloc = new_allocator();
    let mut live = Vec::new();

    let sizes = [8, 40, 100, 500, 1500, 3000, 16, 1];
    for round in 0..20 {
        for &size in &sizes {
            let p = unsafe { alloc.allocate(size) };
            assert!(!p.is_null(), "allocate({size}) failed on round {round}");
            live.push(p);
            alloc.check_heap().expect("heap invariants after allocate");
        }

        // Free every other live block to create fragmentation, forcing
        // coalescing and split paths to interact.
        let mut i = 0;
        live.retain(|&p| {
            let drop_it = i % 2 == 0;
            i += 1;
            if drop_it {
                unsafe { alloc.release(p) };
            }
            !drop_it
        });
        alloc.check_heap().expect("heap invariants after release pass");
    }

    for p in live {
        unsafe { alloc.release(p) };
    }
    alloc.check_heap().expect("heap invariants after draining all live blocks");
}

#[test]
fn allocate_then_release_is_idempotent_on_free_bytes() {
    let mut alloc = new_allocator();

    // Warm up: force the heap to its steady state once.
    let warm = unsafe { alloc.allocate(128) };
    unsafe { alloc.release(warm) };
    let high_before = alloc.heap_high();

    for _ in 0..50 {
        let p = unsafe { alloc.allocate(128) };
        assert!(!p.is_null());
        unsafe { alloc.release(p) };
        alloc.check_heap().unwrap();
    }

    // Repeated equal-size allocate/release pairs with no other activity
    // should not grow the region further.
    assert_eq!(alloc.heap_high(), high_before);
}

#[test]
fn resize_to_its_own_size_returns_the_same_pointer() {
    let mut alloc = new_allocator();
    let p = unsafe { alloc.allocate(77) };
    let q = unsafe { alloc.resize(p, 77) };
    assert_eq!(p, q);
    alloc.check_heap().unwrap();
}
