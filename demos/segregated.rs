use std::io::Read;

use libc::sbrk;
use rallocator::{Config, SegregatedAllocator, SbrkRegion};

/// Waits until the user presses ENTER.
/// Useful when you want to inspect memory state with tools like `pmap`, `htop`,
/// `gdb`, or just visually track how allocations change the program break.
fn block_until_enter_pressed() {
    println!("\n>>> Press ENTER to continue...");
    let _ = std::io::stdin().bytes().next();
}

/// Prints the current program break using `sbrk(0)`.
/// The program break is the upper boundary of the heap managed via brk/sbrk.
unsafe fn print_program_break(label: &str) {
    println!(
        "[{}] PID = {}, program break (sbrk(0)) = {:?}",
        label,
        std::process::id(),
        unsafe { sbrk(0) },
    );
}

fn main() {
    env_logger::init();

    // Our segregated free-list allocator. It holds:
    // - the sbrk-backed region it extends on a miss
    // - the size-class index (a Vec of free-list heads)
    // - the prologue pointer, lazily set up on first allocate
    let mut allocator = SegregatedAllocator::new(SbrkRegion::new(), Config::default());

    unsafe {
        print_program_break("start");
        block_until_enter_pressed();

        // --------------------------------------------------------------
        // 1) Allocate 100 bytes, then another 100 bytes.
        //    Unlike a bump allocator, releasing one of these later gives
        //    the allocator a block it can actually reuse.
        // --------------------------------------------------------------
        let first = allocator.allocate(100);
        println!("\n[1] Allocate 100 bytes -> {first:?}");
        let second = allocator.allocate(100);
        println!("[1] Allocate 100 bytes -> {second:?}");
        block_until_enter_pressed();

        // --------------------------------------------------------------
        // 2) Release the first block. It lands at the head of its size
        //    class instead of being leaked until process exit.
        // --------------------------------------------------------------
        allocator.release(first);
        println!("\n[2] Released first block at {first:?}");
        block_until_enter_pressed();

        // --------------------------------------------------------------
        // 3) Allocate something small enough to fit in the freed block.
        //    A segregated free-list allocator reuses it instead of
        //    extending the heap.
        // --------------------------------------------------------------
        let third = allocator.allocate(80);
        println!("\n[3] Allocate 80 bytes -> {third:?}");
        println!(
            "[3] third == first? {}",
            if third == first {
                "Yes, the freed block was reused"
            } else {
                "No, it landed somewhere else"
            }
        );
        block_until_enter_pressed();

        // --------------------------------------------------------------
        // 4) Release both live blocks. Since they are adjacent, this
        //    coalesces them into one larger free block.
        // --------------------------------------------------------------
        allocator.release(third);
        allocator.release(second);
        println!("\n[4] Released remaining blocks; adjacent free blocks coalesce");
        allocator.check_heap().expect("heap should be consistent here");
        block_until_enter_pressed();

        // --------------------------------------------------------------
        // 5) Grow a live block in place by absorbing a free neighbor,
        //    rather than falling back to allocate-copy-release.
        // --------------------------------------------------------------
        let small = allocator.allocate(64);
        let neighbor = allocator.allocate(64);
        allocator.release(neighbor);
        let grown = allocator.resize(small, 120);
        println!("\n[5] Grew a 64-byte block to 120 bytes in place: {}", grown == small);
        block_until_enter_pressed();

        // --------------------------------------------------------------
        // 6) Allocate a large block to observe heap growth via sbrk.
        // --------------------------------------------------------------
        print_program_break("before large alloc");
        let big = allocator.allocate(64 * 1024);
        println!("\n[6] Allocate large 64 KiB block -> {big:?}");
        print_program_break("after large alloc");
        block_until_enter_pressed();

        // --------------------------------------------------------------
        // 7) End of demo. Everything still live is reclaimed by the OS
        //    when the process exits, same as the bump allocator demo.
        // --------------------------------------------------------------
        allocator.check_heap().expect("heap should be consistent at exit");
        println!("\n[7] End of example. Heap invariants hold; process will now exit.");
    }
}
