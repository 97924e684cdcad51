//! Debug-only heap consistency checker, covering the invariants in the
//! allocator's design: matched header/footer tags, no adjacent free blocks,
//! class-list membership, alignment, and a prologue-to-epilogue walk that
//! accounts for every byte of the region.
//!
//! Not on the hot path. Intended for `#[cfg(test)]` and the `debug-checks`
//! feature, mirroring the original C implementation's `mm_checkheap`.

use crate::block;
use crate::classes::ClassIndex;
use crate::error::AllocError;

/// Walk the heap from `heap_listp` to the epilogue and verify every
/// invariant from the design notes. `expected_block_span` is the number of
/// bytes from the prologue header through the epilogue header inclusive,
/// used to check that the sum of block sizes accounts for the whole region.
/// Returns the first violation found.
///
/// # Safety
///
/// `heap_listp` must be the allocator's current prologue pointer and
/// `classes` its current size-class index; both must describe a heap that
/// is not mid-mutation (no in-progress `place`/`coalesce`/`resize`).
pub unsafe fn check_heap(
    heap_listp: *mut u8,
    classes: &ClassIndex,
    expected_block_span: usize,
) -> Result<(), AllocError> {
    unsafe {
        if block::size_of(block::header(heap_listp)) != 8 || !block::is_alloc(block::header(heap_listp)) {
            return Err(AllocError::Corruption("malformed prologue".into()));
        }

        let mut bp = block::next_block(heap_listp);
        let mut total_bytes = 8; // prologue header + footer
        loop {
            let size = block::size_of(block::header(bp));
            if size == 0 {
                break; // epilogue
            }

            check_block(bp)?;
            total_bytes += size;

            let alloc = block::is_alloc(block::header(bp));
            if !alloc {
                let class_size = size;
                let id = classes.class_of(class_size);
                if class_size > classes.bound(id) {
                    return Err(AllocError::Corruption(format!(
                        "free block of size {class_size} placed in wrong class {id}"
                    )));
                }
            }

            let next = block::next_block(bp);
            if !alloc && block::size_of(block::header(next)) > 0 && !block::is_alloc(block::header(next)) {
                return Err(AllocError::Corruption("adjacent free blocks were not coalesced".into()));
            }

            bp = next;
        }

        if block::size_of(block::header(bp)) != 0 || !block::is_alloc(block::header(bp)) {
            return Err(AllocError::Corruption("malformed epilogue".into()));
        }
        total_bytes += 4; // epilogue header

        if total_bytes != expected_block_span {
            return Err(AllocError::Corruption(format!(
                "block walk covered {total_bytes} bytes, expected {expected_block_span}"
            )));
        }

        for id in 0..classes.num_classes() {
            check_class_list(classes, id)?;
        }

        Ok(())
    }
}

unsafe fn check_block(bp: *mut u8) -> Result<(), AllocError> {
    if !(bp as usize).is_multiple_of(8) {
        return Err(AllocError::Corruption(format!("{bp:p} is not 8-byte aligned")));
    }
    unsafe {
        let header_word = (block::size_of(block::header(bp)), block::is_alloc(block::header(bp)));
        let footer_word = (block::size_of(block::footer(bp)), block::is_alloc(block::footer(bp)));
        if header_word != footer_word {
            return Err(AllocError::Corruption(format!(
                "header/footer mismatch at {bp:p}: {header_word:?} != {footer_word:?}"
            )));
        }
    }
    Ok(())
}

unsafe fn check_class_list(classes: &ClassIndex, id: usize) -> Result<(), AllocError> {
    let mut bp = classes.head(id);
    let mut prev = std::ptr::null_mut();
    while !bp.is_null() {
        unsafe {
            if block::list_prev(bp) != prev {
                return Err(AllocError::Corruption(format!(
                    "class {id} list broken at {bp:p}: prev link does not point back"
                )));
            }
            prev = bp;
            bp = block::list_next(bp);
        }
    }
    Ok(())
}
