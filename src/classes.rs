//! Size-class index: K disjoint size ranges, each with its own doubly-linked
//! free list, plus O(1) insert/unlink on top of [`crate::block`]'s list
//! pointers.

use std::ptr;

use crate::block;

/// A size-class index over `bounds.len()` classes.
///
/// `bounds[i]` is the inclusive upper bound of class `i`; the last class
/// accepts everything larger, so its bound is conventionally `usize::MAX`.
/// Roots live in this struct rather than in heap memory or process statics,
/// matching the "explicit handle" option for global state.
pub struct ClassIndex {
    bounds: Vec<usize>,
    roots: Vec<*mut u8>,
}

impl ClassIndex {
    pub fn new(bounds: Vec<usize>) -> Self {
        assert!(!bounds.is_empty(), "at least one size class is required");
        assert!(
            bounds.windows(2).all(|w| w[0] < w[1]),
            "class bounds must be strictly increasing"
        );
        let roots = vec![ptr::null_mut(); bounds.len()];
        Self { bounds, roots }
    }

    pub fn num_classes(&self) -> usize {
        self.bounds.len()
    }

    /// Smallest class id whose upper bound is >= `size`; monotone non-decreasing.
    pub fn class_of(&self, size: usize) -> usize {
        self.bounds
            .iter()
            .position(|&bound| size <= bound)
            .unwrap_or(self.bounds.len() - 1)
    }

    pub fn head(&self, id: usize) -> *mut u8 {
        self.roots[id]
    }

    /// Inclusive upper bound of class `id`.
    pub fn bound(&self, id: usize) -> usize {
        self.bounds[id]
    }

    fn set_head(&mut self, id: usize, bp: *mut u8) {
        self.roots[id] = bp;
    }

    /// Insert `bp` at the head of its size class. `bp`'s current size (read
    /// from its header) determines the class; never cache the id across a
    /// coalesce.
    ///
    /// # Safety
    ///
    /// `bp` must be a free block with valid header/footer tags, not already
    /// present in any class list.
    pub unsafe fn insert_head(&mut self, bp: *mut u8) {
        let id = self.class_of(unsafe { block::size_of(block::header(bp)) });
        let old_head = self.head(id);

        unsafe {
            block::set_list_next(bp, old_head);
            block::set_list_prev(bp, ptr::null_mut());
            if !old_head.is_null() {
                block::set_list_prev(old_head, bp);
            }
        }
        self.set_head(id, bp);
    }

    /// Remove `bp` from whatever class list currently holds it.
    ///
    /// # Safety
    ///
    /// `bp` must currently be linked into its class's list.
    pub unsafe fn unlink(&mut self, bp: *mut u8) {
        let id = self.class_of(unsafe { block::size_of(block::header(bp)) });
        let (prev, next) = unsafe { (block::list_prev(bp), block::list_next(bp)) };

        if prev.is_null() {
            self.set_head(id, next);
        } else {
            unsafe { block::set_list_next(prev, next) };
        }
        if !next.is_null() {
            unsafe { block::set_list_prev(next, prev) };
        }
    }
}
