//! Typed errors for the safe convenience layer in [`crate::segregated`].
//!
//! The raw four-call contract (`allocate`/`release`/`resize`/
//! `zeroed_allocate`) keeps returning null or no-op on failure, matching
//! `malloc`/`free`/`realloc`/`calloc`. `AllocError` is surfaced only by the
//! `try_*` wrappers built on top of it.

#[derive(Debug, thiserror::Error)]
pub enum AllocError {
    #[error("region provider refused to extend heap by {requested} bytes")]
    OutOfAddressSpace { requested: usize },

    #[error("n * size overflowed while computing zeroed_allocate's total size")]
    SizeOverflow,

    #[error("heap consistency check failed: {0}")]
    Corruption(String),
}
