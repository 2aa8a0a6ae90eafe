//! Count-Min Frequency Sketch
//!
//! A probabilistic frequency estimator used by the admission filter in
//! [`crate::tinylfu`]. The sketch answers "roughly how often has this
//! key been seen?" in O(depth) time and fixed memory, with one-sided
//! error: it can overcount, never undercount.
//!
//! # Data Structure
//!
//! ```text
//! depth rows × width columns of u32 counters (width is a power of two)
//!
//!            col 0   col 1   col 2  ...  col W-1
//!  row 0   [  0   |   3   |   0   | ... |  1   ]   index = mix(h, 0) & (W-1)
//!  row 1   [  1   |   0   |   2   | ... |  0   ]   index = mix(h, 1) & (W-1)
//!  row 2   [  0   |   0   |   3   | ... |  0   ]   index = mix(h, 2) & (W-1)
//!  row 3   [  2   |   0   |   0   | ... |  3   ]   index = mix(h, 3) & (W-1)
//!
//!  add(h):      increment one counter per row (saturating)
//!  estimate(h): minimum of the same counters
//! ```
//!
//! Each row derives its column from the key hash mixed with a fixed
//! per-row seed, so collisions in one row are independent of collisions
//! in another; taking the minimum across rows bounds the overcount.
//! With width `W` and depth `D` over `N` updates, the estimate exceeds
//! the true count by more than `εN` with probability at most `exp(-D)`,
//! where `ε ≈ e/W`.
//!
//! # Aging
//!
//! [`decay_half`](FrequencySketch::decay_half) right-shifts every
//! counter by one. Callers invoke it periodically so that the sketch
//! tracks recent popularity instead of all-time popularity.

extern crate alloc;

use alloc::boxed::Box;
use alloc::vec;
use core::fmt;

/// Default number of columns per row.
pub const DEFAULT_WIDTH: usize = 4096;

/// Default number of rows.
pub const DEFAULT_DEPTH: usize = 4;

/// Fixed per-row seeds mixed into the key hash to derive each row's
/// column. The column function must not depend on program start, so
/// these are compile-time constants.
const ROW_SEEDS: [u64; 8] = [
    0x9e37_79b1_85eb_ca87,
    0xc2b2_ae3d_27d4_eb4f,
    0x1656_67b1_9e37_79f9,
    0xd6e8_feb8_6659_fd93,
    0x94d0_49bb_1331_11eb,
    0x2545_f491_4f6c_dd1d,
    0x6064_2e2a_3432_6f15,
    0x9e37_79b9_7f4a_7c15,
];

/// Golden-ratio increment used in the avalanche step of the column mix.
const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// A Count-Min sketch over saturating `u32` counters.
///
/// Counters only grow between decay calls (saturating at `u32::MAX`),
/// and [`decay_half`](FrequencySketch::decay_half) halves all of them
/// uniformly. A fully saturated estimate stays `u32::MAX`; the
/// admission filter treats that as "unknown high" and lets the
/// comparison tie.
///
/// The sketch works on pre-computed 64-bit key hashes; the caller owns
/// the key-to-hash mapping so that the same hash feeds the sketch, the
/// store and the shard selector consistently.
///
/// # Example
///
/// ```
/// use predictive_cache::FrequencySketch;
///
/// let mut sketch = FrequencySketch::new(64, 4);
/// assert_eq!(sketch.estimate(0xabcd), 0);
///
/// sketch.add(0xabcd);
/// sketch.add(0xabcd);
/// assert_eq!(sketch.estimate(0xabcd), 2);
///
/// sketch.decay_half();
/// assert_eq!(sketch.estimate(0xabcd), 1);
/// ```
pub struct FrequencySketch {
    depth: usize,
    width: usize,
    mask: u64,
    rows: Box<[u32]>,
}

impl FrequencySketch {
    /// Creates a sketch with the given width and depth.
    ///
    /// The width is rounded up to a power of two so the column lookup is
    /// a mask instead of a modulo; the depth is clamped to at least 1.
    pub fn new(width: usize, depth: usize) -> Self {
        let width = width.max(1).next_power_of_two();
        let depth = depth.max(1);
        FrequencySketch {
            depth,
            width,
            mask: (width - 1) as u64,
            rows: vec![0u32; width * depth].into_boxed_slice(),
        }
    }

    /// Creates a sketch with the default dimensions (4096 × 4).
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_DEPTH)
    }

    /// Returns the number of columns per row.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of rows.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Records one occurrence of the hashed key.
    ///
    /// Increments one counter per row, saturating at `u32::MAX`.
    pub fn add(&mut self, hash: u64) {
        for row in 0..self.depth {
            let idx = row * self.width + self.column(hash, row);
            let counter = &mut self.rows[idx];
            *counter = counter.saturating_add(1);
        }
    }

    /// Returns the estimated occurrence count of the hashed key: the
    /// minimum of its per-row counters.
    ///
    /// Returns 0 only when at least one of the touched counters was
    /// never incremented.
    pub fn estimate(&self, hash: u64) -> u32 {
        let mut min = u32::MAX;
        for row in 0..self.depth {
            let idx = row * self.width + self.column(hash, row);
            min = min.min(self.rows[idx]);
        }
        min
    }

    /// Halves every counter by shifting it right one bit.
    pub fn decay_half(&mut self) {
        for counter in self.rows.iter_mut() {
            *counter >>= 1;
        }
    }

    /// Resets every counter to zero.
    pub fn clear(&mut self) {
        for counter in self.rows.iter_mut() {
            *counter = 0;
        }
    }

    /// Derives the column for `hash` in the given row.
    ///
    /// Pure: the same (hash, row) pair always maps to the same column.
    #[inline]
    fn column(&self, hash: u64, row: usize) -> usize {
        let mut h = hash;
        h ^= ROW_SEEDS[row & (ROW_SEEDS.len() - 1)]
            .wrapping_add(GOLDEN_GAMMA)
            .wrapping_add(h << 6)
            .wrapping_add(h >> 2);
        (h & self.mask) as usize
    }
}

impl fmt::Debug for FrequencySketch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrequencySketch")
            .field("width", &self.width)
            .field("depth", &self.depth)
            .finish()
    }
}
