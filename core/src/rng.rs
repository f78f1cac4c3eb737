//! Park-Miller Lehmer generator (MINSTD)
//!
//! Maze generation draws every random choice from this generator so that a
//! seed fully determines the grid on every platform. Only integer arithmetic
//! is used.
//!
//! Constants:
//! - Multiplier (a): 48271
//! - Modulus (m): 2^31 - 1 = 2147483647
//!
//! Reference: https://en.wikipedia.org/wiki/Lehmer_random_number_generator

const MULTIPLIER: u64 = 48271;
const MODULUS: u64 = 2147483647; // 2^31 - 1

/// Seedable Lehmer generator owned by a single generation call.
#[derive(Clone, Debug)]
pub struct LehmerRng {
    state: u32,
}

impl LehmerRng {
    /// Create a generator from a seed.
    ///
    /// The seed is reduced modulo 2^31 - 1; a zero residue is replaced with 1
    /// to avoid the degenerate all-zero sequence.
    pub fn new(seed: u32) -> Self {
        let state = (seed as u64 % MODULUS) as u32;
        Self {
            state: if state == 0 { 1 } else { state },
        }
    }

    /// Draw a fresh seed from OS-backed entropy.
    ///
    /// Used only when the caller does not supply a seed; the drawn value is
    /// recorded on the grid so the episode can be replayed.
    pub fn entropy_seed() -> u32 {
        rand::random::<u32>()
    }

    fn advance(&mut self) {
        self.state = ((self.state as u64 * MULTIPLIER) % MODULUS) as u32;
    }

    /// Choose a random index in `[0, len)`.
    ///
    /// Computes `(state * len) / m` after advancing. `len` must be non-zero.
    pub fn choice_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "choice_index requires a non-empty range");
        self.advance();
        ((self.state as u64 * len as u64) / MODULUS) as usize
    }

    /// Pick `count` distinct indices from `[0, len)` with a partial
    /// Fisher-Yates shuffle.
    ///
    /// Returns `None` when `count > len`.
    pub fn sample_indices(&mut self, len: usize, count: usize) -> Option<Vec<usize>> {
        if count > len {
            return None;
        }

        let mut indices: Vec<usize> = (0..len).collect();
        for i in 0..count {
            let j = i + self.choice_index(len - i);
            indices.swap(i, j);
        }
        indices.truncate(count);
        Some(indices)
    }
}
