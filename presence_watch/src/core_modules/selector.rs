//! Strategies for picking one asset out of a non-empty pool.

use rand::Rng;
use std::num::NonZeroUsize;

/// Picks an index in `0..len`. The pool length is never zero.
pub trait AssetSelector {
    fn select(&mut self, len: NonZeroUsize) -> usize;
}

/// Uniform random choice over the pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSelector;

impl AssetSelector for RandomSelector {
    fn select(&mut self, len: NonZeroUsize) -> usize {
        rand::thread_rng().gen_range(0..len.get())
    }
}

/// Always the first asset.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstSelector;

impl AssetSelector for FirstSelector {
    fn select(&mut self, _len: NonZeroUsize) -> usize {
        0
    }
}

/// Round-robin over the pool, shared across categories.
#[derive(Debug, Default, Clone, Copy)]
pub struct CyclingSelector {
    next: usize,
}

impl AssetSelector for CyclingSelector {
    fn select(&mut self, len: NonZeroUsize) -> usize {
        let index = self.next % len.get();
        self.next = self.next.wrapping_add(1);
        index
    }
}
