//! TEAM_431: Bitmap identifier allocator.
//!
//! Hands out integers from a fixed inclusive range. Freed identifiers become
//! allocatable again, but the search resumes after the most recently issued
//! one so a just-released identifier is not handed straight back out.

use alloc::vec;
use alloc::vec::Vec;

const WORD_BITS: usize = u64::BITS as usize;

/// Next-fit bitmap allocator over `min..=max`.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    min: usize,
    capacity: usize,
    bits: Vec<u64>,
    /// Slot index (relative to `min`) where the next search starts.
    cursor: usize,
    live: usize,
}

impl IdAllocator {
    /// Create an allocator for `min..=max`. An inverted range yields an
    /// allocator with no capacity.
    #[must_use]
    pub fn new(min: usize, max: usize) -> Self {
        let capacity = max.checked_sub(min).map_or(0, |span| span.saturating_add(1));
        Self {
            min,
            capacity,
            bits: vec![0; capacity.div_ceil(WORD_BITS)],
            cursor: 0,
            live: 0,
        }
    }

    /// Allocate the next free identifier, or `None` if every slot is taken.
    pub fn alloc(&mut self) -> Option<usize> {
        if self.live == self.capacity {
            return None;
        }
        for step in 0..self.capacity {
            let slot = (self.cursor + step) % self.capacity;
            if !self.test(slot) {
                self.set(slot, true);
                self.live += 1;
                self.cursor = (slot + 1) % self.capacity;
                return Some(self.min + slot);
            }
        }
        None
    }

    /// Release `id`. Returns false if it was not allocated.
    pub fn free(&mut self, id: usize) -> bool {
        match self.slot(id) {
            Some(slot) if self.test(slot) => {
                self.set(slot, false);
                self.live -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn is_allocated(&self, id: usize) -> bool {
        self.slot(id).is_some_and(|slot| self.test(slot))
    }

    /// Number of identifiers currently allocated.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn slot(&self, id: usize) -> Option<usize> {
        id.checked_sub(self.min).filter(|&slot| slot < self.capacity)
    }

    fn test(&self, slot: usize) -> bool {
        self.bits[slot / WORD_BITS] & (1 << (slot % WORD_BITS)) != 0
    }

    fn set(&mut self, slot: usize, used: bool) {
        let mask = 1u64 << (slot % WORD_BITS);
        let word = &mut self.bits[slot / WORD_BITS];
        if used {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }
}
