//! Fixed-capacity packed bit sieve.
//!
//! Bits are packed into `u64` words. Storage is sized once at construction
//! and never reallocated; only the logical `size` moves.
//!
//! # Layout
//!
//! ```text
//! word 0          word 1          ...  word k (partial)     word k+1 ..
//! [bits 0..64)    [bits 64..128)       [.. size | don't care] [beyond size]
//! |<------------------ active words ------------------>|
//! |<------------------------- capacity ------------------------------->|
//! ```
//!
//! Position `i` lives in word `i / 64` at offset `i % 64`. Bulk operations
//! touch exactly the active words (those at least partially covered by
//! `size`). Bits past `size` inside the last active word are "don't care":
//! `count`, `to_positions` and `ones` mask them out, while `toggle_all`
//! and `set_all` happily flip them.
//!
//! # Bounds checking
//!
//! `set`, `clear` and `toggle` are checked against `size`. `is_set`, the
//! bulk operations and the series operations are not: `is_set` reads the
//! physical bit (panicking only past the physical capacity), and series
//! operations stop at `size` on their own.

use std::fmt;
use std::fmt::Write as _;

use crate::error::{Error, Result};

/// Number of bits in one storage word.
pub const WORD_BITS: usize = u64::BITS as usize;

/// A storage word with every bit set.
pub const ALL_ONES: u64 = u64::MAX;

/// Split a bit index into `(word index, bit offset)`.
#[inline]
fn bit_position(index: usize) -> (usize, usize) {
    (index / WORD_BITS, index % WORD_BITS)
}

/// Number of words touched by the first `len` bits.
#[inline]
fn words_spanned(len: usize) -> usize {
    let (word, offset) = bit_position(len);
    if offset > 0 {
        word + 1
    } else {
        word
    }
}

/// Mask selecting the low `bits` bits of a word (`bits < 64`).
#[inline]
fn low_mask(bits: usize) -> u64 {
    (1u64 << bits) - 1
}

/// A packed bit vector with a fixed capacity and a resizable logical size.
#[derive(Clone)]
pub struct BitSieve {
    /// Packed bits, fixed length for the lifetime of the sieve.
    words: Box<[u64]>,
    /// Logical length in bits, never above `words.len() * 64`.
    size: usize,
}

impl fmt::Debug for BitSieve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitSieve")
            .field("size", &self.size)
            .field("capacity", &self.capacity())
            .field("ones", &self.count())
            .finish()
    }
}

impl BitSieve {
    /// Create a cleared sieve of `size` bits backed by at least `capacity` bits.
    ///
    /// Capacity is rounded up to whole words. Fails with
    /// [`Error::ResizeOutOfRange`] if `size` exceeds the rounded capacity.
    pub fn new(size: usize, capacity: usize) -> Result<Self> {
        let words = vec![0u64; words_spanned(capacity)].into_boxed_slice();
        let physical = words.len() * WORD_BITS;
        if size > physical {
            return Err(Error::ResizeOutOfRange {
                requested: size,
                capacity: physical,
            });
        }
        tracing::debug!(size, capacity = physical, "created bit sieve");
        Ok(Self { words, size })
    }

    /// Create a cleared sieve whose capacity is just enough for `size` bits.
    pub fn with_size(size: usize) -> Self {
        Self {
            words: vec![0u64; words_spanned(size)].into_boxed_slice(),
            size,
        }
    }

    /// Return the logical number of bits.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Return true if the logical size is 0.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Return the number of bits backed by storage.
    pub fn capacity(&self) -> usize {
        self.words.len() * WORD_BITS
    }

    /// Return the number of storage words.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Number of words at least partially covered by the current size.
    fn active_words(&self) -> usize {
        words_spanned(self.size)
    }

    fn checked_position(&self, index: usize) -> Result<(usize, usize)> {
        if index >= self.size {
            return Err(Error::PositionOutOfRange {
                position: index,
                size: self.size,
            });
        }
        Ok(bit_position(index))
    }

    /// Set the bit at `index`.
    pub fn set(&mut self, index: usize) -> Result<()> {
        let (word, bit) = self.checked_position(index)?;
        self.words[word] |= 1u64 << bit;
        Ok(())
    }

    /// Clear the bit at `index`.
    pub fn clear(&mut self, index: usize) -> Result<()> {
        let (word, bit) = self.checked_position(index)?;
        self.words[word] &= !(1u64 << bit);
        Ok(())
    }

    /// Flip the bit at `index`.
    pub fn toggle(&mut self, index: usize) -> Result<()> {
        let (word, bit) = self.checked_position(index)?;
        self.words[word] ^= 1u64 << bit;
        Ok(())
    }

    /// Return true if the physical bit at `index` is set.
    ///
    /// No check against `size`: positions in `size..capacity` read whatever
    /// the storage holds. Use [`BitSieve::get`] for a size-checked read.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity()`.
    #[inline]
    pub fn is_set(&self, index: usize) -> bool {
        let (word, bit) = bit_position(index);
        self.words[word] & (1u64 << bit) != 0
    }

    /// Return the bit at `index`, or `None` if `index >= size`.
    pub fn get(&self, index: usize) -> Option<bool> {
        (index < self.size).then(|| self.is_set(index))
    }

    /// Set every bit of the active words.
    pub fn set_all(&mut self) {
        let active = self.active_words();
        self.words[..active].fill(ALL_ONES);
    }

    /// Clear every bit of the active words.
    pub fn clear_all(&mut self) {
        let active = self.active_words();
        self.words[..active].fill(0);
    }

    /// Flip every bit of the active words, including the don't-care tail.
    pub fn toggle_all(&mut self) {
        let active = self.active_words();
        for word in &mut self.words[..active] {
            *word = !*word;
        }
    }

    /// Return the number of set bits in `[0, size)`.
    pub fn count(&self) -> usize {
        let (full, offset) = bit_position(self.size);
        let mut count: usize = self.words[..full]
            .iter()
            .map(|word| word.count_ones() as usize)
            .sum();
        if offset > 0 {
            count += (self.words[full] & low_mask(offset)).count_ones() as usize;
        }
        count
    }

    /// Change the logical size to `size` and clear everything it covers.
    ///
    /// This is a reset, not a preserving resize. Storage is never
    /// reallocated. Fails with [`Error::ResizeOutOfRange`] above the
    /// capacity, leaving the sieve untouched.
    pub fn resize(&mut self, size: usize) -> Result<()> {
        let capacity = self.capacity();
        if size > capacity {
            return Err(Error::ResizeOutOfRange {
                requested: size,
                capacity,
            });
        }
        let active = words_spanned(size);
        self.words[..active].fill(0);
        tracing::trace!(from = self.size, to = size, "resized bit sieve");
        self.size = size;
        Ok(())
    }

    /// Set `start, start + step, start + 2 * step, ...` below `size`.
    ///
    /// Fails with [`Error::ZeroStep`] before touching any bit if `step == 0`.
    pub fn set_series(&mut self, start: usize, step: usize) -> Result<()> {
        if step == 0 {
            return Err(Error::ZeroStep);
        }
        for index in (start..self.size).step_by(step) {
            let (word, bit) = bit_position(index);
            self.words[word] |= 1u64 << bit;
        }
        Ok(())
    }

    /// Clear `start, start + step, start + 2 * step, ...` below `size`.
    ///
    /// Fails with [`Error::ZeroStep`] before touching any bit if `step == 0`.
    pub fn clear_series(&mut self, start: usize, step: usize) -> Result<()> {
        if step == 0 {
            return Err(Error::ZeroStep);
        }
        for index in (start..self.size).step_by(step) {
            let (word, bit) = bit_position(index);
            self.words[word] &= !(1u64 << bit);
        }
        Ok(())
    }

    /// Return the ascending positions of all set bits in `[0, size)`.
    pub fn to_positions(&self) -> Vec<usize> {
        let (positions, stats) = self.scan_positions();
        tracing::trace!(
            ones = positions.len(),
            words_skipped = stats.words_skipped,
            words_scanned = stats.words_scanned,
            bits_probed = stats.bits_probed,
            "extracted sieve positions"
        );
        positions
    }

    /// Dense-to-sparse extraction, reporting how much scanning it did.
    ///
    /// Zero words are skipped outright. Non-zero full words are probed only
    /// between their lowest and highest set bit. The partial trailing word
    /// is probed over its valid offsets.
    pub(crate) fn scan_positions(&self) -> (Vec<usize>, ScanStats) {
        let (full, offset) = bit_position(self.size);
        let mut positions = Vec::with_capacity(self.count());
        let mut stats = ScanStats::default();

        for (word_index, &word) in self.words[..full].iter().enumerate() {
            if word == 0 {
                stats.words_skipped += 1;
                continue;
            }
            stats.words_scanned += 1;
            let base = word_index * WORD_BITS;
            let low = word.trailing_zeros() as usize;
            let high = WORD_BITS - word.leading_zeros() as usize;
            for bit in low..high {
                stats.bits_probed += 1;
                if word & (1u64 << bit) != 0 {
                    positions.push(base + bit);
                }
            }
        }

        if offset > 0 {
            let word = self.words[full];
            let base = full * WORD_BITS;
            stats.words_scanned += 1;
            for bit in 0..offset {
                stats.bits_probed += 1;
                if word & (1u64 << bit) != 0 {
                    positions.push(base + bit);
                }
            }
        }

        (positions, stats)
    }

    /// Iterate lazily over the ascending positions of set bits in `[0, size)`.
    pub fn ones(&self) -> Ones<'_> {
        let words = &self.words[..self.active_words()];
        let tail_bits = self.size % WORD_BITS;
        Ones {
            words,
            tail_bits,
            word_index: 0,
            current: masked_word(words, 0, tail_bits),
        }
    }

    /// Return true if every set bit of `self`'s active words is set in `other`.
    ///
    /// Whole words are compared, don't-care tail bits included. Words of
    /// `self` beyond `other`'s storage must be zero for the result to hold.
    pub fn is_subset_of(&self, other: &BitSieve) -> bool {
        let active = self.active_words();
        let shared = active.min(other.words.len());
        self.words[..shared]
            .iter()
            .zip(&other.words[..shared])
            .all(|(&mine, &theirs)| mine & theirs == mine)
            && self.words[shared..active].iter().all(|&word| word == 0)
    }

    /// Render the raw words covering positions `from..=to` in binary.
    ///
    /// One 64-digit line per word, most significant bit first. The range is
    /// clamped to storage; an empty string is returned for an empty range.
    pub fn print_range(&self, from: usize, to: usize) -> String {
        let Some(last) = self.words.len().checked_sub(1) else {
            return String::new();
        };
        if from > to {
            return String::new();
        }
        let first = (from / WORD_BITS).min(last);
        let end = (to / WORD_BITS).min(last);
        let mut out = String::with_capacity((end - first + 1) * (WORD_BITS + 1));
        for word in &self.words[first..=end] {
            let _ = writeln!(out, "{word:064b}");
        }
        out
    }
}

/// Counters collected by [`BitSieve::scan_positions`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScanStats {
    /// Zero words passed over without probing.
    pub(crate) words_skipped: usize,
    /// Words probed bit by bit.
    pub(crate) words_scanned: usize,
    /// Individual bit tests performed.
    pub(crate) bits_probed: usize,
}

/// Load word `index`, masking off the don't-care tail of the last word.
fn masked_word(words: &[u64], index: usize, tail_bits: usize) -> u64 {
    match words.get(index) {
        Some(&word) if index + 1 == words.len() && tail_bits > 0 => word & low_mask(tail_bits),
        Some(&word) => word,
        None => 0,
    }
}

/// Iterator over set positions, created by [`BitSieve::ones`].
#[derive(Debug, Clone)]
pub struct Ones<'a> {
    words: &'a [u64],
    tail_bits: usize,
    word_index: usize,
    current: u64,
}

impl Iterator for Ones<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(self.word_index * WORD_BITS + bit);
            }
            if self.word_index + 1 >= self.words.len() {
                return None;
            }
            self.word_index += 1;
            self.current = masked_word(self.words, self.word_index, self.tail_bits);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_positions(sieve: &BitSieve) -> Vec<usize> {
        (0..sieve.size()).filter(|&i| sieve.is_set(i)).collect()
    }

    #[test]
    fn test_new_rounds_capacity_to_words() {
        let sieve = BitSieve::new(10, 100).unwrap();
        assert_eq!(sieve.size(), 10);
        assert_eq!(sieve.word_count(), 2);
        assert_eq!(sieve.capacity(), 128);
        assert_eq!(sieve.count(), 0);

        // size may use the rounded-up capacity
        assert!(BitSieve::new(128, 100).is_ok());
        assert_eq!(
            BitSieve::new(129, 100).unwrap_err(),
            Error::ResizeOutOfRange {
                requested: 129,
                capacity: 128
            }
        );
    }

    #[test]
    fn test_empty_sieve() {
        let mut sieve = BitSieve::new(0, 0).unwrap();
        assert!(sieve.is_empty());
        assert_eq!(sieve.capacity(), 0);
        sieve.set_all();
        sieve.toggle_all();
        assert_eq!(sieve.count(), 0);
        assert!(sieve.to_positions().is_empty());
        assert_eq!(sieve.ones().next(), None);
        assert_eq!(sieve.print_range(0, 10), "");
        assert!(sieve.is_subset_of(&BitSieve::with_size(64)));
    }

    #[test]
    fn test_single_bit_ops() {
        let mut sieve = BitSieve::with_size(130);
        sieve.set(0).unwrap();
        sieve.set(64).unwrap();
        sieve.set(129).unwrap();
        assert!(sieve.is_set(0) && sieve.is_set(64) && sieve.is_set(129));
        assert_eq!(sieve.count(), 3);

        sieve.clear(64).unwrap();
        assert!(!sieve.is_set(64));

        sieve.toggle(5).unwrap();
        assert!(sieve.is_set(5));
        sieve.toggle(5).unwrap();
        assert!(!sieve.is_set(5));
        assert_eq!(sieve.to_positions(), vec![0, 129]);
    }

    #[test]
    fn test_checked_ops_reject_positions_past_size() {
        let mut sieve = BitSieve::new(10, 64).unwrap();
        let err = Error::PositionOutOfRange {
            position: 10,
            size: 10,
        };
        assert_eq!(sieve.set(10), Err(err.clone()));
        assert_eq!(sieve.clear(10), Err(err.clone()));
        assert_eq!(sieve.toggle(10), Err(err));
        assert_eq!(sieve.get(10), None);
        assert_eq!(sieve.get(9), Some(false));
    }

    #[test]
    fn test_is_set_reads_past_size() {
        let mut sieve = BitSieve::new(10, 64).unwrap();
        sieve.set_all();
        // the whole active word is filled, not just [0, 10)
        assert!(sieve.is_set(40));
        assert_eq!(sieve.get(40), None);
        assert_eq!(sieve.count(), 10);
    }

    #[test]
    fn test_bulk_ops_leave_inactive_words_alone() {
        let mut sieve = BitSieve::new(64, 256).unwrap();
        sieve.set_all();
        assert_eq!(sieve.count(), 64);
        assert!(!sieve.is_set(64));

        sieve.toggle_all();
        assert_eq!(sieve.count(), 0);
        assert!(!sieve.is_set(200));

        sieve.set_all();
        sieve.clear_all();
        assert_eq!(sieve.count(), 0);
    }

    #[test]
    fn test_count_ignores_dont_care_tail() {
        let mut sieve = BitSieve::new(70, 128).unwrap();
        sieve.toggle_all();
        assert_eq!(sieve.count(), 70);
        assert_eq!(sieve.to_positions().len(), 70);
        assert_eq!(sieve.ones().count(), 70);
    }

    #[test]
    fn test_resize_clears_and_respects_capacity() {
        let mut sieve = BitSieve::new(50, 200).unwrap();
        sieve.set_all();

        sieve.resize(150).unwrap();
        assert_eq!(sieve.size(), 150);
        assert_eq!(sieve.count(), 0);

        sieve.set_all();
        sieve.resize(20).unwrap();
        assert_eq!(sieve.count(), 0);

        sieve.set(3).unwrap();
        assert_eq!(
            sieve.resize(257),
            Err(Error::ResizeOutOfRange {
                requested: 257,
                capacity: 256
            })
        );
        assert_eq!(sieve.size(), 20);
        assert!(sieve.is_set(3));

        sieve.resize(256).unwrap();
        assert_eq!(sieve.word_count(), 4);
    }

    #[test]
    fn test_series_ops() {
        let mut sieve = BitSieve::with_size(100);
        sieve.set_series(3, 7).unwrap();
        let expected: Vec<usize> = (3..100).step_by(7).collect();
        assert_eq!(sieve.to_positions(), expected);

        sieve.clear_series(10, 14).unwrap();
        let expected: Vec<usize> = (3..100)
            .step_by(7)
            .filter(|i| *i < 10 || (i - 10) % 14 != 0)
            .collect();
        assert_eq!(sieve.to_positions(), expected);

        // start past size is a no-op
        sieve.set_series(100, 1).unwrap();
        sieve.set_series(500, 3).unwrap();
        assert_eq!(sieve.to_positions(), expected);
    }

    #[test]
    fn test_series_rejects_zero_step() {
        let mut sieve = BitSieve::with_size(10);
        assert_eq!(sieve.set_series(0, 0), Err(Error::ZeroStep));
        assert_eq!(sieve.clear_series(0, 0), Err(Error::ZeroStep));
        assert_eq!(sieve.count(), 0);
    }

    #[test]
    fn test_scan_skips_zero_words() {
        let mut sieve = BitSieve::with_size(64 * 8 + 5);
        sieve.set(64 * 2 + 10).unwrap();
        sieve.set(64 * 2 + 12).unwrap();
        sieve.set(64 * 6 + 63).unwrap();
        sieve.set(64 * 8 + 1).unwrap();

        let (positions, stats) = sieve.scan_positions();
        assert_eq!(positions, naive_positions(&sieve));
        assert_eq!(stats.words_skipped, 6);
        // two non-zero full words plus the partial tail
        assert_eq!(stats.words_scanned, 3);
        // bits 10..13 of word 2, bit 63 of word 6, offsets 0..5 of the tail
        assert_eq!(stats.bits_probed, 3 + 1 + 5);
    }

    #[test]
    fn test_scan_full_word() {
        let mut sieve = BitSieve::with_size(128);
        sieve.set_all();
        let (positions, stats) = sieve.scan_positions();
        assert_eq!(positions, (0..128).collect::<Vec<_>>());
        assert_eq!(stats.bits_probed, 128);
        assert_eq!(stats.words_skipped, 0);
    }

    #[test]
    fn test_ones_matches_positions() {
        let mut sieve = BitSieve::new(200, 320).unwrap();
        sieve.set_series(1, 3).unwrap();
        sieve.toggle(199).unwrap();
        sieve.toggle_all();
        let lazy: Vec<usize> = sieve.ones().collect();
        assert_eq!(lazy, sieve.to_positions());
        assert_eq!(lazy, naive_positions(&sieve));
    }

    #[test]
    fn test_subset() {
        let mut small = BitSieve::with_size(100);
        let mut big = BitSieve::with_size(100);
        small.set_series(0, 10).unwrap();
        big.set_series(0, 5).unwrap();

        assert!(small.is_subset_of(&big));
        assert!(!big.is_subset_of(&small));
        assert!(small.is_subset_of(&small));
        assert!(BitSieve::with_size(100).is_subset_of(&small));
    }

    #[test]
    fn test_subset_across_sizes() {
        let mut wide = BitSieve::with_size(300);
        let mut narrow = BitSieve::with_size(64);
        narrow.set(3).unwrap();
        wide.set(3).unwrap();
        assert!(wide.is_subset_of(&narrow));

        // a set bit where `narrow` has no storage
        wide.set(250).unwrap();
        assert!(!wide.is_subset_of(&narrow));
        assert!(narrow.is_subset_of(&wide));
    }

    #[test]
    fn test_print_range() {
        let mut sieve = BitSieve::with_size(130);
        sieve.set(0).unwrap();
        sieve.set(65).unwrap();
        sieve.set(66).unwrap();

        let dump = sieve.print_range(0, 70);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], format!("{}1", "0".repeat(63)));
        assert_eq!(lines[1], format!("{}110", "0".repeat(61)));

        assert_eq!(sieve.print_range(64, 10_000).lines().count(), 2);
        assert_eq!(sieve.print_range(70, 3), "");
    }

    #[test]
    fn test_debug_shows_shape() {
        let mut sieve = BitSieve::new(3, 64).unwrap();
        sieve.set(1).unwrap();
        assert_eq!(
            format!("{sieve:?}"),
            "BitSieve { size: 3, capacity: 64, ones: 1 }"
        );
    }

    #[test]
    fn test_odd_sieve_regression() {
        // odd-only sieve for 1000: index k is 2k + 1
        let mut sieve = BitSieve::new(500, 1000).unwrap();
        sieve.set_all();
        sieve.clear(0).unwrap();
        let mut n = 3;
        while n * n <= 1000 {
            if sieve.is_set(n / 2) {
                sieve.clear_series(3 * n / 2, n).unwrap();
            }
            n += 2;
        }
        // 168 primes below 1000, minus 2 which has no odd slot
        assert_eq!(sieve.count(), 167);
        sieve.toggle_all();
        assert_eq!(sieve.count(), 500 - 167);
    }
}
