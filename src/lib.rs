//! # Bit Sieves
//!
//! *Packed bits in fixed storage, scanned a word at a time.*
//!
//! ## Intuition First
//!
//! Picture a long strip of light switches bolted to a wall. You cannot make
//! the wall longer, but you can tape off the end of the strip and say "only
//! these switches count right now". Flipping a switch is instant, and looking
//! at a whole panel of 64 switches at once tells you immediately whether any
//! of them are on.
//!
//! A [`BitSieve`] is that strip: a fixed run of `u64` words (the wall), a
//! movable logical `size` (the tape), and bulk operations that work on whole
//! panels instead of single switches.
//!
//! ## The Problem
//!
//! Sieving algorithms strike out arithmetic progressions in a huge boolean
//! table and then read back the survivors:
//! - **`Vec<bool>`**: one byte per flag, 8x the memory and cache traffic.
//! - **Hash sets of survivors**: sparse output is cheap, but striking is not.
//!
//! Packing bits into words keeps striking cheap, makes counting a
//! `popcount` per word, and lets extraction skip empty words outright.
//!
//! ## Historical Context
//!
//! ```text
//! ~240 BC  Eratosthenes  Strike the multiples of each surviving number
//! 1977     Bays-Hudson   Segmented sieve: process the table in cache-sized pieces
//! 1978     Gries-Misra   Linear sieve: every composite struck exactly once
//! 1981     Pritchard     Wheel sieves: skip multiples of small primes entirely
//! 2008     Nehalem       Hardware POPCNT makes bit counting a single instruction
//! ```
//!
//! ## Mathematical Formulation
//!
//! Bit `i` lives in word $\lfloor i / 64 \rfloor$ at offset $i \bmod 64$.
//! With logical size $n$, the active words are the first
//! $\lceil n / 64 \rceil$. A series operation with start $s$ and step $d$
//! touches $\{ s + kd : k \ge 0,\ s + kd < n \}$.
//!
//! ## Complexity Analysis
//!
//! - **Single-bit ops**: $O(1)$.
//! - **Bulk ops, `count`, `resize`, `is_subset_of`**: $O(n / 64)$.
//! - **Series ops**: $O((n - s) / d)$.
//! - **`to_positions`**: $O(n / 64 + \text{span of set bits in non-zero words})$.
//!
//! ## What Could Go Wrong
//!
//! 1. **Don't-care bits**: `set_all` and `toggle_all` operate on whole words,
//!    so bits past `size` in the last active word may be set. `count` and
//!    extraction mask them; raw `is_set` past `size` does not.
//! 2. **Resize is a reset**: growing or shrinking clears the covered words.
//!
//! ## Implementation Notes
//!
//! This crate provides:
//! - **`BitSieve`**: the packed bit vector with series operations, subset
//!   testing and dense-to-sparse extraction.
//! - **`primes`**: an odd-only sieve of Eratosthenes and a smallest-prime-factor
//!   table built on top of it.
//!
//! ```
//! use bitsieve::BitSieve;
//!
//! let mut sieve = BitSieve::new(100, 128)?;
//! sieve.set_series(3, 10)?;
//! assert_eq!(sieve.count(), 10);
//! assert_eq!(&sieve.to_positions()[..3], &[3, 13, 23]);
//! # Ok::<(), bitsieve::Error>(())
//! ```
//!
//! ## References
//!
//! - Bays, C., & Hudson, R. (1977). "The segmented sieve of Eratosthenes and
//!   primes in arithmetic progressions to 10^12."
//! - Gries, D., & Misra, J. (1978). "A linear sieve algorithm for finding
//!   prime numbers."
//! - Pritchard, P. (1981). "A sublinear additive sieve for finding prime numbers."

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod primes;
pub mod sieve;

pub use error::{Error, Result};
pub use primes::{prime_sieve_upto, primes_upto, FactorTable};
pub use sieve::{BitSieve, Ones, ALL_ONES, WORD_BITS};
