//! Prime discovery and factorization on top of [`BitSieve`].
//!
//! The prime sieve stores odd numbers only: index `k` stands for `2k + 1`.
//! That halves the storage and lets every strike use an odd step, since the
//! odd multiples of `n` are `n` positions apart in the odd-only index space.

use crate::error::{Error, Result};
use crate::sieve::BitSieve;

/// Sieve of Eratosthenes over the odd numbers `1..=upto`.
///
/// A set bit at index `k` means `2k + 1` is prime. The prime 2 has no slot,
/// so `count()` is one less than the number of primes up to `upto`.
pub fn prime_sieve_upto(upto: usize) -> Result<BitSieve> {
    let odd_count = upto / 2 + upto % 2;
    let mut sieve = BitSieve::with_size(odd_count);
    if sieve.is_empty() {
        return Ok(sieve);
    }

    sieve.set_all();
    sieve.clear(0)?;

    let mut n = 3usize;
    while n.checked_mul(n).is_some_and(|square| square <= upto) {
        if sieve.is_set(n / 2) {
            // everything below n * n was struck by a smaller prime
            sieve.clear_series(n * n / 2, n)?;
        }
        n += 2;
    }

    tracing::debug!(upto, odd_primes = sieve.count(), "sieved primes");
    Ok(sieve)
}

/// Return the primes `<= upto` in ascending order.
pub fn primes_upto(upto: usize) -> Result<Vec<usize>> {
    if upto < 2 {
        return Ok(Vec::new());
    }
    let sieve = prime_sieve_upto(upto)?;
    let odd_primes = sieve.to_positions();

    let mut primes = Vec::with_capacity(odd_primes.len() + 1);
    primes.push(2);
    primes.extend(odd_primes.into_iter().map(|k| 2 * k + 1));
    Ok(primes)
}

/// Smallest-prime-factor table answering factorizations of `1..limit`.
#[derive(Debug, Clone)]
pub struct FactorTable {
    /// `smallest[n]` is the least prime dividing `n` (1 for `n == 1`).
    smallest: Vec<usize>,
}

impl FactorTable {
    /// Build the table for every value below `limit`.
    pub fn new(limit: usize) -> Result<Self> {
        let mut smallest = vec![0usize; limit];
        if limit > 1 {
            smallest[1] = 1;
        }
        for even in (2..limit).step_by(2) {
            smallest[even] = 2;
        }

        let primes = primes_upto(limit.saturating_sub(1))?;
        for &prime in primes.iter().skip(1) {
            // odd multiples only, the evens are done
            for multiple in (prime..limit).step_by(2 * prime) {
                if smallest[multiple] == 0 {
                    smallest[multiple] = prime;
                }
            }
        }

        tracing::debug!(limit, primes = primes.len(), "built factor table");
        Ok(Self { smallest })
    }

    /// Exclusive upper bound of the values this table can factorize.
    pub fn limit(&self) -> usize {
        self.smallest.len()
    }

    /// Return the least prime factor of `n`, or `None` outside `2..limit`.
    pub fn smallest_factor(&self, n: usize) -> Option<usize> {
        match self.smallest.get(n) {
            Some(&factor) if n >= 2 => Some(factor),
            _ => None,
        }
    }

    /// Return true if `n` is a prime below the limit.
    pub fn is_prime(&self, n: usize) -> bool {
        self.smallest_factor(n) == Some(n)
    }

    /// Factorize `n` into ascending `(prime, exponent)` pairs.
    ///
    /// `factorize(1)` is empty. Fails with [`Error::Unfactorable`] for 0
    /// and for values at or above the limit.
    pub fn factorize(&self, n: usize) -> Result<Vec<(usize, u32)>> {
        if n == 0 || n >= self.limit() {
            return Err(Error::Unfactorable {
                value: n,
                limit: self.limit(),
            });
        }

        let mut factors: Vec<(usize, u32)> = Vec::new();
        let mut rest = n;
        while rest > 1 {
            let prime = self.smallest[rest];
            match factors.last_mut() {
                Some((last, exponent)) if *last == prime => *exponent += 1,
                _ => factors.push((prime, 1)),
            }
            rest /= prime;
        }
        Ok(factors)
    }
}
