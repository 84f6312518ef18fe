//! Short-code allocation.
//!
//! Each attempt draws a random candidate and reserves it with a single
//! [`LinkStore::put_if_absent`] call, so there is no gap between "is this
//! code free?" and "take it". Attempts are capped; running out of them
//! surfaces as [`AllocateError::Exhausted`].
//!
//! Capacity planning: with `n` live codes in a space of size `S`
//! (`alphabet.len() ^ length`), each attempt collides with probability
//! `n / S`, so the expected number of attempts is `1 / (1 - n / S)` and the
//! chance of exhausting `k` attempts is `(n / S) ^ k`. The defaults
//! (62 symbols, length 6, 10 attempts) give `S ≈ 5.7e10`; even at 50% fill
//! an allocation fails only about once per thousand requests. Widen the
//! code length well before that point.

use crate::store::{LinkStore, StoreError};
use rand::Rng;
use std::collections::HashSet;

/// `[a-zA-Z0-9]`
pub const DEFAULT_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const DEFAULT_CODE_LENGTH: usize = 6;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

#[derive(Debug, thiserror::Error)]
pub enum AllocateError {
    /// Every candidate drawn collided with an existing record.
    #[error("no free short code found after {attempts} attempt(s)")]
    Exhausted { attempts: u32 },

    /// The store failed mid-allocation. The candidate may or may not be
    /// taken; it is not retried.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocatorConfigError {
    #[error("code alphabet must not be empty")]
    EmptyAlphabet,
    #[error("code alphabet contains '{0}' more than once")]
    DuplicateSymbol(char),
    #[error("code length must be at least 1")]
    ZeroLength,
    #[error("max allocation attempts must be at least 1")]
    ZeroAttempts,
}

#[derive(Debug, Clone)]
pub struct CodeAllocator {
    alphabet: Vec<char>,
    length: usize,
    max_attempts: u32,
}

impl CodeAllocator {
    pub fn new(
        alphabet: &str,
        length: usize,
        max_attempts: u32,
    ) -> Result<Self, AllocatorConfigError> {
        if alphabet.is_empty() {
            return Err(AllocatorConfigError::EmptyAlphabet);
        }
        let mut seen = HashSet::new();
        if let Some(dup) = alphabet.chars().find(|c| !seen.insert(*c)) {
            return Err(AllocatorConfigError::DuplicateSymbol(dup));
        }
        if length == 0 {
            return Err(AllocatorConfigError::ZeroLength);
        }
        if max_attempts == 0 {
            return Err(AllocatorConfigError::ZeroAttempts);
        }

        Ok(Self {
            alphabet: alphabet.chars().collect(),
            length,
            max_attempts,
        })
    }

    /// Default alphabet with the given length and retry bound.
    pub fn with_length(length: usize, max_attempts: u32) -> Result<Self, AllocatorConfigError> {
        Self::new(DEFAULT_ALPHABET, length, max_attempts)
    }

    /// Reserve a fresh code for `target_url` and return it.
    pub async fn allocate(
        &self,
        store: &dyn LinkStore,
        target_url: &str,
    ) -> Result<String, AllocateError> {
        for attempt in 1..=self.max_attempts {
            let candidate = self.random_code();
            if store.put_if_absent(&candidate, target_url).await? {
                tracing::debug!("Allocated short code '{}' on attempt {}", candidate, attempt);
                return Ok(candidate);
            }
            tracing::debug!(
                "Short code '{}' already taken (attempt {}/{})",
                candidate,
                attempt,
                self.max_attempts
            );
        }

        tracing::warn!(
            "Short code allocation exhausted after {} attempts; consider a longer CODE_LENGTH",
            self.max_attempts
        );
        Err(AllocateError::Exhausted {
            attempts: self.max_attempts,
        })
    }

    /// Number of distinct codes this allocator can produce, saturating at
    /// `u64::MAX`.
    pub fn code_space(&self) -> u64 {
        u32::try_from(self.length)
            .ok()
            .and_then(|len| (self.alphabet.len() as u64).checked_pow(len))
            .unwrap_or(u64::MAX)
    }

    /// Fraction of the code space already taken by `existing` codes.
    pub fn fill_ratio(&self, existing: u64) -> f64 {
        (existing as f64 / self.code_space() as f64).min(1.0)
    }

    /// Expected attempts per allocation with `existing` codes taken, or
    /// `None` once the space is full.
    pub fn expected_attempts(&self, existing: u64) -> Option<f64> {
        let free = 1.0 - self.fill_ratio(existing);
        (free > 0.0).then(|| 1.0 / free)
    }

    /// Draw one candidate uniformly from the code space.
    fn random_code(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.length)
            .map(|_| self.alphabet[rng.gen_range(0..self.alphabet.len())])
            .collect()
    }
}

impl Default for CodeAllocator {
    fn default() -> Self {
        Self {
            alphabet: DEFAULT_ALPHABET.chars().collect(),
            length: DEFAULT_CODE_LENGTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}
