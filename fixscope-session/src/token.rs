/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Monotonic correlation tokens.
//!
//! Tokens are 56-bit values taken from the wall clock in microseconds and
//! bumped past the last issued value when the clock has not advanced, so
//! every call returns a strictly greater token than any call before it.

use chrono::Utc;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Mask keeping the low 56 bits of a token.
pub const TOKEN_MASK: u64 = 0x00FF_FFFF_FFFF_FFFF;

/// A 56-bit correlation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(u64);

impl Token {
    /// Returns the token value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<Token> for u64 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn now_micros() -> u64 {
    u64::try_from(Utc::now().timestamp_micros()).unwrap_or(0)
}

/// Lock-free generator of strictly increasing tokens.
#[derive(Debug)]
pub struct TokenGenerator {
    last: AtomicU64,
}

impl TokenGenerator {
    /// Creates a generator seeded from the current time.
    #[must_use]
    pub fn new() -> Self {
        let seed = now_micros();
        debug!("token generator seeded at {}", seed);
        Self::with_seed(seed)
    }

    /// Creates a generator whose first token is greater than `seed`.
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        Self {
            last: AtomicU64::new(seed),
        }
    }

    /// Issues the next token.
    ///
    /// The candidate is the current time; if it does not exceed the last
    /// issued value it becomes `last + 1`. A failed compare-and-swap means
    /// another caller issued a token first, and the candidate is checked
    /// again against the new value.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&self) -> Token {
        let mut candidate = now_micros();
        let mut last = self.last.load(Ordering::SeqCst);
        loop {
            if candidate <= last {
                candidate = last.wrapping_add(1);
            }
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return Token(candidate & TOKEN_MASK),
                Err(current) => last = current,
            }
        }
    }

    /// Returns the last issued token (or the seed) without issuing a new one.
    #[must_use]
    pub fn last(&self) -> Token {
        Token(self.last.load(Ordering::SeqCst) & TOKEN_MASK)
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}
