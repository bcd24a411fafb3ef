//! Node identifiers.
//!
//! An identifier is a numeric header followed by a body drawn from lowercase
//! letters, digits and underscore. No hyphens and no uppercase, so the token
//! survives case-insensitive or normalized attribute and class handling.

use std::collections::HashSet;
use std::fmt;

use rand::{Rng, RngCore};
use thiserror::Error;

pub const HEADER_ALPHABET: &[u8] = b"0123456789";
pub const BODY_ALPHABET: &[u8] = b"0123456789_abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdFormat {
    pub header_len: usize,
    pub body_len: usize,
}

impl Default for IdFormat {
    fn default() -> Self {
        Self {
            header_len: 2,
            body_len: 14,
        }
    }
}

impl IdFormat {
    /// Number of distinct identifiers the format can produce, or `None` if
    /// it does not fit in a `u128`.
    pub fn capacity(&self) -> Option<u128> {
        let header = u128::try_from(HEADER_ALPHABET.len())
            .ok()?
            .checked_pow(u32::try_from(self.header_len).ok()?)?;
        let body = u128::try_from(BODY_ALPHABET.len())
            .ok()?
            .checked_pow(u32::try_from(self.body_len).ok()?)?;
        header.checked_mul(body)
    }

    /// Whether `s` could have been produced with this format.
    pub fn matches(&self, s: &str) -> bool {
        let b = s.as_bytes();
        b.len() == self.header_len + self.body_len
            && b[..self.header_len].iter().all(|c| HEADER_ALPHABET.contains(c))
            && b[self.header_len..].iter().all(|c| BODY_ALPHABET.contains(c))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    /// Wrap an existing token without validating it.
    pub fn new_unchecked(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Draws per call before giving up on finding a free identifier.
pub const MAX_REDRAWS: usize = 4096;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("identifier format needs a non-empty body")]
    EmptyBody,

    #[error("all {capacity} identifiers of the format are in use")]
    Exhausted { capacity: u128 },

    #[error("no free identifier after {0} draws")]
    TooManyCollisions(usize),
}

/// Allocates identifiers, redrawing any token it has already issued or been
/// told to avoid.
pub struct IdGenerator {
    format: IdFormat,
    issued: HashSet<Identifier>,
    /// How many entries of `issued` the format could have produced.
    in_format: u128,
    rng: Box<dyn RngCore>,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(IdFormat::default())
    }
}

impl IdGenerator {
    pub fn new(format: IdFormat) -> Self {
        Self::with_rng(format, rand::rng())
    }

    /// Use a caller supplied random source, e.g. a seeded one in tests.
    pub fn with_rng(format: IdFormat, rng: impl RngCore + 'static) -> Self {
        Self {
            format,
            issued: HashSet::new(),
            in_format: 0,
            rng: Box::new(rng),
        }
    }

    /// Register identifiers already in use, e.g. the markers of a host
    /// document the new tree will be grafted into.
    pub fn excluding<'a>(mut self, taken: impl IntoIterator<Item = &'a Identifier>) -> Self {
        for id in taken {
            if self.issued.insert(id.clone()) && self.format.matches(id.as_str()) {
                self.in_format += 1;
            }
        }
        self
    }

    pub fn format(&self) -> IdFormat {
        self.format
    }

    pub fn issued(&self) -> usize {
        self.issued.len()
    }

    /// A fresh identifier, never issued or excluded before.
    ///
    /// Fails instead of looping when the format cannot produce one: an empty
    /// body, every identifier of the format taken, or [`MAX_REDRAWS`]
    /// consecutive collisions in a nearly full space.
    pub fn next(&mut self) -> Result<Identifier, IdError> {
        if self.format.body_len == 0 {
            return Err(IdError::EmptyBody);
        }
        if let Some(capacity) = self.format.capacity() {
            if self.in_format >= capacity {
                return Err(IdError::Exhausted { capacity });
            }
        }
        for _ in 0..MAX_REDRAWS {
            let id = self.draw();
            if self.issued.insert(id.clone()) {
                self.in_format += 1;
                return Ok(id);
            }
            tracing::debug!(id = %id, "identifier collision, redrawing");
        }
        Err(IdError::TooManyCollisions(MAX_REDRAWS))
    }

    fn draw(&mut self) -> Identifier {
        let mut s = String::with_capacity(self.format.header_len + self.format.body_len);
        for _ in 0..self.format.header_len {
            let idx = self.rng.random_range(0..HEADER_ALPHABET.len());
            s.push(HEADER_ALPHABET[idx] as char);
        }
        for _ in 0..self.format.body_len {
            let idx = self.rng.random_range(0..BODY_ALPHABET.len());
            s.push(BODY_ALPHABET[idx] as char);
        }
        Identifier(s)
    }
}

impl fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdGenerator")
            .field("format", &self.format)
            .field("issued", &self.issued.len())
            .finish()
    }
}
