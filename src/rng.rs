//! The entropy source abstraction.
//!
//! Key generation and signing take their randomness as a parameter
//! rather than reaching for a process-wide generator, so that the
//! deterministic KAT generator ([`crate::drbg::NistCtrDrbg`]) can be
//! swapped in for reproducible test vectors.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::errors::{SignError, SignResult};

/// A source of random bytes.
pub trait RandomSource {
    /// Fill `buf` entirely, or report an entropy failure.
    fn fill(&mut self, buf: &mut [u8]) -> SignResult<()>;
}

/// Operating-system entropy via [`rand::rngs::OsRng`].
#[derive(Clone, Copy, Debug, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&mut self, buf: &mut [u8]) -> SignResult<()> {
        OsRng.try_fill_bytes(buf).map_err(|_| SignError::Entropy)
    }
}
