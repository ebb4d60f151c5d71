//! Error types surfaced by the public API.
//!
//! Verification deliberately reports a single boolean and never
//! distinguishes reject causes; the enum below covers the remaining
//! fallible paths: malformed serialized inputs and entropy failure.

use std::error::Error;
use std::fmt;

/// An error from key generation, signing, or deserialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignError {
    /// A serialized key, signature, or envelope had the wrong length,
    /// nonzero reserved padding, or an out-of-range coefficient.
    MalformedInput,
    /// The entropy source failed to produce bytes.
    Entropy,
}

/// Result alias for the fallible operations of this crate.
pub type SignResult<T> = Result<T, SignError>;

impl fmt::Display for SignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInput => write!(f, "malformed serialized input"),
            Self::Entropy => write!(f, "entropy source failure"),
        }
    }
}

impl Error for SignError {}
