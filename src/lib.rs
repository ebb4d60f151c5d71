//! Masked Raccoon lattice-based signatures.
//!
//! Raccoon is a Fiat-Shamir-with-aborts signature over the ring
//! Z_q[x]/(x^n + 1) whose distinguishing feature is first-class
//! side-channel masking: the secret key and every secret-dependent
//! intermediate live as d additive shares that are rerandomized
//! (refreshed) between operations, so no single observation window sees
//! a whole secret. This crate implements the cryptographic core —
//! key generation, the masked sign loop, verification — together with
//! the deterministic byte codecs for keys and signatures.
//!
//! # Overview
//!
//! - one parameter set is compiled in, selected by a `racc128-*`
//!   feature (see [`param`]); the masking order d is the only thing
//!   that varies across them.
//! - entropy is always a caller-supplied [`RandomSource`]; pass
//!   [`OsRandom`] in production or [`NistCtrDrbg`] for reproducible
//!   known-answer runs.
//! - the byte-level API lives in [`envelope`]: detached signatures or
//!   the NIST signed-message framing.
//!
//! ```
//! use raccoon_sig::{keypair, sign_detached, verify_detached, OsRandom};
//!
//! let mut rng = OsRandom;
//! let (pk, sk) = keypair(&mut rng).unwrap();
//! let sig = sign_detached(&sk, b"attack at dawn", &mut rng).unwrap();
//! assert!(verify_detached(&pk, b"attack at dawn", &sig));
//! ```
//!
//! Verification is variable-time on public data; the final challenge
//! comparison is constant-time. All masked intermediates, sponge
//! states, and generator states are zeroized on drop.

pub mod drbg;
pub mod envelope;
pub mod errors;
pub mod mask_random;
pub mod masked;
#[cfg(feature = "crt32")]
pub mod mont32;
pub mod mont64;
pub mod ntt;
pub mod param;
pub mod poly;
pub mod rng;
pub mod sample;
pub mod scheme;
pub mod serial;
pub mod sponge;

pub use drbg::NistCtrDrbg;
pub use envelope::{keypair, open_message, sign_detached, sign_message, verify_detached};
pub use errors::{SignError, SignResult};
pub use param::{NAME, PK_SZ, SIG_SZ, SK_SZ};
pub use rng::{OsRandom, RandomSource};
pub use scheme::{keygen, sign, verify, PublicKey, SecretKey, Signature};
pub use serial::{decode_pk, decode_sig, decode_sk, encode_pk, encode_sig, encode_sk};
