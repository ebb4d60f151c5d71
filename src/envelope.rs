//! Byte-level operations and the NIST signed-message framing.
//!
//! These wrappers bind a message to the public key by signing
//! µ = SHAKE256(tr || msg) rather than the raw message, and they drive
//! the outer rejection point: when the variable-length signature
//! encoding overflows the fixed buffer, the whole sign loop re-runs
//! with fresh randomness.

use crate::errors::{SignError, SignResult};
use crate::param::SIG_SZ;
use crate::rng::RandomSource;
use crate::sample;
use crate::scheme;
use crate::serial;

/// Generate a serialized keypair: (pk bytes, sk bytes).
pub fn keypair<R: RandomSource + ?Sized>(rng: &mut R) -> SignResult<(Vec<u8>, Vec<u8>)> {
    let (pk, sk) = scheme::keygen(rng)?;
    let pk_bytes = serial::encode_pk(&pk);
    let sk_bytes = serial::encode_sk(&sk, rng)?;
    Ok((pk_bytes, sk_bytes))
}

/// Sign `msg` with a serialized secret key; returns exactly `SIG_SZ`
/// bytes.
pub fn sign_detached<R: RandomSource + ?Sized>(
    sk_bytes: &[u8],
    msg: &[u8],
    rng: &mut R,
) -> SignResult<Vec<u8>> {
    let mut sk = serial::decode_sk(sk_bytes)?;
    let mu = sample::chal_mu(sk.public_key().tr(), msg);
    loop {
        let sig = scheme::sign(&mut sk, &mu, rng)?;
        if let Some(bytes) = serial::encode_sig(&sig) {
            return Ok(bytes);
        }
        log::debug!("signature encoding overflowed, re-running the sign loop");
    }
}

/// Verify a detached signature over `msg`.
pub fn verify_detached(pk_bytes: &[u8], msg: &[u8], sig_bytes: &[u8]) -> bool {
    let Ok(pk) = serial::decode_pk(pk_bytes) else {
        return false;
    };
    let Ok(sig) = serial::decode_sig(sig_bytes) else {
        return false;
    };
    let mu = sample::chal_mu(pk.tr(), msg);
    scheme::verify(&pk, &mu, &sig)
}

/// Produce the NIST "signed message" envelope sm = sig || msg, where
/// the signature part is zero-padded to `SIG_SZ`.
pub fn sign_message<R: RandomSource + ?Sized>(
    sk_bytes: &[u8],
    msg: &[u8],
    rng: &mut R,
) -> SignResult<Vec<u8>> {
    let mut sm = sign_detached(sk_bytes, msg, rng)?;
    sm.extend_from_slice(msg);
    Ok(sm)
}

/// Open a signed message, returning the embedded message when the
/// signature verifies.
pub fn open_message(pk_bytes: &[u8], sm: &[u8]) -> SignResult<Vec<u8>> {
    if sm.len() < SIG_SZ {
        return Err(SignError::MalformedInput);
    }
    let (sig_bytes, msg) = sm.split_at(SIG_SZ);
    if verify_detached(pk_bytes, msg, sig_bytes) {
        Ok(msg.to_vec())
    } else {
        Err(SignError::MalformedInput)
    }
}
