//! Deterministic AES-256-CTR generator compatible with the NIST KAT
//! harness.
//!
//! Seeded from a 48-byte entropy input (optionally XOR-combined with a
//! 48-byte personalization string; the NIST `security_strength`
//! argument carries no information and is not taken). Each fill
//! encrypts successive values of a 128-bit big-endian counter under
//! AES-256-ECB and then re-derives (key || ctr) from three fresh
//! counter blocks, as the reference generator does.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::SignResult;
use crate::rng::RandomSource;

/// The NIST KAT DRBG state.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct NistCtrDrbg {
    key: [u8; 32],
    ctr: [u8; 16],
}

fn inc_ctr(ctr: &mut [u8; 16]) {
    for b in ctr.iter_mut().rev() {
        let (x, carry) = b.overflowing_add(1);
        *b = x;
        if !carry {
            break;
        }
    }
}

impl NistCtrDrbg {
    /// Instantiate from 48 bytes of entropy, optionally XOR-combined
    /// with a 48-byte personalization string.
    pub fn new(entropy: &[u8; 48], personalization: Option<&[u8; 48]>) -> Self {
        let mut seed = *entropy;
        if let Some(ps) = personalization {
            for (s, p) in seed.iter_mut().zip(ps.iter()) {
                *s ^= p;
            }
        }
        let mut drbg = Self {
            key: [0u8; 32],
            ctr: [0u8; 16],
        };
        drbg.update(Some(&seed));
        seed.zeroize();
        drbg
    }

    /// Derive the next (key || ctr) from three counter blocks, XORing
    /// in `input` when present.
    fn update(&mut self, input: Option<&[u8; 48]>) {
        let cipher = Aes256::new(GenericArray::from_slice(&self.key));
        let mut tmp = [0u8; 48];
        for chunk in tmp.chunks_mut(16) {
            inc_ctr(&mut self.ctr);
            let mut block = GenericArray::clone_from_slice(&self.ctr);
            cipher.encrypt_block(&mut block);
            chunk.copy_from_slice(&block);
        }
        if let Some(input) = input {
            for (t, i) in tmp.iter_mut().zip(input.iter()) {
                *t ^= i;
            }
        }
        self.key.copy_from_slice(&tmp[..32]);
        self.ctr.copy_from_slice(&tmp[32..]);
        tmp.zeroize();
    }
}

impl RandomSource for NistCtrDrbg {
    fn fill(&mut self, buf: &mut [u8]) -> SignResult<()> {
        let cipher = Aes256::new(GenericArray::from_slice(&self.key));
        for chunk in buf.chunks_mut(16) {
            inc_ctr(&mut self.ctr);
            let mut block = GenericArray::clone_from_slice(&self.ctr);
            cipher.encrypt_block(&mut block);
            chunk.copy_from_slice(&block[..chunk.len()]);
        }
        self.update(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kat_seed() -> [u8; 48] {
        let mut seed = [0u8; 48];
        for (i, b) in seed.iter_mut().enumerate() {
            *b = i as u8;
        }
        seed
    }

    #[test]
    fn deterministic_across_instances() {
        let mut a = NistCtrDrbg::new(&kat_seed(), None);
        let mut b = NistCtrDrbg::new(&kat_seed(), None);
        let mut x = [0u8; 96];
        let mut y = [0u8; 96];
        a.fill(&mut x).unwrap();
        b.fill(&mut y).unwrap();
        assert_eq!(x, y);
        // the state advances between fills
        a.fill(&mut y[..96]).unwrap();
        assert_ne!(x, y);
    }

    #[test]
    fn personalization_changes_stream() {
        let ps = [0xA5u8; 48];
        let mut a = NistCtrDrbg::new(&kat_seed(), None);
        let mut b = NistCtrDrbg::new(&kat_seed(), Some(&ps));
        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        a.fill(&mut x).unwrap();
        b.fill(&mut y).unwrap();
        assert_ne!(x, y);
    }

    #[test]
    fn counter_increment_carries() {
        let mut ctr = [0xFFu8; 16];
        inc_ctr(&mut ctr);
        assert_eq!(ctr, [0u8; 16]);
        let mut ctr = [0u8; 16];
        ctr[15] = 0xFF;
        inc_ctr(&mut ctr);
        assert_eq!(ctr[15], 0);
        assert_eq!(ctr[14], 1);
    }
}
