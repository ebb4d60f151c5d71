//! Incremental SHA3/SHAKE sponge over the Keccak-f1600 permutation.
//!
//! The permutation itself comes from [`keccak::f1600`]; this module adds
//! the byte-oriented absorb / pad / squeeze state machine the samplers
//! need. A [`Sponge`] starts in the absorb phase, moves to the squeeze
//! phase when [`Sponge::pad`] is called, and never goes back: absorbing
//! after squeezing is a caller bug, not a supported operation.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// SHAKE128 rate in bytes.
pub const SHAKE128_RATE: usize = 168;
/// SHAKE256 rate in bytes (also SHA3-256).
pub const SHAKE256_RATE: usize = 136;
/// SHA3-224 rate in bytes.
pub const SHA3_224_RATE: usize = 144;
/// SHA3-384 rate in bytes.
pub const SHA3_384_RATE: usize = 104;
/// SHA3-512 rate in bytes.
pub const SHA3_512_RATE: usize = 72;

/// Domain-separation byte for the SHA3 fixed-output functions.
pub const SHA3_PAD: u8 = 0x06;
/// Domain-separation byte for the SHAKE extendable-output functions.
pub const SHAKE_PAD: u8 = 0x1f;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Absorb,
    Squeeze,
}

/// A Keccak sponge processing bytes at a fixed rate.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Sponge {
    state: [u64; 25],
    rate: usize,
    pos: usize,
    #[zeroize(skip)]
    phase: Phase,
}

impl Sponge {
    /// Start a fresh sponge with the given rate in bytes.
    pub fn new(rate: usize) -> Self {
        debug_assert!(rate <= 200 && rate % 8 == 0);
        Self {
            state: [0u64; 25],
            rate,
            pos: 0,
            phase: Phase::Absorb,
        }
    }

    #[inline]
    fn xor_byte(&mut self, i: usize, b: u8) {
        self.state[i / 8] ^= (b as u64) << (8 * (i % 8));
    }

    #[inline]
    fn byte(&self, i: usize) -> u8 {
        (self.state[i / 8] >> (8 * (i % 8))) as u8
    }

    /// Absorb `data` into the state. May be called any number of times
    /// before [`Sponge::pad`].
    pub fn absorb(&mut self, data: &[u8]) {
        debug_assert!(self.phase == Phase::Absorb, "absorb after squeeze");
        for &b in data {
            self.xor_byte(self.pos, b);
            self.pos += 1;
            if self.pos == self.rate {
                keccak::f1600(&mut self.state);
                self.pos = 0;
            }
        }
    }

    /// Close the absorb phase with the domain-separation byte `p`
    /// ([`SHA3_PAD`] or [`SHAKE_PAD`]) and switch to squeezing.
    pub fn pad(&mut self, p: u8) {
        debug_assert!(self.phase == Phase::Absorb);
        self.xor_byte(self.pos, p);
        self.xor_byte(self.rate - 1, 0x80);
        self.phase = Phase::Squeeze;
        self.pos = self.rate;
    }

    /// Squeeze `out.len()` bytes. Only valid after [`Sponge::pad`].
    pub fn squeeze(&mut self, out: &mut [u8]) {
        debug_assert!(self.phase == Phase::Squeeze, "squeeze before pad");
        for b in out.iter_mut() {
            if self.pos == self.rate {
                keccak::f1600(&mut self.state);
                self.pos = 0;
            }
            *b = self.byte(self.pos);
            self.pos += 1;
        }
    }
}

/// One-shot SHAKE256.
pub fn shake256(out: &mut [u8], data: &[u8]) {
    let mut kec = Sponge::new(SHAKE256_RATE);
    kec.absorb(data);
    kec.pad(SHAKE_PAD);
    kec.squeeze(out);
}

/// One-shot SHAKE128.
pub fn shake128(out: &mut [u8], data: &[u8]) {
    let mut kec = Sponge::new(SHAKE128_RATE);
    kec.absorb(data);
    kec.pad(SHAKE_PAD);
    kec.squeeze(out);
}

/// One-shot SHA3 with output size `out.len()` (the rate follows from it).
pub fn sha3(out: &mut [u8], data: &[u8]) {
    let mut kec = Sponge::new(200 - 2 * out.len());
    kec.absorb(data);
    kec.pad(SHA3_PAD);
    kec.squeeze(out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shake256_empty() {
        let mut md = [0u8; 32];
        shake256(&mut md, b"");
        assert_eq!(
            hex::encode(md),
            "46b9dd2b0ba88d13233b3feb743eeb243fcd52ea62b81b82b50c27646ed5762f"
        );
    }

    #[test]
    fn shake128_empty() {
        let mut md = [0u8; 16];
        shake128(&mut md, b"");
        assert_eq!(hex::encode(md), "7f9c2ba4e88f827d616045507605853e");
    }

    #[test]
    fn sha3_256_empty() {
        let mut md = [0u8; 32];
        sha3(&mut md, b"");
        assert_eq!(
            hex::encode(md),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );
    }

    #[test]
    fn incremental_absorb_matches_oneshot() {
        let data = b"the quick brown fox jumps over the lazy dog, repeatedly, \
                     until the block boundary has been crossed more than once \
                     to exercise the buffered absorb path of the sponge.";
        let mut a = [0u8; 64];
        shake256(&mut a, data);

        let mut kec = Sponge::new(SHAKE256_RATE);
        for chunk in data.chunks(7) {
            kec.absorb(chunk);
        }
        kec.pad(SHAKE_PAD);
        let mut b = [0u8; 64];
        // squeeze in uneven pieces as well
        kec.squeeze(&mut b[..11]);
        kec.squeeze(&mut b[11..]);
        assert_eq!(a, b);
    }
}
