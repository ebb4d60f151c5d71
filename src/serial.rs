//! Serialize and deserialize keys and signatures.
//!
//! Public keys and secret keys use contiguous LSB-first bit packing at
//! fixed widths. Signatures append, after the challenge hash, a bit
//! stream that run-length codes the hint and splits z coefficients into
//! explicit low bits plus a unary-coded high part; the stream is padded
//! with zero bits to the fixed signature size, and any nonzero padding
//! rejects on decode. Secret keys store share 0 in full and regenerate
//! shares 1..d from fresh per-encode mask seeds.

use zeroize::Zeroize;

use crate::errors::{SignError, SignResult};
use crate::ntt;
use crate::param::{
    AS_SZ, BOO, BOO_H, CH_SZ, D, ELL, K, MK_SZ, N, NUT, PK_SZ, Q, Q_BITS, SIG_SZ, SK_SZ, TR_SZ,
    ZLBITS,
};
use crate::poly::Poly;
use crate::sample;
use crate::scheme::{PublicKey, SecretKey, Signature};
use crate::sponge;

// --- fixed-width packing --------------------------------------------

/// Pack n coefficients LSB-first at `bits` each; returns bytes written.
fn encode_bits(out: &mut [u8], v: &Poly, bits: usize) -> usize {
    let m = (1u64 << bits) - 1;
    let mut j = 0;
    let mut x = 0u64;
    let mut l = 0;
    for &w in v.c.iter() {
        x |= ((w as u64) & m) << l;
        l += bits;
        while l >= 8 {
            out[j] = x as u8;
            j += 1;
            x >>= 8;
            l -= 8;
        }
    }
    if l > 0 {
        out[j] = x as u8;
        j += 1;
    }
    j
}

/// Unpack n unsigned coefficients of `bits` each; returns bytes read.
fn decode_bits(v: &mut Poly, b: &[u8], bits: usize) -> usize {
    let m = (1u64 << bits) - 1;
    let mut i = 0;
    let mut x = 0u64;
    let mut l = 0;
    for w in v.c.iter_mut() {
        while l < bits {
            x |= (b[i] as u64) << l;
            i += 1;
            l += 8;
        }
        *w = (x & m) as i64;
        x >>= bits;
        l -= bits;
    }
    i
}

// --- bit stream for the signature -----------------------------------

struct BitWriter<'a> {
    b: &'a mut [u8],
    byte: usize,
    bit: usize,
}

impl<'a> BitWriter<'a> {
    fn new(b: &'a mut [u8]) -> Self {
        Self { b, byte: 0, bit: 0 }
    }

    /// Append the low `n` bits of `y`, LSB first. False on overflow.
    #[must_use]
    fn put(&mut self, mut y: u64, mut n: usize) -> bool {
        while n > 0 {
            if self.byte >= self.b.len() {
                return false;
            }
            self.b[self.byte] |= ((y & 1) as u8) << self.bit;
            y >>= 1;
            n -= 1;
            self.bit += 1;
            if self.bit == 8 {
                self.bit = 0;
                self.byte += 1;
            }
        }
        true
    }
}

struct BitReader<'a> {
    b: &'a [u8],
    byte: usize,
    bit: usize,
}

impl<'a> BitReader<'a> {
    fn new(b: &'a [u8]) -> Self {
        Self { b, byte: 0, bit: 0 }
    }

    fn get(&mut self) -> SignResult<u64> {
        if self.byte >= self.b.len() {
            return Err(SignError::MalformedInput);
        }
        let x = (self.b[self.byte] >> self.bit) & 1;
        self.bit += 1;
        if self.bit == 8 {
            self.bit = 0;
            self.byte += 1;
        }
        Ok(x as u64)
    }

    /// All remaining bits up to the end of the buffer must be zero.
    fn expect_zero_padding(mut self) -> SignResult<()> {
        if self.bit > 0 {
            if (self.b[self.byte] >> self.bit) != 0 {
                return Err(SignError::MalformedInput);
            }
            self.byte += 1;
        }
        while self.byte < self.b.len() {
            if self.b[self.byte] != 0 {
                return Err(SignError::MalformedInput);
            }
            self.byte += 1;
        }
        Ok(())
    }
}

/// Center a canonical or already-centered representative into
/// (-q/2, q/2].
fn center_q(x: i64) -> i64 {
    if x > Q / 2 {
        x - Q
    } else if x < -(Q / 2) {
        x + Q
    } else {
        x
    }
}

// --- public key ------------------------------------------------------

/// Encode a public key into exactly `PK_SZ` bytes.
pub fn encode_pk(pk: &PublicKey) -> Vec<u8> {
    let mut b = vec![0u8; PK_SZ];
    b[..AS_SZ].copy_from_slice(&pk.a_seed);
    let mut l = AS_SZ;
    for i in 0..K {
        l += encode_bits(&mut b[l..], &pk.t[i], Q_BITS - NUT);
    }
    debug_assert_eq!(l, PK_SZ);
    b
}

/// Decode a public key, recomputing the bound hash `tr`.
pub fn decode_pk(b: &[u8]) -> SignResult<PublicKey> {
    if b.len() != PK_SZ {
        return Err(SignError::MalformedInput);
    }
    let mut pk = PublicKey {
        a_seed: [0u8; AS_SZ],
        t: [Poly::ZERO; K],
        tr: [0u8; TR_SZ],
    };
    pk.a_seed.copy_from_slice(&b[..AS_SZ]);
    let mut l = AS_SZ;
    for i in 0..K {
        l += decode_bits(&mut pk.t[i], &b[l..], Q_BITS - NUT);
    }
    sponge::shake256(&mut pk.tr, b);
    Ok(pk)
}

// --- secret key ------------------------------------------------------

/// Encode a secret key into exactly `SK_SZ` bytes. Shares 1..d are
/// replaced by fresh mask seeds drawn from `rng`; share 0 is reassembled
/// so the share sum is preserved.
pub fn encode_sk<R: crate::rng::RandomSource + ?Sized>(
    sk: &SecretKey,
    rng: &mut R,
) -> SignResult<Vec<u8>> {
    let mut b = encode_pk(&sk.pk);
    b.resize(SK_SZ, 0);
    let mut l = PK_SZ;

    // collapse to canonical 64-bit NTT-domain words
    let mut s0: Vec<Poly> = (0..ELL)
        .map(|i| {
            let mut p = sk.s[i].sh[0].clone();
            ntt::join(&mut p);
            p
        })
        .collect();

    let mut buf = [0u8; MK_SZ + 8];
    for j in 1..D {
        rng.fill(&mut buf[8..])?;
        b[l..l + MK_SZ].copy_from_slice(&buf[8..]);
        l += MK_SZ;

        for (i, s0i) in s0.iter_mut().enumerate() {
            buf[0] = b'K';
            buf[1] = i as u8;
            buf[2] = j as u8;
            buf[3..8].fill(0);
            let r = sample::sample_q(&buf);
            s0i.sub_q(&r);

            let mut t = sk.s[i].sh[j].clone();
            ntt::join(&mut t);
            s0i.add_q(&t);
            t.zeroize();
        }
    }
    buf.zeroize();

    for s0i in s0.iter_mut() {
        l += encode_bits(&mut b[l..], s0i, Q_BITS);
        s0i.zeroize();
    }
    debug_assert_eq!(l, SK_SZ);
    Ok(b)
}

/// Decode a secret key; shares 1..d are regenerated from the stored
/// mask seeds.
pub fn decode_sk(b: &[u8]) -> SignResult<SecretKey> {
    if b.len() != SK_SZ {
        return Err(SignError::MalformedInput);
    }
    let pk = decode_pk(&b[..PK_SZ])?;
    let mut sk = SecretKey {
        pk,
        s: core::array::from_fn(|_| crate::masked::MaskedPoly::ZERO),
    };

    let mut l = PK_SZ;
    let mut buf = [0u8; MK_SZ + 8];
    for j in 1..D {
        buf[8..].copy_from_slice(&b[l..l + MK_SZ]);
        l += MK_SZ;
        for i in 0..ELL {
            buf[0] = b'K';
            buf[1] = i as u8;
            buf[2] = j as u8;
            buf[3..8].fill(0);
            sk.s[i].sh[j] = sample::sample_q(&buf);
        }
    }
    buf.zeroize();

    for i in 0..ELL {
        l += decode_bits(&mut sk.s[i].sh[0], &b[l..], Q_BITS);
    }
    debug_assert_eq!(l, SK_SZ);

    // shares live in the NTT-domain coefficient representation
    for i in 0..ELL {
        for j in 0..D {
            ntt::split(&mut sk.s[i].sh[j]);
        }
    }
    Ok(sk)
}

// --- signature -------------------------------------------------------

/// Encode a signature into exactly `SIG_SZ` bytes, or `None` if the
/// variable-length part does not fit (the caller re-runs the sign
/// loop with fresh randomness).
pub fn encode_sig(sig: &Signature) -> Option<Vec<u8>> {
    let mut b = vec![0u8; SIG_SZ];
    b[..CH_SZ].copy_from_slice(&sig.ch);
    let mut w = BitWriter::new(&mut b[CH_SZ..]);

    // hint: |x| ones, a stop bit, then the sign for nonzero values
    for i in 0..K {
        for j in 0..N {
            let x = center_q(sig.h[i].c[j]);
            let mag = x.unsigned_abs();
            if !w.put((1u64 << mag) - 1, mag as usize) || !w.put(0, 1) {
                return None;
            }
            if x != 0 && !w.put((x < 0) as u64, 1) {
                return None;
            }
        }
    }

    // z: explicit low bits, unary high part, stop bit, optional sign
    for i in 0..ELL {
        for j in 0..N {
            let x = center_q(sig.z[i].c[j]);
            let mag = x.unsigned_abs();
            let hi = (mag >> ZLBITS) as usize;
            if !w.put(mag & ((1u64 << ZLBITS) - 1), ZLBITS)
                || !w.put((1u64 << hi) - 1, hi)
                || !w.put(0, 1)
            {
                return None;
            }
            if mag != 0 && !w.put((x < 0) as u64, 1) {
                return None;
            }
        }
    }

    Some(b)
}

/// Decode a signature; rejects bad lengths, per-coefficient norm
/// overflows, and nonzero padding.
pub fn decode_sig(b: &[u8]) -> SignResult<Signature> {
    if b.len() != SIG_SZ {
        return Err(SignError::MalformedInput);
    }
    let mut sig = Signature {
        ch: [0u8; CH_SZ],
        h: [Poly::ZERO; K],
        z: [Poly::ZERO; ELL],
    };
    sig.ch.copy_from_slice(&b[..CH_SZ]);
    let mut r = BitReader::new(&b[CH_SZ..]);

    for i in 0..K {
        for j in 0..N {
            let mut x: i64 = 0;
            while r.get()? == 1 {
                x += 1;
                if x > BOO_H {
                    return Err(SignError::MalformedInput);
                }
            }
            if x != 0 && r.get()? == 1 {
                x = -x;
            }
            sig.h[i].c[j] = x;
        }
    }

    for i in 0..ELL {
        for j in 0..N {
            let mut x: i64 = 0;
            for n in 0..ZLBITS {
                x |= (r.get()? as i64) << n;
            }
            while r.get()? == 1 {
                x += 1 << ZLBITS;
                if x > BOO {
                    return Err(SignError::MalformedInput);
                }
            }
            if x != 0 && r.get()? == 1 {
                x = Q - x; // negative values stored non-negative mod q
            }
            sig.z[i].c[j] = x;
        }
    }

    r.expect_zero_padding()?;
    Ok(sig)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::{QMSK, QT};

    fn testpk(seed: u8) -> PublicKey {
        let mut pk = PublicKey {
            a_seed: [seed; AS_SZ],
            t: [Poly::ZERO; K],
            tr: [0u8; TR_SZ],
        };
        for i in 0..K {
            for j in 0..N {
                pk.t[i].c[j] = ((i * N + j) as i64 * 31 + seed as i64) % QT;
            }
        }
        pk
    }

    #[test]
    fn bitpack_roundtrip() {
        let mut v = Poly::ZERO;
        let mut x = 12345i64;
        for i in 0..N {
            x = x.wrapping_mul(48271).wrapping_add(7);
            v.c[i] = x & QMSK;
        }
        let mut buf = vec![0u8; (N * Q_BITS).div_ceil(8)];
        let written = encode_bits(&mut buf, &v, Q_BITS);
        assert_eq!(written, buf.len());
        let mut out = Poly::ZERO;
        let read = decode_bits(&mut out, &buf, Q_BITS);
        assert_eq!(read, buf.len());
        for i in 0..N {
            assert_eq!(v.c[i], out.c[i]);
        }
    }

    #[test]
    fn pk_roundtrip_and_tr() {
        let pk = testpk(3);
        let b = encode_pk(&pk);
        assert_eq!(b.len(), PK_SZ);
        let pk2 = decode_pk(&b).unwrap();
        assert_eq!(pk.a_seed, pk2.a_seed);
        for i in 0..K {
            for j in 0..N {
                assert_eq!(pk.t[i].c[j], pk2.t[i].c[j]);
            }
        }
        let mut tr = [0u8; TR_SZ];
        sponge::shake256(&mut tr, &b);
        assert_eq!(pk2.tr, tr);
        assert!(decode_pk(&b[..PK_SZ - 1]).is_err());
    }

    #[test]
    fn sig_roundtrip() {
        let mut sig = Signature {
            ch: [0x5Au8; CH_SZ],
            h: [Poly::ZERO; K],
            z: [Poly::ZERO; ELL],
        };
        // mostly-zero hint with a sprinkling of +-1/+-2, z magnitudes
        // below 2^39 plus a few larger ones to exercise the unary part
        for i in 0..K {
            for j in 0..N {
                sig.h[i].c[j] = if j % 16 == 0 {
                    ((i + j / 16) % 5) as i64 - 2
                } else {
                    0
                };
            }
        }
        let mut x = 999i64;
        for i in 0..ELL {
            for j in 0..N {
                x = x.wrapping_mul(2862933555777941757).wrapping_add(13);
                let v = if j % 32 == 0 {
                    x.rem_euclid(1 << (ZLBITS + 1))
                } else {
                    x.rem_euclid(1 << (ZLBITS - 1))
                };
                sig.z[i].c[j] = if x < 0 { (Q - v) % Q } else { v };
            }
        }
        let b = encode_sig(&sig).expect("must fit");
        assert_eq!(b.len(), SIG_SZ);
        let sig2 = decode_sig(&b).unwrap();
        assert_eq!(sig.ch, sig2.ch);
        for i in 0..K {
            for j in 0..N {
                assert_eq!(sig.h[i].c[j], sig2.h[i].c[j]);
            }
        }
        for i in 0..ELL {
            for j in 0..N {
                assert_eq!(sig.z[i].c[j], sig2.z[i].c[j]);
            }
        }
    }

    #[test]
    fn sig_padding_reject() {
        let sig = Signature {
            ch: [1u8; CH_SZ],
            h: [Poly::ZERO; K],
            z: [Poly::ZERO; ELL],
        };
        let mut b = encode_sig(&sig).unwrap();
        assert!(decode_sig(&b).is_ok());
        // flip a bit in the zero padding region
        assert_eq!(b[SIG_SZ - 1], 0);
        b[SIG_SZ - 1] = 0x80;
        assert!(decode_sig(&b).is_err());
    }

    #[test]
    fn sig_overflow_returns_none() {
        let mut sig = Signature {
            ch: [0u8; CH_SZ],
            h: [Poly::ZERO; K],
            z: [Poly::ZERO; ELL],
        };
        // maximal-magnitude z coefficients cannot fit in SIG_SZ
        for i in 0..ELL {
            for j in 0..N {
                sig.z[i].c[j] = BOO;
            }
        }
        assert!(encode_sig(&sig).is_none());
    }

    #[test]
    fn sig_norm_overflow_rejects() {
        // a run longer than the hint bound must reject
        let mut b = vec![0u8; SIG_SZ];
        for x in b[CH_SZ..CH_SZ + 2].iter_mut() {
            *x = 0xFF;
        }
        assert!(decode_sig(&b).is_err());
        assert!(decode_sig(&b[..SIG_SZ - 1]).is_err());
    }
}
