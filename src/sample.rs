//! Samplers and hashes built on the SHAKE256 sponge.
//!
//! Every routine absorbs a fully domain-separated input: an 8-byte
//! header whose first byte is an ASCII tag, followed by the seed or
//! message material. Interoperability depends on these exact bytes.

use crate::param::{CH_SZ, K, LGW, MU_SZ, N, Q, QMSK, Q_BITS, TR_SZ, W};
use crate::poly::Poly;
use crate::sponge::{Sponge, SHAKE256_RATE, SHAKE_PAD};

/// Byte length of one squeezed candidate for a mod-q coefficient.
const Q_BYTES: usize = Q_BITS.div_ceil(8);

/// Byte length of one serialized rounded-commitment coefficient.
const W_BYTES: usize = LGW.div_ceil(8);

fn le_bytes_to_u64(buf: &[u8]) -> u64 {
    let mut x = 0u64;
    for (i, &b) in buf.iter().enumerate() {
        x |= (b as u64) << (8 * i);
    }
    x
}

/// Expand `seed` (domain separation included) into a uniform polynomial
/// mod q by rejection sampling, coefficient by coefficient.
pub fn sample_q(seed: &[u8]) -> Poly {
    let mut kec = Sponge::new(SHAKE256_RATE);
    kec.absorb(seed);
    kec.pad(SHAKE_PAD);

    let mut r = Poly::ZERO;
    let mut buf = [0u8; Q_BYTES];
    for i in 0..N {
        loop {
            kec.squeeze(&mut buf);
            let x = (le_bytes_to_u64(&buf) & QMSK as u64) as i64;
            if x < Q {
                r.c[i] = x;
                break;
            }
        }
    }
    r
}

/// Sample n coefficients uniform in [-2^(bits-1), 2^(bits-1)), mapped
/// into [0, q) by a conditional add of q.
pub fn sample_u(seed: &[u8], bits: usize) -> Poly {
    let blen = bits.div_ceil(8);
    let mask = (1i64 << bits) - 1;
    let mid = 1i64 << (bits - 1);

    let mut kec = Sponge::new(SHAKE256_RATE);
    kec.absorb(seed);
    kec.pad(SHAKE_PAD);

    let mut r = Poly::ZERO;
    let mut buf = [0u8; 8];
    for i in 0..N {
        kec.squeeze(&mut buf[..blen]);
        let mut x = (le_bytes_to_u64(&buf[..blen]) as i64) & mask;
        // flip the two's-complement sign bit, then re-center
        x ^= mid;
        r.c[i] = crate::mont64::cadd(x - mid, Q);
    }
    r
}

/// µ = SHAKE256(tr || msg): the pk-bound message digest.
pub fn chal_mu(tr: &[u8; TR_SZ], msg: &[u8]) -> [u8; MU_SZ] {
    let mut kec = Sponge::new(SHAKE256_RATE);
    kec.absorb(tr);
    kec.absorb(msg);
    kec.pad(SHAKE_PAD);
    let mut mu = [0u8; MU_SZ];
    kec.squeeze(&mut mu);
    mu
}

/// Challenge hash of the rounded commitment vector w under µ.
pub fn chal_hash(mu: &[u8; MU_SZ], w: &[Poly; K]) -> [u8; CH_SZ] {
    let mut kec = Sponge::new(SHAKE256_RATE);
    let mut hdr = [0u8; 8];
    hdr[0] = b'h';
    hdr[1] = K as u8;
    kec.absorb(&hdr);
    kec.absorb(mu);

    for wi in w.iter() {
        for &x in wi.c.iter() {
            let le = (x as u64).to_le_bytes();
            kec.absorb(&le[..W_BYTES]);
        }
    }

    kec.pad(SHAKE_PAD);
    let mut ch = [0u8; CH_SZ];
    kec.squeeze(&mut ch);
    ch
}

/// Expand a challenge hash into the sparse ternary challenge polynomial
/// with exactly ω nonzero entries in {-1, +1}.
pub fn chal_poly(ch: &[u8; CH_SZ]) -> Poly {
    let mut kec = Sponge::new(SHAKE256_RATE);
    let mut hdr = [0u8; 8];
    hdr[0] = b'c';
    hdr[1] = W as u8;
    kec.absorb(&hdr);
    kec.absorb(ch);
    kec.pad(SHAKE_PAD);

    let mut cp = Poly::ZERO;
    let mut filled = 0;
    let mut buf = [0u8; 2];
    while filled < W {
        kec.squeeze(&mut buf);
        let v = u16::from_le_bytes(buf);
        let sign = (v & 1) as i64;
        let pos = ((v >> 1) as usize) & (N - 1);
        if cp.c[pos] == 0 {
            cp.c[pos] = 2 * sign - 1;
            filled += 1;
        }
    }
    cp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::UW;

    #[test]
    fn sample_q_is_canonical_and_deterministic() {
        let a = sample_q(b"fixed-seed");
        let b = sample_q(b"fixed-seed");
        let c = sample_q(b"other-seed");
        let mut distinct = false;
        for i in 0..N {
            assert!(a.c[i] >= 0 && a.c[i] < Q);
            assert_eq!(a.c[i], b.c[i]);
            distinct |= a.c[i] != c.c[i];
        }
        assert!(distinct);
    }

    #[test]
    fn sample_u_range() {
        let bound = 1i64 << (UW - 1);
        let r = sample_u(b"noise-seed", UW);
        for i in 0..N {
            assert!(r.c[i] >= 0 && r.c[i] < Q);
            // value is either small or close to q (negative side)
            assert!(r.c[i] < bound || r.c[i] >= Q - bound);
        }
    }

    #[test]
    fn chal_poly_weight() {
        // S6: the all-zero hash expands to exactly ω entries in {-1,+1}
        let cp = chal_poly(&[0u8; CH_SZ]);
        let mut nonzero = 0;
        for i in 0..N {
            match cp.c[i] {
                0 => {}
                1 | -1 => nonzero += 1,
                x => panic!("unexpected coefficient {x}"),
            }
        }
        assert_eq!(nonzero, W);
    }

    #[test]
    fn chal_hash_separates_inputs() {
        let mu = [7u8; MU_SZ];
        let w0 = [Poly::ZERO; K];
        let mut w1 = w0.clone();
        w1[0].c[0] = 1;
        assert_ne!(chal_hash(&mu, &w0), chal_hash(&mu, &w1));
        assert_eq!(chal_hash(&mu, &w0), chal_hash(&mu, &w0));
    }
}
