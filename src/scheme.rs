//! The core scheme: key generation, the masked sign loop, and
//! verification.
//!
//! Secret material is handled exclusively through [`MaskedPoly`]
//! aggregates; decoded values appear only where the algorithm makes
//! them public (the rounded commitment, the response z, the hint).
//! Signing is a rejection loop: each iteration draws a fresh masked
//! commitment and the loop exits only when the joint norm bounds hold.
//! Verification is variable-time on public data except for the final
//! challenge comparison.

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::SignResult;
use crate::mask_random::MaskRandom;
use crate::masked::MaskedPoly;
use crate::ntt;
use crate::param::{
    AS_SZ, B22, BOO, BOO_H, CH_SZ, ELL, K, MU_SZ, N, NUT, NUW, Q, QT, QW, TR_SZ, UT, UW,
};
use crate::poly::Poly;
use crate::rng::RandomSource;
use crate::sample;

/// A Raccoon public key.
#[derive(Clone, Zeroize)]
pub struct PublicKey {
    pub(crate) a_seed: [u8; AS_SZ],
    pub(crate) t: [Poly; K],
    pub(crate) tr: [u8; TR_SZ],
}

/// A Raccoon secret key: the embedded public key plus the d-share
/// masked secret vector, held in the NTT domain.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    pub(crate) pk: PublicKey,
    pub(crate) s: [MaskedPoly; ELL],
}

/// A signature: challenge hash, hint, and response.
#[derive(Clone)]
pub struct Signature {
    pub(crate) ch: [u8; CH_SZ],
    pub(crate) h: [Poly; K],
    pub(crate) z: [Poly; ELL],
}

impl PublicKey {
    /// The bound hash tr = SHAKE256 of the serialized key.
    pub fn tr(&self) -> &[u8; TR_SZ] {
        &self.tr
    }
}

impl SecretKey {
    /// The embedded public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.pk
    }
}

/// The expanded public matrix, NTT domain and Montgomery form.
type MatrixA = Vec<[Poly; ELL]>;

/// Expand the seed into the k x ell public matrix. Each entry is
/// forward-transformed and scaled by R once, so every later pointwise
/// product lands back on plain representatives.
fn expand_a(seed: &[u8; AS_SZ]) -> MatrixA {
    let mut buf = [0u8; AS_SZ + 8];
    buf[8..].copy_from_slice(seed);
    (0..K)
        .map(|i| {
            let mut row = [Poly::ZERO; ELL];
            for (j, aij) in row.iter_mut().enumerate() {
                buf[0] = b'A';
                buf[1] = i as u8;
                buf[2] = j as u8;
                buf[3..8].fill(0);
                let mut p = sample::sample_q(&buf);
                ntt::fntt(&mut p);
                ntt::to_mont(&mut p);
                *aij = p;
            }
            row
        })
        .collect()
}

/// The scaled public key rows 2^nu_t * t, NTT domain, ready for the
/// challenge product in sign and verify.
fn expand_t(t: &[Poly; K]) -> Vec<Poly> {
    t.iter()
        .map(|ti| {
            let mut p = ti.clone();
            p.shl_m(NUT, Q);
            ntt::fntt(&mut p);
            p
        })
        .collect()
}

/// Prepare the challenge polynomial: expand, lift to [0, q), transform,
/// and scale by R.
fn challenge_ntt(ch: &[u8; CH_SZ]) -> Poly {
    let mut c = sample::chal_poly(ch);
    c.nonneg(Q);
    ntt::fntt(&mut c);
    ntt::to_mont(&mut c);
    c
}

/// Joint norm check on the hint and response; public-time.
fn check_bounds(h: &[Poly; K], z: &[Poly; ELL]) -> bool {
    let mut h22: i64 = 0;
    let mut hoo: i64 = 0;
    for hi in h.iter() {
        for j in 0..N {
            let x = hi.c[j].abs();
            if x > hoo {
                hoo = x;
            }
            h22 += x * x;
        }
    }

    let mut z22: i64 = 0;
    let mut zoo: i64 = 0;
    for zi in z.iter() {
        for j in 0..N {
            let mut x = zi.c[j];
            if x < 0 {
                x += Q;
            }
            if x > Q / 2 {
                x = Q - x;
            }
            if x > zoo {
                zoo = x;
            }
            // drop the low 32 bits before squaring; the published
            // bound B22 is stated for exactly this scaling
            let xs = x >> 32;
            z22 += xs * xs;
        }
    }

    hoo <= BOO_H && zoo <= BOO && (h22 << (2 * NUW - 64)) + z22 <= B22
}

/// Generate a keypair from the given entropy source.
pub fn keygen<R: RandomSource + ?Sized>(rng: &mut R) -> SignResult<(PublicKey, SecretKey)> {
    let mut mrg = MaskRandom::from_entropy(rng)?;

    let mut a_seed = [0u8; AS_SZ];
    rng.fill(&mut a_seed)?;

    // masked secret vector: zero-encode, add noise, move to NTT domain
    let mut s: [MaskedPoly; ELL] = [MaskedPoly::ZERO; ELL];
    for (i, si) in s.iter_mut().enumerate() {
        *si = MaskedPoly::zero_encoding(&mut mrg);
        si.add_rep_noise(i, UT, rng, &mut mrg)?;
        si.fntt();
    }

    let a = expand_a(&a_seed);

    // t = round(Decode(A * [[s]]) + noise)
    let mut t: [Poly; K] = [Poly::ZERO; K];
    for (i, ti) in t.iter_mut().enumerate() {
        let mut acc = MaskedPoly::ZERO;
        for j in 0..ELL {
            acc.mula(&a[i][j], &s[j]);
        }
        acc.intt();
        acc.add_rep_noise(i, UT, rng, &mut mrg)?;
        let mut d = acc.decode();
        d.round(NUT, 1 << (NUT - 1), QT);
        *ti = d;
    }

    let mut pk = PublicKey {
        a_seed,
        t,
        tr: [0u8; TR_SZ],
    };
    let bytes = crate::serial::encode_pk(&pk);
    crate::sponge::shake256(&mut pk.tr, &bytes);

    let sk = SecretKey { pk: pk.clone(), s };
    Ok((pk, sk))
}

/// Sign a pk-bound message digest µ. The secret key is refreshed in
/// place as the loop runs.
pub fn sign<R: RandomSource + ?Sized>(
    sk: &mut SecretKey,
    mu: &[u8; MU_SZ],
    rng: &mut R,
) -> SignResult<Signature> {
    let mut mrg = MaskRandom::from_entropy(rng)?;
    let a = expand_a(&sk.pk.a_seed);
    let t_ntt = expand_t(&sk.pk.t);

    loop {
        // fresh masked commitment [[r]], w = round(Decode(A * [[r]]))
        let mut mr: [MaskedPoly; ELL] = [MaskedPoly::ZERO; ELL];
        for (i, mri) in mr.iter_mut().enumerate() {
            *mri = MaskedPoly::zero_encoding(&mut mrg);
            mri.add_rep_noise(i, UW, rng, &mut mrg)?;
            mri.fntt();
        }

        let mut vw: [Poly; K] = [Poly::ZERO; K];
        for (i, vwi) in vw.iter_mut().enumerate() {
            let mut acc = MaskedPoly::ZERO;
            for j in 0..ELL {
                acc.mula(&a[i][j], &mr[j]);
            }
            acc.intt();
            acc.add_rep_noise(i, UW, rng, &mut mrg)?;
            let mut d = acc.decode();
            d.round(NUW, 1 << (NUW - 1), QW);
            *vwi = d;
        }

        let ch = sample::chal_hash(mu, &vw);
        let c = challenge_ntt(&ch);

        // masked response z = c * s + r, with refreshes bracketing the
        // secret-dependent product
        let mut z: [Poly; ELL] = [Poly::ZERO; ELL];
        let mut vz: [Poly; ELL] = [Poly::ZERO; ELL];
        for i in 0..ELL {
            sk.s[i].refresh_ntt(&mut mrg);
            mr[i].refresh_ntt(&mut mrg);
            mr[i].mula(&c, &sk.s[i]);
            mr[i].refresh_ntt(&mut mrg);
            vz[i] = mr[i].decode_ntt();
            let mut zi = vz[i].clone();
            ntt::intt(&mut zi);
            z[i] = zi;
        }

        // hint h = Center(w - round(A z - 2^nu_t c t))
        let mut h: [Poly; K] = [Poly::ZERO; K];
        for (i, hi) in h.iter_mut().enumerate() {
            let mut y = Poly::ZERO;
            for j in 0..ELL {
                ntt::mula(&mut y, &a[i][j], &vz[j]);
            }
            let mut ct = Poly::ZERO;
            ntt::cmul(&mut ct, &c, &t_ntt[i]);
            y.ntt_sub_q(&ct);
            ntt::intt(&mut y);
            y.round(NUW, 1 << (NUW - 1), QW);

            let mut d = vw[i].clone();
            d.sub_m(&y, QW);
            d.center(QW);
            *hi = d;
        }

        for p in vz.iter_mut() {
            p.zeroize();
        }

        if check_bounds(&h, &z) {
            return Ok(Signature { ch, h, z });
        }
        for p in z.iter_mut() {
            p.zeroize();
        }
        log::trace!("sign: norm bounds exceeded, drawing a fresh commitment");
    }
}

/// Verify a signature over a pk-bound message digest µ.
pub fn verify(pk: &PublicKey, mu: &[u8; MU_SZ], sig: &Signature) -> bool {
    if !check_bounds(&sig.h, &sig.z) {
        return false;
    }

    let a = expand_a(&pk.a_seed);
    let t_ntt = expand_t(&pk.t);
    let c = challenge_ntt(&sig.ch);

    let mut z_ntt = sig.z.clone();
    for zi in z_ntt.iter_mut() {
        ntt::fntt(zi);
    }

    let mut vw: [Poly; K] = [Poly::ZERO; K];
    for (i, vwi) in vw.iter_mut().enumerate() {
        let mut y = Poly::ZERO;
        for j in 0..ELL {
            ntt::mula(&mut y, &a[i][j], &z_ntt[j]);
        }
        let mut ct = Poly::ZERO;
        ntt::cmul(&mut ct, &c, &t_ntt[i]);
        y.ntt_sub_q(&ct);
        ntt::intt(&mut y);
        y.round(NUW, 1 << (NUW - 1), QW);

        // w' = round(y) + h mod q_w, back on [0, q_w)
        for j in 0..N {
            let mut x = y.c[j] + sig.h[i].c[j];
            if x < 0 {
                x += QW;
            }
            if x >= QW {
                x -= QW;
            }
            vwi.c[j] = x;
        }
    }

    let ch = sample::chal_hash(mu, &vw);
    // the single constant-time comparison on the hot path
    sig.ch[..].ct_eq(&ch[..]).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drbg::NistCtrDrbg;
    use crate::param::D;

    fn kat_rng() -> NistCtrDrbg {
        let mut seed = [0u8; 48];
        for (i, b) in seed.iter_mut().enumerate() {
            *b = i as u8;
        }
        NistCtrDrbg::new(&seed, None)
    }

    #[test]
    fn keygen_sign_verify() {
        let mut rng = kat_rng();
        let (pk, mut sk) = keygen(&mut rng).unwrap();
        let mu = [0x42u8; MU_SZ];
        let sig = sign(&mut sk, &mu, &mut rng).unwrap();
        assert!(verify(&pk, &mu, &sig));

        let mut bad_mu = mu;
        bad_mu[0] ^= 1;
        assert!(!verify(&pk, &bad_mu, &sig));
    }

    #[test]
    fn signature_bounds_hold() {
        let mut rng = kat_rng();
        let (_, mut sk) = keygen(&mut rng).unwrap();
        let sig = sign(&mut sk, &[7u8; MU_SZ], &mut rng).unwrap();
        assert!(check_bounds(&sig.h, &sig.z));
        for hi in sig.h.iter() {
            assert!(hi.norm_oo_centered() <= BOO_H);
        }
        for zi in sig.z.iter() {
            assert!(zi.norm_oo_centered() <= BOO);
        }
    }

    #[test]
    fn tampered_challenge_rejects() {
        let mut rng = kat_rng();
        let (pk, mut sk) = keygen(&mut rng).unwrap();
        let mu = [9u8; MU_SZ];
        let mut sig = sign(&mut sk, &mu, &mut rng).unwrap();
        sig.ch[5] ^= 0x10;
        assert!(!verify(&pk, &mu, &sig));
    }

    #[test]
    fn secret_share_sum_survives_signing() {
        if D == 1 {
            return;
        }
        let mut rng = kat_rng();
        let (_, mut sk) = keygen(&mut rng).unwrap();
        let before: Vec<Poly> = sk.s.iter().map(|m| m.decode_ntt()).collect();
        let _ = sign(&mut sk, &[3u8; MU_SZ], &mut rng).unwrap();
        for (i, b) in before.iter().enumerate() {
            let after = sk.s[i].decode_ntt();
            for j in 0..N {
                assert_eq!(b.c[j], after.c[j]);
            }
        }
    }
}
