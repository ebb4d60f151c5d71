//! d-share arithmetic masking of ring elements.
//!
//! A [`MaskedPoly`] carries d additive shares whose sum mod q is the
//! logical value; individual shares never leave this module except
//! through the secret-key codec. Refreshing adds a zero-encoding (a
//! share vector summing to zero), which rerandomizes the shares without
//! changing the decoded value. With d = 1 the aggregate is its single
//! share and refreshing degenerates to a no-op that the optimizer drops.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::SignResult;
use crate::mask_random::MaskRandom;
use crate::ntt;
use crate::param::{D, REP, SEC};
use crate::poly::Poly;
use crate::rng::RandomSource;
use crate::sample;

/// A masked ring element: d additive shares.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MaskedPoly {
    pub(crate) sh: [Poly; D],
}

impl MaskedPoly {
    /// All shares zero (decodes to zero).
    pub const ZERO: MaskedPoly = MaskedPoly {
        sh: [Poly::ZERO; D],
    };

    /// Fresh encoding of zero: shares are uniform subject to summing
    /// to 0 mod q. Pairs are sampled and negated, then blocks of
    /// doubling width are cross-randomized.
    pub fn zero_encoding(mrg: &mut MaskRandom) -> Self {
        let mut z = Self::ZERO;
        if D == 1 {
            return z;
        }
        let mut i = 0;
        while i < D {
            z.sh[i] = mrg.poly(i);
            z.sh[i + 1] = z.sh[i].clone();
            z.sh[i + 1].neg_q();
            i += 2;
        }
        let mut d = 2;
        while d < D {
            let mut i = 0;
            while i < D {
                for j in i..i + d {
                    let mut r = mrg.poly(j);
                    z.sh[j].add_q(&r);
                    z.sh[j + d].sub_q(&r);
                    r.zeroize();
                }
                i += 2 * d;
            }
            d <<= 1;
        }
        z
    }

    /// Rerandomize shares in the coefficient domain.
    pub fn refresh(&mut self, mrg: &mut MaskRandom) {
        if D == 1 {
            return;
        }
        let z = Self::zero_encoding(mrg);
        for j in 0..D {
            self.sh[j].add_q(&z.sh[j]);
        }
    }

    /// Rerandomize shares held in the NTT domain. The zero-encoding is
    /// sampled in coefficient form and converted to the NTT-domain
    /// coefficient representation before addition.
    pub fn refresh_ntt(&mut self, mrg: &mut MaskRandom) {
        if D == 1 {
            return;
        }
        let mut z = Self::zero_encoding(mrg);
        for j in 0..D {
            ntt::split(&mut z.sh[j]);
            self.sh[j].ntt_add_q(&z.sh[j]);
        }
    }

    /// Add `rep` rounds of fresh noise to every share, refreshing the
    /// encoding between rounds. `i_v` is the vector index bound into
    /// the sampler's domain header.
    pub fn add_rep_noise<R: RandomSource + ?Sized>(
        &mut self,
        i_v: usize,
        bits: usize,
        rng: &mut R,
        mrg: &mut MaskRandom,
    ) -> SignResult<()> {
        let mut buf = [0u8; SEC + 8];
        for i_rep in 0..REP {
            for j in 0..D {
                rng.fill(&mut buf[8..])?;
                buf[0] = b'u';
                buf[1] = i_rep as u8;
                buf[2] = i_v as u8;
                buf[3] = j as u8;
                buf[4..8].fill(0);
                let mut r = sample::sample_u(&buf, bits);
                self.sh[j].add_q(&r);
                r.zeroize();
            }
            self.refresh(mrg);
        }
        buf.zeroize();
        Ok(())
    }

    /// Collapse the shares: sum mod q in the coefficient domain.
    pub fn decode(&self) -> Poly {
        let mut r = self.sh[0].clone();
        for j in 1..D {
            r.add_q(&self.sh[j]);
        }
        r
    }

    /// Collapse the shares in the NTT domain.
    pub fn decode_ntt(&self) -> Poly {
        let mut r = self.sh[0].clone();
        for j in 1..D {
            r.ntt_add_q(&self.sh[j]);
        }
        r
    }

    /// Forward-transform every share.
    pub fn fntt(&mut self) {
        for j in 0..D {
            ntt::fntt(&mut self.sh[j]);
        }
    }

    /// Inverse-transform every share.
    pub fn intt(&mut self) {
        for j in 0..D {
            ntt::intt(&mut self.sh[j]);
        }
    }

    /// Sharewise multiply-accumulate: self += a * x (NTT domain, with
    /// `a` in Montgomery form so the product stays plain).
    pub fn mula(&mut self, a: &Poly, x: &MaskedPoly) {
        for j in 0..D {
            ntt::mula(&mut self.sh[j], a, &x.sh[j]);
        }
    }
}
