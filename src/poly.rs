//! Ring elements of Z_q[x]/(x^n + 1) and their elementwise operations.
//!
//! A [`Poly`] always carries n coefficients. In the default backend a
//! coefficient is a single signed 64-bit representative; with `crt32`
//! the NTT-domain form packs the two prime residues into the same word
//! (see [`crate::mont32`]). Coefficient-domain operations below are
//! backend-independent; only the `ntt_*` variants switch.

use zeroize::Zeroize;

use crate::mont64;
use crate::param::{N, Q};

/// One ring element.
#[derive(Clone, Zeroize)]
pub struct Poly {
    pub(crate) c: [i64; N],
}

impl Poly {
    /// The zero polynomial.
    pub const ZERO: Poly = Poly { c: [0; N] };

    /// Reset to zero.
    pub fn zero(&mut self) {
        self.c = [0; N];
    }

    /// self += b, plain wrapping integer addition.
    pub fn add(&mut self, b: &Poly) {
        for i in 0..N {
            self.c[i] = mont64::add(self.c[i], b.c[i]);
        }
    }

    /// self -= b, plain wrapping integer subtraction.
    pub fn sub(&mut self, b: &Poly) {
        for i in 0..N {
            self.c[i] = mont64::sub(self.c[i], b.c[i]);
        }
    }

    /// self = self + b mod q, canonical result.
    pub fn add_q(&mut self, b: &Poly) {
        for i in 0..N {
            self.c[i] = mont64::csub(self.c[i] + b.c[i], Q);
        }
    }

    /// self = self - b mod q, canonical result.
    pub fn sub_q(&mut self, b: &Poly) {
        for i in 0..N {
            self.c[i] = mont64::cadd(self.c[i] - b.c[i], Q);
        }
    }

    /// self = -self mod q.
    pub fn neg_q(&mut self) {
        self.neg_m(Q);
    }

    /// self = -self, adding m on underflow.
    pub fn neg_m(&mut self, m: i64) {
        for i in 0..N {
            self.c[i] = mont64::cadd(-self.c[i], m);
        }
    }

    /// self = self + b, conditionally subtracting m on overflow.
    pub fn add_m(&mut self, b: &Poly, m: i64) {
        for i in 0..N {
            self.c[i] = mont64::csub(self.c[i] + b.c[i], m);
        }
    }

    /// self = self - b, conditionally adding m on underflow.
    pub fn sub_m(&mut self, b: &Poly, m: i64) {
        for i in 0..N {
            self.c[i] = mont64::cadd(self.c[i] - b.c[i], m);
        }
    }

    /// Left shift with conditional subtract of m.
    pub fn shl_m(&mut self, sh: usize, m: i64) {
        for i in 0..N {
            self.c[i] = mont64::csub(self.c[i] << sh, m);
        }
    }

    /// Right shift with conditional subtract of m.
    pub fn shr_m(&mut self, sh: usize, m: i64) {
        for i in 0..N {
            self.c[i] = mont64::csub(self.c[i] >> sh, m);
        }
    }

    /// Rounding shift: self = (self + h) >> sh, conditionally
    /// subtracting m.
    pub fn round(&mut self, sh: usize, h: i64, m: i64) {
        for i in 0..N {
            self.c[i] = mont64::csub((self.c[i] + h) >> sh, m);
        }
    }

    /// Map coefficients from [0, m) to the centered range
    /// [-m/2, m/2).
    pub fn center(&mut self, m: i64) {
        let c = m >> 1;
        for i in 0..N {
            let x = mont64::csub(self.c[i] + c, m);
            self.c[i] = x - c;
        }
    }

    /// Map coefficients from [-m, m) back to [0, m).
    pub fn nonneg(&mut self, m: i64) {
        for i in 0..N {
            self.c[i] = mont64::cadd(self.c[i], m);
        }
    }

    /// NTT-domain addition mod q.
    #[cfg(not(feature = "crt32"))]
    pub fn ntt_add_q(&mut self, b: &Poly) {
        self.add_q(b);
    }

    /// NTT-domain subtraction mod q.
    #[cfg(not(feature = "crt32"))]
    pub fn ntt_sub_q(&mut self, b: &Poly) {
        self.sub_q(b);
    }

    /// NTT-domain addition, packed residues per prime.
    #[cfg(feature = "crt32")]
    pub fn ntt_add_q(&mut self, b: &Poly) {
        use crate::mont32;
        use crate::param::{Q1, Q2};
        for i in 0..N {
            let (a1, a2) = mont32::unpack(self.c[i]);
            let (b1, b2) = mont32::unpack(b.c[i]);
            self.c[i] = mont32::pack(
                mont32::csub(a1 + b1, Q1 as i32),
                mont32::csub(a2 + b2, Q2 as i32),
            );
        }
    }

    /// NTT-domain subtraction, packed residues per prime.
    #[cfg(feature = "crt32")]
    pub fn ntt_sub_q(&mut self, b: &Poly) {
        use crate::mont32;
        use crate::param::{Q1, Q2};
        for i in 0..N {
            let (a1, a2) = mont32::unpack(self.c[i]);
            let (b1, b2) = mont32::unpack(b.c[i]);
            self.c[i] = mont32::pack(
                mont32::cadd(a1 - b1, Q1 as i32),
                mont32::cadd(a2 - b2, Q2 as i32),
            );
        }
    }

    /// Infinity norm over centered representatives of values in [0, q).
    pub fn norm_oo_centered(&self) -> i64 {
        let mut m = 0;
        for i in 0..N {
            let mut x = self.c[i];
            if x < 0 {
                x += Q;
            }
            if x > Q / 2 {
                x = Q - x;
            }
            if x > m {
                m = x;
            }
        }
        m
    }
}
