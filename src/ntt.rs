//! Negacyclic Number-Theoretic Transform over Z_q[x]/(x^n + 1).
//!
//! The forward transform evaluates a polynomial at the primitive 2n-th
//! roots of unity (the roots of x^n + 1); the inverse folds the 1/n
//! factor into one final Montgomery multiply, so `intt(fntt(a)) == a`
//! with no residual scaling. Twiddles are kept in Montgomery form and
//! laid out in bit-reversed Cooley-Tukey order; the tables are derived
//! once at first use from per-prime primitive 1024-th roots found by
//! deterministic search.
//!
//! Polynomials hold plain (non-Montgomery) representatives throughout.
//! A pointwise product picks up a 1/R factor from REDC; callers cancel
//! it by scaling one operand with [`to_mont`] (the public matrix and the
//! challenge polynomial are scaled once, right after their forward
//! transform), after which [`cmul`] and [`mula`] keep everything plain.

use std::sync::OnceLock;

use crate::param::{LOG_N, N, Q1, Q2};

#[cfg(not(feature = "crt32"))]
use crate::mont64;
#[cfg(not(feature = "crt32"))]
use crate::param::Q;

use crate::poly::Poly;

// --- table generation helpers (u64/u128, composite modulus is fine) ---

fn mulmod(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 * b as u128) % m as u128) as u64
}

fn powmod(mut b: u64, mut e: u64, m: u64) -> u64 {
    let mut r = 1u64;
    b %= m;
    while e > 0 {
        if e & 1 == 1 {
            r = mulmod(r, b, m);
        }
        b = mulmod(b, b, m);
        e >>= 1;
    }
    r
}

/// Smallest-witness primitive 1024-th root of unity mod the prime p,
/// with the negacyclic property z^512 == -1.
fn find_root_1024(p: u64) -> u64 {
    let e = (p - 1) / 1024;
    let mut g = 2u64;
    loop {
        let z = powmod(g, e, p);
        if powmod(z, 512, p) == p - 1 {
            return z;
        }
        g += 1;
    }
}

/// CRT-combine residues (z1 mod q1, z2 mod q2) into [0, q).
#[cfg(not(feature = "crt32"))]
fn crt_combine(z1: u64, z2: u64) -> u64 {
    let q1 = Q1 as u64;
    let q2 = Q2 as u64;
    let q1_inv = powmod(q1 % q2, q2 - 2, q2);
    let d = mulmod((z2 + q2 - z1 % q2) % q2, q1_inv, q2);
    z1 + q1 * d
}

fn brv(i: usize) -> usize {
    i.reverse_bits() >> (usize::BITS as usize - LOG_N)
}

// --- 64-bit backend -------------------------------------------------

#[cfg(not(feature = "crt32"))]
mod tables {
    use super::*;

    pub struct Tables {
        /// zeta^brv(i) * R mod q.
        pub zetas: [i64; N],
        /// -zeta^brv(i) * R mod q, for the Gentleman-Sande inverse.
        pub izetas: [i64; N],
        /// n^-1 * R mod q; redc(x * ninv_r) = x / n.
        pub ninv_r: i64,
    }

    pub fn get() -> &'static Tables {
        static T: OnceLock<Tables> = OnceLock::new();
        T.get_or_init(|| {
            let q = Q as u64;
            let zeta = crt_combine(find_root_1024(Q1 as u64), find_root_1024(Q2 as u64));
            let r = mont64::MONT_R as u64;
            let mut zetas = [0i64; N];
            let mut izetas = [0i64; N];
            for i in 0..N {
                let w = powmod(zeta, brv(i) as u64, q);
                zetas[i] = mulmod(w, r, q) as i64;
                izetas[i] = mulmod(q - w, r, q) as i64;
            }
            let ninv = crt_combine(
                powmod(N as u64, (Q1 as u64) - 2, Q1 as u64),
                powmod(N as u64, (Q2 as u64) - 2, Q2 as u64),
            );
            Tables {
                zetas,
                izetas,
                ninv_r: mulmod(ninv, r, q) as i64,
            }
        })
    }
}

/// Forward negacyclic NTT; canonical in, canonical out.
#[cfg(not(feature = "crt32"))]
pub fn fntt(a: &mut Poly) {
    let t = tables::get();
    let mut k = 1;
    let mut len = N / 2;
    while len >= 1 {
        let mut start = 0;
        while start < N {
            let z = t.zetas[k];
            k += 1;
            for j in start..start + len {
                let u = mont64::mulq(z, a.c[j + len]);
                a.c[j + len] = a.c[j] - u;
                a.c[j] += u;
            }
            start += 2 * len;
        }
        len >>= 1;
    }
    // the butterflies are lazily reduced; bring back to [0, q)
    for x in a.c.iter_mut() {
        *x = mont64::cadd(mont64::redc(*x as i128 * mont64::MONT_R as i128), Q);
    }
}

/// Inverse negacyclic NTT with the 1/n factor folded in.
#[cfg(not(feature = "crt32"))]
pub fn intt(a: &mut Poly) {
    let t = tables::get();
    let mut k = N - 1;
    let mut len = 1;
    while len < N {
        let mut start = 0;
        while start < N {
            let z = t.izetas[k];
            k -= 1;
            for j in start..start + len {
                let u = a.c[j];
                let v = a.c[j + len];
                a.c[j] = u + v;
                a.c[j + len] = mont64::mulq(z, u - v);
            }
            start += 2 * len;
        }
        len <<= 1;
    }
    for x in a.c.iter_mut() {
        *x = mont64::cadd(mont64::redc(*x as i128 * t.ninv_r as i128), Q);
    }
}

/// Pointwise product r = redc(a * b), canonical.
#[cfg(not(feature = "crt32"))]
pub fn cmul(r: &mut Poly, a: &Poly, b: &Poly) {
    for i in 0..N {
        r.c[i] = mont64::cadd(mont64::mulq(a.c[i], b.c[i]), Q);
    }
}

/// Pointwise multiply-accumulate r = r + redc(a * b) mod q, canonical.
pub fn mula(r: &mut Poly, a: &Poly, b: &Poly) {
    #[cfg(not(feature = "crt32"))]
    for i in 0..N {
        let t = mont64::cadd(mont64::mulq(a.c[i], b.c[i]), Q);
        r.c[i] = mont64::csub(r.c[i] + t, Q);
    }
    #[cfg(feature = "crt32")]
    {
        use crate::mont32;
        for i in 0..N {
            let (a1, a2) = mont32::unpack(a.c[i]);
            let (b1, b2) = mont32::unpack(b.c[i]);
            let (r1, r2) = mont32::unpack(r.c[i]);
            let t1 = mont32::cadd(mont32::mulq1(a1, b1), Q1 as i32);
            let t2 = mont32::cadd(mont32::mulq2(a2, b2), Q2 as i32);
            r.c[i] = mont32::pack(
                mont32::csub(r1 + t1, Q1 as i32),
                mont32::csub(r2 + t2, Q2 as i32),
            );
        }
    }
}

/// Pointwise scalar product a = redc(a * c), canonical.
#[cfg(not(feature = "crt32"))]
pub fn smul(a: &mut Poly, c: i64) {
    for x in a.c.iter_mut() {
        *x = mont64::cadd(mont64::redc(*x as i128 * c as i128), Q);
    }
}

/// Scale into Montgomery form: a = a * R mod q.
#[cfg(not(feature = "crt32"))]
pub fn to_mont(a: &mut Poly) {
    smul(a, mont64::MONT_RR);
}

/// Convert a canonical coefficient word into the NTT-domain coefficient
/// representation. Identity for the 64-bit backend.
#[cfg(not(feature = "crt32"))]
pub fn split(_a: &mut Poly) {}

/// Convert the NTT-domain coefficient representation back to canonical
/// 64-bit words. Identity for the 64-bit backend.
#[cfg(not(feature = "crt32"))]
pub fn join(_a: &mut Poly) {}

// --- dual-prime 32-bit CRT backend ----------------------------------

#[cfg(feature = "crt32")]
mod crt {
    use super::*;
    use crate::mont32;

    pub struct Tables {
        pub zetas1: [i32; N],
        pub izetas1: [i32; N],
        pub zetas2: [i32; N],
        pub izetas2: [i32; N],
        pub ninv_r1: i32,
        pub ninv_r2: i32,
    }

    pub fn get() -> &'static Tables {
        static T: OnceLock<Tables> = OnceLock::new();
        T.get_or_init(|| {
            let mut t = Tables {
                zetas1: [0; N],
                izetas1: [0; N],
                zetas2: [0; N],
                izetas2: [0; N],
                ninv_r1: 0,
                ninv_r2: 0,
            };
            build(
                Q1 as u64,
                mont32::MONT_R1 as u64,
                &mut t.zetas1,
                &mut t.izetas1,
                &mut t.ninv_r1,
            );
            build(
                Q2 as u64,
                mont32::MONT_R2 as u64,
                &mut t.zetas2,
                &mut t.izetas2,
                &mut t.ninv_r2,
            );
            t
        })
    }

    fn build(p: u64, r: u64, zetas: &mut [i32; N], izetas: &mut [i32; N], ninv_r: &mut i32) {
        let zeta = find_root_1024(p);
        for i in 0..N {
            let w = powmod(zeta, brv(i) as u64, p);
            zetas[i] = mulmod(w, r, p) as i32;
            izetas[i] = mulmod(p - w, r, p) as i32;
        }
        let ninv = powmod(N as u64, p - 2, p);
        *ninv_r = mulmod(ninv, r, p) as i32;
    }

    #[inline(always)]
    fn get_half(v: i64, shift: u32) -> i32 {
        ((v >> shift) & 0xFFFF_FFFF) as i32
    }

    #[inline(always)]
    fn put_half(c: &mut [i64; N], j: usize, x: i32, shift: u32) {
        let mask: i64 = 0xFFFF_FFFFi64 << shift;
        c[j] = (c[j] & !mask) | ((x as u32 as i64) << shift);
    }

    /// Fully reduced Cooley-Tukey pass on one prime's residues.
    pub fn fntt_half(
        c: &mut [i64; N],
        shift: u32,
        q: i32,
        zetas: &[i32; N],
        mulq: fn(i32, i32) -> i32,
    ) {
        let mut k = 1;
        let mut len = N / 2;
        while len >= 1 {
            let mut start = 0;
            while start < N {
                let z = zetas[k];
                k += 1;
                for j in start..start + len {
                    let t = mont32::cadd(mulq(z, get_half(c[j + len], shift)), q);
                    let a = get_half(c[j], shift);
                    put_half(c, j, mont32::csub(a + t, q), shift);
                    put_half(c, j + len, mont32::cadd(a - t, q), shift);
                }
                start += 2 * len;
            }
            len >>= 1;
        }
    }

    /// Fully reduced Gentleman-Sande pass with the 1/n factor applied.
    pub fn intt_half(
        c: &mut [i64; N],
        shift: u32,
        q: i32,
        izetas: &[i32; N],
        ninv_r: i32,
        mulq: fn(i32, i32) -> i32,
    ) {
        let mut k = N - 1;
        let mut len = 1;
        while len < N {
            let mut start = 0;
            while start < N {
                let z = izetas[k];
                k -= 1;
                for j in start..start + len {
                    let u = get_half(c[j], shift);
                    let v = get_half(c[j + len], shift);
                    put_half(c, j, mont32::csub(u + v, q), shift);
                    put_half(c, j + len, mont32::cadd(mulq(z, u - v), q), shift);
                }
                start += 2 * len;
            }
            len <<= 1;
        }
        for j in 0..N {
            put_half(c, j, mont32::cadd(mulq(ninv_r, get_half(c[j], shift)), q), shift);
        }
    }
}

/// Forward NTT: splits into residues, then one pass per prime.
#[cfg(feature = "crt32")]
pub fn fntt(a: &mut Poly) {
    use crate::mont32;
    split(a);
    let t = crt::get();
    crt::fntt_half(&mut a.c, 0, Q1 as i32, &t.zetas1, mont32::mulq1);
    crt::fntt_half(&mut a.c, 32, Q2 as i32, &t.zetas2, mont32::mulq2);
}

/// Inverse NTT: per-prime inverse passes, then CRT recombination.
#[cfg(feature = "crt32")]
pub fn intt(a: &mut Poly) {
    use crate::mont32;
    let t = crt::get();
    crt::intt_half(&mut a.c, 0, Q1 as i32, &t.izetas1, t.ninv_r1, mont32::mulq1);
    crt::intt_half(&mut a.c, 32, Q2 as i32, &t.izetas2, t.ninv_r2, mont32::mulq2);
    join(a);
}

/// Pointwise product r = redc(a * b) per prime, canonical.
#[cfg(feature = "crt32")]
pub fn cmul(r: &mut Poly, a: &Poly, b: &Poly) {
    use crate::mont32;
    for i in 0..N {
        let (a1, a2) = mont32::unpack(a.c[i]);
        let (b1, b2) = mont32::unpack(b.c[i]);
        r.c[i] = mont32::pack(
            mont32::cadd(mont32::mulq1(a1, b1), Q1 as i32),
            mont32::cadd(mont32::mulq2(a2, b2), Q2 as i32),
        );
    }
}

/// Pointwise scalar product with one scalar per prime, canonical.
#[cfg(feature = "crt32")]
pub fn smul(a: &mut Poly, c1: i32, c2: i32) {
    use crate::mont32;
    for i in 0..N {
        let (a1, a2) = mont32::unpack(a.c[i]);
        a.c[i] = mont32::pack(
            mont32::cadd(mont32::mulq1(a1, c1), Q1 as i32),
            mont32::cadd(mont32::mulq2(a2, c2), Q2 as i32),
        );
    }
}

/// Scale into Montgomery form per prime.
#[cfg(feature = "crt32")]
pub fn to_mont(a: &mut Poly) {
    use crate::mont32;
    smul(a, mont32::MONT_RR1, mont32::MONT_RR2);
}

/// Split canonical 64-bit words into packed per-prime residues.
#[cfg(feature = "crt32")]
pub fn split(a: &mut Poly) {
    for x in a.c.iter_mut() {
        *x = crate::mont32::split(*x);
    }
}

/// Join packed residues back into canonical 64-bit words.
#[cfg(feature = "crt32")]
pub fn join(a: &mut Poly) {
    for x in a.c.iter_mut() {
        *x = crate::mont32::join(*x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::Q;

    fn testpoly(seed: i64) -> Poly {
        let mut p = Poly::ZERO;
        let mut x = seed;
        for i in 0..N {
            x = x
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            p.c[i] = x.rem_euclid(Q);
        }
        p
    }

    /// Schoolbook negacyclic product, coefficient domain.
    fn schoolbook(a: &Poly, b: &Poly) -> Poly {
        let mut r = Poly::ZERO;
        for k in 0..N {
            let mut acc: i128 = 0;
            for i in 0..=k {
                acc += (a.c[i] as i128) * (b.c[k - i] as i128) % Q as i128;
            }
            for i in (k + 1)..N {
                acc -= (a.c[i] as i128) * (b.c[N + k - i] as i128) % Q as i128;
            }
            r.c[k] = acc.rem_euclid(Q as i128) as i64;
        }
        r
    }

    #[test]
    fn intt_inverts_fntt() {
        let a = testpoly(7);
        let mut b = a.clone();
        fntt(&mut b);
        intt(&mut b);
        for i in 0..N {
            assert_eq!(b.c[i], a.c[i], "coefficient {i}");
        }
    }

    #[test]
    fn ntt_multiplication_matches_schoolbook() {
        let a = testpoly(1);
        let b = testpoly(2);
        let want = schoolbook(&a, &b);

        let mut fa = a.clone();
        let mut fb = b.clone();
        fntt(&mut fa);
        fntt(&mut fb);
        // cancel the 1/R REDC factor on one operand
        to_mont(&mut fa);
        let mut r = Poly::ZERO;
        cmul(&mut r, &fa, &fb);
        intt(&mut r);
        for i in 0..N {
            assert_eq!(r.c[i], want.c[i], "coefficient {i}");
        }
    }

    #[test]
    fn mula_accumulates() {
        let a = testpoly(3);
        let b = testpoly(4);
        let mut fa = a.clone();
        let mut fb = b.clone();
        fntt(&mut fa);
        fntt(&mut fb);
        to_mont(&mut fa);

        let mut once = Poly::ZERO;
        cmul(&mut once, &fa, &fb);
        let mut twice = once.clone();
        twice.ntt_add_q(&once);

        let mut acc = Poly::ZERO;
        mula(&mut acc, &fa, &fb);
        mula(&mut acc, &fa, &fb);
        for i in 0..N {
            assert_eq!(acc.c[i], twice.c[i]);
        }
    }

    #[test]
    fn fntt_is_linear() {
        let a = testpoly(5);
        let b = testpoly(6);
        let mut sum = a.clone();
        sum.add_q(&b);
        fntt(&mut sum);

        let mut fa = a.clone();
        let mut fb = b.clone();
        fntt(&mut fa);
        fntt(&mut fb);
        fa.ntt_add_q(&fb);
        for i in 0..N {
            assert_eq!(sum.c[i], fa.c[i]);
        }
    }

    #[cfg(feature = "crt32")]
    #[test]
    fn split_join_identity() {
        let a = testpoly(8);
        let mut b = a.clone();
        split(&mut b);
        join(&mut b);
        for i in 0..N {
            assert_eq!(a.c[i], b.c[i]);
        }
    }
}
