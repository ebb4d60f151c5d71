//! Portable 64-bit Montgomery arithmetic in Z_q.
//!
//! The constants are tied to q = q1*q2 = 549824583172097 and R = 2^64:
//!
//! ```text
//! r  = 2^64 mod q
//! rr = r^2 mod q
//! qi = (-q)^-1 mod 2^64
//! ```
//!
//! `redc` maps a signed 128-bit product x to r with r*2^64 == x (mod q)
//! and r in [-q, q); callers normalize with `cadd` when a canonical
//! representative is needed.

use crate::param::Q;

/// R = 2^64 mod q.
pub const MONT_R: i64 = 129308285697266;

/// R^2 mod q.
pub const MONT_RR: i64 = 506614974174448;

/// -q^-1 mod 2^64.
pub const MONT_QI: u64 = 2231854466648768511;

/// Wrapping addition; reduction is the caller's concern.
#[inline(always)]
pub fn add(x: i64, y: i64) -> i64 {
    x.wrapping_add(y)
}

/// Wrapping subtraction; reduction is the caller's concern.
#[inline(always)]
pub fn sub(x: i64, y: i64) -> i64 {
    x.wrapping_sub(y)
}

/// Conditionally add m if x is negative. Requires -m <= x < m.
#[inline(always)]
pub fn cadd(x: i64, m: i64) -> i64 {
    debug_assert!(x >= -m && x < m);
    x + ((x >> 63) & m)
}

/// Conditionally subtract m if x >= m. Requires 0 <= x < 2m.
#[inline(always)]
pub fn csub(x: i64, m: i64) -> i64 {
    debug_assert!(x >= 0 && x < 2 * m);
    let t = x - m;
    t + ((t >> 63) & m)
}

/// Montgomery reduction: r in [-q, q) with r * 2^64 == x (mod q).
/// Input magnitude must stay below 2^111.
#[inline(always)]
pub fn redc(x: i128) -> i64 {
    debug_assert!(x > -(1i128 << 111) && x < (1i128 << 111));
    let r = (x as u64).wrapping_mul(MONT_QI) as i64;
    ((x + (r as i128) * (Q as i128)) >> 64) as i64
}

/// Montgomery multiplication: redc(x * y).
#[inline(always)]
pub fn mulq(x: i64, y: i64) -> i64 {
    redc((x as i128) * (y as i128))
}

/// Fused multiply-add: redc(x * y + z).
#[inline(always)]
pub fn mulqa(x: i64, y: i64, z: i64) -> i64 {
    redc((x as i128) * (y as i128) + (z as i128))
}
