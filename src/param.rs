//! Compiled-in parameter set.
//!
//! Exactly one `racc128-*` cargo feature selects the masking order `d`
//! (and with it the repetition count and noise widths); the ring, module
//! dimensions and bounds are shared by the whole Raccoon-128 family.
//! A single set is bound per build unit; code elsewhere reads only the
//! constants exported here.

#[cfg(not(any(
    feature = "racc128-1",
    feature = "racc128-2",
    feature = "racc128-4",
    feature = "racc128-8",
    feature = "racc128-16",
    feature = "racc128-32",
)))]
compile_error!("select exactly one racc128-* parameter feature");

/// Security parameter κ in bits.
pub const KAPPA: usize = 128;

/// Ring degree n (negacyclic, x^n + 1).
pub const N: usize = 512;

/// log2(N).
pub const LOG_N: usize = 9;

/// First prime factor, q1 = 2^24 - 2^18 + 1.
pub const Q1: i64 = 16515073;

/// Second prime factor, q2 = 2^25 - 2^18 + 1.
pub const Q2: i64 = 33292289;

/// Ring modulus q = q1 * q2.
pub const Q: i64 = 549824583172097;

/// Bits needed to hold a coefficient in [0, q).
pub const Q_BITS: usize = 49;

/// Mask covering Q_BITS bits.
pub const QMSK: i64 = (1 << Q_BITS) - 1;

/// Module dimensions: t and w have K rows, the secret has ELL.
pub const K: usize = 5;
pub const ELL: usize = 4;

/// Public-key rounding shift.
pub const NUT: usize = 42;

/// Commitment rounding shift.
pub const NUW: usize = 44;

/// Challenge Hamming weight ω.
pub const W: usize = 19;

/// Infinity-norm bound on z.
pub const BOO: i64 = 41954689765971;

/// Scaled squared-L2 bound, 2^-64 * B_2^2.
pub const B22: i64 = 14656575897;

/// Low-bit split in the z run-length encoding.
pub const ZLBITS: usize = 40;

/// Fixed serialized signature size in bytes.
pub const SIG_SZ: usize = 11524;

#[cfg(feature = "racc128-1")]
mod set {
    pub const NAME: &str = "Raccoon-128-1";
    pub const D: usize = 1;
    pub const REP: usize = 8;
    pub const UT: usize = 6;
    pub const UW: usize = 41;
}

#[cfg(feature = "racc128-2")]
mod set {
    pub const NAME: &str = "Raccoon-128-2";
    pub const D: usize = 2;
    pub const REP: usize = 4;
    pub const UT: usize = 6;
    pub const UW: usize = 41;
}

#[cfg(feature = "racc128-4")]
mod set {
    pub const NAME: &str = "Raccoon-128-4";
    pub const D: usize = 4;
    pub const REP: usize = 2;
    pub const UT: usize = 6;
    pub const UW: usize = 41;
}

#[cfg(feature = "racc128-8")]
mod set {
    pub const NAME: &str = "Raccoon-128-8";
    pub const D: usize = 8;
    pub const REP: usize = 1;
    pub const UT: usize = 6;
    pub const UW: usize = 41;
}

#[cfg(feature = "racc128-16")]
mod set {
    pub const NAME: &str = "Raccoon-128-16";
    pub const D: usize = 16;
    pub const REP: usize = 1;
    pub const UT: usize = 5;
    pub const UW: usize = 40;
}

#[cfg(feature = "racc128-32")]
mod set {
    pub const NAME: &str = "Raccoon-128-32";
    pub const D: usize = 32;
    pub const REP: usize = 1;
    pub const UT: usize = 4;
    pub const UW: usize = 39;
}

pub use set::{D, NAME, REP, UT, UW};

/// Byte size of symmetric keys / pre-image security.
pub const SEC: usize = KAPPA / 8;

/// Byte size of collision-resistant hashes.
pub const CRH: usize = 2 * KAPPA / 8;

/// Size of the public matrix seed.
pub const AS_SZ: usize = SEC;

/// Size of the public-key hash tr = H(pk).
pub const TR_SZ: usize = CRH;

/// Size of the pk-bound message digest µ = H(tr, msg).
pub const MU_SZ: usize = CRH;

/// Size of the challenge hash.
pub const CH_SZ: usize = CRH;

/// Size of the mask keys in a serialized secret key.
pub const MK_SZ: usize = SEC;

/// Bits per rounded commitment coefficient.
pub const LGW: usize = Q_BITS - NUW;

/// Rounded moduli q_t = q >> ν_t and q_w = q >> ν_w.
pub const QT: i64 = Q >> NUT;
pub const QW: i64 = Q >> NUW;

/// Scaled infinity-norm bound on the hint.
pub const BOO_H: i64 = (BOO + (1 << (NUW - 1))) >> NUW;

/// Serialized public-key size in bytes.
pub const PK_SZ: usize = AS_SZ + (K * N * (Q_BITS - NUT)).div_ceil(8);

/// Serialized secret-key size in bytes.
pub const SK_SZ: usize = PK_SZ + (D - 1) * MK_SZ + (ELL * N * Q_BITS).div_ceil(8);

// Build-time parameter consistency.
const _: () = {
    assert!(N.is_power_of_two());
    assert!(D.is_power_of_two());
    assert!(Q == Q1 * Q2);
    assert!(Q > 0 && (Q as u64) < (1u64 << Q_BITS));
    assert!((Q as u64) >= (1u64 << (Q_BITS - 1)));
    assert!(ZLBITS < Q_BITS);
    assert!(W < N);
    assert!(PK_SZ == 2256);
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_sizes() {
        assert_eq!(QT, 125);
        assert_eq!(QW, 31);
        assert_eq!(LGW, 5);
        assert_eq!(BOO_H, 2);
        assert_eq!(PK_SZ, 2256);
        assert_eq!(SK_SZ, PK_SZ + (D - 1) * 16 + 12544);
    }

    #[test]
    fn modulus_factors() {
        assert_eq!(Q1, (1 << 24) - (1 << 18) + 1);
        assert_eq!(Q2, (1 << 25) - (1 << 18) + 1);
        assert_eq!(Q1 as i128 * Q2 as i128, Q as i128);
    }
}
