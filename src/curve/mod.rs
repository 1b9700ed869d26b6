//! Elliptic Curve Backends
//!
//! Hierarchical keys never touch curve arithmetic directly. Everything goes
//! through the [`CurveAdapter`] capability, which is injected when a root key
//! is built and carried along by every derived node.
//!
//! - **fun**: [`Secp256kFun`], pure Rust arithmetic from `secp256kfun`
//! - **libsecp**: [`LibSecp256k1`], bindings to libsecp256k1 via `bitcoin`
//!
//! Scalars are 32-byte big-endian arrays and points are 33-byte compressed
//! SEC1 encodings at this boundary, so both backends are interchangeable and
//! produce byte-identical trees.

mod fun;
mod libsecp;

pub use fun::Secp256kFun;
pub use libsecp::LibSecp256k1;

use crate::Result;

/// Order `n` of the secp256k1 group, big-endian.
pub const SECP256K1_ORDER: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

/// Curve capability consumed by hierarchical key derivation.
///
/// Implementations must be cheap to clone: every derived node keeps its own
/// copy of the adapter.
pub trait CurveAdapter: Clone + Send + Sync {
    /// Short backend name, used in logs.
    fn name(&self) -> &'static str;

    /// Order of the curve group, big-endian.
    fn curve_order(&self) -> [u8; 32];

    /// Returns `true` if `0 < scalar < n`.
    fn is_valid_scalar(&self, scalar: &[u8; 32]) -> bool;

    /// Computes `scalar * G` and returns it compressed.
    ///
    /// # Errors
    /// `InvalidScalarOrPoint` if the scalar is zero or not below the order.
    fn scalar_multiply_base(&self, scalar: &[u8; 32]) -> Result<[u8; 33]>;

    /// Adds two compressed points.
    ///
    /// # Errors
    /// `InvalidScalarOrPoint` if either input is not on the curve or the sum
    /// is the point at infinity.
    fn point_add(&self, a: &[u8; 33], b: &[u8; 33]) -> Result<[u8; 33]>;

    /// Computes `(a + b) mod n`.
    ///
    /// # Errors
    /// `InvalidScalarOrPoint` if an input is not below the order or the sum
    /// reduces to zero.
    fn scalar_add(&self, a: &[u8; 32], b: &[u8; 32]) -> Result<[u8; 32]>;

    /// Parses a SEC1 point (33-byte compressed or 65-byte uncompressed) and
    /// returns its compressed encoding.
    ///
    /// # Errors
    /// `InvalidScalarOrPoint` if the encoding is malformed or off the curve.
    fn compress(&self, encoded: &[u8]) -> Result<[u8; 33]>;
}

/// Returns `true` if `value` is strictly below the big-endian `order`.
///
/// Big-endian byte arrays of equal length compare like the integers they
/// encode.
pub(crate) fn is_below_order(value: &[u8; 32], order: &[u8; 32]) -> bool {
    value < order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_below_order() {
        let mut n_minus_one = SECP256K1_ORDER;
        n_minus_one[31] -= 1;

        assert!(is_below_order(&[0u8; 32], &SECP256K1_ORDER));
        assert!(is_below_order(&n_minus_one, &SECP256K1_ORDER));
        assert!(!is_below_order(&SECP256K1_ORDER, &SECP256K1_ORDER));
        assert!(!is_below_order(&[0xff; 32], &SECP256K1_ORDER));
    }

    #[test]
    fn test_backends_agree_on_order() {
        assert_eq!(Secp256kFun.curve_order(), SECP256K1_ORDER);
        assert_eq!(LibSecp256k1::new().curve_order(), SECP256K1_ORDER);
    }
}
