use secp256kfun::prelude::*;

use super::{CurveAdapter, SECP256K1_ORDER};
use crate::{HdError, Result};

/// Pure Rust secp256k1 backend built on `secp256kfun`.
///
/// This is the default backend. It is a zero-sized type, so cloning it into
/// every derived node costs nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Secp256kFun;

impl Secp256kFun {
    fn secret_scalar(bytes: &[u8; 32]) -> Result<Scalar<Secret, NonZero>> {
        Scalar::<Secret, Zero>::from_bytes(*bytes)
            .ok_or(HdError::InvalidScalarOrPoint("scalar is not below the curve order"))?
            .non_zero()
            .ok_or(HdError::InvalidScalarOrPoint("scalar is zero"))
    }

    fn point(bytes: &[u8; 33]) -> Result<Point> {
        Point::from_bytes(*bytes).ok_or(HdError::InvalidScalarOrPoint("point is not on the curve"))
    }
}

impl CurveAdapter for Secp256kFun {
    fn name(&self) -> &'static str {
        "secp256kfun"
    }

    fn curve_order(&self) -> [u8; 32] {
        SECP256K1_ORDER
    }

    fn is_valid_scalar(&self, scalar: &[u8; 32]) -> bool {
        Self::secret_scalar(scalar).is_ok()
    }

    fn scalar_multiply_base(&self, scalar: &[u8; 32]) -> Result<[u8; 33]> {
        let scalar = Self::secret_scalar(scalar)?;
        Ok(g!(scalar * G).normalize().to_bytes())
    }

    fn point_add(&self, a: &[u8; 33], b: &[u8; 33]) -> Result<[u8; 33]> {
        let a = Self::point(a)?;
        let b = Self::point(b)?;
        let sum = g!(a + b)
            .normalize()
            .non_zero()
            .ok_or(HdError::InvalidScalarOrPoint("point addition reached infinity"))?;
        Ok(sum.to_bytes())
    }

    fn scalar_add(&self, a: &[u8; 32], b: &[u8; 32]) -> Result<[u8; 32]> {
        let a = Scalar::<Secret, Zero>::from_bytes(*a)
            .ok_or(HdError::InvalidScalarOrPoint("scalar is not below the curve order"))?;
        let b = Scalar::<Secret, Zero>::from_bytes(*b)
            .ok_or(HdError::InvalidScalarOrPoint("scalar is not below the curve order"))?;
        let sum = s!(a + b)
            .non_zero()
            .ok_or(HdError::InvalidScalarOrPoint("scalar sum is zero"))?;
        Ok(sum.to_bytes())
    }

    fn compress(&self, encoded: &[u8]) -> Result<[u8; 33]> {
        let point = match encoded.len() {
            33 => {
                let bytes: [u8; 33] = encoded
                    .try_into()
                    .map_err(|_| HdError::InvalidScalarOrPoint("malformed point encoding"))?;
                Point::from_bytes(bytes)
            }
            65 => {
                let bytes: [u8; 65] = encoded
                    .try_into()
                    .map_err(|_| HdError::InvalidScalarOrPoint("malformed point encoding"))?;
                Point::from_bytes_uncompressed(bytes)
            }
            _ => None,
        };
        point
            .map(|p| p.to_bytes())
            .ok_or(HdError::InvalidScalarOrPoint("point is not on the curve"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1 * G
    const GENERATOR: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    fn one() -> [u8; 32] {
        let mut one = [0u8; 32];
        one[31] = 1;
        one
    }

    #[test]
    fn test_scalar_multiply_base_one_is_generator() {
        let point = Secp256kFun.scalar_multiply_base(&one()).unwrap();
        assert_eq!(hex::encode(point), GENERATOR);
    }

    #[test]
    fn test_zero_scalar_rejected() {
        assert!(!Secp256kFun.is_valid_scalar(&[0u8; 32]));
        assert!(matches!(
            Secp256kFun.scalar_multiply_base(&[0u8; 32]),
            Err(HdError::InvalidScalarOrPoint(_))
        ));
    }

    #[test]
    fn test_order_rejected() {
        assert!(!Secp256kFun.is_valid_scalar(&SECP256K1_ORDER));
    }

    #[test]
    fn test_scalar_add_wraps_to_zero() {
        let mut n_minus_one = SECP256K1_ORDER;
        n_minus_one[31] -= 1;

        let err = Secp256kFun.scalar_add(&n_minus_one, &one()).unwrap_err();
        assert!(matches!(err, HdError::InvalidScalarOrPoint(_)));
    }

    #[test]
    fn test_point_add_matches_scalar_add() {
        let mut two = [0u8; 32];
        two[31] = 2;
        let mut three = [0u8; 32];
        three[31] = 3;

        let p1 = Secp256kFun.scalar_multiply_base(&one()).unwrap();
        let p2 = Secp256kFun.scalar_multiply_base(&two).unwrap();
        let p3 = Secp256kFun.scalar_multiply_base(&three).unwrap();

        assert_eq!(Secp256kFun.point_add(&p1, &p2).unwrap(), p3);
        assert_eq!(Secp256kFun.scalar_add(&one(), &two).unwrap(), three);
    }

    #[test]
    fn test_compress_uncompressed_generator() {
        let uncompressed = hex::decode(
            "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798\
             483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8",
        )
        .unwrap();
        let compressed = Secp256kFun.compress(&uncompressed).unwrap();
        assert_eq!(hex::encode(compressed), GENERATOR);
    }

    #[test]
    fn test_compress_rejects_garbage() {
        assert!(Secp256kFun.compress(&[0x02; 10]).is_err());
        assert!(Secp256kFun.compress(&[0x05; 33]).is_err());
    }
}
