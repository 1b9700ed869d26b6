use std::sync::Arc;

use bitcoin::secp256k1::{self, constants::CURVE_ORDER, All, PublicKey, Secp256k1, SecretKey};

use super::CurveAdapter;
use crate::{HdError, Result};

/// secp256k1 backend backed by libsecp256k1 through the `bitcoin` crate.
///
/// The signing/verification context is shared behind an [`Arc`] so cloning
/// the adapter into derived nodes does not rebuild it.
#[derive(Debug, Clone)]
pub struct LibSecp256k1 {
    secp: Arc<Secp256k1<All>>,
}

impl LibSecp256k1 {
    /// Creates a backend with a fresh context.
    pub fn new() -> Self {
        Self {
            secp: Arc::new(Secp256k1::new()),
        }
    }

    fn secret_key(bytes: &[u8; 32]) -> Result<SecretKey> {
        SecretKey::from_slice(bytes)
            .map_err(|_| HdError::InvalidScalarOrPoint("scalar out of range"))
    }

    fn public_key(bytes: &[u8]) -> Result<PublicKey> {
        PublicKey::from_slice(bytes)
            .map_err(|_| HdError::InvalidScalarOrPoint("point is not on the curve"))
    }
}

impl Default for LibSecp256k1 {
    fn default() -> Self {
        Self::new()
    }
}

impl CurveAdapter for LibSecp256k1 {
    fn name(&self) -> &'static str {
        "libsecp256k1"
    }

    fn curve_order(&self) -> [u8; 32] {
        CURVE_ORDER
    }

    fn is_valid_scalar(&self, scalar: &[u8; 32]) -> bool {
        SecretKey::from_slice(scalar).is_ok()
    }

    fn scalar_multiply_base(&self, scalar: &[u8; 32]) -> Result<[u8; 33]> {
        let secret = Self::secret_key(scalar)?;
        Ok(PublicKey::from_secret_key(&self.secp, &secret).serialize())
    }

    fn point_add(&self, a: &[u8; 33], b: &[u8; 33]) -> Result<[u8; 33]> {
        let a = Self::public_key(a)?;
        let b = Self::public_key(b)?;
        let sum = a
            .combine(&b)
            .map_err(|_| HdError::InvalidScalarOrPoint("point addition reached infinity"))?;
        Ok(sum.serialize())
    }

    fn scalar_add(&self, a: &[u8; 32], b: &[u8; 32]) -> Result<[u8; 32]> {
        // libsecp256k1 has no zero secret key, so a zero operand is the identity.
        if *b == [0u8; 32] {
            return Ok(Self::secret_key(a)?.secret_bytes());
        }
        let tweak = secp256k1::Scalar::from_be_bytes(*a)
            .map_err(|_| HdError::InvalidScalarOrPoint("scalar is not below the curve order"))?;
        let sum = Self::secret_key(b)?
            .add_tweak(&tweak)
            .map_err(|_| HdError::InvalidScalarOrPoint("scalar sum is zero"))?;
        Ok(sum.secret_bytes())
    }

    fn compress(&self, encoded: &[u8]) -> Result<[u8; 33]> {
        if encoded.len() != 33 && encoded.len() != 65 {
            return Err(HdError::InvalidScalarOrPoint("malformed point encoding"));
        }
        Ok(Self::public_key(encoded)?.serialize())
    }
}
