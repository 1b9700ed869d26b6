//! BIP-32 Hierarchical Keys
//!
//! A [`HierarchicalKey`] is one immutable node of an HD tree: depth, parent
//! fingerprint, child index, chain code and either a private scalar or a
//! compressed public point. Deriving a child never touches the parent, it
//! returns a new node.
//!
//! ## Derivation
//!
//! ```text
//! hardened:  I = HMAC-SHA512(chain_code, 0x00 || k_par || ser32(i))
//! normal:    I = HMAC-SHA512(chain_code, K_par || ser32(i))
//!
//! private:   k_i = IL + k_par (mod n)
//! public:    K_i = IL*G + K_par
//! chain:     c_i = IR
//! ```
//!
//! When `IL >= n`, `k_i == 0` or `K_i` is the point at infinity the child is
//! invalid and `InvalidScalarOrPoint` is returned. BIP-32 suggests moving on
//! to the next index in that case; that choice is left to the caller.
//!
//! ## Usage
//!
//! ```ignore
//! let master = HierarchicalKey::from_seed(&seed, Secp256kFun)?;
//! let account = master.derive_path("m/44'/0'/0'")?;
//! let xpub = account.serialize_public(&NetworkPrefixes::BITCOIN);
//! ```

use std::fmt;

use rand::RngCore;
use tracing::{debug, trace, warn};
use zeroize::Zeroizing;

use crate::crypto::hash::{hash160, hmac_sha512, split_hmac};
use crate::crypto::key::KeyMaterial;
use crate::curve::{is_below_order, CurveAdapter, Secp256kFun};
use crate::path::{self, is_hardened};
use crate::{HdError, Result};

/// HMAC key used to turn a seed into a master node.
pub const MASTER_SEED_KEY: &[u8] = b"Bitcoin seed";

/// Number of random bytes drawn by [`HierarchicalKey::generate_master`].
pub const GENERATED_SEED_LEN: usize = 64;

// ============================================================================
// Data Structures
// ============================================================================

/// One node of a BIP-32 key tree.
///
/// The curve backend `C` is chosen when the root is built and inherited by
/// every descendant.
#[derive(Clone)]
pub struct HierarchicalKey<C: CurveAdapter = Secp256kFun> {
    curve: C,
    depth: u8,
    parent_fingerprint: u32,
    child_index: u32,
    chain_code: [u8; 32],
    /// Present only on private nodes.
    secret: Option<Zeroizing<[u8; 32]>>,
    /// Always populated; computed from `secret` on private nodes.
    public: [u8; 33],
}

impl<C: CurveAdapter> HierarchicalKey<C> {
    /// Builds a node from its parts.
    ///
    /// # Errors
    /// - `UnsupportedUncompressedKey` if `key` is an uncompressed EC key
    /// - `InvalidScalarOrPoint` if the scalar is outside `(0, n)` or the
    ///   point is not on the curve
    pub fn new(
        curve: C,
        depth: u8,
        parent_fingerprint: u32,
        child_index: u32,
        chain_code: [u8; 32],
        key: KeyMaterial,
    ) -> Result<Self> {
        let (secret, public) = match key {
            KeyMaterial::Private(private) => {
                if !private.is_compressed() {
                    return Err(HdError::UnsupportedUncompressedKey);
                }
                let public = curve.scalar_multiply_base(private.secret_bytes())?;
                (Some(Zeroizing::new(*private.secret_bytes())), public)
            }
            KeyMaterial::Public(public) => {
                if !public.is_compressed() {
                    return Err(HdError::UnsupportedUncompressedKey);
                }
                (None, curve.compress(public.as_bytes())?)
            }
        };

        Ok(Self {
            curve,
            depth,
            parent_fingerprint,
            child_index,
            chain_code,
            secret,
            public,
        })
    }

    /// Draws 64 random bytes and builds a master node from them.
    pub fn generate_master(curve: C) -> Result<Self> {
        let mut seed = Zeroizing::new([0u8; GENERATED_SEED_LEN]);
        rand::thread_rng().fill_bytes(&mut seed[..]);
        Self::from_seed(&seed[..], curve)
    }

    /// Builds the master node for `seed`.
    ///
    /// `I = HMAC-SHA512("Bitcoin seed", seed)`; `IL` is the master scalar and
    /// `IR` the master chain code. Any seed length is accepted; BIP-32
    /// recommends 128 to 512 bits.
    ///
    /// # Errors
    /// `InvalidScalarOrPoint` if `IL` is zero or not below the curve order.
    pub fn from_seed(seed: &[u8], curve: C) -> Result<Self> {
        let i = Zeroizing::new(hmac_sha512(MASTER_SEED_KEY, seed));
        let (il, chain_code) = split_hmac(&i);
        let il = Zeroizing::new(il);

        if !curve.is_valid_scalar(&il) {
            warn!(backend = curve.name(), "seed produced an invalid master key");
            return Err(HdError::InvalidScalarOrPoint("master key out of range"));
        }

        let public = curve.scalar_multiply_base(&il)?;
        let master = Self {
            curve,
            depth: 0,
            parent_fingerprint: 0,
            child_index: 0,
            chain_code,
            secret: Some(il),
            public,
        };
        debug!(
            backend = master.curve.name(),
            fingerprint = %format_args!("{:08x}", master.fingerprint()),
            "built master key from seed"
        );
        Ok(master)
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Whether this node holds a private scalar.
    pub fn is_private(&self) -> bool {
        self.secret.is_some()
    }

    /// Whether this node was produced by hardened derivation.
    pub fn is_hardened(&self) -> bool {
        is_hardened(self.child_index)
    }

    /// Number of derivations between the master node and this one.
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Index this node was derived at, hardened bit included.
    pub fn child_index(&self) -> u32 {
        self.child_index
    }

    /// Fingerprint of the parent node; zero for a master node.
    pub fn parent_fingerprint(&self) -> u32 {
        self.parent_fingerprint
    }

    /// The chain code.
    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// The curve backend carried by this node.
    pub fn curve(&self) -> &C {
        &self.curve
    }

    /// First four bytes of HASH160 of the compressed public point.
    ///
    /// Children derived from this node record it as their parent fingerprint.
    pub fn fingerprint(&self) -> u32 {
        let id = hash160(&self.public);
        u32::from_be_bytes([id[0], id[1], id[2], id[3]])
    }

    /// The 32-byte private scalar.
    ///
    /// # Errors
    /// `MissingPrivateMaterial` on public-only nodes.
    pub fn private_scalar(&self) -> Result<&[u8; 32]> {
        self.secret
            .as_deref()
            .ok_or(HdError::MissingPrivateMaterial)
    }

    /// The compressed public point.
    pub fn public_point(&self) -> [u8; 33] {
        self.public
    }

    /// A public-only copy of this node.
    ///
    /// Non-hardened descendants of the copy have the same public points as
    /// the corresponding descendants of the original.
    pub fn neuter(&self) -> Self {
        Self {
            curve: self.curve.clone(),
            depth: self.depth,
            parent_fingerprint: self.parent_fingerprint,
            child_index: self.child_index,
            chain_code: self.chain_code,
            secret: None,
            public: self.public,
        }
    }

    // ------------------------------------------------------------------------
    // Derivation
    // ------------------------------------------------------------------------

    /// Derives the child at `index`. Indices `>= 2^31` are hardened.
    ///
    /// # Errors
    /// - `HardenedDerivationRequiresPrivateKey` for a hardened index on a
    ///   public-only node
    /// - `InvalidScalarOrPoint` if the index yields an invalid key; the
    ///   caller may retry with the next index
    /// - `DepthOverflow` if this node is already at depth 255
    pub fn derive_child(&self, index: u32) -> Result<Self> {
        let depth = self.depth.checked_add(1).ok_or(HdError::DepthOverflow)?;
        let hardened = is_hardened(index);

        let mut data = Zeroizing::new(Vec::with_capacity(37));
        if hardened {
            let secret = self
                .secret
                .as_ref()
                .ok_or(HdError::HardenedDerivationRequiresPrivateKey(index))?;
            data.push(0x00);
            data.extend_from_slice(&secret[..]);
        } else {
            data.extend_from_slice(&self.public);
        }
        data.extend_from_slice(&index.to_be_bytes());

        let i = Zeroizing::new(hmac_sha512(&self.chain_code, &data));
        let (il, chain_code) = split_hmac(&i);
        let il = Zeroizing::new(il);

        if !is_below_order(&il, &self.curve.curve_order()) {
            warn!(index, depth, "derived tweak is not below the curve order");
            return Err(HdError::InvalidScalarOrPoint("derived tweak out of range"));
        }

        let (secret, public) = self
            .child_material(&il)
            .inspect_err(|e| warn!(index, depth, error = %e, "derived child key is invalid"))?;

        let child = Self {
            curve: self.curve.clone(),
            depth,
            parent_fingerprint: self.fingerprint(),
            child_index: index,
            chain_code,
            secret,
            public,
        };
        trace!(
            depth,
            index,
            hardened,
            private = child.is_private(),
            parent = %format_args!("{:08x}", child.parent_fingerprint),
            "derived child key"
        );
        Ok(child)
    }

    /// `k_i = IL + k_par` on private nodes, `K_i = IL*G + K_par` on public ones.
    fn child_material(&self, il: &[u8; 32]) -> Result<(Option<Zeroizing<[u8; 32]>>, [u8; 33])> {
        match &self.secret {
            Some(parent) => {
                let child = Zeroizing::new(self.curve.scalar_add(il, parent)?);
                let public = self.curve.scalar_multiply_base(&child)?;
                Ok((Some(child), public))
            }
            None => {
                let tweak = self.curve.scalar_multiply_base(il)?;
                Ok((None, self.curve.point_add(&tweak, &self.public)?))
            }
        }
    }

    /// Derives each index in turn, left to right.
    ///
    /// Fails on the first invalid step; no partially derived node is
    /// returned.
    pub fn derive_indices(&self, indices: &[u32]) -> Result<Self> {
        indices
            .iter()
            .try_fold(self.clone(), |node, &index| node.derive_child(index))
            .inspect_err(|e| {
                debug!(path = %path::render(indices), error = %e, "path derivation failed")
            })
    }

    /// Decodes `path` (for example `m/44'/0'/0'/0/0`) and derives along it.
    pub fn derive_path(&self, path: &str) -> Result<Self> {
        let indices = path::decode(path)?;
        self.derive_indices(&indices)
    }
}

impl<C: CurveAdapter> PartialEq for HierarchicalKey<C> {
    fn eq(&self, other: &Self) -> bool {
        self.depth == other.depth
            && self.parent_fingerprint == other.parent_fingerprint
            && self.child_index == other.child_index
            && self.chain_code == other.chain_code
            && self.secret == other.secret
            && self.public == other.public
    }
}

impl<C: CurveAdapter> Eq for HierarchicalKey<C> {}

impl<C: CurveAdapter> fmt::Debug for HierarchicalKey<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HierarchicalKey")
            .field("curve", &self.curve.name())
            .field("depth", &self.depth)
            .field(
                "parent_fingerprint",
                &format_args!("{:08x}", self.parent_fingerprint),
            )
            .field("child_index", &self.child_index)
            .field("chain_code", &hex::encode(self.chain_code))
            .field("public", &hex::encode(self.public))
            .field("private", &self.secret.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
