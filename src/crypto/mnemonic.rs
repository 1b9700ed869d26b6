//! BIP-39 Mnemonic Seeds
//!
//! Human-readable backups for master keys. A mnemonic plus an optional
//! passphrase (the "25th word") is stretched with PBKDF2 into a 64-byte seed,
//! which then becomes a master node through [`HierarchicalKey::from_seed`].
//!
//! ## Usage
//!
//! ```ignore
//! let mnemonic = generate_mnemonic(24)?;
//! println!("Backup:\n{}", format_mnemonic_numbered(&mnemonic));
//!
//! let master = HierarchicalKey::from_mnemonic(&mnemonic.to_string(), "", Secp256kFun)?;
//! ```

use bip39::{Language, Mnemonic};
use rand::RngCore;
use tracing::debug;
use zeroize::Zeroizing;

use crate::crypto::hd::HierarchicalKey;
use crate::curve::CurveAdapter;
use crate::{HdError, Result};

/// Word counts BIP-39 defines.
pub const WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

// ============================================================================
// Mnemonic Generation
// ============================================================================

/// Generates a random English mnemonic with `word_count` words.
///
/// Every three words carry 32 bits of entropy, so 12 words hold 128 bits and
/// 24 words hold 256.
///
/// # Errors
/// `InvalidMnemonic` if `word_count` is not one of [`WORD_COUNTS`].
pub fn generate_mnemonic(word_count: usize) -> Result<Mnemonic> {
    if !WORD_COUNTS.contains(&word_count) {
        return Err(HdError::InvalidMnemonic(format!(
            "unsupported word count {word_count}"
        )));
    }

    let mut entropy = Zeroizing::new([0u8; 32]);
    let len = word_count / 3 * 4;
    rand::thread_rng().fill_bytes(&mut entropy[..len]);

    Mnemonic::from_entropy_in(Language::English, &entropy[..len])
        .map_err(|e| HdError::InvalidMnemonic(e.to_string()))
}

// ============================================================================
// Mnemonic Parsing
// ============================================================================

/// Parses space-separated English words, checking wordlist and checksum.
pub fn parse_mnemonic(words: &str) -> Result<Mnemonic> {
    Mnemonic::parse_in(Language::English, words)
        .map_err(|e| HdError::InvalidMnemonic(e.to_string()))
}

/// Stretches a mnemonic into its 64-byte BIP-39 seed.
///
/// Different passphrases produce unrelated seeds; none of them is "wrong".
pub fn mnemonic_to_seed(mnemonic: &Mnemonic, passphrase: &str) -> Zeroizing<[u8; 64]> {
    Zeroizing::new(mnemonic.to_seed(passphrase))
}

/// Formats a mnemonic as a numbered word list for display.
pub fn format_mnemonic_numbered(mnemonic: &Mnemonic) -> String {
    mnemonic
        .words()
        .enumerate()
        .map(|(i, word)| format!("{:2}. {}", i + 1, word))
        .collect::<Vec<_>>()
        .join("\n")
}

impl<C: CurveAdapter> HierarchicalKey<C> {
    /// Builds the master node for a mnemonic phrase and passphrase.
    ///
    /// # Errors
    /// `InvalidMnemonic` if the phrase fails wordlist or checksum checks.
    pub fn from_mnemonic(words: &str, passphrase: &str, curve: C) -> Result<Self> {
        let mnemonic = parse_mnemonic(words)?;
        debug!(
            words = mnemonic.word_count(),
            passphrase = !passphrase.is_empty(),
            "deriving seed from mnemonic"
        );
        let seed = mnemonic_to_seed(&mnemonic, passphrase);
        Self::from_seed(&seed[..], curve)
    }
}

// ============================================================================
// Tests
// ============================================================================
