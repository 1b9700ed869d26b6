//! Command implementations behind the `hdkeytree` binary.
//!
//! Each `*_core` function is pure apart from randomness: it takes its inputs
//! and a network, and returns a [`CommandResult`] holding the human-readable
//! explanation plus a JSON line for scripts.

use anyhow::{Context, Result};
use hdkeytree::crypto::mnemonic::{format_mnemonic_numbered, generate_mnemonic};
use hdkeytree::path::{self, is_hardened};
use hdkeytree::{CurveAdapter, DerivationPath, HierarchicalKey, NetworkPrefixes};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::CommandResult;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";

// ============================================================================
// Data Structures
// ============================================================================

/// JSON description of one key node.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KeyOutput {
    /// Mnemonic backing a freshly generated master key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mnemonic: Option<String>,
    /// Extended private key, absent for public-only nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xprv: Option<String>,
    pub xpub: String,
    pub depth: u8,
    /// Parent fingerprint (hex)
    pub parent_fingerprint: String,
    pub child_index: u32,
    pub hardened: bool,
    /// This node's fingerprint (hex)
    pub fingerprint: String,
    /// Compressed public point (hex)
    pub public_key: String,
    /// Path the node was derived along, relative to the input key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<DerivationPath>,
}

/// JSON output of `decode-path`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PathOutput {
    pub path: DerivationPath,
    pub indices: Vec<u32>,
}

fn key_output<C: CurveAdapter>(key: &HierarchicalKey<C>, network: &NetworkPrefixes) -> KeyOutput {
    KeyOutput {
        mnemonic: None,
        xprv: key.serialize_private(network).ok(),
        xpub: key.serialize_public(network),
        depth: key.depth(),
        parent_fingerprint: format!("{:08x}", key.parent_fingerprint()),
        child_index: key.child_index(),
        hardened: key.is_hardened(),
        fingerprint: format!("{:08x}", key.fingerprint()),
        public_key: hex::encode(key.public_point()),
        path: None,
    }
}

fn describe(out: &mut String, key: &KeyOutput) {
    out.push_str(&format!("Depth:              {}\n", key.depth));
    out.push_str(&format!("Parent fingerprint: {}\n", key.parent_fingerprint));
    let index = if key.hardened {
        format!("{}' ({})", key.child_index - path::HARDENED_OFFSET, key.child_index)
    } else {
        key.child_index.to_string()
    };
    out.push_str(&format!("Child index:        {}\n", index));
    out.push_str(&format!("Fingerprint:        {}\n", key.fingerprint));
    out.push_str(&format!("Public key:         {}\n\n", key.public_key));

    if let Some(xprv) = &key.xprv {
        out.push_str(&format!("Extended private key:\n   {}\n", xprv));
    }
    out.push_str(&format!("Extended public key:\n   {}\n", key.xpub));
}

fn finish(out: String, output: &impl Serialize) -> Result<CommandResult> {
    let result = serde_json::to_string(output)?;
    Ok(CommandResult {
        output: out,
        result,
    })
}

// ============================================================================
// Master Key Construction
// ============================================================================

/// Creates a random master key, optionally backed by a fresh mnemonic.
pub fn generate_core<C: CurveAdapter>(
    words: Option<usize>,
    passphrase: &str,
    network: &NetworkPrefixes,
    curve: C,
) -> Result<CommandResult> {
    let mut out = String::new();
    out.push_str("HD Master Key Generation (BIP-32)\n\n");
    out.push_str(RULE);

    let (master, mnemonic) = match words {
        Some(count) => {
            out.push_str(&format!("Generating a {count}-word BIP-39 mnemonic...\n"));
            let mnemonic = generate_mnemonic(count)?;
            let phrase = Zeroizing::new(mnemonic.to_string());
            let master = HierarchicalKey::from_mnemonic(&phrase, passphrase, curve)?;
            out.push_str("\nWrite these words down in order:\n\n");
            out.push_str(&format_mnemonic_numbered(&mnemonic));
            out.push_str("\n\n");
            (master, Some(phrase))
        }
        None => {
            out.push_str("Drawing 64 random bytes as the seed...\n");
            out.push_str("   I = HMAC-SHA512(\"Bitcoin seed\", seed)\n");
            out.push_str("   master key = I[0..32], chain code = I[32..64]\n\n");
            (HierarchicalKey::generate_master(curve)?, None)
        }
    };

    let mut output = key_output(&master, network);
    output.mnemonic = mnemonic.map(|phrase| phrase.to_string());

    out.push_str(RULE);
    describe(&mut out, &output);
    out.push_str("\nNEVER share the extended private key or the mnemonic!\n");

    finish(out, &output)
}

/// Builds the master key for a hex-encoded seed.
pub fn from_seed_core<C: CurveAdapter>(
    seed_hex: &str,
    network: &NetworkPrefixes,
    curve: C,
) -> Result<CommandResult> {
    let seed = Zeroizing::new(hex::decode(seed_hex.trim()).context("Seed must be hex-encoded")?);

    let mut out = String::new();
    out.push_str("HD Master Key from Seed (BIP-32)\n\n");
    out.push_str(RULE);
    out.push_str(&format!("Seed length: {} bytes\n\n", seed.len()));

    let master = HierarchicalKey::from_seed(&seed, curve).context("Failed to build master key")?;
    let output = key_output(&master, network);
    describe(&mut out, &output);

    finish(out, &output)
}

/// Builds the master key for a BIP-39 mnemonic.
pub fn from_mnemonic_core<C: CurveAdapter>(
    words: &str,
    passphrase: &str,
    network: &NetworkPrefixes,
    curve: C,
) -> Result<CommandResult> {
    let mut out = String::new();
    out.push_str("HD Master Key from Mnemonic (BIP-39 + BIP-32)\n\n");
    out.push_str(RULE);
    if !passphrase.is_empty() {
        out.push_str("Using passphrase (a different passphrase gives a different wallet)\n\n");
    }

    let master = HierarchicalKey::from_mnemonic(words, passphrase, curve)
        .context("Failed to build master key from mnemonic")?;
    let output = key_output(&master, network);
    describe(&mut out, &output);

    finish(out, &output)
}

// ============================================================================
// Extended Key Operations
// ============================================================================

/// Derives a descendant of an extended key.
pub fn derive_core<C: CurveAdapter>(
    key: &str,
    path_text: &str,
    public_only: bool,
    network: &NetworkPrefixes,
    curve: C,
) -> Result<CommandResult> {
    let parent = HierarchicalKey::from_extended(key.trim(), network, curve)
        .context("Failed to decode extended key")?;
    let derivation: DerivationPath = path_text.parse().context("Invalid derivation path")?;

    let mut out = String::new();
    out.push_str("HD Child Key Derivation (BIP-32)\n\n");
    out.push_str(RULE);
    out.push_str(&format!("Parent fingerprint: {:08x}\n", parent.fingerprint()));
    out.push_str(&format!("Path:               {}\n\n", derivation));

    let child = parent
        .derive_indices(&derivation)
        .with_context(|| format!("Failed to derive {derivation}"))?;
    let child = if public_only { child.neuter() } else { child };

    let mut output = key_output(&child, network);
    output.path = Some(derivation);
    describe(&mut out, &output);

    finish(out, &output)
}

/// Decodes an extended key and shows its fields.
pub fn inspect_core<C: CurveAdapter>(
    key: &str,
    network: &NetworkPrefixes,
    curve: C,
) -> Result<CommandResult> {
    let node = HierarchicalKey::from_extended(key.trim(), network, curve)
        .context("Failed to decode extended key")?;

    let mut out = String::new();
    out.push_str("Extended Key Inspection\n\n");
    out.push_str(RULE);
    let kind = if node.is_private() { "private" } else { "public" };
    out.push_str(&format!("Kind:               {kind}\n"));
    out.push_str(&format!("Chain code:         {}\n", hex::encode(node.chain_code())));

    let output = key_output(&node, network);
    describe(&mut out, &output);

    finish(out, &output)
}

/// Strips the private half of an extended key.
pub fn neuter_core<C: CurveAdapter>(
    key: &str,
    network: &NetworkPrefixes,
    curve: C,
) -> Result<CommandResult> {
    let node = HierarchicalKey::from_extended(key.trim(), network, curve)
        .context("Failed to decode extended key")?
        .neuter();

    let mut out = String::new();
    out.push_str("Extended Public Key\n\n");
    out.push_str(RULE);
    out.push_str("Public-only keys can derive non-hardened children but never sign.\n\n");

    let output = key_output(&node, network);
    describe(&mut out, &output);

    finish(out, &output)
}

/// Parses a derivation path into raw indices.
pub fn decode_path_core(path_text: &str) -> Result<CommandResult> {
    let derivation: DerivationPath = path_text.parse().context("Invalid derivation path")?;

    let mut out = String::new();
    out.push_str("Derivation Path\n\n");
    out.push_str(RULE);
    out.push_str(&format!("Canonical: {}\n", derivation));
    for (depth, index) in derivation.iter().enumerate() {
        let note = if is_hardened(*index) { "hardened" } else { "normal" };
        out.push_str(&format!("   depth {}: {} ({note})\n", depth + 1, index));
    }

    let output = PathOutput {
        indices: derivation.indices().to_vec(),
        path: derivation,
    };
    finish(out, &output)
}

// ============================================================================
// Tests
// ============================================================================
