//! Parsing and classification of base58check extended public keys.

use std::{fmt, str::FromStr};

use bitcoin::{
    base58,
    hashes::{sha256d, Hash},
};
use secp256k1::PublicKey;

use crate::{
    derive::{derive_child, ChildKey, DerivationError},
    paths::{
        EXTENDED_KEY_LEN, LEGACY_PURPOSE, NATIVE_SEGWIT_PURPOSE, P2SH_SEGWIT_PURPOSE,
        PUBLIC_KEY_OFFSET, XPUB_VERSIONS, YPUB_VERSIONS, ZPUB_VERSIONS,
    },
};

/// Errors raised while parsing an extended public key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// The trailing four bytes do not match the double-SHA256 of the payload.
    #[error("base58check checksum mismatch")]
    ChecksumError,

    /// The text is not base58 or does not decode to a 78-byte extended key.
    #[error("malformed extended key: {0}")]
    MalformedKey(String),

    /// The prefix is not `xpub`, `ypub` or `zpub`, or the version bytes belong to another family.
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// The key material is not a compressed secp256k1 point.
    #[error("invalid public key format: {0}")]
    InvalidPublicKeyFormat(String),
}

/// The address-generation scheme implied by an extended key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFamily {
    /// `xpub`, BIP-44, P2PKH addresses.
    Legacy,

    /// `ypub`, BIP-49, P2SH-wrapped P2WPKH addresses.
    P2shSegwit,

    /// `zpub`, BIP-84, native P2WPKH addresses.
    NativeSegwit,
}

impl KeyFamily {
    /// Classifies the four-character textual prefix of `raw`, ignoring case.
    pub fn from_prefix(raw: &str) -> Option<Self> {
        let prefix = raw.get(..4)?.to_ascii_lowercase();
        match prefix.as_str() {
            "xpub" => Some(Self::Legacy),
            "ypub" => Some(Self::P2shSegwit),
            "zpub" => Some(Self::NativeSegwit),
            _ => None,
        }
    }

    /// The canonical lowercase prefix.
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Legacy => "xpub",
            Self::P2shSegwit => "ypub",
            Self::NativeSegwit => "zpub",
        }
    }

    /// The BIP-43 purpose number of the family.
    pub const fn purpose(&self) -> u32 {
        match self {
            Self::Legacy => LEGACY_PURPOSE,
            Self::P2shSegwit => P2SH_SEGWIT_PURPOSE,
            Self::NativeSegwit => NATIVE_SEGWIT_PURPOSE,
        }
    }

    /// The first mainnet account path, used as a label when none is configured.
    pub fn default_account_path(&self) -> String {
        format!("m/{}'/0'/0'", self.purpose())
    }

    /// Whether `version` is one of the version-byte sets this family is serialized with.
    pub fn accepts_version(&self, version: &[u8; 4]) -> bool {
        let versions = match self {
            Self::Legacy => XPUB_VERSIONS,
            Self::P2shSegwit => YPUB_VERSIONS,
            Self::NativeSegwit => ZPUB_VERSIONS,
        };
        versions.contains(version)
    }
}

impl fmt::Display for KeyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Legacy => "legacy (P2PKH)",
            Self::P2shSegwit => "nested segwit (P2SH-P2WPKH)",
            Self::NativeSegwit => "native segwit (P2WPKH)",
        };
        f.write_str(name)
    }
}

impl FromStr for KeyFamily {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 4 {
            return Err(KeyError::UnsupportedKeyType(s.to_string()));
        }
        Self::from_prefix(s).ok_or_else(|| KeyError::UnsupportedKeyType(s.to_string()))
    }
}

/// A parsed extended public key.
///
/// Constructed once by [`parse`] and never mutated; derivation copies what it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtendedPublicKey {
    /// The family implied by the textual prefix.
    pub family: KeyFamily,

    /// Serialization version bytes.
    pub version: [u8; 4],

    /// Depth below the master key.
    pub depth: u8,

    /// First four bytes of the parent's key identifier.
    pub parent_fingerprint: [u8; 4],

    /// The child number this key was derived at.
    pub child_number: u32,

    /// Chain code used as the HMAC key for child derivation.
    pub chain_code: [u8; 32],

    /// The compressed public key.
    pub public_key: PublicKey,
}

impl ExtendedPublicKey {
    /// Serializes the key back into its 78-byte form.
    pub fn to_bytes(&self) -> [u8; EXTENDED_KEY_LEN] {
        let mut bytes = [0u8; EXTENDED_KEY_LEN];
        bytes[0..4].copy_from_slice(&self.version);
        bytes[4] = self.depth;
        bytes[5..9].copy_from_slice(&self.parent_fingerprint);
        bytes[9..13].copy_from_slice(&self.child_number.to_be_bytes());
        bytes[13..45].copy_from_slice(&self.chain_code);
        bytes[PUBLIC_KEY_OFFSET..].copy_from_slice(&self.public_key.serialize());
        bytes
    }

    /// Derives the non-hardened child at `index` (CKDpub).
    pub fn derive_child(&self, index: u32) -> Result<ChildKey, DerivationError> {
        derive_child(&self.chain_code, &self.public_key, index)
    }
}

impl fmt::Display for ExtendedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base58::encode_check(&self.to_bytes()))
    }
}

impl FromStr for ExtendedPublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Parses a base58check extended public key.
///
/// Checks run in order: base58 alphabet and checksum, decoded length, textual prefix, version
/// bytes against the prefix family, and finally the compressed public key.
pub fn parse(raw: &str) -> Result<ExtendedPublicKey, KeyError> {
    let raw = raw.trim();
    let payload = decode_check(raw)?;

    if payload.len() != EXTENDED_KEY_LEN {
        return Err(KeyError::MalformedKey(format!(
            "expected {EXTENDED_KEY_LEN} bytes, got {}",
            payload.len()
        )));
    }

    let family = KeyFamily::from_prefix(raw).ok_or_else(|| {
        KeyError::UnsupportedKeyType(raw.chars().take(4).collect::<String>())
    })?;

    let mut version = [0u8; 4];
    version.copy_from_slice(&payload[0..4]);
    if !family.accepts_version(&version) {
        return Err(KeyError::UnsupportedKeyType(format!(
            "version bytes {} do not belong to {}",
            hex(&version),
            family.prefix()
        )));
    }

    let key_bytes = &payload[PUBLIC_KEY_OFFSET..];
    if !matches!(key_bytes[0], 0x02 | 0x03) {
        return Err(KeyError::InvalidPublicKeyFormat(format!(
            "leading byte {:#04x}, only compressed public keys are supported",
            key_bytes[0]
        )));
    }
    let public_key = PublicKey::from_slice(key_bytes)
        .map_err(|e| KeyError::InvalidPublicKeyFormat(e.to_string()))?;

    let mut parent_fingerprint = [0u8; 4];
    parent_fingerprint.copy_from_slice(&payload[5..9]);
    let mut child_number = [0u8; 4];
    child_number.copy_from_slice(&payload[9..13]);
    let mut chain_code = [0u8; 32];
    chain_code.copy_from_slice(&payload[13..45]);

    Ok(ExtendedPublicKey {
        family,
        version,
        depth: payload[4],
        parent_fingerprint,
        child_number: u32::from_be_bytes(child_number),
        chain_code,
        public_key,
    })
}

/// Whether [`parse`] would accept `raw`.
pub fn validate(raw: &str) -> bool {
    parse(raw).is_ok()
}

/// Base58-decodes `raw` and strips a verified four-byte checksum.
fn decode_check(raw: &str) -> Result<Vec<u8>, KeyError> {
    let mut data = base58::decode(raw).map_err(|e| KeyError::MalformedKey(e.to_string()))?;
    if data.len() < 4 {
        return Err(KeyError::MalformedKey(format!(
            "{} bytes is too short for a checksum",
            data.len()
        )));
    }

    let split = data.len() - 4;
    let digest = sha256d::Hash::hash(&data[..split]).to_byte_array();
    if digest[..4] != data[split..] {
        return Err(KeyError::ChecksumError);
    }

    data.truncate(split);
    Ok(data)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_vectors::{XPUB, YPUB, ZPUB};

    const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

    fn with_bytes(raw: &str, edit: impl FnOnce(&mut Vec<u8>)) -> String {
        let mut payload = decode_check(raw).unwrap();
        edit(&mut payload);
        base58::encode_check(&payload)
    }

    #[test]
    fn parses_all_three_families() {
        let cases = [
            (XPUB, KeyFamily::Legacy, 44),
            (YPUB, KeyFamily::P2shSegwit, 49),
            (ZPUB, KeyFamily::NativeSegwit, 84),
        ];

        for (raw, family, purpose) in cases {
            let key = parse(raw).unwrap();
            assert_eq!(key.family, family);
            assert_eq!(key.family.purpose(), purpose);
            assert_eq!(key.depth, 3);
            assert_eq!(key.child_number, 0x8000_0000, "account 0' of {raw}");
            assert_eq!(key.to_string(), raw);
            assert!(validate(raw));
        }
    }

    #[test]
    fn default_account_paths() {
        assert_eq!(KeyFamily::Legacy.default_account_path(), "m/44'/0'/0'");
        assert_eq!(KeyFamily::P2shSegwit.default_account_path(), "m/49'/0'/0'");
        assert_eq!(KeyFamily::NativeSegwit.default_account_path(), "m/84'/0'/0'");
    }

    #[test]
    fn family_from_str_is_case_insensitive() {
        assert_eq!("ZPUB".parse::<KeyFamily>().unwrap(), KeyFamily::NativeSegwit);
        assert_eq!("Ypub".parse::<KeyFamily>().unwrap(), KeyFamily::P2shSegwit);
        assert!("tpub".parse::<KeyFamily>().is_err());
        assert!("xpubx".parse::<KeyFamily>().is_err());
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert!(validate(&format!("  {ZPUB}\n")));
    }

    #[test]
    fn checksum_mismatch() {
        let mut corrupted = XPUB.to_string();
        let last = corrupted.pop().unwrap();
        corrupted.push(if last == 'j' { 'k' } else { 'j' });

        assert_eq!(parse(&corrupted), Err(KeyError::ChecksumError));
        assert!(!validate(&corrupted));
    }

    #[test]
    fn non_base58_text_is_malformed() {
        let bad = XPUB.replacen('6', "0", 1);
        assert!(matches!(parse(&bad), Err(KeyError::MalformedKey(_))));
        assert!(matches!(parse(""), Err(KeyError::MalformedKey(_))));
    }

    #[test]
    fn wrong_length_is_malformed() {
        let short = with_bytes(XPUB, |payload| {
            payload.pop();
        });
        assert!(matches!(parse(&short), Err(KeyError::MalformedKey(_))));
    }

    #[test]
    fn unknown_prefix_is_unsupported() {
        // testnet tpub version bytes
        let tpub = with_bytes(XPUB, |payload| {
            payload[0..4].copy_from_slice(&[0x04, 0x35, 0x87, 0xcf]);
        });
        assert!(tpub.starts_with("tpub"));
        assert!(matches!(parse(&tpub), Err(KeyError::UnsupportedKeyType(_))));
    }

    #[test]
    fn foreign_version_bytes_are_unsupported() {
        let odd = with_bytes(XPUB, |payload| payload[3] = 0x1f);
        assert!(matches!(parse(&odd), Err(KeyError::UnsupportedKeyType(_))));
    }

    #[test]
    fn private_and_uncompressed_keys_are_rejected() {
        for leading in [0x00, 0x04] {
            let raw = with_bytes(XPUB, |payload| payload[PUBLIC_KEY_OFFSET] = leading);
            assert!(
                matches!(parse(&raw), Err(KeyError::InvalidPublicKeyFormat(_))),
                "leading byte {leading:#04x}"
            );
            assert!(!validate(&raw));
        }
    }

    #[test]
    fn off_curve_point_is_rejected() {
        // x exceeds the field prime
        let raw = with_bytes(XPUB, |payload| payload[PUBLIC_KEY_OFFSET + 1..].fill(0xff));
        assert!(matches!(parse(&raw), Err(KeyError::InvalidPublicKeyFormat(_))));
    }

    #[test]
    fn every_single_character_corruption_is_caught() {
        for raw in [XPUB, YPUB, ZPUB] {
            for (position, original) in raw.char_indices() {
                for replacement in BASE58_ALPHABET.chars().filter(|c| *c != original) {
                    let mut corrupted = String::with_capacity(raw.len());
                    corrupted.push_str(&raw[..position]);
                    corrupted.push(replacement);
                    corrupted.push_str(&raw[position + 1..]);

                    assert!(
                        parse(&corrupted).is_err(),
                        "{replacement} at {position} of {raw} went unnoticed"
                    );
                }
            }
        }
    }
}
