//! Version bytes, purposes and chain indices of the supported key families.
//!
//! # Key Family Overview
//!
//! | Prefix | Family | Purpose | Version bytes | Address |
//! |--------|--------|---------|---------------|---------|
//! | `xpub` | Legacy | 44 | `0488b21e` | P2PKH |
//! | `ypub` / `Ypub` | P2SH-wrapped SegWit | 49 | `049d7cb2` / `0295b43f` | P2SH-P2WPKH |
//! | `zpub` / `Zpub` | Native SegWit | 84 | `04b24746` / `02aa7ed3` | P2WPKH |
//!
//! Addresses are derived at `{chain}/{index}` directly below the supplied key, which is expected to
//! sit at the account level (`m/{purpose}'/0'/0'`).

/// Version bytes of a mainnet `xpub`.
pub(crate) const XPUB_VERSIONS: &[[u8; 4]] = &[[0x04, 0x88, 0xb2, 0x1e]];

/// Version bytes of a mainnet `ypub` (single-sig) and `Ypub` (multisig).
pub(crate) const YPUB_VERSIONS: &[[u8; 4]] = &[[0x04, 0x9d, 0x7c, 0xb2], [0x02, 0x95, 0xb4, 0x3f]];

/// Version bytes of a mainnet `zpub` (single-sig) and `Zpub` (multisig).
pub(crate) const ZPUB_VERSIONS: &[[u8; 4]] = &[[0x04, 0xb2, 0x47, 0x46], [0x02, 0xaa, 0x7e, 0xd3]];

/// BIP-44 purpose.
pub(crate) const LEGACY_PURPOSE: u32 = 44;

/// BIP-49 purpose.
pub(crate) const P2SH_SEGWIT_PURPOSE: u32 = 49;

/// BIP-84 purpose.
pub(crate) const NATIVE_SEGWIT_PURPOSE: u32 = 84;

/// External (receive) chain index.
pub const RECEIVE_CHAIN: u32 = 0;

/// Internal (change) chain index.
pub const CHANGE_CHAIN: u32 = 1;

/// First hardened child index.
pub const HARDENED_KEY_START: u32 = 0x8000_0000;

/// Byte length of a serialized extended key, without the checksum.
pub(crate) const EXTENDED_KEY_LEN: usize = 78;

/// Offset of the compressed public key inside a serialized extended key.
pub(crate) const PUBLIC_KEY_OFFSET: usize = 45;
