//! Public-parent to public-child key derivation (BIP-32 CKDpub).
//!
//! Only non-hardened children can be derived from a public key. An index whose HMAC output is not a
//! valid scalar, or whose child point is the point at infinity, is skipped in favour of the next
//! index, at most [`MAX_DERIVATION_ATTEMPTS`] times in total.

use bitcoin::hashes::{sha512, Hash, HashEngine, Hmac, HmacEngine};
use secp256k1::{PublicKey, Scalar, SECP256K1};

use crate::paths::HARDENED_KEY_START;

/// Number of consecutive indices tried before giving up on a derivation.
pub const MAX_DERIVATION_ATTEMPTS: u32 = 16;

/// Error type for child key derivation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DerivationError {
    /// Hardened children need the parent private key.
    #[error("hardened derivation is not supported from a public key (index {0:#x})")]
    HardenedDerivationUnsupported(u32),

    /// Every candidate index produced an invalid child key.
    #[error("no valid child key within {attempts} indices starting at {index}")]
    DerivationRetryLimitExceeded {
        /// The originally requested index.
        index: u32,
        /// How many indices were tried.
        attempts: u32,
    },
}

/// A derived child public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildKey {
    /// The index the key was actually derived at. Differs from the requested one only when
    /// earlier indices were invalid.
    pub index: u32,

    /// Chain code for deriving the next level.
    pub chain_code: [u8; 32],

    /// The child public key.
    pub public_key: PublicKey,
}

/// Derives the non-hardened child of `(chain_code, public_key)` at `index`.
///
/// Pure and deterministic: identical inputs always produce identical outputs.
pub fn derive_child(
    chain_code: &[u8; 32],
    public_key: &PublicKey,
    index: u32,
) -> Result<ChildKey, DerivationError> {
    derive_with_retries(index, |candidate| {
        ckd_pub(chain_code, public_key, candidate)
    })
}

/// Runs `attempt` on successive indices until it yields a key.
fn derive_with_retries<F>(index: u32, mut attempt: F) -> Result<ChildKey, DerivationError>
where
    F: FnMut(u32) -> Option<ChildKey>,
{
    let mut candidate = index;
    for _ in 0..MAX_DERIVATION_ATTEMPTS {
        if candidate >= HARDENED_KEY_START {
            return Err(DerivationError::HardenedDerivationUnsupported(candidate));
        }
        if let Some(child) = attempt(candidate) {
            return Ok(child);
        }
        // candidate < 2^31 here, so this cannot overflow.
        candidate += 1;
    }

    Err(DerivationError::DerivationRetryLimitExceeded {
        index,
        attempts: MAX_DERIVATION_ATTEMPTS,
    })
}

/// A single CKDpub step. Returns `None` if `index` yields an invalid key.
fn ckd_pub(chain_code: &[u8; 32], public_key: &PublicKey, index: u32) -> Option<ChildKey> {
    let mut engine = HmacEngine::<sha512::Hash>::new(chain_code);
    engine.input(&public_key.serialize());
    engine.input(&index.to_be_bytes());
    let i = Hmac::<sha512::Hash>::from_engine(engine).to_byte_array();

    let mut i_l = [0u8; 32];
    i_l.copy_from_slice(&i[..32]);
    let mut i_r = [0u8; 32];
    i_r.copy_from_slice(&i[32..]);

    // Fails when I_L >= n.
    let tweak = Scalar::from_be_bytes(i_l).ok()?;
    // Fails when the sum is the point at infinity.
    let child = public_key.add_exp_tweak(SECP256K1, &tweak).ok()?;

    Some(ChildKey {
        index,
        chain_code: i_r,
        public_key: child,
    })
}
