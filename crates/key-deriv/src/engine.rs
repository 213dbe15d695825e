//! Derivation of `(index, address)` pairs along `{chain}/{index}` below an extended key.

use crate::{
    address::encode_address,
    derive::{derive_child, DerivationError},
    keys::ExtendedPublicKey,
    paths::{CHANGE_CHAIN, HARDENED_KEY_START, RECEIVE_CHAIN},
};

/// Derives `count` addresses at `{change}/{start..start + count}` below `key`.
///
/// The chain node is derived once and reused as the parent of every leaf. The first failure aborts
/// the whole range, so callers never see a batch with holes in it. A range that would reach into
/// the hardened index space is rejected before anything is derived.
pub fn addresses_for_range(
    key: &ExtendedPublicKey,
    change: bool,
    start: u32,
    count: u32,
) -> Result<Vec<(u32, String)>, DerivationError> {
    if count == 0 {
        return Ok(Vec::new());
    }

    let last = start.checked_add(count - 1).unwrap_or(u32::MAX);
    if last >= HARDENED_KEY_START {
        return Err(DerivationError::HardenedDerivationUnsupported(
            start.max(HARDENED_KEY_START),
        ));
    }

    let chain_index = if change { CHANGE_CHAIN } else { RECEIVE_CHAIN };
    let chain = derive_child(&key.chain_code, &key.public_key, chain_index)?;

    (start..=last)
        .map(|index| {
            let leaf = derive_child(&chain.chain_code, &chain.public_key, index)?;
            Ok((
                index,
                encode_address(key.family, &leaf.public_key.serialize()),
            ))
        })
        .collect()
}
