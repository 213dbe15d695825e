//! Address encodings for compressed public keys.
//!
//! All encoders expect a valid 33-byte compressed public key; anything else is a caller bug.

use bitcoin::{
    base58,
    bech32::{hrp, segwit},
    hashes::{hash160, Hash},
};

use crate::keys::KeyFamily;

/// Mainnet P2PKH version byte.
pub const P2PKH_VERSION: u8 = 0x00;

/// Mainnet P2SH version byte.
pub const P2SH_VERSION: u8 = 0x05;

/// Encodes `public_key` in the format implied by `family`.
pub fn encode_address(family: KeyFamily, public_key: &[u8; 33]) -> String {
    match family {
        KeyFamily::Legacy => p2pkh_address(public_key),
        KeyFamily::P2shSegwit => p2sh_p2wpkh_address(public_key),
        KeyFamily::NativeSegwit => p2wpkh_address(public_key),
    }
}

/// Legacy pay-to-pubkey-hash address.
pub fn p2pkh_address(public_key: &[u8; 33]) -> String {
    base58_address(P2PKH_VERSION, &key_hash(public_key))
}

/// Pay-to-witness-pubkey-hash nested in pay-to-script-hash.
pub fn p2sh_p2wpkh_address(public_key: &[u8; 33]) -> String {
    let mut redeem_script = [0u8; 22];
    redeem_script[0] = 0x00; // OP_0
    redeem_script[1] = 0x14; // push 20 bytes
    redeem_script[2..].copy_from_slice(&key_hash(public_key));

    let script_hash = hash160::Hash::hash(&redeem_script).to_byte_array();
    base58_address(P2SH_VERSION, &script_hash)
}

/// Native segwit v0 address with the `bc` human-readable part.
pub fn p2wpkh_address(public_key: &[u8; 33]) -> String {
    segwit::encode_v0(hrp::BC, &key_hash(public_key))
        .expect("a 20-byte v0 witness program is always encodable")
}

fn key_hash(public_key: &[u8; 33]) -> [u8; 20] {
    assert!(
        matches!(public_key[0], 0x02 | 0x03),
        "not a compressed public key"
    );
    hash160::Hash::hash(public_key).to_byte_array()
}

fn base58_address(version: u8, hash: &[u8; 20]) -> String {
    let mut payload = [0u8; 21];
    payload[0] = version;
    payload[1..].copy_from_slice(hash);
    base58::encode_check(&payload)
}

#[cfg(test)]
mod tests {
    use bitcoin::{Address, CompressedPublicKey, Network};

    use super::*;
    use crate::{
        keys::parse,
        test_vectors::{XPUB, YPUB, ZPUB},
    };

    fn decode_version(address: &str) -> u8 {
        base58::decode_check(address).unwrap()[0]
    }

    #[test]
    fn family_selects_encoding() {
        for (raw, expected_version) in [(XPUB, P2PKH_VERSION), (YPUB, P2SH_VERSION)] {
            let key = parse(raw).unwrap();
            let address = encode_address(key.family, &key.public_key.serialize());
            assert_eq!(decode_version(&address), expected_version);
        }

        let key = parse(ZPUB).unwrap();
        let address = encode_address(key.family, &key.public_key.serialize());
        let (hrp, version, program) = segwit::decode(&address).unwrap();
        assert_eq!(hrp, hrp::BC);
        assert_eq!(version, segwit::VERSION_0);
        assert_eq!(program.len(), 20);
    }

    #[test]
    fn matches_bitcoin_crate_addresses() {
        let key = parse(XPUB).unwrap();
        let bytes = key.public_key.serialize();
        let compressed = CompressedPublicKey(key.public_key);

        assert_eq!(
            p2pkh_address(&bytes),
            Address::p2pkh(compressed.pubkey_hash(), Network::Bitcoin).to_string()
        );
        assert_eq!(
            p2sh_p2wpkh_address(&bytes),
            Address::p2shwpkh(&compressed, Network::Bitcoin).to_string()
        );
        assert_eq!(
            p2wpkh_address(&bytes),
            Address::p2wpkh(&compressed, Network::Bitcoin).to_string()
        );
    }

    #[test]
    #[should_panic(expected = "not a compressed public key")]
    fn uncompressed_prefix_is_a_contract_violation() {
        let mut bytes = parse(XPUB).unwrap().public_key.serialize();
        bytes[0] = 0x04;
        p2pkh_address(&bytes);
    }
}
