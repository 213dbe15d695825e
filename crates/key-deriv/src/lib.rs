//! Extended public key parsing, child key derivation and address encoding.
//!
//! # Usage
//!
//! ```rust,ignore
//! use satsentry_key_deriv::{addresses_for_range, parse};
//!
//! let key = parse("zpub6rFR7y4Q2AijBEqTUquhVz398htDFrtymD9xYYfG1m4wAcvPhXNfE3EfH1r1ADqtfSdVCToUG868RvUUkgDKf31mGDtKsAYz2oz2AGutZYs")?;
//!
//! // First five receive addresses: (0, "bc1qcr8te4..."), (1, "bc1qnjg0jd..."), ...
//! let receive = addresses_for_range(&key, false, 0, 5)?;
//! ```
//!
//! # Key Families
//!
//! The textual prefix of the key selects both the purpose and the address encoding, see
//! [`KeyFamily`]. Derivation never touches private material; hardened indices fail with
//! [`DerivationError::HardenedDerivationUnsupported`].

pub mod address;
pub mod derive;
pub mod engine;
mod keys;
mod paths;

#[cfg(test)]
mod test_vectors;

pub use address::{encode_address, p2pkh_address, p2sh_p2wpkh_address, p2wpkh_address};
pub use derive::{derive_child, ChildKey, DerivationError, MAX_DERIVATION_ATTEMPTS};
pub use engine::addresses_for_range;
pub use keys::{parse, validate, ExtendedPublicKey, KeyError, KeyFamily};
pub use paths::{CHANGE_CHAIN, HARDENED_KEY_START, RECEIVE_CHAIN};
