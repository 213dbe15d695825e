//! Account-level keys of the BIP-39 "abandon abandon ... about" wallet and addresses derived from
//! them, as published alongside BIP-44, BIP-49 and BIP-84.

/// `m/44'/0'/0'`
pub(crate) const XPUB: &str = "xpub6BosfCnifzxcFwrSzQiqu2DBVTshkCXacvNsWGYJVVhhawA7d4R5WSWGFNbi8Aw6ZRc1brxMyWMzG3DSSSSoekkudhUd9yLb6qx39T9nMdj";

/// `m/49'/0'/0'`
pub(crate) const YPUB: &str = "ypub6Ww3ibxVfGzLrAH1PNcjyAWenMTbbAosGNB6VvmSEgytSER9azLDWCxoJwW7Ke7icmizBMXrzBx9979FfaHxHcrArf3zbeJJJUZPf663zsP";

/// `m/84'/0'/0'`
pub(crate) const ZPUB: &str = "zpub6rFR7y4Q2AijBEqTUquhVz398htDFrtymD9xYYfG1m4wAcvPhXNfE3EfH1r1ADqtfSdVCToUG868RvUUkgDKf31mGDtKsAYz2oz2AGutZYs";

/// `m/44'/0'/0'/0/0`
pub(crate) const XPUB_RECEIVE_0: &str = "1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabA";

/// `m/49'/0'/0'/0/0`
pub(crate) const YPUB_RECEIVE_0: &str = "37VucYSaXLCAsxYyAPfbSi9eh4iEcbShgf";

/// `m/84'/0'/0'/0/0`
pub(crate) const ZPUB_RECEIVE_0: &str = "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu";

/// `m/84'/0'/0'/0/1`
pub(crate) const ZPUB_RECEIVE_1: &str = "bc1qnjg0jd8228aq7egyzacy8cys3knf9xvrerkf9g";

/// `m/84'/0'/0'/1/0`
pub(crate) const ZPUB_CHANGE_0: &str = "bc1q8c6fshw2dlwun7ekn9qwf37cu2rn755upcp6el";
