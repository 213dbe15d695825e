//! Identity of a derivation path.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one derivation path: the raw extended key text plus a caller-chosen label.
///
/// The label is only used for grouping and display; derivation always starts fresh at
/// `change/index` below the key itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PathId {
    /// The extended public key exactly as the user entered it.
    pub extended_key: String,

    /// The derivation-path label, e.g. `m/84'/0'/0'`.
    pub label: String,
}

impl PathId {
    /// Creates a new path id.
    pub fn new(extended_key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            extended_key: extended_key.into(),
            label: label.into(),
        }
    }

    /// Display path for the address at `index` on the given chain, e.g. `m/84'/0'/0'/0/7`.
    pub fn address_path(&self, change: bool, index: u32) -> String {
        let chain = u8::from(change);
        if self.label.is_empty() {
            format!("{chain}/{index}")
        } else {
            format!("{}/{chain}/{index}", self.label)
        }
    }
}

impl fmt::Display for PathId {
    /// Abbreviates the key so log lines stay readable.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.extended_key.chars().take(8).collect();
        write!(f, "{prefix}.../{}", self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_path_with_and_without_label() {
        let labelled = PathId::new("xpub6Bos", "m/44'/0'/0'");
        assert_eq!(labelled.address_path(false, 3), "m/44'/0'/0'/0/3");
        assert_eq!(labelled.address_path(true, 0), "m/44'/0'/0'/1/0");

        let bare = PathId::new("xpub6Bos", "");
        assert_eq!(bare.address_path(false, 12), "0/12");
    }

    #[test]
    fn display_abbreviates_key() {
        let id = PathId::new("zpub6rFR7y4Q2AijBEqT", "m/84'/0'/0'");
        assert_eq!(id.to_string(), "zpub6rFR.../m/84'/0'/0'");
    }
}
