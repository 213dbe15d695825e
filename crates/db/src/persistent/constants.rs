//! This module contains all the constants used in the persistence layer.

/// File holding every derivation path, grouped by extended key.
pub const DEFAULT_PATHS_FILE: &str = "extended_public_keys.json";

/// File holding the standalone watched addresses.
pub const DEFAULT_WATCHED_FILE: &str = "single_addresses.json";

/// Suffix of the scratch file a document is written to before it replaces the original.
pub const TMP_SUFFIX: &str = "tmp";
