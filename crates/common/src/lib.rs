//! Reusable utilities shared by the satsentry binaries and tests.
//! Currently this covers initializing the tracing framework.

pub mod logging;

// Re-export tracing crate for convenience.
pub use tracing;
