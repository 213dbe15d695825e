//! In-memory implementations of the storage traits.

mod tracker;

pub use tracker::InMemoryDb;
