//! JSON-file persistence.

pub mod config;
pub mod constants;
pub mod errors;
mod json;

pub use json::JsonFileDb;
