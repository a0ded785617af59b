//! Storage abstractions for service layer
//!
//! Contains the JSON file backed map store shared by the record stores,
//! along with its error type.

pub mod error;
pub mod json_map_store;

pub use error::StoreError;
pub use json_map_store::{JsonMapStore, WriteMode};
