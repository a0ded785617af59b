//! File-backed stores built on [`crate::storage::JsonMapStore`].

pub mod sighting_store;
