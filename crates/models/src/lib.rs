//! Record types shared by the service and server crates.
//! - `Sighting` is what gets stored and returned.
//! - `SightingInput` is what clients send; it carries the validation rules.

pub mod errors;
pub mod sighting;

pub use sighting::{Sighting, SightingInput};
