//! Service layer for sighting records.
//! - `storage` holds the generic JSON file backed map.
//! - `file` specialises it for sightings.
//! - `sighting` applies validation and system owned fields before delegating to a repository.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod file;
pub mod sighting;
