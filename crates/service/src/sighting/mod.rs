pub mod repository;
pub mod service;

pub use repository::{SightingRepository, SightingUpdate};
pub use service::{assign_id, SightingService};
