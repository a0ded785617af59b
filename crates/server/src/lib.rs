pub mod errors;
pub mod metrics;
pub mod routes;
pub mod state;
pub mod startup;

pub use startup::run;
