pub mod pipeline;
pub mod config;
pub mod sources;
pub mod sinks;
pub mod transform;
pub mod observability;
pub mod ingest;

pub use ingest::load_readings;
pub use pipeline::{Pipeline, Envelope};
