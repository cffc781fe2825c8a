//! CLI command implementations.

pub mod probe;
pub mod scan;

pub use probe::ProbeCommand;
pub use scan::{load_queries, ScanCommand, ScanOutput};
