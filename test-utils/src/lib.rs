//! Helpers shared by the integration tests of the workspace: recorded drops loaded from
//! CSV and a sink collecting whatever a source publishes.

pub mod csv_loader;
pub mod sinks;
