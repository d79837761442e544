// Public API - expose the runner plus the types it hands out
pub mod runner;
pub mod settings;

pub use error::SplitterError;
pub use splitter::{ProgramRecord, SplitConfig, Splitter};
pub use writer::{WriteFailure, WriteOptions, WriteSummary, Writer};

// Internal modules - organized by subsystem
mod config;
mod error;
mod splitter;
mod telemetry;
mod writer;

#[cfg(test)]
mod integ_tests;
