//! Pipeline module.
//!
//! This module ties planning, row building, tiles and the caption into a
//! single render call, and reads render input documents for the CLI.

mod builder;
mod input;
mod report;

pub use builder::{StatsPipeline, StatsPipelineBuilder};
pub use input::RenderInput;
pub use report::StatsReport;
