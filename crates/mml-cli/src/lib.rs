//! CLI library components for the MML extraction tool.

#![allow(missing_docs)]

pub mod logging;
pub mod pipeline;
