//! logsweep CLI library module.
//!
//! - `cli/` - argument parsing and run dispatch

pub mod cli;
