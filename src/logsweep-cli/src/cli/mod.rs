//! CLI argument parsing and run dispatch.
//!
//! - `args` - Command-line argument structures
//! - `handlers` - Run execution

pub mod args;
pub mod handlers;

pub use args::Cli;
pub use handlers::execute;
