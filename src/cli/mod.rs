//! Command-line interface for pagecheck.

mod commands;

pub use commands::{is_verbose, run};
