//! The tools module holds the thin surroundings of the compressor core.
//!
//! Currently that is just the command line layer:
//! - cli: argument parsing, option resolution and output-name derivation.

pub mod cli;
