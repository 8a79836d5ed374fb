//! Command-line front end for the `docfilter` compiler
//!
//! Reads a filter description as JSON and prints the compiled MongoDB query
//! document.

pub mod app;
pub mod core;
pub mod utils;
