//! Outer surfaces: the command line and CSV interchange.

pub mod cli;
pub mod csv;
