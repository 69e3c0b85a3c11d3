//! CLI module organization: argument parsing in `args`, command bodies in
//! `commands`.

pub mod args;
pub mod commands;

pub use args::*;
pub use commands::*;
