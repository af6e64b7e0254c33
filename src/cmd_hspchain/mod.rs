//! Subcommand modules for the `hspchain` binary.

pub mod chain;
pub mod compare;
pub mod group;
pub mod score;
pub mod utils;
