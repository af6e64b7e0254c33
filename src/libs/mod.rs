pub mod chaining;
pub mod error;
pub mod hsp;
