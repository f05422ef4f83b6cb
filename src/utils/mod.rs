//! Utility functions and helpers.

pub mod http;
pub mod sources;

pub use sources::{parse_list, parse_sources, read_sources};
