//! Shared bundler utilities.

pub mod fs;
