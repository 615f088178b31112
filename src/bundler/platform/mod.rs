//! Platform-specific bundle targets.

pub mod windows;
