//! Windows installer targets.

pub mod nsis;
pub mod sign;
