//! Shared helper functions

pub mod sql;
pub mod string;
