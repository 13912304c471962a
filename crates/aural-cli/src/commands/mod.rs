//! CLI command implementations.

pub mod classify;
pub mod common;
pub mod compile;
pub mod config;
pub mod decode;
pub mod encode;
