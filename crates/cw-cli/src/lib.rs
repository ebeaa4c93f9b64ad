//! cw-probe library
//!
//! Command implementations and output helpers for the `cw-probe` binary.

pub mod commands;
pub mod output;
