//! Shared test utilities for framedump
//!
//! - Value and stack fixtures
//! - Snapshot files and isolated config files for the binary

pub mod fixtures;
