//! Integration tests for framedump
//!
//! These tests drive the public API and the binary end to end.

#[path = "../common/mod.rs"]
pub mod common;

pub mod cli;
pub mod dump_flow;
pub mod properties;
