//! Utility modules

pub mod paths;

pub use paths::{config_path, resolve_path, temp_prefix};
