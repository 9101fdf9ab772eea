//! Path utilities for dump destinations and the config file

use std::io;
use std::path::{Path, PathBuf};

/// Get the default config file path (<config dir>/framedump/config.toml)
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("framedump"))
        .unwrap_or_else(|| PathBuf::from(".framedump"))
        .join("config.toml")
}

/// Expand a leading `~` to the home directory and make the path absolute.
///
/// Other `~user` forms are left untouched.
pub fn resolve_path(path: &Path) -> io::Result<PathBuf> {
    let expanded = expand_home(path);
    if expanded.is_absolute() {
        return Ok(expanded);
    }
    Ok(std::env::current_dir()?.join(expanded))
}

fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => {
            tracing::debug!(path = %path.display(), "No home directory, leaving path unexpanded");
            path.to_path_buf()
        }
    }
}

/// File name prefix for dumps written to a temporary file.
pub fn temp_prefix(package_name: Option<&str>) -> String {
    match package_name {
        Some(package) => format!("{package}_stack_and_locals"),
        None => "stack_and_locals".to_string(),
    }
}
