//! File utility functions

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Expand a path string to an absolute path.
///
/// Handles `~` and `~/path` (home directory), relative paths and bare names
/// (joined onto the current directory). Absolute paths pass through.
///
/// ```text
/// expand_path("~/.docfilter") // -> /home/user/.docfilter
/// expand_path("./filter.json") // -> /current/dir/./filter.json
/// ```
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }

    let expanded = if path == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(path))
    } else if let Some(rest) = path.strip_prefix("~/") {
        match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        }
    } else {
        PathBuf::from(path)
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

/// True when the argument names standard input (`-` or nothing)
pub fn is_stdin(source: Option<&Path>) -> bool {
    source.is_none_or(|p| p.as_os_str() == "-")
}

/// Read filter input from a file, or from stdin when no path (or `-`) is given
pub fn read_input(source: Option<&Path>) -> Result<String> {
    match source {
        Some(path) if !is_stdin(Some(path)) => {
            let path = expand_path(&path.to_string_lossy());
            tracing::debug!(path = %path.display(), "Reading filter file");
            std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read filter file: {}", path.display()))
        }
        _ => {
            tracing::debug!("Reading filter from stdin");
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read filter from stdin")?;
            Ok(input)
        }
    }
}
