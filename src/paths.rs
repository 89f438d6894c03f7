//! XDG-style locations for the config file and the translation cache.

use std::path::PathBuf;

const APP_DIR: &str = "babelfish";

/// `$XDG_CONFIG_HOME/babelfish`, or `~/.config/babelfish` when unset.
pub fn config_dir() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config")
}

/// `$XDG_CACHE_HOME/babelfish`, or `~/.cache/babelfish` when unset.
pub fn cache_dir() -> PathBuf {
    xdg_dir("XDG_CACHE_HOME", ".cache")
}

fn xdg_dir(var: &str, fallback: &str) -> PathBuf {
    match std::env::var(var) {
        Ok(base) if !base.is_empty() => PathBuf::from(base).join(APP_DIR),
        _ => home_dir().join(fallback).join(APP_DIR),
    }
}

// Without a home directory, fall back to the working directory.
fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}
