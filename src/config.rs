//! Runtime configuration
//!
//! Everything comes from the environment; there is no config file.

use std::path::PathBuf;

/// Overrides the SQLite file location
pub const DATABASE_PATH_ENV: &str = "MACROTRACK_DATABASE_PATH";

/// Default log directive when RUST_LOG is unset
pub const DEFAULT_LOG_DIRECTIVE: &str = "macrotrack=info";

/// Get the database path from environment or use `<project>/data/macrotrack.db`
pub fn database_path() -> PathBuf {
    std::env::var(DATABASE_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_database_path())
}

fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(parent) = path.parent() {
            if let Some(grandparent) = parent.parent() {
                path = grandparent.to_path_buf();
            }
        }
    }

    path.push("data");
    path.push("macrotrack.db");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path_shape() {
        let path = default_database_path();
        assert!(path.ends_with("data/macrotrack.db"));
    }
}
