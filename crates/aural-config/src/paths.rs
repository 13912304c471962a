//! Platform-specific paths for the engine configuration file.
//!
//! - **User config**: `~/.config/aural/` (Linux), `~/Library/Application Support/aural/` (macOS), `%APPDATA%\aural\` (Windows)
//!
//! # Example
//!
//! ```rust,no_run
//! use aural_config::paths;
//!
//! if let Some(path) = paths::find_config(None) {
//!     println!("Using config at: {:?}", path);
//! }
//! ```

use std::path::{Path, PathBuf};

/// Application name used for directory paths.
pub const APP_NAME: &str = "aural";

/// File name of the engine configuration inside the user config directory.
pub const CONFIG_FILE_NAME: &str = "engine.toml";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Path of `engine.toml` inside [`user_config_dir`].
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(CONFIG_FILE_NAME)
}

/// Ensure the user config directory exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_user_config_dir() -> Result<PathBuf, crate::ConfigError> {
    let dir = user_config_dir();

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| crate::ConfigError::create_dir(&dir, e))?;
    }

    Ok(dir)
}

/// Locates the configuration file to load.
///
/// An explicit path wins when it names an existing file. Otherwise the
/// default user config file is returned if present.
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.is_file().then(|| path.to_path_buf());
    }

    let default = default_config_path();
    default.is_file().then_some(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_user_config_dir() {
        let dir = user_config_dir();
        assert!(dir.to_string_lossy().contains("aural"));
    }

    #[test]
    fn test_default_config_path() {
        let path = default_config_path();
        assert_eq!(path.file_name().unwrap(), "engine.toml");
        assert_eq!(path.parent().unwrap(), user_config_dir());
    }

    #[test]
    fn test_ensure_user_config_dir() {
        // Creation depends on the environment; success must yield the user dir.
        if let Ok(dir) = ensure_user_config_dir() {
            assert_eq!(dir, user_config_dir());
            assert!(dir.is_dir());
        }
    }

    #[test]
    fn test_find_config_explicit() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        fs::write(&path, "quantum_size = 64").unwrap();

        assert_eq!(find_config(Some(&path)), Some(path));
    }

    #[test]
    fn test_find_config_explicit_missing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.toml");

        assert_eq!(find_config(Some(&path)), None);
    }
}
