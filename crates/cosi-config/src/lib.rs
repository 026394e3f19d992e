//! blob-cosi configuration
//!
//! Locates and parses `cosi.kdl`. A missing file is not an error: the driver
//! then runs on defaults plus environment variables.

pub mod error;
pub mod model;
pub mod parser;

pub use error::*;
pub use model::*;
pub use parser::*;

use std::path::PathBuf;

/// Environment variable that points directly at a config file
pub const CONFIG_PATH_ENV: &str = "COSI_CONFIG_PATH";

const CONFIG_FILE: &str = "cosi.kdl";
const CONFIG_DIR: &str = ".cosi";
const APP_DIR: &str = "blob-cosi";

/// Look for the driver's config file
///
/// Search order:
/// 1. `COSI_CONFIG_PATH`
/// 2. `./cosi.kdl`
/// 3. `./.cosi/cosi.kdl`
/// 4. `~/.config/blob-cosi/cosi.kdl`
pub fn find_config_file() -> Option<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Some(path);
        }
        tracing::warn!(path = %path.display(), "{} points to a missing file", CONFIG_PATH_ENV);
    }

    if let Ok(current_dir) = std::env::current_dir() {
        let candidates = [
            current_dir.join(CONFIG_FILE),
            current_dir.join(CONFIG_DIR).join(CONFIG_FILE),
        ];
        if let Some(path) = candidates.into_iter().find(|p| p.exists()) {
            return Some(path);
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
        .filter(|p| p.exists())
}

/// Load the config from an explicit path, or from the search order above
pub fn load_config(explicit: Option<PathBuf>) -> Result<DriverConfig> {
    match explicit.or_else(find_config_file) {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading configuration");
            parse_config_file(&path)
        }
        None => {
            tracing::info!("No configuration file found, using defaults");
            Ok(DriverConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    #[serial]
    fn test_find_config_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("cosi.kdl"), "// test").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_config_file();

        std::env::set_current_dir(original_dir).unwrap();
        assert!(result.unwrap().ends_with("cosi.kdl"));
    }

    #[test]
    #[serial]
    fn test_find_config_in_dot_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        let dot_dir = temp_dir.path().join(".cosi");
        fs::create_dir(&dot_dir).unwrap();
        fs::write(dot_dir.join("cosi.kdl"), "// in dot dir").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_config_file();

        std::env::set_current_dir(original_dir).unwrap();
        assert!(result.unwrap().ends_with(".cosi/cosi.kdl"));
    }

    #[test]
    #[serial]
    fn test_env_var_takes_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.kdl");
        fs::write(&config_path, "endpoint \"tcp://0.0.0.0:7000\"").unwrap();

        unsafe {
            std::env::set_var(CONFIG_PATH_ENV, config_path.to_str().unwrap());
        }

        let found = find_config_file();
        let config = load_config(None);

        unsafe {
            std::env::remove_var(CONFIG_PATH_ENV);
        }

        assert_eq!(found, Some(config_path));
        assert_eq!(config.unwrap().endpoint, "tcp://0.0.0.0:7000");
    }

    #[test]
    #[serial]
    fn test_explicit_path_wins() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("explicit.kdl");
        fs::write(&path, "driver \"explicit.driver\"").unwrap();

        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.driver_name, "explicit.driver");
    }

    #[test]
    #[serial]
    fn test_explicit_missing_path_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(temp_dir.path().join("missing.kdl")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
