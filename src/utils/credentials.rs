//! Startup environment: `.env` file → process env. Missing API key is fatal.

use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

use crate::utils::config::EnvKeys;

/// Load `env_file` (or `.env` in the working directory when None) into the process env.
/// A missing default `.env` is fine; a missing explicit file is an error.
/// Returns the file that was loaded. Runs before logging is set up, so the caller logs it.
pub fn load_env_file(env_file: Option<&Path>) -> Result<Option<PathBuf>> {
    match env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .map_err(|e| anyhow::anyhow!("load env file {}: {}", path.display(), e))?;
            Ok(Some(path.to_path_buf()))
        }
        None => match dotenvy::dotenv() {
            Ok(path) => Ok(Some(path)),
            Err(e) if e.not_found() => Ok(None),
            Err(e) => Err(anyhow::anyhow!("load .env: {}", e)),
        },
    }
}

/// Non-empty, trimmed value of `key`, or None.
pub fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Read the source API key. Call after [`load_env_file`].
pub fn api_key() -> Result<String> {
    match env_value(EnvKeys::API_KEY) {
        Some(key) => Ok(key),
        None => bail!(
            "{} is not set (export it or put it in .env)",
            EnvKeys::API_KEY
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_env_file_is_loaded_and_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harvest.env");
        std::fs::write(&path, "YTHARVEST_TEST_ENV_FILE_KEY=from-file\n").unwrap();

        let loaded = load_env_file(Some(&path)).unwrap();

        assert_eq!(loaded.as_deref(), Some(path.as_path()));
        assert_eq!(
            env_value("YTHARVEST_TEST_ENV_FILE_KEY").as_deref(),
            Some("from-file")
        );
    }

    #[test]
    fn missing_explicit_env_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_file(Some(&dir.path().join("nope.env"))).is_err());
    }
}
