//! Persist a LookoutConfig as TOML.
//!
//! The file is staged in a temporary sibling and moved into place, so a
//! reader never sees a half-written config.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use lookout_common::ConfigError;

use crate::schema::LookoutConfig;
use crate::validation;

const HEADER: &str = "# Lookout configuration\n# Missing keys fall back to built-in defaults.\n\n";

/// Validate `config` and write it to `path`, creating parent directories.
pub fn save_config_to_path(config: &LookoutConfig, path: &Path) -> Result<(), ConfigError> {
    validation::validate(config)?;

    let body = toml::to_string_pretty(config)
        .map_err(|e| ConfigError::ParseError(format!("failed to serialize config to TOML: {e}")))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| write_error(dir, e))?;

    let mut staged = NamedTempFile::new_in(dir).map_err(|e| write_error(dir, e))?;
    let written = staged
        .write_all(HEADER.as_bytes())
        .and_then(|()| staged.write_all(body.as_bytes()))
        .and_then(|()| staged.as_file().sync_all());
    written.map_err(|e| write_error(dir, e))?;
    staged.persist(path).map_err(|e| write_error(path, e.error))?;

    tracing::info!(path = %path.display(), "Config saved");
    Ok(())
}

fn write_error(path: &Path, e: std::io::Error) -> ConfigError {
    ConfigError::ParseError(format!("failed to write config to {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = LookoutConfig::default();
        config.presence.server = "presence.example.com:8443".into();
        config.presence.http_endpoint = Some("https://api.example.com".into());
        config.presence.keepalive_interval_secs = 45;
        save_config_to_path(&config, &path).unwrap();

        let loaded = crate::load_from_path(&path).unwrap();
        assert_eq!(loaded.presence.server, "presence.example.com:8443");
        assert_eq!(
            loaded.presence.http_endpoint.as_deref(),
            Some("https://api.example.com")
        );
        assert_eq!(loaded.presence.keepalive_interval_secs, 45);
        assert_eq!(loaded.logging.level, config.logging.level);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# Lookout configuration"));
    }

    #[test]
    fn replaces_existing_file_without_leftovers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "stale = true\n").unwrap();

        save_config_to_path(&LookoutConfig::default(), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("stale"));
        assert!(contents.contains("[presence]"));
        assert_eq!(entries(dir.path()), ["config.toml"]);
    }

    #[test]
    fn creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deep").join("config.toml");

        save_config_to_path(&LookoutConfig::default(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn invalid_config_is_not_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = LookoutConfig::default();
        config.presence.reconnect_delay_secs = 0;

        assert!(matches!(
            save_config_to_path(&config, &path),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(!path.exists());
    }
}
