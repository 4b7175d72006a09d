use std::path::Path;

use thiserror::Error;
use tokenlayer_filesystem::FileSystem;

use crate::config::resolve;
use crate::config::Config;
use crate::config::UserConfig;

/// Config loading failures are fatal to the build: without a usable config
/// there is nothing sensible to compile against.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("unable to read config at {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },
  #[error("error parsing {path}: {source}")]
  Parse {
    path: String,
    #[source]
    source: serde_json::Error,
  },
}

/// Loads and resolves a JSON config file. Hosts with other config formats
/// implement their own loader and call [`resolve`] themselves.
pub fn load_config(fs: &dyn FileSystem, path: &Path) -> Result<Config, ConfigError> {
  let raw = fs.read_to_string(path).map_err(|source| ConfigError::Io {
    path: path.display().to_string(),
    source,
  })?;

  let user: UserConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
    path: path.display().to_string(),
    source,
  })?;

  Ok(resolve(user))
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;
  use tokenlayer_filesystem::InMemoryFileSystem;

  use super::*;

  #[test]
  fn loads_and_resolves_json_config() {
    let fs = InMemoryFileSystem::new();
    fs.write_file(
      "tokenlayer.config.json",
      r##"{
        "include": ["src/**/*.tsx"],
        "grid": "0.5rem",
        "theme": { "color": { "sky-500": "#0ea5e9" } }
      }"##,
    );

    let config = load_config(&fs, Path::new("tokenlayer.config.json")).unwrap();
    assert_eq!(config.include, vec!["src/**/*.tsx".to_string()]);
    assert_eq!(config.grid, "0.5rem");
    assert!(config.theme.contains("color", "sky-500"));
  }

  #[test]
  fn missing_or_malformed_configs_are_fatal() {
    let fs = InMemoryFileSystem::new();
    assert!(matches!(
      load_config(&fs, Path::new("missing.json")),
      Err(ConfigError::Io { .. })
    ));

    fs.write_file("broken.json", "{ not json");
    assert!(matches!(
      load_config(&fs, Path::new("broken.json")),
      Err(ConfigError::Parse { .. })
    ));
  }
}
