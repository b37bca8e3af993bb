use serde::{Deserialize, Deserializer};
use std::{collections::BTreeMap, io, path::Path};
use tracing::debug;

use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_FILE: &str = "gost-config.yml";

/// Template variables keyed by name. Values keep their YAML shape.
pub type VarMap = BTreeMap<String, serde_yaml::Value>;

#[derive(Debug, Default, Clone, Deserialize)]
pub struct Config {
    /// Variables applied to every environment unless overridden.
    #[serde(default, deserialize_with = "null_as_default")]
    pub defaults: VarMap,

    #[serde(default, deserialize_with = "null_as_default")]
    pub environments: BTreeMap<String, Environment>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct Environment {
    /// Overrides for `defaults`, this environment only.
    #[serde(default, deserialize_with = "null_as_default")]
    pub vars: VarMap,

    #[serde(default, deserialize_with = "null_as_default")]
    pub gost_command: String,

    /// Alternate spelling, used only when `gost_command` is empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub command_template: String,
}

impl Environment {
    pub fn command(&self) -> &str {
        if self.gost_command.is_empty() {
            &self.command_template
        } else {
            &self.gost_command
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                Error::ConfigNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                Error::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let cfg = Self::from_yaml(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(
            path = %path.display(),
            environments = cfg.environments.len(),
            defaults = cfg.defaults.len(),
            "loaded configuration"
        );
        Ok(cfg)
    }

    /// Decode a YAML document. An empty document is an empty configuration.
    pub fn from_yaml(text: &str) -> std::result::Result<Self, serde_yaml::Error> {
        let cfg: Option<Config> = serde_yaml::from_str(text)?;
        Ok(cfg.unwrap_or_default())
    }

    pub fn environment_names(&self) -> Vec<String> {
        self.environments.keys().cloned().collect()
    }
}

/// `key:` with no value decodes as YAML null; treat it like an absent key.
fn null_as_default<'de, D, T>(de: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
defaults:
  port: 8080
  tags: [a, b]
environments:
  staging:
    vars:
      host: example.com
    gost_command: "-H {{.host}} -p {{.port}}"
  production:
    vars:
    command_template: |
      -L tcp://:{{.port}}
      -F relay+tls://{{.host}}
"#;

    #[test]
    fn decodes_sample() {
        let cfg = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(cfg.defaults.get("port"), Some(&Value::from(8080)));
        assert_eq!(cfg.environment_names(), vec!["production", "staging"]);

        let staging = &cfg.environments["staging"];
        assert_eq!(staging.gost_command, "-H {{.host}} -p {{.port}}");
        assert_eq!(staging.vars.get("host"), Some(&Value::from("example.com")));

        let prod = &cfg.environments["production"];
        assert!(prod.vars.is_empty());
        assert!(prod.command().starts_with("-L tcp://"));
    }

    #[test]
    fn gost_command_wins_over_command_template() {
        let cfg = Config::from_yaml(
            "environments:\n  dev:\n    gost_command: -L :1\n    command_template: -L :2\n",
        )
        .unwrap();
        assert_eq!(cfg.environments["dev"].command(), "-L :1");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let cfg = Config::from_yaml(
            "version: 3\nenvironments:\n  dev:\n    gost_command: -L :1\n    notes: hi\n",
        )
        .unwrap();
        assert!(cfg.defaults.is_empty());
        assert_eq!(cfg.environments["dev"].gost_command, "-L :1");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.yml");
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yml");
        fs::write(&path, "environments: [unclosed\n").unwrap();
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn wrong_shape_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shape.yml");
        fs::write(&path, "environments:\n  - dev\n  - prod\n").unwrap();
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn directory_is_read_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load_from_path(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }
}
