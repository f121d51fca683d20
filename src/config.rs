use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_CONFIG_PATH: &str = "/etc/find-host.conf";
const DEFAULT_SSH_COMMAND: &str = "ssh";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TTL: u32 = 4;

/// Runtime settings for `find-host`.
///
/// Read from an optional `key = value` file, then overridden by
/// `FINDHOST_*` environment variables. Credentials are not part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// OpenSSH client binary
    pub ssh_command: String,
    pub connect_timeout: Duration,
    /// Hop budget used when `--ttl` is not given
    pub ttl: u32,
    /// Appended to bare device names before connecting, e.g. `corp.example.com`
    pub domain_suffix: Option<String>,
    /// Where SSH control sockets are created
    pub control_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ssh_command: DEFAULT_SSH_COMMAND.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            ttl: DEFAULT_TTL,
            domain_suffix: None,
            control_dir: std::env::temp_dir(),
        }
    }
}

impl Config {
    /// Load the configuration.
    ///
    /// The file is `path` when given, else `$FINDHOST_CONFIG`, else
    /// `/etc/find-host.conf`. Only the default location may be missing.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("FINDHOST_CONFIG").ok().map(PathBuf::from));

        let content = match &explicit {
            Some(config_path) => {
                if !config_path.exists() {
                    return Err(ConfigError::Invalid(format!(
                        "Config file not found: {}",
                        config_path.display()
                    )));
                }
                std::fs::read_to_string(config_path)?
            }
            None => {
                let config_path = Path::new(DEFAULT_CONFIG_PATH);
                if config_path.exists() {
                    std::fs::read_to_string(config_path)?
                } else {
                    String::new()
                }
            }
        };

        Self::from_sources(&content, |name| std::env::var(name).ok())
    }

    /// Build a configuration from file content and an environment lookup.
    pub fn from_sources<F>(content: &str, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.split_once('=') {
                Some((key, value)) => config.set(key.trim(), value.trim(), key.trim())?,
                None => {
                    return Err(ConfigError::Invalid(format!("Expected key = value: {}", line)))
                }
            }
        }

        // Allow environment variable overrides
        for key in ["ssh_command", "connect_timeout", "ttl", "domain_suffix", "control_dir"] {
            let name = format!("FINDHOST_{}", key.to_ascii_uppercase());
            if let Some(value) = env(&name) {
                config.set(key, value.trim(), &name)?;
            }
        }

        Ok(config)
    }

    fn set(&mut self, key: &str, value: &str, source: &str) -> Result<(), ConfigError> {
        match key {
            "ssh_command" => {
                if value.is_empty() {
                    return Err(ConfigError::Invalid(format!("Empty {}", source)));
                }
                self.ssh_command = value.to_string();
            }
            "connect_timeout" => {
                let secs: u64 = value.parse().map_err(|_| {
                    ConfigError::Invalid(format!("Invalid {}: {}", source, value))
                })?;
                self.connect_timeout = Duration::from_secs(secs);
            }
            "ttl" => {
                self.ttl = value.parse().map_err(|_| {
                    ConfigError::Invalid(format!("Invalid {}: {}", source, value))
                })?;
            }
            "domain_suffix" => {
                let suffix = value.trim_start_matches('.');
                self.domain_suffix = (!suffix.is_empty()).then(|| suffix.to_string());
            }
            "control_dir" => self.control_dir = PathBuf::from(value),
            _ => tracing::debug!("Ignoring unknown config key: {}", key),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_sources("", no_env).unwrap();
        assert_eq!(config.ssh_command, "ssh");
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.ttl, 4);
        assert!(config.domain_suffix.is_none());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_file_values() {
        let content = "\
# find-host settings
ssh_command = /usr/local/bin/ssh
connect_timeout = 30

ttl = 8
domain_suffix = .corp.example.com
control_dir = /run/find-host
colour = blue
";
        let config = Config::from_sources(content, no_env).unwrap();
        assert_eq!(config.ssh_command, "/usr/local/bin/ssh");
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.ttl, 8);
        assert_eq!(config.domain_suffix.as_deref(), Some("corp.example.com"));
        assert_eq!(config.control_dir, PathBuf::from("/run/find-host"));
    }

    #[test]
    fn test_env_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("FINDHOST_TTL", "2"),
            ("FINDHOST_DOMAIN_SUFFIX", "lab.example.net"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_sources("ttl = 8\nconnect_timeout = 5", |name| {
            env.get(name).map(|v| v.to_string())
        })
        .unwrap();

        assert_eq!(config.ttl, 2);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.domain_suffix.as_deref(), Some("lab.example.net"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(Config::from_sources("ttl = four", no_env).is_err());
        assert!(Config::from_sources("connect_timeout = -1", no_env).is_err());
        assert!(Config::from_sources("just some text", no_env).is_err());

        let err = Config::from_sources("", |name| {
            (name == "FINDHOST_TTL").then(|| "x".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("FINDHOST_TTL"));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/find-host.conf"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
