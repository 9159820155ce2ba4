// SPDX-FileCopyrightText: 2025 Greenbone AG
//
// SPDX-License-Identifier: GPL-2.0-or-later WITH x11vnc-openssl-exception

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod logging;

use crate::version::DEFAULT_VERSION_PACKAGE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Redis {
    /// Complete url including the protocol, e.g. `unix:///run/redis/redis-server.sock`.
    pub url: String,
}

impl Default for Redis {
    fn default() -> Self {
        Self {
            url: "unix:///run/redis/redis-server.sock".to_owned(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct VersionSource {
    /// pkg-config module of the library writing the nvticache.
    pub package: String,
}

impl Default for VersionSource {
    fn default() -> Self {
        Self {
            package: DEFAULT_VERSION_PACKAGE.to_owned(),
        }
    }
}

#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub redis: Redis,
    pub version: VersionSource,
    pub logging: logging::Logging,
}

impl Config {
    pub fn from_toml(config: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(config)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading config");
        let config = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml(&config)
    }
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::*;

    #[test]
    fn defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.redis.url, "unix:///run/redis/redis-server.sock");
        assert_eq!(config.version.package, "libgvm_util");
        assert_eq!(Level::from(config.logging.level), Level::INFO);
    }

    #[test]
    fn overrides() {
        let config = Config::from_toml(
            r#"
[redis]
url = "redis://localhost:6379"

[version]
package = "libgvm_base"

[logging]
level = "DEBUG"

[logging.additional]
redis = "WARN"
"#,
        )
        .unwrap();
        assert_eq!(config.redis.url, "redis://localhost:6379");
        assert_eq!(config.version.package, "libgvm_base");
        assert_eq!(Level::from(config.logging.level), Level::DEBUG);
        assert_eq!(
            config.logging.additional.get("redis").copied().map(Level::from),
            Some(Level::WARN)
        );
    }

    #[test]
    fn invalid_level() {
        let err = Config::from_toml("[logging]\nlevel = \"loud\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn round_trip_without_additional() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(!toml.contains("additional"));
        assert_eq!(Config::from_toml(&toml).unwrap(), config);
    }

    #[test]
    fn missing_file() {
        let err = Config::from_file("/nonexistent/nvticache.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
