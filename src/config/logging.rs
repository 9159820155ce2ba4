// SPDX-FileCopyrightText: 2025 Greenbone AG
//
// SPDX-License-Identifier: GPL-2.0-or-later WITH x11vnc-openssl-exception

use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::{Level, metadata::ParseLevelError};
use tracing_subscriber::{EnvFilter, filter, layer::SubscriberExt, util::SubscriberInitExt};

/// A tracing level that can be read from and written to toml.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LogLevel(Level);

impl Default for LogLevel {
    fn default() -> Self {
        Self(Level::INFO)
    }
}

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::from_str(s).map(LogLevel)
    }
}

impl TryFrom<String> for LogLevel {
    type Error = ParseLevelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}

impl From<LogLevel> for String {
    fn from(value: LogLevel) -> Self {
        value.0.as_str().to_owned()
    }
}

impl From<Level> for LogLevel {
    fn from(level: Level) -> Self {
        Self(level)
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        level.0
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Logging section of the configuration.
///
/// `additional` sets the level per target, e.g. `nvticache::cache = "TRACE"`.
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Logging {
    pub level: LogLevel,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub additional: BTreeMap<String, LogLevel>,
}

impl Logging {
    fn targets(&self) -> filter::Targets {
        self.additional.iter().fold(
            filter::Targets::new().with_default(Level::from(self.level)),
            |filter, (name, level)| filter.with_target(name, Level::from(*level)),
        )
    }

    /// Installs the global subscriber.
    ///
    /// When `RUST_LOG` is set it takes precedence over the configuration.
    pub fn init(&self) {
        let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
        let registry = tracing_subscriber::registry().with(layer);
        let result = match EnvFilter::try_from_default_env() {
            Ok(env) => registry.with(env).try_init(),
            Err(_) => registry.with(self.targets()).try_init(),
        };
        if let Err(e) = result {
            tracing::debug!(error = %e, "Logging already initialized.");
        }
    }
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::*;

    #[test]
    fn parse_level() {
        assert_eq!(LogLevel::from_str("debug").unwrap(), Level::DEBUG.into());
        assert_eq!(LogLevel::from_str("WARN").unwrap(), Level::WARN.into());
        assert!(LogLevel::from_str("loud").is_err());
        assert_eq!(String::from(LogLevel::from(Level::TRACE)), "TRACE");
    }

    #[test]
    fn targets() {
        let logging = Logging {
            level: Level::WARN.into(),
            additional: [("nvticache::cache".to_owned(), Level::TRACE.into())]
                .into_iter()
                .collect(),
        };
        let targets = logging.targets();
        assert!(targets.would_enable("nvticache::cache", &Level::TRACE));
        assert!(!targets.would_enable("redis", &Level::INFO));
        assert!(targets.would_enable("redis", &Level::WARN));
    }
}
