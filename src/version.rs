// SPDX-FileCopyrightText: 2025 Greenbone AG
//
// SPDX-License-Identifier: GPL-2.0-or-later WITH x11vnc-openssl-exception

//! Version handling to find a nvticache compatible with this reader.

use std::{cmp::Ordering, fmt::Display, process, str::FromStr};

use lazy_regex::{Lazy, Regex, lazy_regex};

use crate::error::NvtiCacheError;

/// Versions of gvm-libs whose nvticache layout is understood.
pub const SUPPORTED_NVTICACHE_VERSIONS: &[&str] = &["20.4"];

/// Prefix of the key marking the database containing the nvticache.
pub const NVTICACHE_PREFIX: &str = "nvticache";

/// pkg-config module of the library writing the nvticache.
pub const DEFAULT_VERSION_PACKAGE: &str = "libgvm_util";

static RE: Lazy<Regex> = lazy_regex!(r"^[vV]?(\d+(?:\.\d+)*)(.*)$");

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    Pre,
    Final,
    Post,
}

/// A release version like `20.4.1`.
///
/// Missing release components count as zero, so `20.4` equals `20.4.0`.
/// A suffix marks either a pre-release (`20.4.1a1`, `20.4.1~git`, `20.4.1-rc1`)
/// sorting before the release or a post/local release (`20.4.1.post1`,
/// `20.4.1+deb`) sorting after it.
///
/// Development builds like `20.4.1~git` are pre-releases of `20.4.1` and
/// therefore still newer than `20.4`, they are accepted as compatible.
#[derive(Debug, Clone)]
pub struct Version {
    release: Vec<u64>,
    stage: Stage,
    suffix: String,
}

impl Version {
    /// First component of the release.
    pub fn major(&self) -> u64 {
        self.release.first().copied().unwrap_or_default()
    }

    fn release_cmp(&self, other: &Self) -> Ordering {
        let len = self.release.len().max(other.release.len());
        for i in 0..len {
            let a = self.release.get(i).copied().unwrap_or_default();
            let b = other.release.get(i).copied().unwrap_or_default();
            match a.cmp(&b) {
                Ordering::Equal => continue,
                x => return x,
            }
        }
        Ordering::Equal
    }
}

impl FromStr for Version {
    type Err = NvtiCacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NvtiCacheError::Configuration(format!("Invalid version {s}."));
        let captures = RE.captures(s.trim()).ok_or_else(invalid)?;
        let release = captures[1]
            .split('.')
            .map(u64::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| invalid())?;
        let suffix = captures[2].to_lowercase();
        let trimmed = suffix.trim_start_matches(['.', '-', '_']);
        let stage = if suffix.is_empty() {
            Stage::Final
        } else if suffix.starts_with('+') || trimmed.starts_with("post") {
            Stage::Post
        } else {
            Stage::Pre
        };
        Ok(Self {
            release,
            stage,
            suffix,
        })
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.release_cmp(other)
            .then_with(|| self.stage.cmp(&other.stage))
            .then_with(|| self.suffix.cmp(&other.suffix))
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let release: Vec<String> = self.release.iter().map(|x| x.to_string()).collect();
        write!(f, "{}{}", release.join("."), self.suffix)
    }
}

/// Returns true when the installed version has the same major version and is
/// at least the supported one.
pub fn is_compatible(installed: &Version, supported: &Version) -> bool {
    installed.major() == supported.major() && installed >= supported
}

/// Verifies the installed version against the supported versions and returns
/// the name of the nvticache.
pub fn nvticache_name(installed: &str, supported: &[&str]) -> Result<String, NvtiCacheError> {
    let installed_version = Version::from_str(installed)?;
    for s in supported {
        let supported_version = Version::from_str(s)?;
        if is_compatible(&installed_version, &supported_version) {
            return Ok(format!("{NVTICACHE_PREFIX}{installed}"));
        }
    }
    Err(NvtiCacheError::Configuration(format!(
        "Incompatible nvticache version {installed}. Supported versions are {}.",
        supported.join(", ")
    )))
}

/// Discovers the version of the installed library writing the nvticache.
pub trait VersionProbe {
    fn installed_version(&self) -> Result<String, NvtiCacheError>;
}

/// Asks pkg-config for the installed version.
#[derive(Debug, Clone)]
pub struct PkgConfig {
    package: String,
}

impl PkgConfig {
    pub fn new<S: Into<String>>(package: S) -> Self {
        Self {
            package: package.into(),
        }
    }
}

impl Default for PkgConfig {
    fn default() -> Self {
        Self::new(DEFAULT_VERSION_PACKAGE)
    }
}

impl VersionProbe for PkgConfig {
    fn installed_version(&self) -> Result<String, NvtiCacheError> {
        let probe_error = |msg: String| {
            NvtiCacheError::Configuration(format!(
                "Not possible to get the installed version of {}. {msg}",
                self.package
            ))
        };
        let output = process::Command::new("pkg-config")
            .arg("--modversion")
            .arg(&self.package)
            .output()
            .map_err(|e| probe_error(format!("{e}")))?;
        if !output.status.success() {
            return Err(probe_error(
                String::from_utf8_lossy(&output.stderr).trim_end().to_owned(),
            ));
        }
        let version = String::from_utf8(output.stdout).map_err(|e| probe_error(e.to_string()))?;
        let version = version.trim_end().to_owned();
        tracing::debug!(package = %self.package, %version, "Found installed version.");
        Ok(version)
    }
}

/// Returns always the same version.
///
/// Useful when the version is known upfront, e.g. configured by an operator.
#[derive(Debug, Clone)]
pub struct StaticVersion(pub String);

impl VersionProbe for StaticVersion {
    fn installed_version(&self) -> Result<String, NvtiCacheError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::from_str(s).unwrap()
    }

    #[test]
    fn compare() {
        assert!(v("20.4.1") > v("20.4"));
        assert!(v("20.4.10") > v("20.4.9"));
        assert_eq!(v("20.4"), v("20.4.0"));
        assert!(v("21.0") > v("20.4"));
        assert!(v("20.3") < v("20.4"));
        assert!(v("20.8") > v("20.04.1"));
    }

    #[test]
    fn suffixes() {
        assert!(v("20.4.1~git") < v("20.4.1"));
        assert!(v("20.4.1rc1") < v("20.4.1"));
        assert!(v("20.4.1a1") < v("20.4.1b1"));
        assert!(v("20.4.1.post1") > v("20.4.1"));
        assert!(v("20.4.1+deb11") > v("20.4.1"));
        assert!(v("20.4.1~git") > v("20.4"));
    }

    #[test]
    fn major() {
        assert_eq!(v("20.4.1").major(), 20);
        assert_eq!(v("v22").major(), 22);
    }

    #[test]
    fn invalid() {
        assert!(matches!(
            Version::from_str("git-master"),
            Err(NvtiCacheError::Configuration(_))
        ));
        assert!(Version::from_str("").is_err());
    }

    #[test]
    fn compatible_with_supported_version() {
        assert_eq!(
            nvticache_name("20.4.1", SUPPORTED_NVTICACHE_VERSIONS).unwrap(),
            "nvticache20.4.1"
        );
        assert_eq!(
            nvticache_name("20.4.1~git", SUPPORTED_NVTICACHE_VERSIONS).unwrap(),
            "nvticache20.4.1~git"
        );
        assert!(nvticache_name("20.4~git", SUPPORTED_NVTICACHE_VERSIONS).is_err());
        assert_eq!(
            nvticache_name("20.4", SUPPORTED_NVTICACHE_VERSIONS).unwrap(),
            "nvticache20.4"
        );
        assert_eq!(
            nvticache_name("20.8.0", SUPPORTED_NVTICACHE_VERSIONS).unwrap(),
            "nvticache20.8.0"
        );
    }

    #[test]
    fn major_mismatch() {
        let err = nvticache_name("21.0", SUPPORTED_NVTICACHE_VERSIONS).unwrap_err();
        assert!(matches!(err, NvtiCacheError::Configuration(_)));
        assert!(err.to_string().contains("Supported versions are 20.4"));
    }

    #[test]
    fn below_supported() {
        assert!(matches!(
            nvticache_name("20.3", SUPPORTED_NVTICACHE_VERSIONS),
            Err(NvtiCacheError::Configuration(_))
        ));
    }

    #[test]
    fn display() {
        assert_eq!(v("20.4.1~git").to_string(), "20.4.1~git");
    }

    #[test]
    fn static_version() {
        let probe = StaticVersion("20.4.1".to_owned());
        assert_eq!(probe.installed_version().unwrap(), "20.4.1");
    }
}
