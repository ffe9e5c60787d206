//! Server capability negotiation.
//!
//! The repository API grew over time and some endpoints only exist past a
//! given server version. Reconcilers ask a [`FeatureProbe`] before picking a
//! code path, and a failed negotiation is surfaced instead of guessed around:
//! assuming either answer could mean wrong reads against an incompatible
//! server.

use std::fmt;

use crate::error::{Result, SyncError};

/// Version-gated server capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// Direct repository lookup by URL instead of a list scan.
    RepositoryGet,
    /// `project` field on repository registrations.
    ProjectScopedRepositories,
}

impl Feature {
    /// Minimum server version that advertises this capability.
    pub fn min_version(self) -> ServerVersion {
        match self {
            Feature::RepositoryGet => ServerVersion::new(2, 0, 0),
            Feature::ProjectScopedRepositories => ServerVersion::new(2, 2, 0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Feature::RepositoryGet => "repository get",
            Feature::ProjectScopedRepositories => "project-scoped repositories",
        }
    }
}

/// Parsed `major.minor.patch` server version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ServerVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl ServerVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a server-reported version string.
    ///
    /// Servers report versions like `v2.5.3+aabbcc` or `2.6.0-rc1`; the
    /// leading `v` and anything past the patch number are dropped.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim().trim_start_matches('v');
        let core = trimmed.split(['+', '-']).next().unwrap_or(trimmed);

        let mut parts = core.split('.');
        let mut next = |what: &str| -> Result<u64> {
            parts
                .next()
                .ok_or_else(|| SyncError::version(format!("missing {} in {:?}", what, raw)))?
                .parse()
                .map_err(|_| SyncError::version(format!("invalid {} in {:?}", what, raw)))
        };

        let major = next("major")?;
        let minor = next("minor")?;
        let patch = next("patch")?;
        Ok(Self::new(major, minor, patch))
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Capability negotiation interface exposed by the provider session.
pub trait FeatureProbe: Send + Sync {
    /// Whether the connected server supports `feature`.
    ///
    /// An error means negotiation itself failed; callers must treat that as
    /// fatal rather than assume either answer.
    fn is_supported(&self, feature: Feature) -> Result<bool>;
}

/// Probe backed by the version string the server advertised at connect time.
#[derive(Debug, Clone)]
pub struct VersionProbe {
    version: String,
}

impl VersionProbe {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }
}

impl FeatureProbe for VersionProbe {
    fn is_supported(&self, feature: Feature) -> Result<bool> {
        let server = ServerVersion::parse(&self.version)?;
        Ok(server >= feature.min_version())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_decorated() {
        assert_eq!(
            ServerVersion::parse("2.5.3").unwrap(),
            ServerVersion::new(2, 5, 3)
        );
        assert_eq!(
            ServerVersion::parse("v2.5.3+aabbcc").unwrap(),
            ServerVersion::new(2, 5, 3)
        );
        assert_eq!(
            ServerVersion::parse("2.6.0-rc1").unwrap(),
            ServerVersion::new(2, 6, 0)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(ServerVersion::parse("").is_err());
        assert!(ServerVersion::parse("2.5").is_err());
        assert!(ServerVersion::parse("two.five.three").is_err());
    }

    #[test]
    fn test_ordering() {
        assert!(ServerVersion::new(2, 2, 0) > ServerVersion::new(2, 1, 9));
        assert!(ServerVersion::new(2, 2, 0) >= ServerVersion::new(2, 2, 0));
        assert!(ServerVersion::new(1, 9, 9) < ServerVersion::new(2, 0, 0));
    }

    #[test]
    fn test_version_probe_gates_features() {
        let old = VersionProbe::new("1.8.0");
        assert!(!old.is_supported(Feature::RepositoryGet).unwrap());
        assert!(!old.is_supported(Feature::ProjectScopedRepositories).unwrap());

        let mid = VersionProbe::new("v2.0.0+deadbeef");
        assert!(mid.is_supported(Feature::RepositoryGet).unwrap());
        assert!(!mid.is_supported(Feature::ProjectScopedRepositories).unwrap());

        let new = VersionProbe::new("2.7.1");
        assert!(new.is_supported(Feature::RepositoryGet).unwrap());
        assert!(new.is_supported(Feature::ProjectScopedRepositories).unwrap());
    }

    #[test]
    fn test_version_probe_surfaces_parse_failure() {
        let probe = VersionProbe::new("development");
        assert!(matches!(
            probe.is_supported(Feature::RepositoryGet),
            Err(SyncError::Version(_))
        ));
    }
}
