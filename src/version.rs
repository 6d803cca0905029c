//! Semantic versioning for tokens

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::VersionError;

/// A `(major, minor, patch)` version, ordered lexicographically.
///
/// Serialized as `"MAJOR.MINOR.PATCH"`. Legacy senders that stamp tokens with a
/// bare integer `n` are read as `n.0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemanticVersion {
    /// `0.0.0`, the floor used when a token declares no minimum
    pub const ZERO: SemanticVersion = SemanticVersion::new(0, 0, 0);

    /// `1.0.0`
    pub const INITIAL: SemanticVersion = SemanticVersion::new(1, 0, 0);

    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch }
    }

    /// Parse `"MAJOR.MINOR.PATCH"` (optionally `v`-prefixed) or a bare integer.
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(VersionError::Empty);
        }

        if let Ok(major) = trimmed.parse::<u64>() {
            return Ok(Self::new(major, 0, 0));
        }

        let dotted = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let version = semver::Version::parse(dotted).map_err(|e| VersionError::Malformed {
            input: text.to_string(),
            reason: e.to_string(),
        })?;

        if !version.pre.is_empty() || !version.build.is_empty() {
            return Err(VersionError::Unsupported(text.to_string()));
        }

        Ok(version.into())
    }

    /// Same major line, and this version's minor does not exceed the client's.
    /// Patch never matters for compatibility.
    pub fn is_compatible_with(&self, client_floor: &SemanticVersion) -> bool {
        self.major == client_floor.major && self.minor <= client_floor.minor
    }

    /// Migration only moves forward (or stays put)
    pub fn can_migrate_to(&self, target: &SemanticVersion) -> bool {
        self <= target
    }

    /// Increments saturate at `u64::MAX`
    pub fn increment_major(&self) -> Self {
        Self::new(self.major.saturating_add(1), 0, 0)
    }

    pub fn increment_minor(&self) -> Self {
        Self::new(self.major, self.minor.saturating_add(1), 0)
    }

    pub fn increment_patch(&self) -> Self {
        Self::new(self.major, self.minor, self.patch.saturating_add(1))
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<u64> for SemanticVersion {
    fn from(major: u64) -> Self {
        Self::new(major, 0, 0)
    }
}

impl From<semver::Version> for SemanticVersion {
    fn from(v: semver::Version) -> Self {
        Self::new(v.major, v.minor, v.patch)
    }
}

impl From<SemanticVersion> for semver::Version {
    fn from(v: SemanticVersion) -> Self {
        semver::Version::new(v.major, v.minor, v.patch)
    }
}

impl Serialize for SemanticVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SemanticVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SemanticVersionVisitor)
    }
}

struct SemanticVersionVisitor;

impl<'de> Visitor<'de> for SemanticVersionVisitor {
    type Value = SemanticVersion;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a \"MAJOR.MINOR.PATCH\" string or a non-negative integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        SemanticVersion::parse(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(SemanticVersion::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .map(SemanticVersion::from)
            .map_err(|_| E::custom(format!("negative version {v}")))
    }
}
