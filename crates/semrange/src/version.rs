//! Semantic version value type with trailing wildcards

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::comparator::{self, VersionComparer};

/// Error type for version parsing and construction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Version string is empty")]
    Empty,
    #[error("Invalid version string \"{0}\"")]
    InvalidVersion(String),
    #[error("Invalid version string \"{version}\": {reason}")]
    InvalidVersionWithContext { version: String, reason: String },
}

const WILDCARD: &str = "*";

lazy_static! {
    // major(.minor(.patch)?)?(-prerelease)?(+build)? where any numeric part may be "*"
    static ref VERSION_RE: Regex = Regex::new(
        r"^(?P<major>[0-9]+|\*)(?:\.(?P<minor>[0-9]+|\*)(?:\.(?P<patch>[0-9]+|\*))?)?(?:-(?P<pre>[0-9A-Za-z.\-]+|\*))?(?:\+(?P<build>[0-9A-Za-z.\-]+|\*))?$"
    ).unwrap();

    static ref FOUR_PART_RE: Regex = Regex::new(r"^([0-9]+)\.([0-9]+)(?:\.([0-9]+))?(?:\.([0-9]+))?$").unwrap();
}

/// A semantic version whose trailing numeric components may be wildcards.
///
/// A missing component means "any value here and in every later position", so
/// `1.*` has no minor and no patch. Prerelease and build labels are stored as
/// dot-separated identifier strings and are empty when not specified.
///
/// Equality, ordering and hashing go through the process-wide default
/// [`VersionComparer`]; use [`Version::compare_with`] to pick one explicitly.
#[derive(Debug, Clone)]
pub struct Version {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    prerelease: String,
    build: String,
}

impl Version {
    /// Create a concrete version without prerelease or build labels
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major: Some(major),
            minor: Some(minor),
            patch: Some(patch),
            prerelease: String::new(),
            build: String::new(),
        }
    }

    /// The version matching everything (`*`)
    pub fn wildcard() -> Self {
        Version {
            major: None,
            minor: None,
            patch: None,
            prerelease: String::new(),
            build: String::new(),
        }
    }

    /// `major.*`
    pub fn minor_wildcard(major: u64) -> Self {
        Version {
            major: Some(major),
            ..Self::wildcard()
        }
    }

    /// `major.minor.*`
    pub fn patch_wildcard(major: u64, minor: u64) -> Self {
        Version {
            major: Some(major),
            minor: Some(minor),
            ..Self::wildcard()
        }
    }

    /// The first public API version, `1.0.0`.
    pub fn base() -> Self {
        Self::new(1, 0, 0)
    }

    /// Build a version from its raw components.
    ///
    /// Fails when a concrete component follows a wildcard one, or when a
    /// wildcarded version carries prerelease or build labels.
    pub fn from_parts(
        major: Option<u64>,
        minor: Option<u64>,
        patch: Option<u64>,
        prerelease: &str,
        build: &str,
    ) -> Result<Self, VersionError> {
        let invalid = |reason: &str| VersionError::InvalidVersionWithContext {
            version: describe_parts(major, minor, patch, prerelease, build),
            reason: reason.to_string(),
        };

        if major.is_none() && (minor.is_some() || patch.is_some()) {
            return Err(invalid("minor and patch must be wildcards when major is a wildcard"));
        }
        if minor.is_none() && patch.is_some() {
            return Err(invalid("patch must be a wildcard when minor is a wildcard"));
        }
        if patch.is_none() && !(is_blank(prerelease) && is_blank(build)) {
            return Err(invalid("wildcard versions cannot carry prerelease or build labels"));
        }

        Ok(Version {
            major,
            minor,
            patch,
            prerelease: prerelease.to_string(),
            build: build.to_string(),
        })
    }

    /// Return a copy of this version with the given prerelease label
    pub fn with_prerelease(&self, prerelease: &str) -> Result<Self, VersionError> {
        Self::from_parts(self.major, self.minor, self.patch, prerelease, &self.build)
    }

    /// Return a copy of this version with the given build label
    pub fn with_build(&self, build: &str) -> Result<Self, VersionError> {
        Self::from_parts(self.major, self.minor, self.patch, &self.prerelease, build)
    }

    /// Convert a four-part numeric version (`major.minor.build.revision`).
    ///
    /// The build number becomes the patch (0 when absent) and the revision, if
    /// any, becomes the build label. No prerelease label is ever set.
    pub fn from_four_part(major: u64, minor: u64, build: Option<u64>, revision: Option<u64>) -> Self {
        Version {
            major: Some(major),
            minor: Some(minor),
            patch: Some(build.unwrap_or(0)),
            prerelease: String::new(),
            build: revision.map(|r| r.to_string()).unwrap_or_default(),
        }
    }

    /// Parse `major.minor[.build[.revision]]` and convert it like [`Version::from_four_part`]
    pub fn parse_four_part(input: &str) -> Result<Self, VersionError> {
        if is_blank(input) {
            return Err(VersionError::Empty);
        }

        let caps = FOUR_PART_RE
            .captures(input)
            .ok_or_else(|| VersionError::InvalidVersion(input.to_string()))?;

        let number = |index: usize, name: &str| -> Result<Option<u64>, VersionError> {
            caps.get(index)
                .map(|m| parse_number(input, m.as_str(), name))
                .transpose()
        };

        let major = number(1, "major")?.unwrap_or(0);
        let minor = number(2, "minor")?.unwrap_or(0);
        Ok(Self::from_four_part(major, minor, number(3, "build")?, number(4, "revision")?))
    }

    /// Check whether the string matches the version grammar.
    ///
    /// This is a lightweight probe: `1` and `1.2` match the grammar even
    /// though [`Version::parse`] rejects them for missing a minor or patch.
    pub fn is_version(input: &str) -> bool {
        VERSION_RE.is_match(input)
    }

    /// Parse a version string
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        if is_blank(input) {
            return Err(VersionError::Empty);
        }

        let caps = VERSION_RE
            .captures(input)
            .ok_or_else(|| VersionError::InvalidVersion(input.to_string()))?;

        let missing = |reason: &str| VersionError::InvalidVersionWithContext {
            version: input.to_string(),
            reason: reason.to_string(),
        };

        // Everything after the first wildcard component is discarded
        let major = match caps.name("major").map_or(WILDCARD, |m| m.as_str()) {
            WILDCARD => return Ok(Self::wildcard()),
            digits => parse_number(input, digits, "major")?,
        };

        let minor = match caps.name("minor").map(|m| m.as_str()) {
            None => return Err(missing("a minor version is required")),
            Some(WILDCARD) => return Ok(Self::minor_wildcard(major)),
            Some(digits) => parse_number(input, digits, "minor")?,
        };

        let patch = match caps.name("patch").map(|m| m.as_str()) {
            None => return Err(missing("a patch version is required")),
            Some(WILDCARD) => return Ok(Self::patch_wildcard(major, minor)),
            Some(digits) => parse_number(input, digits, "patch")?,
        };

        // A "*" label means "not specified"
        let label = |name: &str| match caps.name(name).map(|m| m.as_str()) {
            None | Some(WILDCARD) => String::new(),
            Some(value) => value.to_string(),
        };

        Ok(Version {
            major: Some(major),
            minor: Some(minor),
            patch: Some(patch),
            prerelease: label("pre"),
            build: label("build"),
        })
    }

    /// Parse a version string, returning `None` when it is invalid
    pub fn try_parse(input: &str) -> Option<Self> {
        Self::parse(input).ok()
    }

    pub fn major(&self) -> Option<u64> {
        self.major
    }

    pub fn minor(&self) -> Option<u64> {
        self.minor
    }

    pub fn patch(&self) -> Option<u64> {
        self.patch
    }

    pub fn prerelease(&self) -> &str {
        &self.prerelease
    }

    pub fn build(&self) -> &str {
        &self.build
    }

    /// True when at least one numeric component is a wildcard
    pub fn is_wildcard(&self) -> bool {
        self.patch.is_none()
    }

    /// True when a prerelease label is present
    pub fn is_prerelease(&self) -> bool {
        !is_blank(&self.prerelease)
    }

    /// Compare against another version with an explicit comparer
    pub fn compare_with(&self, other: &Version, comparer: &dyn VersionComparer) -> Ordering {
        comparer.compare(self, other)
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn parse_number(input: &str, digits: &str, component: &str) -> Result<u64, VersionError> {
    digits.parse().map_err(|_| VersionError::InvalidVersionWithContext {
        version: input.to_string(),
        reason: format!("the {} component is out of range", component),
    })
}

fn describe_parts(
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    prerelease: &str,
    build: &str,
) -> String {
    let part = |p: Option<u64>| p.map_or_else(|| WILDCARD.to_string(), |n| n.to_string());
    let mut out = format!("{}.{}.{}", part(major), part(minor), part(patch));
    if !is_blank(prerelease) {
        out.push('-');
        out.push_str(prerelease);
    }
    if !is_blank(build) {
        out.push('+');
        out.push_str(build);
    }
    out
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
        comparator::default_comparer().compare(self, other)
    }
}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(comparator::default_comparer().hash_version(self));
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(major) = self.major else {
            return f.write_str(WILDCARD);
        };
        let Some(minor) = self.minor else {
            return write!(f, "{}.*", major);
        };
        let Some(patch) = self.patch else {
            return write!(f, "{}.{}.*", major, minor);
        };

        write!(f, "{}.{}.{}", major, minor, patch)?;
        if !is_blank(&self.prerelease) {
            write!(f, "-{}", self.prerelease)?;
        }
        if !is_blank(&self.build) {
            write!(f, "+{}", self.build)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Version {
    type Error = VersionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Version {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Version {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
