//! Semver facade providing high-level version operations on strings

use crate::range::{RangeError, RangeParser, VersionRange};
use crate::version::Version;

/// Main facade for string-in, string-out version operations.
///
/// Unparsable versions or ranges never panic here: `satisfies` answers
/// `false` and the list operations skip the offending entries.
pub struct Semver;

impl Semver {
    /// Check if a version satisfies a range
    pub fn satisfies(version: &str, range: &str) -> bool {
        let Ok(version) = Version::parse(version) else {
            return false;
        };

        match RangeParser::new().parse(range) {
            Ok(range) => range.matches(&version),
            Err(e) => {
                log::debug!("Ignoring invalid range \"{}\": {}", range, e);
                false
            }
        }
    }

    /// Return all versions that satisfy the given range, in input order
    pub fn satisfied_by(versions: &[&str], range: &str) -> Vec<String> {
        let Ok(parsed) = Self::parse_range(range) else {
            return Vec::new();
        };

        versions
            .iter()
            .filter(|v| Self::satisfies_parsed(v, &parsed))
            .map(|v| v.to_string())
            .collect()
    }

    /// Parse a range once for repeated checks
    pub fn parse_range(range: &str) -> Result<VersionRange, RangeError> {
        RangeParser::new().parse(range)
    }

    /// Check a version against a pre-parsed range
    pub fn satisfies_parsed(version: &str, range: &VersionRange) -> bool {
        Version::parse(version).is_ok_and(|v| range.matches(&v))
    }

    /// Sort versions in ascending order
    pub fn sort(versions: &[&str]) -> Vec<String> {
        Self::usort(versions, true)
    }

    /// Sort versions in descending order (reverse sort)
    pub fn rsort(versions: &[&str]) -> Vec<String> {
        Self::usort(versions, false)
    }

    fn usort(versions: &[&str], ascending: bool) -> Vec<String> {
        // Parsed version with its original index
        let mut parsed: Vec<(Version, usize)> = versions
            .iter()
            .enumerate()
            .filter_map(|(i, v)| Some((Version::parse(v).ok()?, i)))
            .collect();

        parsed.sort_by(|(a, _), (b, _)| if ascending { a.cmp(b) } else { b.cmp(a) });

        // Return original strings in sorted order
        parsed.into_iter().map(|(_, i)| versions[i].to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_satisfies_positive() {
        // Juxtaposed bounds and explicit connectives
        assert!(Semver::satisfies("1.4.0", ">=1.2.0 <2.0.0"));
        assert!(Semver::satisfies("1.5.0", ">=  1.0.0 &&\t<2.0.0"));
        assert!(Semver::satisfies("1.0.0", "1.0.0 || 2.*"));

        // Wildcards sort after every concrete version they cover
        assert!(Semver::satisfies("2.3.0", "<=2.* && !2.0.0"));
        assert!(Semver::satisfies("7.0.0", "<=*"));
        assert!(Semver::satisfies("1.2.*", ">1.2.99"));

        // Negation and grouping
        assert!(Semver::satisfies("2.0.0", "(1.0.0 || 2.0.0) !=3.0.0"));
        assert!(Semver::satisfies("4.5.6", "!(>=1.0.0 <4.0.0)"));
        assert!(Semver::satisfies("0.9.0", "<1.* && !(0.5.0 || 0.6.0)"));

        // Prerelease and build labels
        assert!(Semver::satisfies("3.0.0-rc.2", ">=3.0.0-rc.1 <3.0.0"));
        assert!(Semver::satisfies("1.0.0-ALPHA.1", "==1.0.0-alpha.1"));
        assert!(Semver::satisfies("1.0.0-alpha.10", ">1.0.0-alpha.9"));
        assert!(Semver::satisfies("1.0.0-alpha.beta", ">1.0.0-alpha.99"));
        assert!(Semver::satisfies("1.1.0+build.2", ">1.1.0+build.1 <1.1.0"));
    }

    #[test]
    fn test_satisfies_negative() {
        assert!(!Semver::satisfies("2.0.0", ">=1.2.0 <2.0.0"));
        assert!(!Semver::satisfies("2.0.0", "<=2.* && !2.0.0"));
        assert!(!Semver::satisfies("3.0.0", ">=3.0.0-rc.1 <3.0.0"));
        assert!(!Semver::satisfies("1.2.3", "1.2.*"));
        assert!(!Semver::satisfies("3.0.0", "(1.0.0 || 2.0.0) !=3.0.0"));
        assert!(!Semver::satisfies("2.5.0", "!(>=1.0.0 <4.0.0)"));
        assert!(!Semver::satisfies("0.5.0", "<1.* && !(0.5.0 || 0.6.0)"));
        assert!(!Semver::satisfies("1.0.0-alpha.9", ">1.0.0-alpha.10"));
        assert!(!Semver::satisfies("1.0.0", "!!!1.0.0"));

        // Invalid input never matches
        assert!(!Semver::satisfies("v1.2.3", ">=1.0.0"));
        assert!(!Semver::satisfies("1.2", ">=1.0.0"));
        assert!(!Semver::satisfies("1.2.3", "^1.2.3"));
        assert!(!Semver::satisfies("1.2.3", ""));
        assert!(!Semver::satisfies("1.2.3", "(>=1.0.0"));
        assert!(!Semver::satisfies("1.0.0", ">=(1.0.0)"));
    }

    #[test]
    fn test_satisfied_by() {
        let versions = vec!["0.9.0", "1.0.0-rc.1", "1.0.0", "1.4.2", "2.0.0", "2.7.1", "3.0.0"];
        let result = Semver::satisfied_by(&versions, ">=1.0.0 <=2.*");
        assert_eq!(result, vec!["1.0.0", "1.4.2", "2.0.0", "2.7.1"]);

        let result = Semver::satisfied_by(&versions, "!(1.4.2 || 2.0.0) >=1.0.0");
        assert_eq!(result, vec!["1.0.0", "2.7.1", "3.0.0"]);

        // Unparsable entries are skipped
        let versions = vec!["0.2.0", "bogus", "0.2.1", "0.3"];
        assert_eq!(Semver::satisfied_by(&versions, "<0.3.0"), vec!["0.2.0", "0.2.1"]);

        assert!(Semver::satisfied_by(&versions, "||").is_empty());
    }

    #[test]
    fn test_sort() {
        let versions = vec!["1.10.0", "1.9.0", "1.0.0-beta.11", "*", "1.0.0-beta.2", "1.*"];
        let sorted = Semver::sort(&versions);
        assert_eq!(sorted, vec!["1.0.0-beta.2", "1.0.0-beta.11", "1.9.0", "1.10.0", "1.*", "*"]);

        let versions = vec!["1.0.0", "not-a-version", "1.0.0-rc.1", "1.0.0+b"];
        assert_eq!(Semver::sort(&versions), vec!["1.0.0-rc.1", "1.0.0+b", "1.0.0"]);
    }

    #[test]
    fn test_rsort() {
        let versions = vec!["2.*", "1.0.0-rc.1", "1.0.0", "3.1.4", "1.0.0+build.5", "0.0.1"];
        let rsorted = Semver::rsort(&versions);
        assert_eq!(rsorted, vec!["3.1.4", "2.*", "1.0.0", "1.0.0+build.5", "1.0.0-rc.1", "0.0.1"]);
    }

    #[test]
    fn test_parsed_range_reuse() {
        let parsed = Semver::parse_range(">=1.2.0 <2.0.0").unwrap();
        assert!(Semver::satisfies_parsed("1.2.3", &parsed));
        assert!(Semver::satisfies_parsed("1.9.0", &parsed));
        assert!(!Semver::satisfies_parsed("2.0.0", &parsed));
        assert!(!Semver::satisfies_parsed("1.9", &parsed));

        assert_eq!(Semver::parse_range("  ").unwrap_err(), RangeError::Empty);
    }
}
