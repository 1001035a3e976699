//! Semantic versions with trailing wildcards and boolean range expressions
//!
//! This crate provides a [`Version`] value type following SemVer 2.0 precedence
//! (extended with `*` wildcards), pluggable comparison through
//! [`VersionComparer`], and a range engine that parses expressions such as
//! `>=1.2.0 <2.0.0 || !3.*` into reusable [`VersionRange`] predicates.
//!
//! ```
//! use semrange::{Version, VersionRange};
//!
//! let range: VersionRange = ">=1.2.0 <2.0.0 || 3.0.0".parse().unwrap();
//! assert!(range.matches(&Version::parse("1.4.2").unwrap()));
//! assert!(!range.matches(&Version::parse("2.0.0").unwrap()));
//! ```

mod comparator;
pub mod range;
mod semver;
mod version;

pub use comparator::{
    compare_component, compare_identifiers, default_comparer, reset_default_comparer, set_default_comparer,
    PrecedenceComparer, SemverComparer, VersionComparer,
};
pub use range::{Operator, RangeError, RangeParser, VersionRange};
pub use semver::Semver;
pub use version::{Version, VersionError};
