//! Version comparison strategies and the process-wide default comparer

use std::cmp::Ordering;
use std::sync::{Arc, PoisonError, RwLock};

use lazy_static::lazy_static;

use crate::version::Version;

const WILDCARD: &str = "*";

/// Strategy used to order two versions
pub trait VersionComparer: Send + Sync {
    /// Compare two versions
    fn compare(&self, left: &Version, right: &Version) -> Ordering;

    /// Hash a version consistently with [`VersionComparer::compare`] equality.
    ///
    /// The default covers every field `SemverComparer` compares. Comparers
    /// with a coarser equality must override it; closure comparers always use
    /// the default.
    fn hash_version(&self, version: &Version) -> u64 {
        precedence_hash(version).wrapping_mul(HASH_MULTIPLIER) ^ identifiers_hash(version.build())
    }

    /// Name used when logging comparer changes
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> VersionComparer for F
where
    F: Fn(&Version, &Version) -> Ordering + Send + Sync,
{
    fn compare(&self, left: &Version, right: &Version) -> Ordering {
        self(left, right)
    }
}

/// Default comparer: major, minor, patch, prerelease, then build metadata.
///
/// A wildcard component sorts after any concrete value at the same position,
/// and a version without prerelease (or build) labels sorts after one with
/// them.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemverComparer;

impl VersionComparer for SemverComparer {
    fn compare(&self, left: &Version, right: &Version) -> Ordering {
        compare_precedence(left, right).then_with(|| compare_identifiers(left.build(), right.build()))
    }

    fn name(&self) -> &str {
        "semver"
    }
}

/// Comparer that ignores build metadata entirely
#[derive(Debug, Clone, Copy, Default)]
pub struct PrecedenceComparer;

impl VersionComparer for PrecedenceComparer {
    fn compare(&self, left: &Version, right: &Version) -> Ordering {
        compare_precedence(left, right)
    }

    fn hash_version(&self, version: &Version) -> u64 {
        precedence_hash(version)
    }

    fn name(&self) -> &str {
        "precedence"
    }
}

fn compare_precedence(left: &Version, right: &Version) -> Ordering {
    compare_component(left.major(), right.major())
        .then_with(|| compare_component(left.minor(), right.minor()))
        .then_with(|| compare_component(left.patch(), right.patch()))
        .then_with(|| compare_identifiers(left.prerelease(), right.prerelease()))
}

const HASH_MULTIPLIER: u64 = 397;

fn precedence_hash(version: &Version) -> u64 {
    [version.major(), version.minor(), version.patch()]
        .into_iter()
        .fold(0u64, |hash, component| {
            hash.wrapping_mul(HASH_MULTIPLIER) ^ component.unwrap_or(0)
        })
        .wrapping_mul(HASH_MULTIPLIER)
        ^ identifiers_hash(version.prerelease())
}

/// Compare one numeric component; a wildcard (`None`) sorts last
pub fn compare_component(left: Option<u64>, right: Option<u64>) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(l), Some(r)) => l.cmp(&r),
    }
}

/// Compare two dot-separated identifier lists (prerelease or build labels).
///
/// Blank and `*` labels sort after any concrete label, with `*` last. Otherwise
/// identifiers are compared pairwise: numbers numerically, numbers before
/// alphanumerics, alphanumerics case-insensitively. If one list is a prefix of
/// the other, the shorter list sorts first.
pub fn compare_identifiers(left: &str, right: &str) -> Ordering {
    let left_rank = unqualified_rank(left);
    let right_rank = unqualified_rank(right);
    if left_rank.is_some() || right_rank.is_some() {
        // Option orders None (qualified) before Some (unqualified)
        return left_rank.cmp(&right_rank);
    }

    let left_parts: Vec<&str> = identifiers(left).collect();
    let right_parts: Vec<&str> = identifiers(right).collect();

    for (l, r) in left_parts.iter().zip(right_parts.iter()) {
        let ordering = match (numeric(l), numeric(r)) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => compare_ignore_case(l, r),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    left_parts.len().cmp(&right_parts.len())
}

/// Hash of an identifier list that agrees with [`compare_identifiers`] equality
fn identifiers_hash(label: &str) -> u64 {
    if label.trim().is_empty() {
        return 0;
    }

    identifiers(label).fold(0u64, |hash, part| {
        let part_hash = match numeric(part) {
            Some(n) => n,
            None => fnv1a(part.chars().flat_map(char::to_uppercase)),
        };
        hash.wrapping_mul(HASH_MULTIPLIER) ^ part_hash
    })
}

fn unqualified_rank(label: &str) -> Option<u8> {
    if label.trim().is_empty() {
        Some(0)
    } else if label == WILDCARD {
        Some(1)
    } else {
        None
    }
}

fn identifiers(label: &str) -> impl Iterator<Item = &str> {
    label.split('.').filter(|part| !part.is_empty())
}

fn numeric(identifier: &str) -> Option<u64> {
    if identifier.bytes().all(|b| b.is_ascii_digit()) {
        identifier.parse().ok()
    } else {
        None
    }
}

fn compare_ignore_case(left: &str, right: &str) -> Ordering {
    left.chars()
        .flat_map(char::to_uppercase)
        .cmp(right.chars().flat_map(char::to_uppercase))
}

fn fnv1a(chars: impl Iterator<Item = char>) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;

    let mut buf = [0u8; 4];
    chars.fold(OFFSET, |hash, c| {
        c.encode_utf8(&mut buf)
            .bytes()
            .fold(hash, |h, b| (h ^ u64::from(b)).wrapping_mul(PRIME))
    })
}

lazy_static! {
    static ref DEFAULT_COMPARER: RwLock<Arc<dyn VersionComparer>> = RwLock::new(Arc::new(SemverComparer));
}

/// The comparer currently used by `Version`'s `Ord`, `Eq` and by range matching.
///
/// Each call returns a snapshot, so a comparison that is already running keeps
/// the comparer it started with even if another thread replaces the default.
pub fn default_comparer() -> Arc<dyn VersionComparer> {
    DEFAULT_COMPARER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replace the process-wide default comparer.
///
/// Affects every later comparison that does not pass a comparer explicitly,
/// including `HashMap`/`BTreeMap` lookups on `Version` keys. Swapping it while
/// such collections are populated will break their invariants.
pub fn set_default_comparer<C: VersionComparer + 'static>(comparer: C) {
    log::debug!("Default version comparer set to {}", comparer.name());
    *DEFAULT_COMPARER.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(comparer);
}

/// Restore [`SemverComparer`] as the default
pub fn reset_default_comparer() {
    set_default_comparer(SemverComparer);
}
