//! Version suffixes embedded in resource names.
//!
//! A versioned name ends in `_v<N>[.<N>]*`, e.g. `SendData_v2` or
//! `Interview Prep_v1.2.3`. Names without the suffix behave as version `0`.
//! Comparison is component-wise with missing trailing components read as
//! zero, so `1`, `1.0` and `1.0.0` are all equal.

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// The version a name without a suffix is treated as.
pub const ZERO_VERSION: &str = "0";

/// Trailing `_v` + dot-separated ASCII digit groups, anchored at the end.
static VERSION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_v([0-9]+(?:\.[0-9]+)*)$").expect("version suffix pattern is valid"));

/// A bare version string: digit groups, no `v`, no empty components.
static VERSION_STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(?:\.[0-9]+)*$").expect("version string pattern is valid"));

/// Extract the version from a name's trailing suffix.
///
/// Only the final suffix counts: `Foo_v1_v2` yields `2`. A suffix with a
/// non-numeric component (`Foo_v1.x`) is not a version at all.
pub fn parse_version(name: &str) -> Option<String> {
    VERSION_SUFFIX
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Strip one trailing version suffix. Unversioned names are returned as-is.
pub fn base_name(name: &str) -> &str {
    match VERSION_SUFFIX.find(name) {
        Some(m) => &name[..m.start()],
        None => name,
    }
}

/// Whether `version` is one-or-more dot-separated digit groups.
pub fn is_valid_version(version: &str) -> bool {
    VERSION_STRING.is_match(version)
}

/// Reassemble a versioned name.
///
/// No suffix is appended for an absent, empty or zero (`"0"`) version.
pub fn build_name(base: &str, version: Option<&str>) -> String {
    match version {
        Some(v) if !v.is_empty() && v != ZERO_VERSION => format!("{base}_v{v}"),
        _ => base.to_string(),
    }
}

/// Compare two version strings component-wise.
///
/// The shorter sequence is right-padded with zeros. Components are compared
/// numerically without overflow; a non-numeric component reads as zero.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left: Vec<&str> = a.split('.').collect();
    let right: Vec<&str> = b.split('.').collect();
    let len = left.len().max(right.len());

    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(ZERO_VERSION);
        let r = right.get(i).copied().unwrap_or(ZERO_VERSION);
        match compare_component(l, r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

fn compare_component(a: &str, b: &str) -> Ordering {
    let a = normalize_component(a);
    let b = normalize_component(b);
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Digits without leading zeros; anything non-numeric becomes `"0"`.
fn normalize_component(component: &str) -> &str {
    if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
        return ZERO_VERSION;
    }
    let trimmed = component.trim_start_matches('0');
    if trimmed.is_empty() { ZERO_VERSION } else { trimmed }
}

/// The parsed version of a resource name, ordered component-wise.
///
/// Equality follows [`compare_versions`], so `VersionSpec("1") ==
/// VersionSpec("1.0")`.
#[derive(Debug, Clone)]
pub struct VersionSpec(String);

impl VersionSpec {
    /// Version of a name; names without a suffix are version `0`.
    pub fn from_name(name: &str) -> Self {
        Self(parse_version(name).unwrap_or_else(|| ZERO_VERSION.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for VersionSpec {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionSpec {}

impl PartialOrd for VersionSpec {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionSpec {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_versions(&self.0, &other.0)
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
