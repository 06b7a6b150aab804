//! Compiler versions and the version requirements expressed by
//! `pragma solidity` directives

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use itertools::Itertools;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::ConfigError;

// -----------------
// | Solc Versions |
// -----------------

/// A fully-specified `solc` release version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SolcVersion {
    /// The major version
    pub major: u64,
    /// The minor version
    pub minor: u64,
    /// The patch version
    pub patch: u64,
}

impl SolcVersion {
    /// Construct a new version
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch }
    }
}

impl Display for SolcVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SolcVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let partial = PartialVersion::from_str(s)?;
        match (partial.minor, partial.patch) {
            (Some(minor), Some(patch)) => Ok(SolcVersion::new(partial.major, minor, patch)),
            _ => Err(ConfigError::InvalidVersion(s.to_string())),
        }
    }
}

impl Serialize for SolcVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SolcVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        SolcVersion::from_str(&s).map_err(de::Error::custom)
    }
}

/// A version in which the trailing components may be omitted, e.g. `0.8`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PartialVersion {
    /// The major version
    major: u64,
    /// The minor version, if given
    minor: Option<u64>,
    /// The patch version, if given
    patch: Option<u64>,
}

impl PartialVersion {
    /// The lowest full version matching this partial version
    fn floor(&self) -> SolcVersion {
        SolcVersion::new(self.major, self.minor.unwrap_or(0), self.patch.unwrap_or(0))
    }

    /// The lowest full version above every version matching this partial version
    fn ceil(&self) -> SolcVersion {
        match (self.minor, self.patch) {
            (None, _) => SolcVersion::new(self.major + 1, 0, 0),
            (Some(minor), None) => SolcVersion::new(self.major, minor + 1, 0),
            (Some(minor), Some(patch)) => SolcVersion::new(self.major, minor, patch + 1),
        }
    }
}

impl FromStr for PartialVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('v');
        // Pre-release and build metadata never appear in `solc` release versions
        let core = trimmed.split(['-', '+']).next().unwrap_or_default();

        let parts = core
            .split('.')
            .filter(|p| !matches!(*p, "x" | "X" | "*"))
            .map(|p| p.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ConfigError::InvalidVersion(s.to_string()))?;

        match parts.as_slice() {
            [major] => Ok(Self { major: *major, minor: None, patch: None }),
            [major, minor] => Ok(Self { major: *major, minor: Some(*minor), patch: None }),
            [major, minor, patch] => {
                Ok(Self { major: *major, minor: Some(*minor), patch: Some(*patch) })
            }
            _ => Err(ConfigError::InvalidVersion(s.to_string())),
        }
    }
}

// ------------------------
// | Version Requirements |
// ------------------------

/// A comparison operator in a version requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    /// `>`
    Greater,
    /// `>=`
    GreaterEq,
    /// `<`
    Less,
    /// `<=`
    LessEq,
}

/// A single bound on a version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Comparator {
    /// The comparison operator
    op: Op,
    /// The version compared against
    version: SolcVersion,
}

impl Comparator {
    /// Whether the given version satisfies this bound
    fn matches(&self, version: &SolcVersion) -> bool {
        match self.op {
            Op::Greater => version > &self.version,
            Op::GreaterEq => version >= &self.version,
            Op::Less => version < &self.version,
            Op::LessEq => version <= &self.version,
        }
    }

    /// Desugar a single requirement token, e.g. `^0.8.0` or `>=0.7`,
    /// into the bounds it denotes
    fn parse_token(token: &str) -> Result<Vec<Comparator>, ConfigError> {
        let invalid = || ConfigError::InvalidPragma(token.to_string());
        let (op, rest) = ["^", "~", ">=", "<=", ">", "<", "="]
            .iter()
            .find_map(|op| token.strip_prefix(op).map(|rest| (*op, rest)))
            .unwrap_or(("", token));
        let partial = PartialVersion::from_str(rest).map_err(|_| invalid())?;

        let ge = |version| Comparator { op: Op::GreaterEq, version };
        let lt = |version| Comparator { op: Op::Less, version };

        let bounds = match op {
            "^" => {
                let upper = match (partial.major, partial.minor, partial.patch) {
                    (0, Some(0), Some(patch)) => SolcVersion::new(0, 0, patch + 1),
                    (0, Some(minor), _) => SolcVersion::new(0, minor + 1, 0),
                    (major, ..) => SolcVersion::new(major + 1, 0, 0),
                };
                vec![ge(partial.floor()), lt(upper)]
            }
            "~" => {
                let upper = match partial.minor {
                    Some(minor) => SolcVersion::new(partial.major, minor + 1, 0),
                    None => SolcVersion::new(partial.major + 1, 0, 0),
                };
                vec![ge(partial.floor()), lt(upper)]
            }
            ">=" => vec![ge(partial.floor())],
            "<" => vec![lt(partial.floor())],
            ">" if partial.patch.is_some() => {
                vec![Comparator { op: Op::Greater, version: partial.floor() }]
            }
            ">" => vec![ge(partial.ceil())],
            "<=" if partial.patch.is_some() => {
                vec![Comparator { op: Op::LessEq, version: partial.floor() }]
            }
            "<=" => vec![lt(partial.ceil())],
            // `=` and bare versions
            _ => vec![ge(partial.floor()), lt(partial.ceil())],
        };

        Ok(bounds)
    }
}

/// The version requirement of a `pragma solidity` directive
///
/// A requirement is a disjunction (`||`) of comparator sets, each of which is
/// a whitespace-separated conjunction of bounds. A hyphen range `a - b`
/// stands for `>=a <=b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionReq {
    /// The original requirement text
    raw: String,
    /// The alternatives, any one of which may be satisfied
    alternatives: Vec<Vec<Comparator>>,
}

impl VersionReq {
    /// Whether the given version satisfies the requirement
    pub fn matches(&self, version: &SolcVersion) -> bool {
        self.alternatives
            .iter()
            .any(|set| set.iter().all(|c| c.matches(version)))
    }

    /// The requirement as written in the source
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Display for VersionReq {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for VersionReq {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().to_string();
        if raw.is_empty() {
            return Err(ConfigError::InvalidPragma(s.to_string()));
        }

        let mut alternatives = Vec::new();
        for alternative in raw.split("||") {
            let mut comparators = Vec::new();
            for token in expand_hyphen_ranges(join_operators(alternative))? {
                comparators.extend(Comparator::parse_token(&token)?);
            }
            if comparators.is_empty() {
                return Err(ConfigError::InvalidPragma(s.to_string()));
            }
            alternatives.push(comparators);
        }

        Ok(Self { raw, alternatives })
    }
}

/// Split a comparator set on whitespace, re-attaching operators that were
/// separated from their version, e.g. `>= 0.8.0`
fn join_operators(set: &str) -> Vec<String> {
    let is_operator = |t: &str| t.chars().all(|c| matches!(c, '^' | '~' | '>' | '<' | '='));

    set.split_whitespace()
        .map(String::from)
        .coalesce(|prev, next| {
            if is_operator(&prev) {
                Ok(prev + &next)
            } else {
                Err((prev, next))
            }
        })
        .collect()
}

/// Rewrite hyphen ranges `a - b` into the bounds `>=a` and `<=b`
fn expand_hyphen_ranges(tokens: Vec<String>) -> Result<Vec<String>, ConfigError> {
    let mut expanded = Vec::with_capacity(tokens.len());
    let mut tokens = tokens.into_iter().peekable();

    while let Some(token) = tokens.next() {
        if tokens.peek().map(String::as_str) != Some("-") {
            expanded.push(token);
            continue;
        }

        tokens.next();
        let upper = tokens
            .next()
            .ok_or_else(|| ConfigError::InvalidPragma(format!("{token} -")))?;
        expanded.push(format!(">={token}"));
        expanded.push(format!("<={upper}"));
    }

    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(s: &str) -> VersionReq {
        VersionReq::from_str(s).unwrap()
    }

    fn v(s: &str) -> SolcVersion {
        SolcVersion::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(v("0.8.1"), SolcVersion::new(0, 8, 1));
        assert_eq!(v("v0.8.20"), SolcVersion::new(0, 8, 20));
        assert!(SolcVersion::from_str("0.8").is_err());
        assert!(SolcVersion::from_str("zero.eight").is_err());
    }

    #[test]
    fn test_caret() {
        let r = req("^0.8.0");
        assert!(r.matches(&v("0.8.0")));
        assert!(r.matches(&v("0.8.1")));
        assert!(!r.matches(&v("0.9.0")));
        assert!(!r.matches(&v("0.7.6")));
    }

    #[test]
    fn test_exact() {
        let r = req("0.8.1");
        assert!(r.matches(&v("0.8.1")));
        assert!(!r.matches(&v("0.8.0")));

        let r = req("=0.8.0");
        assert!(r.matches(&v("0.8.0")));
        assert!(!r.matches(&v("0.8.1")));
    }

    #[test]
    fn test_range_with_spaces() {
        let r = req(">= 0.7.0 < 0.8.1");
        assert!(r.matches(&v("0.7.6")));
        assert!(r.matches(&v("0.8.0")));
        assert!(!r.matches(&v("0.8.1")));
    }

    #[test]
    fn test_partial_versions() {
        assert!(req("0.8").matches(&v("0.8.19")));
        assert!(!req(">0.7").matches(&v("0.7.6")));
        assert!(req(">0.7").matches(&v("0.8.0")));
        assert!(req("<=0.8").matches(&v("0.8.9")));
        assert!(req("~0.8.1").matches(&v("0.8.9")));
        assert!(!req("~0.8.1").matches(&v("0.8.0")));
    }

    #[test]
    fn test_alternatives() {
        let r = req("0.7.6 || ^0.8.1");
        assert!(r.matches(&v("0.7.6")));
        assert!(r.matches(&v("0.8.4")));
        assert!(!r.matches(&v("0.8.0")));
    }

    #[test]
    fn test_hyphen_range() {
        let r = req("0.8.0 - 0.8.1");
        assert!(!r.matches(&v("0.7.6")));
        assert!(r.matches(&v("0.8.0")));
        assert!(r.matches(&v("0.8.1")));
        assert!(!r.matches(&v("0.8.2")));

        // A partial upper bound covers its whole series
        let r = req("0.7.0 - 0.8");
        assert!(r.matches(&v("0.8.19")));
        assert!(!r.matches(&v("0.9.0")));

        let r = req("0.6.12 || 0.8.0 - 0.8.1");
        assert!(r.matches(&v("0.6.12")));
        assert!(r.matches(&v("0.8.1")));

        assert!(VersionReq::from_str("0.8.0 -").is_err());
        assert!(VersionReq::from_str("- 0.8.1").is_err());
    }

    #[test]
    fn test_invalid_pragma() {
        assert!(VersionReq::from_str("").is_err());
        assert!(VersionReq::from_str("^latest").is_err());
    }
}
