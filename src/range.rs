//! npm-style semantic version ranges
//!
//! Supports the range syntax release constraints are written in:
//! - `1.2.3`, `=1.2.3`, `v1.2.3` - exact match
//! - `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3` - comparison operators
//! - `1.2.x`, `1.x`, `1.2`, `1`, `*` - wildcards and partial versions
//! - `~1.2.3`, `~>1.2.3` - patch updates only
//! - `^1.2.3` - compatible updates (special cases for 0.x)
//! - `1.2.3 - 2.3.4` - inclusive hyphen range
//! - `>=1.0.0 <2.0.0` (AND) and `^1.0.0 || ^2.0.0` (OR)
//!
//! Parsing is loose: a leading `v` and whitespace between an operator and its
//! version are accepted. Prereleases are never included implicitly; a
//! prerelease only satisfies a comparator set that names a prerelease of the
//! same `major.minor.patch`.

use std::cmp::Ordering;

use semver::{BuildMetadata, Prerelease, Version};

use crate::version::precedence;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Comparator {
    op: Op,
    version: Version,
}

impl Comparator {
    fn new(op: Op, version: Version) -> Self {
        Self { op, version }
    }

    /// A comparator no version can satisfy.
    fn nothing() -> Self {
        Self::new(Op::Lt, lowest_of(0, 0, 0))
    }

    fn matches(&self, version: &Version) -> bool {
        let ord = precedence(version, &self.version);
        match self.op {
            Op::Eq => ord == Ordering::Equal,
            Op::Lt => ord == Ordering::Less,
            Op::Lte => ord != Ordering::Greater,
            Op::Gt => ord == Ordering::Greater,
            Op::Gte => ord != Ordering::Less,
        }
    }

    fn is_prerelease_of(&self, version: &Version) -> bool {
        !self.version.pre.is_empty()
            && self.version.major == version.major
            && self.version.minor == version.minor
            && self.version.patch == version.patch
    }
}

/// `M.m.p-0`, the lowest version of a release series.
fn lowest_of(major: u64, minor: u64, patch: u64) -> Version {
    let mut version = Version::new(major, minor, patch);
    version.pre = Prerelease::new("0").expect("`0` is a valid prerelease");
    version
}

/// Parses a prerelease loosely: numeric identifiers may carry leading zeros,
/// `rc.01` is `rc.1`.
fn parse_prerelease(pre: &str) -> Option<Prerelease> {
    if pre.is_empty() {
        return None;
    }
    let normalized = pre
        .split('.')
        .map(|ident| {
            if ident.len() > 1 && ident.bytes().all(|b| b.is_ascii_digit()) {
                let trimmed = ident.trim_start_matches('0');
                if trimmed.is_empty() {
                    "0"
                } else {
                    trimmed
                }
            } else {
                ident
            }
        })
        .collect::<Vec<_>>()
        .join(".");
    Prerelease::new(&normalized).ok()
}

/// A possibly incomplete version, as written in a range: `1`, `1.2`, `1.x`,
/// `1.2.3-rc1`. Components after the first wildcard are always `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Partial {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    pre: Prerelease,
}

impl Partial {
    fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let input = input.strip_prefix('v').unwrap_or(input);
        if input.is_empty() {
            return None;
        }

        let (input, build) = match input.split_once('+') {
            Some((rest, build)) => (rest, Some(build)),
            None => (input, None),
        };
        if let Some(build) = build {
            BuildMetadata::new(build).ok()?;
        }

        let (core, pre) = match input.split_once('-') {
            Some((core, pre)) => (core, parse_prerelease(pre)?),
            None => (input, Prerelease::EMPTY),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() > 3 {
            return None;
        }

        let mut numbers = [None; 3];
        let mut wildcard = false;
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            if matches!(*part, "x" | "X" | "*") {
                wildcard = true;
            } else if !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()) {
                if !wildcard {
                    *slot = Some(part.parse::<u64>().ok()?);
                }
            } else {
                return None;
            }
        }

        let [major, minor, patch] = numbers;
        if !pre.is_empty() && patch.is_none() {
            return None;
        }

        Some(Self {
            major,
            minor,
            patch,
            pre,
        })
    }

    fn full(&self) -> Option<Version> {
        let mut version = Version::new(self.major?, self.minor?, self.patch?);
        version.pre = self.pre.clone();
        Some(version)
    }

    /// Inclusive lower bound, `None` when unbounded.
    fn lower(&self) -> Option<Comparator> {
        let major = self.major?;
        Some(match (self.minor, self.full()) {
            (_, Some(full)) => Comparator::new(Op::Gte, full),
            (Some(minor), None) => Comparator::new(Op::Gte, Version::new(major, minor, 0)),
            (None, _) => Comparator::new(Op::Gte, Version::new(major, 0, 0)),
        })
    }

    /// Inclusive-as-written upper bound, `None` when unbounded.
    fn upper(&self) -> Option<Comparator> {
        let major = self.major?;
        Some(match (self.minor, self.full()) {
            (_, Some(full)) => Comparator::new(Op::Lte, full),
            (Some(minor), None) => {
                Comparator::new(Op::Lt, lowest_of(major, minor.saturating_add(1), 0))
            }
            (None, _) => Comparator::new(Op::Lt, lowest_of(major.saturating_add(1), 0, 0)),
        })
    }

    fn exact(&self) -> Vec<Comparator> {
        match self.full() {
            Some(full) => vec![Comparator::new(Op::Eq, full)],
            None => self.lower().into_iter().chain(self.upper()).collect(),
        }
    }

    fn tilde(&self) -> Vec<Comparator> {
        let (Some(major), Some(minor)) = (self.major, self.minor) else {
            return self.exact();
        };
        let lower = self
            .full()
            .unwrap_or_else(|| Version::new(major, minor, 0));
        vec![
            Comparator::new(Op::Gte, lower),
            Comparator::new(Op::Lt, lowest_of(major, minor.saturating_add(1), 0)),
        ]
    }

    fn caret(&self) -> Vec<Comparator> {
        let (Some(major), Some(minor)) = (self.major, self.minor) else {
            return self.exact();
        };
        let lower = self
            .full()
            .unwrap_or_else(|| Version::new(major, minor, 0));
        let upper = match (major, minor, self.patch) {
            (0, 0, Some(patch)) => lowest_of(0, 0, patch.saturating_add(1)),
            (0, minor, _) => lowest_of(0, minor.saturating_add(1), 0),
            (major, _, _) => lowest_of(major.saturating_add(1), 0, 0),
        };
        vec![
            Comparator::new(Op::Gte, lower),
            Comparator::new(Op::Lt, upper),
        ]
    }

    fn greater_than(&self) -> Vec<Comparator> {
        let Some(major) = self.major else {
            return vec![Comparator::nothing()];
        };
        let bound = match (self.minor, self.full()) {
            (_, Some(full)) => return vec![Comparator::new(Op::Gt, full)],
            (Some(minor), None) => Version::new(major, minor.saturating_add(1), 0),
            (None, _) => Version::new(major.saturating_add(1), 0, 0),
        };
        vec![Comparator::new(Op::Gte, bound)]
    }

    fn less_than(&self) -> Vec<Comparator> {
        let Some(major) = self.major else {
            return vec![Comparator::nothing()];
        };
        let bound = match (self.minor, self.full()) {
            (_, Some(full)) => full,
            (Some(minor), None) => lowest_of(major, minor, 0),
            (None, _) => lowest_of(major, 0, 0),
        };
        vec![Comparator::new(Op::Lt, bound)]
    }
}

/// Parse one space-free term such as `^1.2`, `>=1.0.0` or `1.x`.
fn parse_term(term: &str) -> Option<Vec<Comparator>> {
    const OPERATORS: [&str; 8] = [">=", "<=", "~>", ">", "<", "=", "~", "^"];

    let (op, rest) = OPERATORS
        .iter()
        .find_map(|op| term.strip_prefix(op).map(|rest| (*op, rest)))
        .unwrap_or(("", term));
    let partial = Partial::parse(rest)?;

    Some(match op {
        ">=" => partial.lower().into_iter().collect(),
        "<=" => partial.upper().into_iter().collect(),
        ">" => partial.greater_than(),
        "<" => partial.less_than(),
        "~" | "~>" => partial.tilde(),
        "^" => partial.caret(),
        _ => partial.exact(),
    })
}

/// Parse one `||`-separated alternative into the comparators that must all hold.
fn parse_set(input: &str) -> Option<Vec<Comparator>> {
    // glue dangling operators to their version: `>= 1.2.3` is `>=1.2.3`
    let mut terms: Vec<String> = Vec::new();
    let mut pending = String::new();
    for token in input.split_whitespace() {
        pending.push_str(token);
        if !token.chars().all(|c| matches!(c, '<' | '>' | '=' | '~' | '^')) {
            terms.push(std::mem::take(&mut pending));
        }
    }
    if !pending.is_empty() {
        return None;
    }

    if let [from, dash, to] = terms.as_slice() {
        if dash == "-" {
            let from = Partial::parse(from)?;
            let to = Partial::parse(to)?;
            return Some(from.lower().into_iter().chain(to.upper()).collect());
        }
    }

    let mut comparators = Vec::new();
    for term in &terms {
        comparators.extend(parse_term(term)?);
    }
    Some(comparators)
}

/// A parsed range: a union of comparator sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    sets: Vec<Vec<Comparator>>,
}

impl VersionRange {
    /// Parses `input`, returning `None` when it is not a valid range.
    pub fn parse(input: &str) -> Option<Self> {
        let sets = input
            .split("||")
            .map(parse_set)
            .collect::<Option<Vec<_>>>()?;
        Some(Self { sets })
    }

    pub fn satisfies(&self, version: &Version) -> bool {
        self.sets.iter().any(|set| {
            set.iter().all(|c| c.matches(version))
                && (version.pre.is_empty() || set.iter().any(|c| c.is_prerelease_of(version)))
        })
    }

    /// The highest of `versions` inside this range.
    pub fn max_satisfying<'a, I>(&self, versions: I) -> Option<&'a Version>
    where
        I: IntoIterator<Item = &'a Version>,
    {
        versions
            .into_iter()
            .filter(|v| self.satisfies(v))
            .max_by(|a, b| precedence(a, b))
    }
}
