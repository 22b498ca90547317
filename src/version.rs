//! Resolving a version constraint against published release tags.

use std::cmp::Ordering;

use semver::Version;
use tracing::debug;

use crate::{error::Error, range::VersionRange};

/// Every release tag carries this prefix in front of its version.
pub const TAG_PREFIX: char = 'v';

/// Semantic version precedence. Unlike `Ord for Version`, build metadata is
/// not taken into account.
pub fn precedence(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch)
        .cmp(&(b.major, b.minor, b.patch))
        .then_with(|| a.pre.cmp(&b.pre))
}

/// The tag a release of `version` is published under.
pub fn tag_for(version: &Version) -> String {
    format!("{TAG_PREFIX}{version}")
}

/// Parses a `v`-prefixed release tag. Returns `None` for tags that are not
/// semantic versions.
pub fn parse_tag(tag: &str) -> Option<Version> {
    let version = tag.strip_prefix(TAG_PREFIX)?;
    Version::parse(version).ok()
}

/// A parsed version constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Highest release without a prerelease label.
    Latest,
    /// Highest release overall, prereleases included.
    Next,
    Range(VersionRange),
}

impl Constraint {
    pub fn parse(constraint: &str) -> Result<Self, Error> {
        match constraint {
            "latest" => Ok(Self::Latest),
            "next" => Ok(Self::Next),
            _ => VersionRange::parse(constraint)
                .map(Self::Range)
                .ok_or_else(|| Error::InvalidConstraint(constraint.to_string())),
        }
    }

    /// Picks the best version out of `candidates`.
    pub fn select<'a>(&self, candidates: &'a [Version]) -> Option<&'a Version> {
        match self {
            Self::Next => candidates.iter().max_by(|a, b| precedence(a, b)),
            Self::Latest => candidates
                .iter()
                .filter(|v| v.pre.is_empty())
                .max_by(|a, b| precedence(a, b)),
            Self::Range(range) => range.max_satisfying(candidates),
        }
    }
}

/// Resolves `constraint` (`latest`, `next`, or a range) against the published
/// `tags`. Tags that do not parse are skipped.
///
/// `Ok(None)` means nothing published satisfies the constraint, which is not
/// the same as a malformed constraint.
pub fn resolve<S: AsRef<str>>(constraint: &str, tags: &[S]) -> Result<Option<Version>, Error> {
    let constraint = Constraint::parse(constraint)?;

    let candidates: Vec<Version> = tags
        .iter()
        .filter_map(|tag| {
            let tag = tag.as_ref();
            let version = parse_tag(tag);
            if version.is_none() {
                debug!("skipping tag {tag}, not a semantic version");
            }
            version
        })
        .collect();

    Ok(constraint.select(&candidates).cloned())
}
