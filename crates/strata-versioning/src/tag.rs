//! ---
//! strata_section: "01-release-versioning"
//! strata_subsection: "module"
//! strata_type: "source"
//! strata_scope: "code"
//! strata_description: "Version resolution against source control and archive metadata."
//! strata_version: "v0.1.0-alpha"
//! strata_owner: "tbd"
//! ---
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{Result, VersionError};

/// Release tag grammar: `MAJOR.MINOR[.MICRO][PRE]` where `PRE` is an `a`,
/// `b`, or `rc` marker with optional trailing digits.
static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\.(\d+)(?:\.(\d+))?((?:a|b|rc)\d*)?$").expect("tag grammar to compile")
});

/// Describe output grammar: `v<tag>[-<n>-g<hash>]`.
static DESCRIBE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^v([0-9][0-9A-Za-z.]*?)(?:-(\d+)-g([0-9a-fA-F]+))?$")
        .expect("describe grammar to compile")
});

/// Trailing `.postN` marker carried by versions past a tagged release.
static POST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+)\.post(\d+)$").expect("post grammar to compile"));

/// Numeric and prerelease fields parsed out of a release tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag {
    /// Leading digit group.
    pub major: u32,
    /// Second digit group.
    pub minor: u32,
    /// Optional third digit group; releases tagged `vX.Y` omit it.
    pub micro: Option<u32>,
    /// Optional prerelease token (`a`, `b`, or `rc` plus optional digits).
    pub prerelease: Option<String>,
}

impl ReleaseTag {
    /// Parse the numeric/prerelease portion of a release tag, without the
    /// leading `v` and without any `.postN` suffix.
    pub fn parse(text: &str) -> Result<Self> {
        let caps = TAG_RE.captures(text).ok_or_else(|| VersionError::Parse {
            text: text.to_owned(),
        })?;
        let field = |index: usize| -> Result<u32> {
            caps.get(index)
                .map(|m| m.as_str())
                .unwrap_or_default()
                .parse()
                .map_err(|_| VersionError::Parse {
                    text: text.to_owned(),
                })
        };
        Ok(Self {
            major: field(1)?,
            minor: field(2)?,
            micro: caps.get(3).map(|_| field(3)).transpose()?,
            prerelease: caps.get(4).map(|m| m.as_str().to_owned()),
        })
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(micro) = self.micro {
            write!(f, ".{micro}")?;
        }
        if let Some(prerelease) = &self.prerelease {
            write!(f, "{prerelease}")?;
        }
        Ok(())
    }
}

/// Parse a `git describe` line into the bare tag version and the number of
/// commits past it. An exact tag match yields a patch count of zero.
pub fn parse_describe(text: &str) -> Result<(String, u32)> {
    let text = text.trim();
    let caps = DESCRIBE_RE.captures(text).ok_or_else(|| VersionError::Parse {
        text: text.to_owned(),
    })?;
    let base = caps[1].to_owned();
    let patchnumber = match caps.get(2) {
        Some(m) => m.as_str().parse().map_err(|_| VersionError::Parse {
            text: text.to_owned(),
        })?,
        None => 0,
    };
    Ok((base, patchnumber))
}

/// Split a trailing `.postN` suffix off a version string.
pub fn split_post(version: &str) -> (&str, Option<u32>) {
    if let Some(caps) = POST_RE.captures(version) {
        if let Ok(n) = caps[2].parse() {
            return (caps.get(1).map(|m| m.as_str()).unwrap_or(version), Some(n));
        }
    }
    (version, None)
}

/// Normalise a version string to its "exactly at the tagged release" form,
/// used to compare the checked-in fallback against a live resolution.
pub fn post_zero_form(version: &str) -> String {
    format!("{}.post0", split_post(version).0)
}
