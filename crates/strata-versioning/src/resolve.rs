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

use chrono::{DateTime, FixedOffset};
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::archive::{self, ArchiveRecord};
use crate::errors::{Result, VersionError};
use crate::fallback::FALLBACK_VERSION;
use crate::git::{GitBackend, SystemGit};
use crate::tag::{parse_describe, post_zero_form, split_post, ReleaseTag};

/// Author-date column format produced by the log query (`%ai`).
const AUTHOR_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Canonical version descriptor for a source tree.
///
/// Either provenance path fills every field; partial descriptors do not
/// exist. `version` reparses into the numeric/prerelease subfields it is
/// stored next to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Canonical form `MAJOR.MINOR[.MICRO][PRERELEASE][.postN]`.
    pub version: String,
    /// Leading digit group of the release tag.
    pub major: u32,
    /// Second digit group of the release tag.
    pub minor: u32,
    /// Third digit group; zero when the tag omits it.
    pub micro: u32,
    /// Prerelease token (`a`, `b`, or `rc` with optional digits), if any.
    pub prerelease: Option<String>,
    /// Commits past the nearest release tag; zero at an exact release.
    pub patchnumber: u32,
    /// Full hash of the current revision.
    pub commit: String,
    /// Author date of the current revision, `YYYY-MM-DD HH:MM:SS +ZZZZ`.
    pub date: String,
}

impl VersionInfo {
    fn from_parts(version: String, patchnumber: u32, commit: String, date: String) -> Result<Self> {
        let (base, _) = split_post(&version);
        let tag = ReleaseTag::parse(base)?;
        Ok(Self {
            version,
            major: tag.major,
            minor: tag.minor,
            micro: tag.micro.unwrap_or(0),
            prerelease: tag.prerelease,
            patchnumber,
            commit,
            date,
        })
    }

    /// The commit's author date as a timezone-aware timestamp.
    pub fn commit_datetime(&self) -> Result<DateTime<FixedOffset>> {
        DateTime::parse_from_str(&self.date, AUTHOR_DATE_FORMAT).map_err(|_| {
            VersionError::Parse {
                text: self.date.clone(),
            }
        })
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.version)
    }
}

/// Version data recovered from a live source-control query, before the
/// fallback cross-check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveVersion {
    /// Tag version with the `.postN` suffix already applied.
    pub version: String,
    /// Commits past the described tag.
    pub patchnumber: u32,
    /// Full hash of the current revision.
    pub commit: String,
    /// Author date of the current revision.
    pub date: String,
}

/// Memoized outcome of the live probe. An empty first probe is retried
/// exactly once more per process before it becomes final.
#[derive(Debug, Clone)]
enum LiveProbe {
    Unprobed,
    Missing { retried: bool },
    Ready(LiveVersion),
}

/// Version resolver bound to one source tree.
///
/// The live query result is memoized inside the resolver, so a process
/// holding one resolver spawns the external queries at most twice no matter
/// how many threads ask. [`resolved_version`] wraps a process-wide instance
/// for the common case.
#[derive(Debug)]
pub struct Resolver<B: GitBackend = SystemGit> {
    backend: B,
    live: Mutex<LiveProbe>,
}

impl Resolver<SystemGit> {
    /// Resolver for the working tree rooted at `root`.
    pub fn from_tree(root: impl Into<std::path::PathBuf>) -> Self {
        Self::new(SystemGit::new(root))
    }
}

impl<B: GitBackend> Resolver<B> {
    /// Resolver over an explicit query backend.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            live: Mutex::new(LiveProbe::Unprobed),
        }
    }

    /// Access the underlying query backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Query source control for the current version.
    ///
    /// `Ok(None)` means the tree has no usable source-control metadata and
    /// the caller should fall back to the archival path. A describe output
    /// that does not match the release-tag grammar is an error and is not
    /// cached.
    pub fn live_version(&self) -> Result<Option<LiveVersion>> {
        let mut probe = self.live.lock();
        match &*probe {
            LiveProbe::Ready(live) => Ok(Some(live.clone())),
            LiveProbe::Missing { retried: true } => Ok(None),
            LiveProbe::Unprobed | LiveProbe::Missing { retried: false } => {
                let retrying = matches!(&*probe, LiveProbe::Missing { .. });
                match self.probe()? {
                    Some(live) => {
                        *probe = LiveProbe::Ready(live.clone());
                        Ok(Some(live))
                    }
                    None => {
                        *probe = LiveProbe::Missing { retried: retrying };
                        Ok(None)
                    }
                }
            }
        }
    }

    fn probe(&self) -> Result<Option<LiveVersion>> {
        let Some(described) = self.backend.describe() else {
            debug!("source control unavailable; version falls back to archive metadata");
            return Ok(None);
        };
        let Some(log_line) = self.backend.last_commit() else {
            return Ok(None);
        };
        let Some((commit, date)) = log_line.split_once(' ') else {
            return Ok(None);
        };
        let (base, patchnumber) = parse_describe(&described)?;
        ReleaseTag::parse(&base)?;
        let version = if patchnumber > 0 {
            format!("{base}.post{patchnumber}")
        } else {
            base
        };
        debug!(%version, commit, "version resolved from source control");
        Ok(Some(LiveVersion {
            version,
            patchnumber,
            commit: commit.to_owned(),
            date: date.to_owned(),
        }))
    }

    /// Resolve the full version descriptor.
    ///
    /// With live source control the checked-in `fallback` must agree with
    /// the described release, otherwise resolution fails with
    /// [`VersionError::Configuration`]: a stale fallback blocks the
    /// release until it is fixed. Without source control the expanded
    /// `archive` record supplies commit identity, and the version is the
    /// exact tag from its ref names when present, or `fallback` marked as
    /// an unresolved post-release otherwise.
    pub fn resolve(&self, fallback: &str, archive: Option<&ArchiveRecord>) -> Result<VersionInfo> {
        if let Some(live) = self.live_version()? {
            if post_zero_form(fallback) != post_zero_form(&live.version) {
                return Err(VersionError::Configuration {
                    fallback: fallback.to_owned(),
                    resolved: split_post(&live.version).0.to_owned(),
                });
            }
            return VersionInfo::from_parts(live.version, live.patchnumber, live.commit, live.date);
        }

        let record = archive.ok_or(VersionError::Environment)?;
        if !record.is_expanded() {
            return Err(VersionError::Environment);
        }
        let (version, patchnumber) = match record.version_tag() {
            Some(tag) => (tag, 0),
            None => {
                warn!(fallback, "archive ref names carry no release tag; using fallback version");
                (fallback.to_owned(), 1)
            }
        };
        VersionInfo::from_parts(version, patchnumber, record.commit.clone(), record.date.clone())
    }
}

static PROCESS_RESOLVER: Lazy<Resolver> = Lazy::new(|| Resolver::new(SystemGit::default()));
static RESOLVED: OnceCell<VersionInfo> = OnceCell::new();

/// Live-query the source tree this crate is checked into. See
/// [`Resolver::live_version`].
pub fn resolve_live_version() -> Result<Option<LiveVersion>> {
    PROCESS_RESOLVER.live_version()
}

/// Resolve a descriptor for the source tree this crate is checked into,
/// from an explicit fallback string and optional archive record. See
/// [`Resolver::resolve`].
pub fn resolve_version(fallback: &str, archive: Option<&ArchiveRecord>) -> Result<VersionInfo> {
    PROCESS_RESOLVER.resolve(fallback, archive)
}

/// The process-wide version descriptor.
///
/// Computed on first request from [`FALLBACK_VERSION`] and the co-located
/// archive record, then memoized for the remainder of the process; the
/// source tree is assumed immutable for the process's lifetime.
pub fn resolved_version() -> Result<&'static VersionInfo> {
    RESOLVED.get_or_try_init(|| {
        let record = ArchiveRecord::load(archive::default_record_path())?;
        PROCESS_RESOLVER.resolve(FALLBACK_VERSION, record.as_ref())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const LOG_LINE: &str =
        "8c6f7ae15d16ebd65f0d6c3f2dbd303c43e2ea94 2026-03-24 15:23:33 -0400";

    /// Scripted backend that counts describe queries.
    #[derive(Debug, Default)]
    struct ScriptedGit {
        describe: Option<String>,
        commit: Option<String>,
        describe_calls: AtomicUsize,
    }

    impl ScriptedGit {
        fn live(describe: &str) -> Self {
            Self {
                describe: Some(describe.to_owned()),
                commit: Some(LOG_LINE.to_owned()),
                describe_calls: AtomicUsize::new(0),
            }
        }

        fn absent() -> Self {
            Self::default()
        }

        fn calls(&self) -> usize {
            self.describe_calls.load(Ordering::SeqCst)
        }
    }

    impl GitBackend for ScriptedGit {
        fn describe(&self) -> Option<String> {
            self.describe_calls.fetch_add(1, Ordering::SeqCst);
            self.describe.clone()
        }

        fn last_commit(&self) -> Option<String> {
            self.commit.clone()
        }
    }

    fn expanded_record(refnames: &str) -> ArchiveRecord {
        ArchiveRecord {
            commit: "8c6f7ae15d16ebd65f0d6c3f2dbd303c43e2ea94".to_owned(),
            date: "2026-03-24 15:23:33 -0400".to_owned(),
            refnames: refnames.to_owned(),
        }
    }

    #[test]
    fn live_resolution_is_memoized() {
        let resolver = Resolver::new(ScriptedGit::live("v1.3.4-2-g8c6f7ae"));
        let first = resolver.live_version().unwrap().unwrap();
        let second = resolver.live_version().unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.version, "1.3.4.post2");
        assert_eq!(first.patchnumber, 2);
        assert_eq!(resolver.backend().calls(), 1);
    }

    #[test]
    fn empty_probe_is_retried_exactly_once() {
        let resolver = Resolver::new(ScriptedGit::absent());
        assert_eq!(resolver.live_version().unwrap(), None);
        assert_eq!(resolver.live_version().unwrap(), None);
        assert_eq!(resolver.live_version().unwrap(), None);
        assert_eq!(resolver.live_version().unwrap(), None);
        // One initial probe plus one retry, then permanently empty.
        assert_eq!(resolver.backend().calls(), 2);
    }

    #[test]
    fn exact_tag_has_no_post_suffix() {
        let resolver = Resolver::new(ScriptedGit::live("v1.3.4"));
        let live = resolver.live_version().unwrap().unwrap();
        assert_eq!(live.version, "1.3.4");
        assert_eq!(live.patchnumber, 0);
    }

    #[test]
    fn garbage_describe_is_a_parse_error() {
        let resolver = Resolver::new(ScriptedGit::live("not-a-tag"));
        assert!(matches!(
            resolver.live_version(),
            Err(VersionError::Parse { .. })
        ));
    }

    #[test]
    fn matching_fallback_returns_the_live_result() {
        let resolver = Resolver::new(ScriptedGit::live("v1.3.4-2-g8c6f7ae"));
        let info = resolver.resolve("1.3.4", None).unwrap();
        assert_eq!(info.version, "1.3.4.post2");
        assert_eq!((info.major, info.minor, info.micro), (1, 3, 4));
        assert_eq!(info.prerelease, None);
        assert_eq!(info.patchnumber, 2);
        assert_eq!(info.commit, "8c6f7ae15d16ebd65f0d6c3f2dbd303c43e2ea94");
        assert_eq!(info.date, "2026-03-24 15:23:33 -0400");
    }

    #[test]
    fn post_marked_fallback_also_matches() {
        let resolver = Resolver::new(ScriptedGit::live("v1.3.4"));
        let info = resolver.resolve("1.3.4.post0", None).unwrap();
        assert_eq!(info.version, "1.3.4");
        assert_eq!(info.patchnumber, 0);
    }

    #[test]
    fn stale_fallback_blocks_resolution() {
        let resolver = Resolver::new(ScriptedGit::live("v1.4.0"));
        let err = resolver.resolve("1.3.4", None).unwrap_err();
        assert!(matches!(err, VersionError::Configuration { .. }));
        assert!(err.to_string().contains("1.3.4"));
        assert!(err.to_string().contains("1.4.0"));
    }

    #[test]
    fn missing_record_without_source_control_is_an_environment_error() {
        let resolver = Resolver::new(ScriptedGit::absent());
        let err = resolver.resolve("1.3.4", None).unwrap_err();
        assert!(matches!(err, VersionError::Environment));
    }

    #[test]
    fn unexpanded_record_is_an_environment_error() {
        let resolver = Resolver::new(ScriptedGit::absent());
        let record = ArchiveRecord {
            commit: "$Format:%H$".to_owned(),
            date: "$Format:%ai$".to_owned(),
            refnames: "$Format:%D$".to_owned(),
        };
        let err = resolver.resolve("1.3.4", Some(&record)).unwrap_err();
        assert!(matches!(err, VersionError::Environment));
    }

    #[test]
    fn archive_tag_overrides_the_fallback() {
        let resolver = Resolver::new(ScriptedGit::absent());
        let record = expanded_record("HEAD -> master, tag: v2.0.0");
        let info = resolver.resolve("1.3.4", Some(&record)).unwrap();
        assert_eq!(info.version, "2.0.0");
        assert_eq!(info.patchnumber, 0);
        assert_eq!((info.major, info.minor, info.micro), (2, 0, 0));
        assert_eq!(info.commit, record.commit);
    }

    #[test]
    fn untagged_archive_uses_the_fallback_as_post_release() {
        let resolver = Resolver::new(ScriptedGit::absent());
        let record = expanded_record("HEAD -> master");
        let info = resolver.resolve("1.3.4", Some(&record)).unwrap();
        assert_eq!(info.version, "1.3.4");
        assert_eq!(info.patchnumber, 1);
        assert_eq!(info.date, record.date);
    }

    #[test]
    fn prerelease_fields_survive_resolution() {
        let resolver = Resolver::new(ScriptedGit::live("v2.0rc1-5-gdeadbee"));
        let info = resolver.resolve("2.0rc1", None).unwrap();
        assert_eq!(info.version, "2.0rc1.post5");
        assert_eq!((info.major, info.minor, info.micro), (2, 0, 0));
        assert_eq!(info.prerelease.as_deref(), Some("rc1"));
    }

    #[test]
    fn commit_datetime_parses_the_author_date() {
        let resolver = Resolver::new(ScriptedGit::live("v1.3.4"));
        let info = resolver.resolve("1.3.4", None).unwrap();
        let when = info.commit_datetime().unwrap();
        assert_eq!(when.timezone(), FixedOffset::west_opt(4 * 3600).unwrap());
    }

    #[test]
    fn descriptor_serialises_for_packaging_tooling() {
        let resolver = Resolver::new(ScriptedGit::live("v1.3.4"));
        let info = resolver.resolve("1.3.4", None).unwrap();
        let json = serde_json::to_string(&info).unwrap();
        let back: VersionInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, info);
    }
}
