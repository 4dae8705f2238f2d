//! ---
//! strata_section: "01-release-versioning"
//! strata_subsection: "module"
//! strata_type: "source"
//! strata_scope: "code"
//! strata_description: "Version resolution against source control and archive metadata."
//! strata_version: "v0.1.0-alpha"
//! strata_owner: "tbd"
//! ---
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::errors::{Result, VersionError};

/// File name of the archive metadata record co-located with this crate.
pub const ARCHIVE_RECORD_FILE: &str = "gitarchive.toml";

/// Prefix left behind in record values when `git archive` export
/// substitution did not run. Its presence means the tree is not a proper
/// archive export.
const FORMAT_PLACEHOLDER: &str = "$Format";

/// Exact version tag marker inside a `%D` ref-names list, e.g.
/// `HEAD -> master, tag: v2.0.0`.
static REF_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\btag: v(\d[^,\s]*)").expect("ref-names grammar to compile"));

/// Commit metadata captured at archive-export time.
///
/// The checked-in record holds `$Format:…$` placeholder tokens which
/// `git archive` substitutes through the `export-subst` attribute; a tree
/// unpacked from such an archive therefore carries the exporting commit's
/// identity even though it has no source-control history.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArchiveRecord {
    /// Full hash of the exported commit (`%H`).
    pub commit: String,
    /// Author date of the exported commit (`%ai`).
    pub date: String,
    /// Ref names pointing at the exported commit (`%D`).
    pub refnames: String,
}

impl ArchiveRecord {
    /// Read a record from disk. A missing file is absence (`None`), a file
    /// that is not valid TOML is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let record = toml::from_str(&raw).map_err(|source| VersionError::Archive {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(record))
    }

    /// Whether export substitution actually ran on this record.
    #[must_use]
    pub fn is_expanded(&self) -> bool {
        !self.commit.contains(FORMAT_PLACEHOLDER)
    }

    /// Exact release tag recorded in the ref names, without the leading
    /// `v`, when the exported commit was itself a tagged release.
    #[must_use]
    pub fn version_tag(&self) -> Option<String> {
        REF_TAG_RE
            .captures(&self.refnames)
            .map(|caps| caps[1].to_owned())
    }
}

/// Location of the archive record shipped with this crate.
#[must_use]
pub fn default_record_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(ARCHIVE_RECORD_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn record(commit: &str, refnames: &str) -> ArchiveRecord {
        ArchiveRecord {
            commit: commit.to_owned(),
            date: "2026-03-24 15:23:33 -0400".to_owned(),
            refnames: refnames.to_owned(),
        }
    }

    #[test]
    fn missing_record_is_absent() {
        let scratch = tempfile::tempdir().unwrap();
        let loaded = ArchiveRecord::load(scratch.path().join(ARCHIVE_RECORD_FILE)).unwrap();
        assert_eq!(loaded, None);
    }

    #[test]
    fn record_loads_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "commit = \"51a9cfbf\"\ndate = \"2026-03-24 15:23:33 -0400\"\nrefnames = \"HEAD -> master, tag: v2.0.0\"\n"
        )
        .unwrap();
        let loaded = ArchiveRecord::load(file.path()).unwrap().unwrap();
        assert_eq!(loaded.commit, "51a9cfbf");
        assert!(loaded.is_expanded());
        assert_eq!(loaded.version_tag().as_deref(), Some("2.0.0"));
    }

    #[test]
    fn malformed_record_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "commit = [not toml").unwrap();
        let err = ArchiveRecord::load(file.path()).unwrap_err();
        assert!(matches!(err, VersionError::Archive { .. }));
    }

    #[test]
    fn unsubstituted_placeholder_is_detected() {
        assert!(!record("$Format:%H$", "$Format:%D$").is_expanded());
        assert!(record("51a9cfbf", "").is_expanded());
    }

    #[test]
    fn version_tag_requires_a_tag_marker() {
        assert_eq!(record("c0ffee", "HEAD -> master").version_tag(), None);
        assert_eq!(
            record("c0ffee", "HEAD, tag: maintenance, tag: v1.3.4rc2, origin/master")
                .version_tag()
                .as_deref(),
            Some("1.3.4rc2")
        );
    }

    #[test]
    fn shipped_record_still_carries_placeholders() {
        // The checked-in record must only ever be expanded by `git archive`.
        let record = ArchiveRecord::load(default_record_path()).unwrap().unwrap();
        assert!(!record.is_expanded());
    }
}
