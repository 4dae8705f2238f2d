//! ---
//! strata_section: "01-release-versioning"
//! strata_subsection: "module"
//! strata_type: "source"
//! strata_scope: "code"
//! strata_description: "Version resolution against source control and archive metadata."
//! strata_version: "v0.1.0-alpha"
//! strata_owner: "tbd"
//! ---
use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VersionError>;

/// Failures raised while resolving the workspace version.
///
/// Absence of source control is not an error; it selects the archival
/// resolution path instead. Everything below propagates to the packaging
/// entry point unchanged.
#[derive(Debug, Error)]
pub enum VersionError {
    /// A describe output, release tag, or date string did not match the
    /// expected grammar.
    #[error("cannot parse version string {text:?}")]
    Parse {
        /// Offending input, verbatim.
        text: String,
    },
    /// The archive metadata record exists but is not valid TOML.
    #[error("invalid archive record {}: {source}", path.display())]
    Archive {
        /// Location of the offending record.
        path: PathBuf,
        /// Underlying deserialisation failure.
        #[source]
        source: toml::de::Error,
    },
    /// The checked-in fallback version disagrees with the release tag
    /// resolved from source control. This is a release-process bug: the
    /// fallback record was not updated after tagging and must be fixed at
    /// the source, never worked around.
    #[error(
        "checked-in fallback version {fallback} disagrees with source control ({resolved}); \
         update the fallback record to match the latest release tag"
    )]
    Configuration {
        /// The fallback string supplied by the caller.
        fallback: String,
        /// Base version resolved from source control.
        resolved: String,
    },
    /// Neither source control nor an expanded archive record is available.
    #[error(
        "unable to determine the source version: build from a git checkout, \
         or from an archive created with `git archive` so that the \
         gitarchive record is expanded"
    )]
    Environment,
    /// Filesystem failure while reading a persisted record.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
