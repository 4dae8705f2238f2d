//! ---
//! strata_section: "01-release-versioning"
//! strata_subsection: "module"
//! strata_type: "source"
//! strata_scope: "code"
//! strata_description: "Version resolution against source control and archive metadata."
//! strata_version: "v0.1.0-alpha"
//! strata_owner: "tbd"
//! ---
//! Version resolution for the Strata workspace.
//!
//! Packaging and documentation tooling obtain one canonical version
//! descriptor per process, whether the tree is a live git checkout or a
//! `git archive` export: a live checkout is described against its release
//! tags and cross-checked against the checked-in fallback version, an
//! export is identified through the substituted archive metadata record.

pub mod archive;
pub mod build_info;
pub mod errors;
pub mod fallback;
pub mod git;
pub mod resolve;
pub mod tag;

pub use archive::ArchiveRecord;
pub use build_info::BuildInfo;
pub use errors::{Result, VersionError};
pub use fallback::FALLBACK_VERSION;
pub use git::{GitBackend, SystemGit};
pub use resolve::{
    resolve_live_version, resolve_version, resolved_version, LiveVersion, Resolver, VersionInfo,
};
pub use tag::ReleaseTag;
