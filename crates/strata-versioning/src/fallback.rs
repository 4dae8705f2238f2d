//! ---
//! strata_section: "01-release-versioning"
//! strata_subsection: "module"
//! strata_type: "source"
//! strata_scope: "code"
//! strata_description: "Version resolution against source control and archive metadata."
//! strata_version: "v0.1.0-alpha"
//! strata_owner: "tbd"
//! ---
//! Checked-in fallback version, used when no git repository is available,
//! for example when building from a source archive.

/// Static release version of record.
///
/// Update this constant when tagging a new release; resolution fails with a
/// configuration error whenever it drifts from the latest release tag.
pub const FALLBACK_VERSION: &str = "0.1.0";
